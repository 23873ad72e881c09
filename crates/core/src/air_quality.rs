//! Composite air-quality score from humidity and gas resistance.
//!
//! Humidity contributes up to 25 points and gas resistance up to 75. The
//! humidity term is normalised asymmetrically around the 40 % ideal: the
//! deficit below it is divided by 40, the excess above it by 60. This is
//! a known quirk and is kept as-is, so `score(20, g)` and `score(60, g)`
//! differ even though both are 20 points from the ideal.

use serde::Serialize;

/// Ideal relative humidity in percent.
pub const IDEAL_HUMIDITY: f64 = 40.0;

/// Gas resistance at or above which the gas term is maxed out.
pub const GAS_CEILING_OHMS: f64 = 50_000.0;

/// Upper bound of the score.
pub const MAX_SCORE: f64 = 99.9;

const HUMIDITY_WEIGHT: f64 = 25.0;
const GAS_WEIGHT: f64 = 75.0;

/// Score a humidity / gas pair into `[0, 99.9]`, rounded to one decimal.
pub fn score(humidity: f64, gas_resistance: f64) -> f64 {
    let total = humidity_contribution(humidity) + gas_contribution(gas_resistance);
    let rounded = (total * 10.0).round() / 10.0;
    // Rounding can push an ideal reading to 100.0.
    rounded.clamp(0.0, MAX_SCORE)
}

/// Humidity term, 25 points at exactly [`IDEAL_HUMIDITY`].
pub fn humidity_contribution(humidity: f64) -> f64 {
    let diff = (IDEAL_HUMIDITY - humidity).abs();
    if humidity < IDEAL_HUMIDITY {
        HUMIDITY_WEIGHT - diff / IDEAL_HUMIDITY * HUMIDITY_WEIGHT
    } else if humidity > IDEAL_HUMIDITY {
        HUMIDITY_WEIGHT - diff / (100.0 - IDEAL_HUMIDITY) * HUMIDITY_WEIGHT
    } else {
        HUMIDITY_WEIGHT
    }
}

/// Gas term; negative resistance counts as zero.
pub fn gas_contribution(gas_resistance: f64) -> f64 {
    let gas = gas_resistance.clamp(0.0, GAS_CEILING_OHMS);
    GAS_WEIGHT - (GAS_CEILING_OHMS - gas) / GAS_CEILING_OHMS * GAS_WEIGHT
}

/// Qualitative band used by the dashboard gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AirQualityBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl AirQualityBand {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 50.0 => AirQualityBand::Poor,
            s if s < 70.0 => AirQualityBand::Fair,
            s if s < 85.0 => AirQualityBand::Good,
            _ => AirQualityBand::Excellent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_point_caps_at_max() {
        assert_eq!(score(40.0, 50_000.0), 99.9);
        assert_eq!(score(40.0, 2_000_000.0), 99.9);
    }

    #[test]
    fn score_stays_in_range() {
        for h in 0..=100 {
            for gas in [0.0, 1.0, 12_345.0, 49_999.0, 50_000.0, 1e9] {
                let s = score(f64::from(h), gas);
                assert!((0.0..=MAX_SCORE).contains(&s), "h={h} gas={gas} -> {s}");
            }
        }
    }

    #[test]
    fn humidity_normalisation_is_asymmetric() {
        // 20 points below the ideal: 25 - 20/40*25 = 12.5
        assert_eq!(score(20.0, 0.0), 12.5);
        // 20 points above the ideal: 25 - 20/60*25 = 16.67
        assert_eq!(score(60.0, 0.0), 16.7);
        assert_ne!(score(20.0, 0.0), score(60.0, 0.0));
    }

    #[test]
    fn extremes_with_no_gas_score_zero() {
        assert_eq!(score(0.0, 0.0), 0.0);
        assert_eq!(score(100.0, 0.0), 0.0);
    }

    #[test]
    fn gas_term_is_linear_below_ceiling() {
        assert_eq!(gas_contribution(25_000.0), 37.5);
        assert_eq!(score(40.0, 25_000.0), 62.5);
    }

    #[test]
    fn negative_gas_counts_as_zero() {
        assert_eq!(gas_contribution(-10_000.0), 0.0);
        assert_eq!(score(40.0, -10_000.0), 25.0);
    }

    #[test]
    fn bands_follow_gauge_ranges() {
        assert_eq!(AirQualityBand::from_score(12.0), AirQualityBand::Poor);
        assert_eq!(AirQualityBand::from_score(50.0), AirQualityBand::Fair);
        assert_eq!(AirQualityBand::from_score(84.9), AirQualityBand::Good);
        assert_eq!(AirQualityBand::from_score(99.9), AirQualityBand::Excellent);
    }
}
