//! Text for the two-module, four-character LED matrix display.
//!
//! Only the page model and string formatting live here; pushing the
//! characters to the hardware is the sink's business.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::channel::Channel;
use crate::error::CoreError;
use crate::reading::Reading;

/// Characters available on the display.
pub const DISPLAY_WIDTH: usize = 4;

/// Shown when a value does not fit in [`DISPLAY_WIDTH`] characters.
const OVERFLOW: &str = "----";

/// One view of the display, cycled by the trackball button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayPage {
    /// Wall clock, `HHMM`.
    Time,
    Channel(Channel),
}

impl DisplayPage {
    /// Pages in button order.
    pub const ALL: [DisplayPage; 7] = [
        DisplayPage::Time,
        DisplayPage::Channel(Channel::Temperature),
        DisplayPage::Channel(Channel::Pressure),
        DisplayPage::Channel(Channel::Humidity),
        DisplayPage::Channel(Channel::Gas),
        DisplayPage::Channel(Channel::Smoke),
        DisplayPage::Channel(Channel::AirQuality),
    ];

    pub fn label(self) -> &'static str {
        match self {
            DisplayPage::Time => "TIME",
            DisplayPage::Channel(channel) => channel.label(),
        }
    }

    /// The page after this one, wrapping back to [`DisplayPage::Time`].
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Whether the decimal point between the two modules is lit.
    ///
    /// Values formatted with one implied decimal place light it; the clock
    /// blinks it with `tick`.
    pub fn decimal_point(self, tick: bool) -> bool {
        match self {
            DisplayPage::Time => tick,
            DisplayPage::Channel(Channel::Temperature | Channel::Humidity | Channel::AirQuality) => {
                true
            }
            DisplayPage::Channel(_) => false,
        }
    }
}

impl fmt::Display for DisplayPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DisplayPage {
    type Err = CoreError;

    /// Parse a page label, ignoring case and surrounding spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().trim().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Validation(format!("unknown display page '{s}'")))
    }
}

/// Render one page as exactly [`DISPLAY_WIDTH`] right-aligned characters.
pub fn format_page(page: DisplayPage, reading: &Reading, clock: NaiveTime) -> String {
    let text = match page {
        DisplayPage::Time => format!("{:02}{:02}", clock.hour(), clock.minute()),
        DisplayPage::Channel(channel) => format_channel(channel, reading),
    };
    if text.chars().count() > DISPLAY_WIDTH {
        return OVERFLOW.to_string();
    }
    format!("{text:>width$}", width = DISPLAY_WIDTH)
}

fn format_channel(channel: Channel, reading: &Reading) -> String {
    match channel {
        Channel::Temperature => format!("{}c", implied_decimal(reading.temperature)),
        Channel::Pressure => format!("{}", reading.pressure.round() as i64),
        Channel::Humidity => format!("{}%", implied_decimal(reading.humidity)),
        Channel::Gas => {
            let kohms = (f64::from(reading.gas_resistance) / 1000.0).round() as u32;
            format!("{}ko", kohms.min(99))
        }
        Channel::Smoke => format!("{}", reading.smoke.min(9999)),
        Channel::AirQuality => format!("{}%", implied_decimal(reading.air_quality)),
    }
}

/// One decimal place with the point dropped: `21.37` becomes `214`.
fn implied_decimal(value: f64) -> String {
    format!("{value:.1}").replace('.', "")
}

/// Display brightness by hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Brightness {
    Full,
    Dim,
}

impl Brightness {
    /// Full from 10:00 until 20:59, dimmed overnight.
    pub fn for_hour(hour: u32) -> Self {
        if hour > 9 && hour < 21 {
            Brightness::Full
        } else {
            Brightness::Dim
        }
    }

    /// Driver brightness level in `0.0..=1.0`.
    pub fn level(self) -> f32 {
        match self {
            Brightness::Full => 1.0,
            Brightness::Dim => 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SensorSample;

    fn reading() -> Reading {
        Reading::from_sample(SensorSample::new(21.37, 1013.4, 45.26, 23_600.0, 42.0))
    }

    fn clock() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 5, 0).unwrap()
    }

    #[test]
    fn formats_each_page() {
        let r = reading();
        let rendered: Vec<String> = DisplayPage::ALL
            .into_iter()
            .map(|p| format_page(p, &r, clock()))
            .collect();
        assert_eq!(
            rendered,
            vec!["0905", "214c", "1013", "453%", "24ko", "  42", "582%"]
        );
    }

    #[test]
    fn gas_and_smoke_saturate() {
        let r = Reading::from_sample(SensorSample::new(0.0, 0.0, 0.0, 250_000.0, 123_456.0));
        assert_eq!(format_page(DisplayPage::Channel(Channel::Gas), &r, clock()), "99ko");
        assert_eq!(format_page(DisplayPage::Channel(Channel::Smoke), &r, clock()), "9999");
    }

    #[test]
    fn short_values_are_right_aligned() {
        let r = Reading::from_sample(SensorSample::new(5.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(format_page(DisplayPage::Channel(Channel::Temperature), &r, clock()), " 50c");
    }

    #[test]
    fn overflowing_values_show_dashes() {
        let r = Reading::from_sample(SensorSample::new(104.2, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(format_page(DisplayPage::Channel(Channel::Temperature), &r, clock()), "----");
    }

    #[test]
    fn pages_wrap_around() {
        let mut page = DisplayPage::Time;
        for _ in 0..DisplayPage::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, DisplayPage::Time);
        assert_eq!(DisplayPage::Channel(Channel::AirQuality).next(), DisplayPage::Time);
    }

    #[test]
    fn decimal_point_policy() {
        assert!(DisplayPage::Channel(Channel::Temperature).decimal_point(false));
        assert!(!DisplayPage::Channel(Channel::Pressure).decimal_point(true));
        assert!(DisplayPage::Time.decimal_point(true));
        assert!(!DisplayPage::Time.decimal_point(false));
    }

    #[test]
    fn parses_labels() {
        assert_eq!("gas".parse::<DisplayPage>().unwrap(), DisplayPage::Channel(Channel::Gas));
        assert_eq!("AIRQ".parse::<DisplayPage>().unwrap(), DisplayPage::Channel(Channel::AirQuality));
        assert!("wind".parse::<DisplayPage>().is_err());
    }

    #[test]
    fn dims_overnight() {
        assert_eq!(Brightness::for_hour(9), Brightness::Dim);
        assert_eq!(Brightness::for_hour(10), Brightness::Full);
        assert_eq!(Brightness::for_hour(20), Brightness::Full);
        assert_eq!(Brightness::for_hour(21), Brightness::Dim);
    }
}
