//! Alert indicator (the RGB trackball LED) state.
//!
//! The blink phase flips on every monitoring cycle. While a warning is
//! active the LED shows the alert colour on the "on" phase and goes dark
//! on the other, so it blinks at the cycle rate instead of staying solid.

use serde::Serialize;

/// Colour the indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    Off,
    Red,
}

/// What a sink needs to drive the indicator for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorState {
    pub warning_active: bool,
    pub blink_phase: bool,
}

impl IndicatorState {
    pub fn color(&self) -> IndicatorColor {
        if self.warning_active && self.blink_phase {
            IndicatorColor::Red
        } else {
            IndicatorColor::Off
        }
    }
}

/// Blink-phase tracker owned by the monitoring cycle.
#[derive(Debug, Default)]
pub struct Indicator {
    phase: bool,
}

impl Indicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the phase and report the state for this cycle.
    pub fn advance(&mut self, warning_active: bool) -> IndicatorState {
        self.phase = !self.phase;
        IndicatorState {
            warning_active,
            blink_phase: self.phase,
        }
    }
}
