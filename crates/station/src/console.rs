//! Console rendering of the LED display and indicator.
//!
//! The segment and trackball drivers are outside this process; this sink
//! logs exactly what they would be told to show, one line per cycle.
//! Trackball presses arrive through a [`PageButton`] and take effect on
//! the next frame.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveTime, Timelike};

use envmon_core::cycle::{CycleOutput, DisplaySink};
use envmon_core::display::{format_page, Brightness, DisplayPage};

pub struct ConsoleDisplay {
    page: DisplayPage,
    brightness: Option<Brightness>,
    button: PageButton,
}

/// Shareable handle for the trackball's short press.
#[derive(Debug, Clone, Default)]
pub struct PageButton(Arc<AtomicU32>);

impl PageButton {
    pub fn press(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn take(&self) -> u32 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// One frame of the LED matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub text: String,
    pub decimal_point: bool,
    pub brightness: Brightness,
    /// Every page rendered, in button order, for the console line.
    pub pages: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new(page: DisplayPage) -> Self {
        Self {
            page,
            brightness: None,
            button: PageButton::default(),
        }
    }

    pub fn button(&self) -> PageButton {
        self.button.clone()
    }

    pub fn page(&self) -> DisplayPage {
        self.page
    }

    fn apply_presses(&mut self) {
        let presses = self.button.take();
        if presses == 0 {
            return;
        }
        for _ in 0..presses {
            self.page = self.page.next();
        }
        tracing::info!(page = %self.page, presses, "Display page changed");
    }

    /// Render the frame for `output` at wall-clock time `clock`.
    pub fn render(&mut self, output: &CycleOutput, clock: NaiveTime) -> Frame {
        let brightness = Brightness::for_hour(clock.hour());
        if self.brightness != Some(brightness) {
            tracing::info!(?brightness, level = brightness.level(), "Display brightness changed");
            self.brightness = Some(brightness);
        }

        Frame {
            text: format_page(self.page, &output.reading, clock),
            decimal_point: self.page.decimal_point(output.indicator.blink_phase),
            brightness,
            pages: DisplayPage::ALL
                .into_iter()
                .map(|p| format_page(p, &output.reading, clock))
                .collect(),
        }
    }
}

impl DisplaySink for ConsoleDisplay {
    fn present(&mut self, output: &CycleOutput) {
        self.apply_presses();
        let frame = self.render(output, Local::now().time());
        tracing::info!(
            page = %self.page,
            text = %frame.text,
            decimal_point = frame.decimal_point,
            pages = ?frame.pages,
            indicator = ?output.indicator.color(),
            "Display",
        );
    }
}
