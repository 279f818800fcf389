//! Text-row status screen and its renderer.
//!
//! [`StatusScreen`] is what the control loop draws into through the
//! [`StatusDisplay`] trait. Drawing edits a staged frame; `refresh()`
//! publishes it and bumps a revision counter. The display task renders the
//! published [`StatusFrame`] whenever the revision moves, so the control
//! loop never waits on I2C.

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Text},
};
use etc_control::io::StatusDisplay;
use heapless::String;

/// Text rows on a 64 px tall panel with 12 px line pitch.
pub const TEXT_LINES: usize = 5;

/// Characters per row: 128 px / 6 px glyphs.
pub const LINE_CHARS: usize = 21;

/// One row of text.
pub type Line = String<LINE_CHARS>;

const EMPTY_LINE: Line = String::new();

// ── DisplayConfig ────────────────────────────────────────────────────────

/// Layout geometry and refresh rate for the status screen.
///
/// [`DisplayConfig::default()`] fits [`TEXT_LINES`] rows of `FONT_6X10`
/// on a 128×64 panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Panel poll rate in Hz. Default: 20.
    pub update_frequency_hz: u32,
    /// Left margin in pixels. Default: 0.
    pub text_x: i32,
    /// Baseline of the first row, pixels from the top. Default: 10.
    pub first_baseline: i32,
    /// Distance between row baselines. Default: 12.
    pub line_height: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 20,
            text_x: 0,
            first_baseline: 10,
            line_height: 12,
        }
    }
}

impl DisplayConfig {
    /// Poll period in milliseconds: `1000 / update_frequency_hz`.
    pub fn update_period_ms(&self) -> u64 {
        1000 / u64::from(self.update_frequency_hz.max(1))
    }
}

// ── StatusFrame ──────────────────────────────────────────────────────────

/// Everything on screen for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFrame {
    pub lines: [Line; TEXT_LINES],
}

impl StatusFrame {
    pub const fn new() -> Self {
        Self {
            lines: [EMPTY_LINE; TEXT_LINES],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }
}

// ── StatusScreen ─────────────────────────────────────────────────────────

/// Staged/published pair of frames shared between the control loop and
/// the display task.
#[derive(Debug, Clone, Default)]
pub struct StatusScreen {
    staged: StatusFrame,
    published: StatusFrame,
    revision: u32,
}

impl StatusScreen {
    pub const fn new() -> Self {
        Self {
            staged: StatusFrame::new(),
            published: StatusFrame::new(),
            revision: 0,
        }
    }

    /// Last frame published by `refresh()`.
    pub fn published(&self) -> &StatusFrame {
        &self.published
    }

    /// Incremented (wrapping) each time a changed frame is published.
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl StatusDisplay for StatusScreen {
    fn clear(&mut self) {
        self.staged = StatusFrame::new();
    }

    /// Rows past [`TEXT_LINES`] are ignored; text is cut at
    /// [`LINE_CHARS`] characters.
    fn draw_text(&mut self, line: u8, text: &str) {
        let Some(row) = self.staged.lines.get_mut(usize::from(line)) else {
            return;
        };
        row.clear();
        for c in text.chars() {
            if row.push(c).is_err() {
                break;
            }
        }
    }

    fn refresh(&mut self) {
        if self.staged != self.published {
            self.published = self.staged.clone();
            self.revision = self.revision.wrapping_add(1);
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Draw `frame` into `display`. The caller clears the buffer first.
///
/// ```text
/// ┌─────────────────────┐
/// │Booting 12%          │  ← first_baseline
/// │                     │  ← + line_height
/// │        …            │
/// └─────────────────────┘
/// ```
pub fn render_status<D>(
    display: &mut D,
    frame: &StatusFrame,
    config: &DisplayConfig,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

    let mut y = config.first_baseline;
    for line in frame.lines.iter() {
        if !line.is_empty() {
            Text::with_alignment(line, Point::new(config.text_x, y), style, Alignment::Left)
                .draw(display)?;
        }
        y += config.line_height;
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────
