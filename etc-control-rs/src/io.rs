//! Hardware collaborators the scheduler drives.
//!
//! The scheduler owns no peripherals. Every side effect goes through one of
//! the traits below, so the same control loop runs against the RP2350
//! firmware and against an in-memory mock in tests. All methods are
//! non-blocking: inputs return `None`/`false` when nothing is available and
//! outputs drop data rather than wait when their buffer is full.
//!
//! [`Board`] bundles them; any type implementing all of the collaborator
//! traits is a `Board` automatically.

use crate::input::KNOB_COUNT;
use crate::wire::{Message, Outbound};

/// Red/green/blue indicator state, one bit per colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::from_code(0);
    pub const RED: Rgb = Rgb::from_code(4);
    pub const GREEN: Rgb = Rgb::from_code(2);

    /// Decode a 3-bit colour code: bit 2 red, bit 1 green, bit 0 blue.
    ///
    /// Codes outside 0–7 wrap modulo 8.
    ///
    /// ```
    /// use etc_control::Rgb;
    ///
    /// assert_eq!(Rgb::from_code(6), Rgb { red: true, green: true, blue: false });
    /// assert_eq!(Rgb::from_code(8), Rgb::OFF);
    /// ```
    pub const fn from_code(code: i32) -> Self {
        let code = code.rem_euclid(8);
        Self {
            red: code & 0b100 != 0,
            green: code & 0b010 != 0,
            blue: code & 0b001 != 0,
        }
    }
}

/// Incoming MIDI byte stream.
pub trait MidiIn {
    /// Next received byte, if any.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Outgoing MIDI byte stream.
pub trait MidiOut {
    fn write_bytes(&mut self, bytes: &[u8]);
}

/// Framed host link.
pub trait Transport {
    /// Next complete, well-formed inbound message. Malformed frames are
    /// discarded by the implementation and never surface here.
    fn receive(&mut self) -> Option<Message>;

    /// Queue one outbound message for the host.
    fn send(&mut self, message: &Outbound);
}

/// Raw key levels, already converted to "pressed" polarity.
pub trait DigitalInputs {
    fn key_pressed(&mut self, index: usize) -> bool;
}

/// Analog converter delivering complete scans of all knob channels.
pub trait AnalogInputs {
    /// Take the most recent complete batch in physical channel order,
    /// clearing the batch-complete flag. `None` if no new batch finished
    /// since the last call.
    fn take_batch(&mut self) -> Option<[u16; KNOB_COUNT]>;
}

/// RGB status indicator.
pub trait Indicator {
    fn set_rgb(&mut self, rgb: Rgb);
}

/// Optional text display. Boards without one implement this as a no-op.
pub trait StatusDisplay {
    fn clear(&mut self);
    /// Draw `text` on text row `line`, replacing what was there.
    fn draw_text(&mut self, line: u8, text: &str);
    /// Push pending drawing to the panel.
    fn refresh(&mut self);
}

/// Everything the scheduler needs from the hardware.
pub trait Board:
    MidiIn + MidiOut + Transport + DigitalInputs + AnalogInputs + Indicator + StatusDisplay
{
}

impl<T> Board for T where
    T: MidiIn + MidiOut + Transport + DigitalInputs + AnalogInputs + Indicator + StatusDisplay
{
}
