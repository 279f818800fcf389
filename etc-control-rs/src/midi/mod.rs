//! MIDI 1.0 byte-stream codec.
//!
//! [`MidiDecoder`] turns a raw serial byte stream into discrete
//! [`MidiEvent`]s one byte at a time, honouring running status, and
//! [`MidiEncoder`] produces wire bytes for events going back out (MIDI
//! thru), applying running-status compression on the send side.
//!
//! # Status classes
//!
//! ```text
//! 0x80 note off        2 args    0xF2 song position  2 args
//! 0x90 note on         2 args    0xF3 song select    1 arg
//! 0xA0 poly pressure   2 args    0xF6 tune request   immediate
//! 0xB0 control change  2 args    0xF8 clock          immediate (real-time)
//! 0xC0 program change  1 arg     0xFA start / 0xFB continue / 0xFC stop
//! 0xD0 channel press.  1 arg     0xFE active sense / 0xFF reset
//! 0xE0 pitch bend      2 args    0xF0 … 0xF7 vendor (SysEx) passthrough
//! ```

mod decoder;
mod encoder;

pub use decoder::MidiDecoder;
pub use encoder::MidiEncoder;

// ── Status bytes ─────────────────────────────────────────────────────────

pub const STATUS_NOTE_OFF: u8 = 0x80;
pub const STATUS_NOTE_ON: u8 = 0x90;
pub const STATUS_POLY_PRESSURE: u8 = 0xA0;
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
pub const STATUS_PROGRAM_CHANGE: u8 = 0xC0;
pub const STATUS_CHANNEL_PRESSURE: u8 = 0xD0;
pub const STATUS_PITCH_BEND: u8 = 0xE0;
pub const STATUS_VENDOR_START: u8 = 0xF0;
pub const STATUS_SONG_POSITION: u8 = 0xF2;
pub const STATUS_SONG_SELECT: u8 = 0xF3;
pub const STATUS_TUNE_REQUEST: u8 = 0xF6;
pub const STATUS_VENDOR_END: u8 = 0xF7;
pub const STATUS_CLOCK: u8 = 0xF8;
pub const STATUS_START: u8 = 0xFA;
pub const STATUS_CONTINUE: u8 = 0xFB;
pub const STATUS_STOP: u8 = 0xFC;
pub const STATUS_ACTIVE_SENSE: u8 = 0xFE;
pub const STATUS_RESET: u8 = 0xFF;

/// Channel filter value meaning "accept every channel".
pub const OMNI: u8 = 0;

/// Clock pulses per quarter note.
pub const PPQN: u8 = 24;

/// Status class of a status byte: the high nibble for channel messages,
/// the full byte for system messages (`>= 0xF0`).
#[inline]
pub(crate) fn status_class(status: u8) -> u8 {
    if status < 0xF0 {
        status & 0xF0
    } else {
        status
    }
}

/// One complete logical MIDI event.
///
/// Channels are 1-based (1–16) as in the user-facing MIDI convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiEvent {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    PolyPressure { channel: u8, note: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend value, 0x2000 is centre.
    PitchBend { channel: u8, value: u16 },
    /// 14-bit position in MIDI beats (sixteenth notes).
    SongPosition(u16),
    SongSelect(u8),
    TuneRequest,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSense,
    Reset,
    /// Entered vendor (SysEx) passthrough.
    VendorStart,
    /// One byte of vendor passthrough payload.
    VendorData(u8),
    /// Left vendor passthrough.
    VendorEnd,
}

impl MidiEvent {
    /// `true` for system real-time events, which may be interleaved with
    /// any other message without affecting running status.
    pub fn is_realtime(&self) -> bool {
        matches!(
            self,
            MidiEvent::Clock
                | MidiEvent::Start
                | MidiEvent::Continue
                | MidiEvent::Stop
                | MidiEvent::ActiveSense
                | MidiEvent::Reset
        )
    }
}
