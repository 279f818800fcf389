//! Packed snapshot of live MIDI state sent to the host as `/mblob`.
//!
//! ```text
//! byte  0..16   note-on bitfield, note n = bit (n & 7) of byte (n >> 3)
//! byte 16..21   controllers 21, 22, 23, 24, 25
//! byte 21       clock position within the quarter note (0–23)
//! byte 22       current program
//! ```
//!
//! Every update is a targeted bit or byte write. The blob is written by
//! MIDI event handling and read by the snapshot path, both from the same
//! scheduler context, so a [`snapshot()`](LiveState::snapshot) is always
//! internally consistent.

use crate::midi::{MidiEvent, PPQN};

/// Size of the packed blob in bytes.
pub const BLOB_LEN: usize = 23;

/// Number of bytes holding the 128-note bitfield.
pub const NOTE_BYTES: usize = 16;

/// Controller numbers mirrored into the blob, in slot order.
pub const BLOB_CONTROLLERS: [u8; 5] = [21, 22, 23, 24, 25];

const CONTROLLER_BASE: usize = NOTE_BYTES;
const SYNC_INDEX: usize = 21;
const PROGRAM_INDEX: usize = 22;

/// Live note/controller/transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveState {
    blob: [u8; BLOB_LEN],
}

impl Default for LiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveState {
    pub const fn new() -> Self {
        Self {
            blob: [0; BLOB_LEN],
        }
    }

    /// Zero every field.
    pub fn clear(&mut self) {
        self.blob = [0; BLOB_LEN];
    }

    /// Copy of the current blob for transmission.
    pub fn snapshot(&self) -> [u8; BLOB_LEN] {
        self.blob
    }

    // ── Notes ────────────────────────────────────────────────────────

    pub fn note_on(&mut self, note: u8) {
        let (byte, bit) = note_position(note);
        self.blob[byte] |= bit;
    }

    pub fn note_off(&mut self, note: u8) {
        let (byte, bit) = note_position(note);
        self.blob[byte] &= !bit;
    }

    pub fn is_note_on(&self, note: u8) -> bool {
        let (byte, bit) = note_position(note);
        self.blob[byte] & bit != 0
    }

    // ── Controllers ──────────────────────────────────────────────────

    /// Store `value` if `controller` is one of [`BLOB_CONTROLLERS`];
    /// other controller numbers are ignored.
    pub fn set_controller(&mut self, controller: u8, value: u8) {
        if let Some(slot) = BLOB_CONTROLLERS.iter().position(|&c| c == controller) {
            self.blob[CONTROLLER_BASE + slot] = value;
        }
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Count one clock pulse, wrapping every quarter note.
    pub fn advance_sync(&mut self) {
        let next = self.blob[SYNC_INDEX] + 1;
        self.blob[SYNC_INDEX] = if next >= PPQN { 0 } else { next };
    }

    pub fn reset_sync(&mut self) {
        self.blob[SYNC_INDEX] = 0;
    }

    pub fn sync(&self) -> u8 {
        self.blob[SYNC_INDEX]
    }

    pub fn set_program(&mut self, program: u8) {
        self.blob[PROGRAM_INDEX] = program;
    }

    pub fn program(&self) -> u8 {
        self.blob[PROGRAM_INDEX]
    }

    // ── Event mapping ────────────────────────────────────────────────

    /// Fold a decoded MIDI event into the blob. Events without a blob
    /// field are ignored.
    pub fn apply(&mut self, event: &MidiEvent) {
        match *event {
            MidiEvent::NoteOn { note, .. } => self.note_on(note),
            MidiEvent::NoteOff { note, .. } => self.note_off(note),
            MidiEvent::ControlChange {
                controller, value, ..
            } => self.set_controller(controller, value),
            MidiEvent::ProgramChange { program, .. } => self.set_program(program),
            MidiEvent::Clock => self.advance_sync(),
            MidiEvent::Start | MidiEvent::Continue => self.reset_sync(),
            _ => {}
        }
    }
}

/// Byte index and bit mask for `note`. Masking keeps every note in range.
fn note_position(note: u8) -> (usize, u8) {
    (usize::from((note >> 3) & 0x0F), 1 << (note & 0x07))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Notes ────────────────────────────────────────────────────────

    #[test]
    fn note_bit_layout() {
        let mut ls = LiveState::new();
        ls.note_on(0);
        ls.note_on(9);
        ls.note_on(127);
        let blob = ls.snapshot();
        assert_eq!(blob[0], 0b0000_0001);
        assert_eq!(blob[1], 0b0000_0010);
        assert_eq!(blob[15], 0b1000_0000);
    }

    #[test]
    fn note_off_clears_only_its_bit() {
        let mut ls = LiveState::new();
        ls.note_on(60);
        ls.note_on(61);
        ls.note_off(60);
        assert!(!ls.is_note_on(60));
        assert!(ls.is_note_on(61));
    }

    #[test]
    fn note_on_then_off_restores_zero() {
        for note in 0..128u8 {
            let mut ls = LiveState::new();
            ls.note_on(note);
            ls.note_off(note);
            assert_eq!(ls.snapshot(), [0; BLOB_LEN], "note {}", note);
        }
    }

    #[test]
    fn last_operation_wins_per_note() {
        let mut ls = LiveState::new();
        let ops: [(u8, bool); 8] = [
            (60, true),
            (60, true),
            (64, true),
            (60, false),
            (67, true),
            (64, false),
            (64, true),
            (67, false),
        ];
        let mut expected = [false; 128];
        for &(note, on) in &ops {
            if on {
                ls.note_on(note);
            } else {
                ls.note_off(note);
            }
            expected[note as usize] = on;
        }
        for note in 0..128u8 {
            assert_eq!(ls.is_note_on(note), expected[note as usize], "note {}", note);
        }
    }

    #[test]
    fn notes_never_touch_trailing_fields() {
        let mut ls = LiveState::new();
        for note in 0..=255u8 {
            ls.note_on(note);
        }
        assert!(ls.snapshot()[NOTE_BYTES..].iter().all(|&b| b == 0));
    }

    // ── Controllers ──────────────────────────────────────────────────

    #[test]
    fn whitelisted_controllers_land_in_their_slots() {
        let mut ls = LiveState::new();
        for (i, &cc) in BLOB_CONTROLLERS.iter().enumerate() {
            ls.set_controller(cc, 10 + i as u8);
        }
        assert_eq!(&ls.snapshot()[16..21], &[10, 11, 12, 13, 14]);
    }

    #[test]
    fn other_controllers_are_ignored() {
        let mut ls = LiveState::new();
        ls.set_controller(20, 99);
        ls.set_controller(26, 99);
        ls.set_controller(7, 99);
        assert_eq!(ls.snapshot(), [0; BLOB_LEN]);
    }

    // ── Transport ────────────────────────────────────────────────────

    #[test]
    fn sync_wraps_every_24_pulses() {
        let mut ls = LiveState::new();
        for _ in 0..23 {
            ls.advance_sync();
        }
        assert_eq!(ls.sync(), 23);
        ls.advance_sync();
        assert_eq!(ls.sync(), 0);
    }

    #[test]
    fn start_and_continue_reset_sync() {
        let mut ls = LiveState::new();
        for event in [MidiEvent::Start, MidiEvent::Continue] {
            ls.advance_sync();
            ls.advance_sync();
            ls.apply(&event);
            assert_eq!(ls.sync(), 0);
        }
    }

    #[test]
    fn stop_leaves_sync_alone() {
        let mut ls = LiveState::new();
        ls.apply(&MidiEvent::Clock);
        ls.apply(&MidiEvent::Stop);
        assert_eq!(ls.sync(), 1);
    }

    // ── Event mapping ────────────────────────────────────────────────

    #[test]
    fn apply_maps_channel_events() {
        let mut ls = LiveState::new();
        ls.apply(&MidiEvent::NoteOn {
            channel: 1,
            note: 36,
            velocity: 90,
        });
        ls.apply(&MidiEvent::ControlChange {
            channel: 1,
            controller: 23,
            value: 77,
        });
        ls.apply(&MidiEvent::ProgramChange {
            channel: 1,
            program: 12,
        });
        ls.apply(&MidiEvent::PitchBend {
            channel: 1,
            value: 0,
        });

        assert!(ls.is_note_on(36));
        assert_eq!(ls.snapshot()[CONTROLLER_BASE + 2], 77);
        assert_eq!(ls.program(), 12);

        ls.apply(&MidiEvent::NoteOff {
            channel: 1,
            note: 36,
            velocity: 0,
        });
        assert!(!ls.is_note_on(36));
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut ls = LiveState::new();
        ls.note_on(1);
        ls.set_program(3);
        ls.advance_sync();
        ls.clear();
        assert_eq!(ls, LiveState::default());
    }
}
