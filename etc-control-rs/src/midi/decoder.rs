use super::*;

/// Receive-side parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum RecvState {
    /// No pending event; data bytes are ignored.
    Idle,
    /// Collecting argument bytes for `status`. Stays here after each
    /// complete message so further argument groups reuse the same status
    /// (running status).
    AwaitingArgs { status: u8, needed: u8, received: u8 },
    /// Between 0xF0 and 0xF7: every byte is vendor payload.
    VendorPassthrough,
}

/// Byte-at-a-time MIDI stream decoder.
///
/// Feed every received byte to [`feed()`](Self::feed); a byte that
/// completes a logical event returns it. No message buffering takes place:
/// only the pending status, the argument counter, and the previous data
/// byte are kept.
///
/// # Example
///
/// ```
/// use etc_control::midi::{MidiDecoder, MidiEvent, OMNI};
///
/// let mut decoder = MidiDecoder::new(OMNI);
/// let events: Vec<_> = [0x90, 60, 100, 64, 0]
///     .iter()
///     .filter_map(|&b| decoder.feed(b))
///     .collect();
///
/// assert_eq!(events, [
///     MidiEvent::NoteOn { channel: 1, note: 60, velocity: 100 },
///     // Running status, velocity 0 reads as note off.
///     MidiEvent::NoteOff { channel: 1, note: 64, velocity: 0 },
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct MidiDecoder {
    state: RecvState,
    /// Most recent data byte; the first argument of two-argument events.
    last_data: u8,
    /// 1–16, or [`OMNI`] to accept all channels.
    channel_filter: u8,
}

impl MidiDecoder {
    /// Create a decoder listening on `channel_filter` (1–16, or [`OMNI`]).
    pub const fn new(channel_filter: u8) -> Self {
        Self {
            state: RecvState::Idle,
            last_data: 0,
            channel_filter,
        }
    }

    /// Consume one received byte.
    pub fn feed(&mut self, byte: u8) -> Option<MidiEvent> {
        if self.state == RecvState::VendorPassthrough && byte != STATUS_VENDOR_END {
            return Some(MidiEvent::VendorData(byte));
        }

        if byte & 0x80 != 0 {
            return self.status_byte(byte);
        }

        let mut event = None;
        if let RecvState::AwaitingArgs {
            status,
            needed,
            ref mut received,
        } = self.state
        {
            *received += 1;
            if *received == needed {
                *received = 0;
                event = self.dispatch(status, byte);
            }
        }

        self.last_data = byte;
        event
    }

    fn status_byte(&mut self, byte: u8) -> Option<MidiEvent> {
        match status_class(byte) {
            STATUS_NOTE_OFF | STATUS_NOTE_ON | STATUS_POLY_PRESSURE | STATUS_CONTROL_CHANGE
            | STATUS_PITCH_BEND | STATUS_SONG_POSITION => {
                self.await_args(byte, 2);
                None
            }
            STATUS_PROGRAM_CHANGE | STATUS_CHANNEL_PRESSURE | STATUS_SONG_SELECT => {
                self.await_args(byte, 1);
                None
            }
            STATUS_VENDOR_START => {
                self.state = RecvState::VendorPassthrough;
                Some(MidiEvent::VendorStart)
            }
            STATUS_VENDOR_END => {
                self.state = RecvState::Idle;
                Some(MidiEvent::VendorEnd)
            }
            STATUS_TUNE_REQUEST => {
                self.state = RecvState::Idle;
                Some(MidiEvent::TuneRequest)
            }
            // Real-time messages leave any pending event untouched.
            STATUS_CLOCK => Some(MidiEvent::Clock),
            STATUS_START => Some(MidiEvent::Start),
            STATUS_CONTINUE => Some(MidiEvent::Continue),
            STATUS_STOP => Some(MidiEvent::Stop),
            STATUS_ACTIVE_SENSE => Some(MidiEvent::ActiveSense),
            STATUS_RESET => Some(MidiEvent::Reset),
            // Undefined / unsupported system common (0xF1, 0xF4, 0xF5).
            b if b < STATUS_CLOCK => {
                #[cfg(feature = "defmt")]
                defmt::debug!("midi: ignoring system common {=u8:#x}", b);
                self.state = RecvState::Idle;
                None
            }
            // Undefined real-time (0xF9, 0xFD).
            _ => None,
        }
    }

    fn await_args(&mut self, status: u8, needed: u8) {
        self.state = RecvState::AwaitingArgs {
            status,
            needed,
            received: 0,
        };
    }

    /// Build the event for `status` now that its last argument `byte` has
    /// arrived. Returns `None` when the channel filter rejects it.
    fn dispatch(&self, status: u8, byte: u8) -> Option<MidiEvent> {
        let channel = (status & 0x0F) + 1;
        let class = status_class(status);

        if self.channel_filter != OMNI && channel != self.channel_filter && class < 0xF0 {
            return None;
        }

        let arg0 = self.last_data;
        let wide = (u16::from(byte) << 7) | u16::from(arg0);

        let event = match class {
            STATUS_NOTE_ON if byte == 0 => MidiEvent::NoteOff {
                channel,
                note: arg0,
                velocity: 0,
            },
            STATUS_NOTE_ON => MidiEvent::NoteOn {
                channel,
                note: arg0,
                velocity: byte,
            },
            STATUS_NOTE_OFF => MidiEvent::NoteOff {
                channel,
                note: arg0,
                velocity: byte,
            },
            STATUS_POLY_PRESSURE => MidiEvent::PolyPressure {
                channel,
                note: arg0,
                pressure: byte,
            },
            STATUS_CONTROL_CHANGE => MidiEvent::ControlChange {
                channel,
                controller: arg0,
                value: byte,
            },
            STATUS_PROGRAM_CHANGE => MidiEvent::ProgramChange {
                channel,
                program: byte,
            },
            STATUS_CHANNEL_PRESSURE => MidiEvent::ChannelPressure {
                channel,
                pressure: byte,
            },
            STATUS_PITCH_BEND => MidiEvent::PitchBend {
                channel,
                value: wide,
            },
            STATUS_SONG_POSITION => MidiEvent::SongPosition(wide),
            STATUS_SONG_SELECT => MidiEvent::SongSelect(byte),
            _ => return None,
        };

        Some(event)
    }
}

impl Default for MidiDecoder {
    fn default() -> Self {
        Self::new(OMNI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(decoder: &mut MidiDecoder, bytes: &[u8]) -> Vec<MidiEvent> {
        bytes.iter().filter_map(|&b| decoder.feed(b)).collect()
    }

    // ── Channel messages ─────────────────────────────────────────────

    #[test]
    fn note_on_extracts_channel_note_velocity() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0x93, 60, 101]);
        assert_eq!(
            events,
            [MidiEvent::NoteOn {
                channel: 4,
                note: 60,
                velocity: 101
            }]
        );
    }

    #[test]
    fn event_fires_only_on_last_byte() {
        let mut d = MidiDecoder::new(OMNI);
        assert_eq!(d.feed(0x80), None);
        assert_eq!(d.feed(40), None);
        assert_eq!(
            d.feed(12),
            Some(MidiEvent::NoteOff {
                channel: 1,
                note: 40,
                velocity: 12
            })
        );
    }

    #[test]
    fn running_status_repeats_last_event_class() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0x90, 60, 100, 62, 90, 64, 80]);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            MidiEvent::NoteOn {
                channel: 1,
                note: 62,
                velocity: 90
            }
        );
        assert_eq!(
            events[2],
            MidiEvent::NoteOn {
                channel: 1,
                note: 64,
                velocity: 80
            }
        );
    }

    #[test]
    fn note_on_velocity_zero_is_note_off() {
        let mut d = MidiDecoder::new(OMNI);
        for vel_zero_seq in [[0x90u8, 10, 0], [0x9F, 127, 0]] {
            let events = decode(&mut d, &vel_zero_seq);
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], MidiEvent::NoteOff { velocity: 0, .. }));
        }
    }

    #[test]
    fn one_argument_events_and_running_status() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0xC2, 5, 6, 0xD0, 77]);
        assert_eq!(
            events,
            [
                MidiEvent::ProgramChange {
                    channel: 3,
                    program: 5
                },
                MidiEvent::ProgramChange {
                    channel: 3,
                    program: 6
                },
                MidiEvent::ChannelPressure {
                    channel: 1,
                    pressure: 77
                },
            ]
        );
    }

    #[test]
    fn control_change_and_poly_pressure() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0xB0, 21, 64, 0xA1, 60, 33]);
        assert_eq!(
            events,
            [
                MidiEvent::ControlChange {
                    channel: 1,
                    controller: 21,
                    value: 64
                },
                MidiEvent::PolyPressure {
                    channel: 2,
                    note: 60,
                    pressure: 33
                },
            ]
        );
    }

    #[test]
    fn pitch_bend_and_song_position_combine_14_bits() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0xE0, 0x00, 0x40, 0xF2, 0x7F, 0x7F]);
        assert_eq!(
            events,
            [
                MidiEvent::PitchBend {
                    channel: 1,
                    value: 0x2000
                },
                MidiEvent::SongPosition(0x3FFF),
            ]
        );
    }

    #[test]
    fn song_select() {
        let mut d = MidiDecoder::new(OMNI);
        assert_eq!(decode(&mut d, &[0xF3, 9]), [MidiEvent::SongSelect(9)]);
    }

    // ── Channel filter ───────────────────────────────────────────────

    #[test]
    fn channel_filter_drops_other_channels() {
        let mut d = MidiDecoder::new(1);
        assert!(decode(&mut d, &[0x91, 60, 100]).is_empty());
        assert_eq!(decode(&mut d, &[0x90, 60, 100]).len(), 1);
    }

    #[test]
    fn channel_filter_does_not_apply_to_system_messages() {
        let mut d = MidiDecoder::new(5);
        assert_eq!(
            decode(&mut d, &[0xF2, 1, 0, 0xF8]),
            [MidiEvent::SongPosition(1), MidiEvent::Clock]
        );
    }

    // ── System messages ──────────────────────────────────────────────

    #[test]
    fn realtime_bytes_fire_immediately() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0xF8, 0xFA, 0xFB, 0xFC, 0xFE, 0xFF]);
        assert_eq!(
            events,
            [
                MidiEvent::Clock,
                MidiEvent::Start,
                MidiEvent::Continue,
                MidiEvent::Stop,
                MidiEvent::ActiveSense,
                MidiEvent::Reset,
            ]
        );
    }

    #[test]
    fn realtime_between_arguments_keeps_running_status() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0x90, 60, 0xF8, 100, 0xF8, 62, 101]);
        assert_eq!(
            events,
            [
                MidiEvent::Clock,
                MidiEvent::NoteOn {
                    channel: 1,
                    note: 60,
                    velocity: 100
                },
                MidiEvent::Clock,
                MidiEvent::NoteOn {
                    channel: 1,
                    note: 62,
                    velocity: 101
                },
            ]
        );
    }

    #[test]
    fn tune_request_cancels_running_status() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0x90, 60, 100, 0xF6, 62, 100]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], MidiEvent::TuneRequest);
    }

    #[test]
    fn data_bytes_without_status_are_ignored() {
        let mut d = MidiDecoder::new(OMNI);
        assert!(decode(&mut d, &[1, 2, 3, 4]).is_empty());
    }

    #[test]
    fn undefined_status_bytes_are_ignored() {
        let mut d = MidiDecoder::new(OMNI);
        assert!(decode(&mut d, &[0xF9, 0xFD, 0xF4, 10, 20]).is_empty());
    }

    // ── Vendor passthrough ───────────────────────────────────────────

    #[test]
    fn vendor_block_is_passed_through() {
        let mut d = MidiDecoder::new(OMNI);
        let events = decode(&mut d, &[0xF0, 0x7D, 0x01, 0x90, 0xF7, 0x90, 1, 2]);
        assert_eq!(
            events,
            [
                MidiEvent::VendorStart,
                MidiEvent::VendorData(0x7D),
                MidiEvent::VendorData(0x01),
                MidiEvent::VendorData(0x90),
                MidiEvent::VendorEnd,
                MidiEvent::NoteOn {
                    channel: 1,
                    note: 1,
                    velocity: 2
                },
            ]
        );
    }
}
