use heapless::Vec;
use midi_convert::render_slice::MidiRenderSlice;
use midi_types::{Channel, Control, MidiMessage, Note, Program, Value14, Value7};

use super::*;

/// Wire bytes for one encoded event (at most status + two data bytes).
pub type MidiBytes = Vec<u8, 3>;

/// Send-side MIDI encoder with running-status compression.
///
/// Events are rendered by `midi-convert`; this type only decides whether
/// the status byte goes out. Channel messages omit it when it matches the
/// last one sent, unless [`send_full_commands`](Self::set_send_full_commands)
/// is enabled. System common messages always carry their status and cancel
/// running status; real-time messages neither use nor disturb it. Vendor
/// payload bytes are passed through as received.
#[derive(Debug, Clone, Default)]
pub struct MidiEncoder {
    last_status_sent: Option<u8>,
    send_full_commands: bool,
}

impl MidiEncoder {
    pub const fn new() -> Self {
        Self {
            last_status_sent: None,
            send_full_commands: false,
        }
    }

    /// Always emit status bytes (disables running-status compression).
    pub fn set_send_full_commands(&mut self, full: bool) {
        self.send_full_commands = full;
    }

    /// Encode `event` to wire bytes. Data bytes are masked to 7 bits and
    /// channels outside 1–16 wrap into range.
    pub fn encode(&mut self, event: &MidiEvent) -> MidiBytes {
        let mut out = MidiBytes::new();

        let message = match *event {
            MidiEvent::VendorData(b) => {
                push(&mut out, b);
                return out;
            }
            MidiEvent::VendorStart => {
                self.last_status_sent = None;
                push(&mut out, STATUS_VENDOR_START);
                return out;
            }
            MidiEvent::VendorEnd => {
                self.last_status_sent = None;
                push(&mut out, STATUS_VENDOR_END);
                return out;
            }
            _ => match to_midi_message(event) {
                Some(message) => message,
                None => return out,
            },
        };

        let mut buf = [0u8; 3];
        let len = message.render_slice(&mut buf).min(buf.len());
        let Some((&status, data)) = buf[..len].split_first() else {
            return out;
        };

        if event.is_realtime() {
            push(&mut out, status);
            return out;
        }
        if status < STATUS_VENDOR_START {
            if self.send_full_commands || self.last_status_sent != Some(status) {
                push(&mut out, status);
                self.last_status_sent = Some(status);
            }
        } else {
            self.last_status_sent = None;
            push(&mut out, status);
        }
        for &b in data {
            push(&mut out, b);
        }
        out
    }
}

/// Map a channel or system event onto its `midi-types` message. Vendor
/// events have no counterpart.
fn to_midi_message(event: &MidiEvent) -> Option<MidiMessage> {
    let message = match *event {
        MidiEvent::NoteOff {
            channel,
            note,
            velocity,
        } => MidiMessage::NoteOff(wire_channel(channel), data_note(note), data7(velocity)),
        MidiEvent::NoteOn {
            channel,
            note,
            velocity,
        } => MidiMessage::NoteOn(wire_channel(channel), data_note(note), data7(velocity)),
        MidiEvent::PolyPressure {
            channel,
            note,
            pressure,
        } => MidiMessage::KeyPressure(wire_channel(channel), data_note(note), data7(pressure)),
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        } => MidiMessage::ControlChange(
            wire_channel(channel),
            Control::new(controller & 0x7F),
            data7(value),
        ),
        MidiEvent::ProgramChange { channel, program } => {
            MidiMessage::ProgramChange(wire_channel(channel), Program::from(program & 0x7F))
        }
        MidiEvent::ChannelPressure { channel, pressure } => {
            MidiMessage::ChannelPressure(wire_channel(channel), data7(pressure))
        }
        MidiEvent::PitchBend { channel, value } => {
            MidiMessage::PitchBendChange(wire_channel(channel), data14(value))
        }
        MidiEvent::SongPosition(pos) => MidiMessage::SongPositionPointer(data14(pos)),
        MidiEvent::SongSelect(song) => MidiMessage::SongSelect(data7(song)),
        MidiEvent::TuneRequest => MidiMessage::TuneRequest,
        MidiEvent::Clock => MidiMessage::TimingClock,
        MidiEvent::Start => MidiMessage::Start,
        MidiEvent::Continue => MidiMessage::Continue,
        MidiEvent::Stop => MidiMessage::Stop,
        MidiEvent::ActiveSense => MidiMessage::ActiveSensing,
        MidiEvent::Reset => MidiMessage::Reset,
        MidiEvent::VendorStart | MidiEvent::VendorData(_) | MidiEvent::VendorEnd => return None,
    };
    Some(message)
}

/// 1-based channel to the 0-based wire nibble.
fn wire_channel(channel: u8) -> Channel {
    Channel::new(channel.wrapping_sub(1) & 0x0F)
}

fn data_note(note: u8) -> Note {
    Note::from(note & 0x7F)
}

fn data7(value: u8) -> Value7 {
    Value7::new(value & 0x7F)
}

fn data14(value: u16) -> Value14 {
    Value14::from(value & 0x3FFF)
}

/// Capacity is three bytes and no event encodes to more.
fn push(out: &mut MidiBytes, byte: u8) {
    let _ = out.push(byte);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(note: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            channel: 1,
            note,
            velocity: 100,
        }
    }

    #[test]
    fn first_channel_message_carries_status() {
        let mut enc = MidiEncoder::new();
        assert_eq!(enc.encode(&note_on(60)).as_slice(), &[0x90, 60, 100]);
    }

    #[test]
    fn repeated_status_is_compressed() {
        let mut enc = MidiEncoder::new();
        enc.encode(&note_on(60));
        assert_eq!(enc.encode(&note_on(62)).as_slice(), &[62, 100]);
    }

    #[test]
    fn full_commands_disable_compression() {
        let mut enc = MidiEncoder::new();
        enc.set_send_full_commands(true);
        enc.encode(&note_on(60));
        assert_eq!(enc.encode(&note_on(62)).as_slice(), &[0x90, 62, 100]);
    }

    #[test]
    fn channel_change_emits_new_status() {
        let mut enc = MidiEncoder::new();
        enc.encode(&note_on(60));
        let bytes = enc.encode(&MidiEvent::NoteOn {
            channel: 16,
            note: 60,
            velocity: 1,
        });
        assert_eq!(bytes.as_slice(), &[0x9F, 60, 1]);
    }

    #[test]
    fn realtime_does_not_break_running_status() {
        let mut enc = MidiEncoder::new();
        enc.encode(&note_on(60));
        assert_eq!(enc.encode(&MidiEvent::Clock).as_slice(), &[0xF8]);
        assert_eq!(enc.encode(&note_on(61)).as_slice(), &[61, 100]);
    }

    #[test]
    fn system_common_cancels_running_status() {
        let mut enc = MidiEncoder::new();
        enc.encode(&note_on(60));
        assert_eq!(enc.encode(&MidiEvent::SongSelect(3)).as_slice(), &[0xF3, 3]);
        assert_eq!(enc.encode(&note_on(61)).as_slice(), &[0x90, 61, 100]);
    }

    #[test]
    fn fourteen_bit_values_split_lsb_first() {
        let mut enc = MidiEncoder::new();
        let bytes = enc.encode(&MidiEvent::PitchBend {
            channel: 2,
            value: 0x2001,
        });
        assert_eq!(bytes.as_slice(), &[0xE1, 0x01, 0x40]);
        let bytes = enc.encode(&MidiEvent::SongPosition(0x3FFF));
        assert_eq!(bytes.as_slice(), &[0xF2, 0x7F, 0x7F]);
    }

    #[test]
    fn data_bytes_are_masked() {
        let mut enc = MidiEncoder::new();
        let bytes = enc.encode(&MidiEvent::ControlChange {
            channel: 1,
            controller: 0x95,
            value: 0xFF,
        });
        assert_eq!(bytes.as_slice(), &[0xB0, 0x15, 0x7F]);
    }

    #[test]
    fn decoder_reads_back_encoder_output() {
        let events = [
            note_on(60),
            note_on(64),
            MidiEvent::ControlChange {
                channel: 1,
                controller: 22,
                value: 5,
            },
            MidiEvent::ProgramChange {
                channel: 1,
                program: 9,
            },
        ];
        let mut enc = MidiEncoder::new();
        let mut dec = MidiDecoder::new(OMNI);
        let mut decoded = std::vec::Vec::new();
        for e in &events {
            for &b in enc.encode(e).iter() {
                decoded.extend(dec.feed(b));
            }
        }
        assert_eq!(decoded, events);
    }

    #[test]
    fn vendor_block_passes_through_unchanged() {
        // A real-time byte inside a vendor block is payload, not a status.
        let input = [0xF0, 0x7D, 0xF8, 0x01, 0xF7];
        let mut dec = MidiDecoder::new(OMNI);
        let mut enc = MidiEncoder::new();
        let mut out = std::vec::Vec::new();
        for &b in &input {
            if let Some(event) = dec.feed(b) {
                out.extend_from_slice(&enc.encode(&event));
            }
        }
        assert_eq!(out, input);
    }

    #[test]
    fn vendor_block_cancels_running_status() {
        let mut enc = MidiEncoder::new();
        enc.encode(&note_on(60));
        enc.encode(&MidiEvent::VendorStart);
        enc.encode(&MidiEvent::VendorEnd);
        assert_eq!(enc.encode(&note_on(61)).as_slice(), &[0x90, 61, 100]);
    }
}
