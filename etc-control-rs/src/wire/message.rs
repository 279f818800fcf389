use heapless::{String, Vec};

use crate::error::WireError;
use crate::input::{KeyEvent, KNOB_COUNT};
use crate::live_state::BLOB_LEN;
use crate::midi::MidiEvent;

/// Longest accepted OSC address pattern.
pub const MAX_ADDRESS_LEN: usize = 32;

/// Most arguments carried by one message.
pub const MAX_ARGS: usize = 8;

/// Largest blob argument.
pub const MAX_BLOB_LEN: usize = 32;

/// One OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    Float(f32),
    Blob(Vec<u8, MAX_BLOB_LEN>),
}

/// A decoded OSC message: address plus typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    address: String<MAX_ADDRESS_LEN>,
    args: Vec<Arg, MAX_ARGS>,
}

impl Message {
    /// Create a message with no arguments.
    ///
    /// Returns [`WireError::CapacityExceeded`] if the address is longer
    /// than [`MAX_ADDRESS_LEN`].
    pub fn new(address: &str) -> Result<Self, WireError> {
        let mut owned = String::new();
        owned
            .push_str(address)
            .map_err(|_| WireError::CapacityExceeded)?;
        Ok(Self {
            address: owned,
            args: Vec::new(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Append an argument.
    pub fn push(&mut self, arg: Arg) -> Result<(), WireError> {
        self.args.push(arg).map_err(|_| WireError::CapacityExceeded)
    }

    /// Builder-style [`push()`](Self::push) of an int argument.
    pub fn with_int(mut self, value: i32) -> Result<Self, WireError> {
        self.push(Arg::Int(value))?;
        Ok(self)
    }

    /// Builder-style [`push()`](Self::push) of a blob argument.
    pub fn with_blob(mut self, bytes: &[u8]) -> Result<Self, WireError> {
        let blob = Vec::from_slice(bytes).map_err(|_| WireError::CapacityExceeded)?;
        self.push(Arg::Blob(blob))?;
        Ok(self)
    }

    /// Argument `index` if it is an int.
    pub fn int(&self, index: usize) -> Option<i32> {
        match self.args.get(index) {
            Some(Arg::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Argument `index` if it is a blob.
    pub fn blob(&self, index: usize) -> Option<&[u8]> {
        match self.args.get(index) {
            Some(Arg::Blob(b)) => Some(b),
            _ => None,
        }
    }
}

/// Every message the device sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outbound {
    /// `/mblob`: the 23-byte live-state blob.
    MidiBlob([u8; BLOB_LEN]),
    /// `/knobs`: six knob readings in logical order.
    Knobs([i32; KNOB_COUNT]),
    /// `/key`: key index and 100 (pressed) or 0 (released).
    Key { index: i32, value: i32 },
    /// `/fs`: 1 when the foot switch is pressed, 0 when released.
    FootSwitch { pressed: bool },
    /// `/mnon`
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// `/mnoff`
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// `/mpc`
    ProgramChange { channel: u8, program: u8 },
    /// `/mcc`
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// `/mstart`
    Start,
    /// `/mstop`
    Stop,
    /// `/mcont`
    Continue,
    /// `/msync`
    Sync,
}

/// Constant argument carried by transport notifications.
const TRANSPORT_ARG: i32 = 1;

impl Outbound {
    pub fn address(&self) -> &'static str {
        match self {
            Outbound::MidiBlob(_) => "/mblob",
            Outbound::Knobs(_) => "/knobs",
            Outbound::Key { .. } => "/key",
            Outbound::FootSwitch { .. } => "/fs",
            Outbound::NoteOn { .. } => "/mnon",
            Outbound::NoteOff { .. } => "/mnoff",
            Outbound::ProgramChange { .. } => "/mpc",
            Outbound::ControlChange { .. } => "/mcc",
            Outbound::Start => "/mstart",
            Outbound::Stop => "/mstop",
            Outbound::Continue => "/mcont",
            Outbound::Sync => "/msync",
        }
    }

    /// The host-facing notification for a decoded MIDI event, if the event
    /// class is forwarded at all.
    pub fn from_midi(event: &MidiEvent) -> Option<Self> {
        let out = match *event {
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => Outbound::NoteOn {
                channel,
                note,
                velocity,
            },
            MidiEvent::NoteOff {
                channel,
                note,
                velocity,
            } => Outbound::NoteOff {
                channel,
                note,
                velocity,
            },
            MidiEvent::ProgramChange { channel, program } => {
                Outbound::ProgramChange { channel, program }
            }
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => Outbound::ControlChange {
                channel,
                controller,
                value,
            },
            MidiEvent::Start => Outbound::Start,
            MidiEvent::Stop => Outbound::Stop,
            MidiEvent::Continue => Outbound::Continue,
            MidiEvent::Clock => Outbound::Sync,
            _ => return None,
        };
        Some(out)
    }

    /// Build the OSC message for this reply.
    pub fn to_message(&self) -> Message {
        let mut msg = Message {
            address: String::new(),
            args: Vec::new(),
        };
        // Addresses and argument lists are fixed and well inside capacity.
        let _ = msg.address.push_str(self.address());
        if let Outbound::MidiBlob(blob) = self {
            let _ = msg
                .args
                .push(Arg::Blob(Vec::from_slice(blob).unwrap_or_default()));
        }
        for value in self.int_args() {
            let _ = msg.args.push(Arg::Int(value));
        }
        msg
    }

    fn int_args(&self) -> Vec<i32, KNOB_COUNT> {
        let ints = match *self {
            Outbound::MidiBlob(_) => Ok(Vec::new()),
            Outbound::Knobs(values) => Vec::from_slice(&values),
            Outbound::Key { index, value } => Vec::from_slice(&[index, value]),
            Outbound::FootSwitch { pressed } => Vec::from_slice(&[i32::from(pressed)]),
            Outbound::NoteOn {
                channel,
                note,
                velocity,
            }
            | Outbound::NoteOff {
                channel,
                note,
                velocity,
            } => Vec::from_slice(&[i32::from(channel), i32::from(note), i32::from(velocity)]),
            Outbound::ProgramChange { channel, program } => {
                Vec::from_slice(&[i32::from(channel), i32::from(program)])
            }
            Outbound::ControlChange {
                channel,
                controller,
                value,
            } => Vec::from_slice(&[i32::from(channel), i32::from(controller), i32::from(value)]),
            Outbound::Start | Outbound::Stop | Outbound::Continue | Outbound::Sync => {
                Vec::from_slice(&[TRANSPORT_ARG])
            }
        };
        ints.unwrap_or_default()
    }
}

impl From<KeyEvent> for Outbound {
    fn from(event: KeyEvent) -> Self {
        Outbound::Key {
            index: event.index as i32,
            value: event.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_builder_and_accessors() {
        let msg = Message::new("/led").unwrap().with_int(5).unwrap();
        assert_eq!(msg.address(), "/led");
        assert_eq!(msg.int(0), Some(5));
        assert_eq!(msg.int(1), None);
        assert_eq!(msg.blob(0), None);
    }

    #[test]
    fn address_too_long_is_rejected() {
        let long = "/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert_eq!(Message::new(long), Err(WireError::CapacityExceeded));
    }

    #[test]
    fn blob_message_carries_all_bytes() {
        let mut blob = [0u8; BLOB_LEN];
        blob[22] = 7;
        let msg = Outbound::MidiBlob(blob).to_message();
        assert_eq!(msg.address(), "/mblob");
        assert_eq!(msg.blob(0).map(<[u8]>::len), Some(BLOB_LEN));
        assert_eq!(msg.blob(0).unwrap()[22], 7);
    }

    #[test]
    fn knobs_message_has_six_ints() {
        let msg = Outbound::Knobs([1, 2, 3, 4, 5, 6]).to_message();
        assert_eq!(msg.args().len(), 6);
        assert_eq!(msg.int(5), Some(6));
    }

    #[test]
    fn midi_events_map_to_notifications() {
        let cases = [
            (MidiEvent::Clock, "/msync"),
            (MidiEvent::Start, "/mstart"),
            (MidiEvent::Stop, "/mstop"),
            (MidiEvent::Continue, "/mcont"),
            (
                MidiEvent::ProgramChange {
                    channel: 1,
                    program: 2,
                },
                "/mpc",
            ),
        ];
        for (event, address) in cases {
            assert_eq!(Outbound::from_midi(&event).unwrap().address(), address);
        }
        assert_eq!(Outbound::from_midi(&MidiEvent::ActiveSense), None);
        assert_eq!(Outbound::from_midi(&MidiEvent::VendorData(1)), None);
    }

    #[test]
    fn note_message_argument_order() {
        let msg = Outbound::NoteOff {
            channel: 2,
            note: 60,
            velocity: 0,
        }
        .to_message();
        assert_eq!(msg.address(), "/mnoff");
        assert_eq!(
            msg.args(),
            &[Arg::Int(2), Arg::Int(60), Arg::Int(0)]
        );
    }

    #[test]
    fn transport_messages_carry_constant_arg() {
        assert_eq!(Outbound::Sync.to_message().int(0), Some(1));
    }

    #[test]
    fn foot_switch_value() {
        assert_eq!(Outbound::FootSwitch { pressed: true }.to_message().int(0), Some(1));
        assert_eq!(Outbound::FootSwitch { pressed: false }.to_message().int(0), Some(0));
    }
}
