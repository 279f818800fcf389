//! Pico 2 implementation of the control-loop collaborators.
//!
//! Serial traffic never blocks the control loop: UART tasks move bytes
//! between the peripherals and the pipes below, and [`PicoBoard`] only
//! ever `try_read`s and `try_write`s them. Knob batches arrive the same way
//! through [`ADC_BATCH`], and progress text goes to [`SCREEN`] for the
//! OLED task.

use core::cell::{Cell, RefCell};

use defmt::{debug, warn};
use embassy_rp::gpio::{Input, Level, Output};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_sync::pipe::Pipe;

use etc_control::input::KNOB_COUNT;
use etc_control::io::{
    AnalogInputs, DigitalInputs, Indicator, MidiIn, MidiOut, StatusDisplay, Transport,
};
use etc_control::wire::{self, osc, Message, Outbound, SlipDecoder, MAX_FRAME_LEN, MAX_PACKET_LEN};
use etc_control::Rgb;
use etc_oled_display_rs::{SharedScreen, StatusScreen};

/// Key inputs wired on the board.
pub const KEY_PINS: usize = 10;

pub type BytePipe<const N: usize> = Pipe<CriticalSectionRawMutex, N>;

// ---------------------------------------------------------------------------
// Shared buffers
// ---------------------------------------------------------------------------

/// MIDI IN → control loop.
pub static MIDI_RX: BytePipe<256> = Pipe::new();
/// Control loop → MIDI OUT (thru).
pub static MIDI_TX: BytePipe<64> = Pipe::new();
/// Host link → control loop, raw SLIP bytes.
pub static HOST_RX: BytePipe<512> = Pipe::new();
/// Control loop → host link, complete SLIP frames.
pub static HOST_TX: BytePipe<1024> = Pipe::new();

/// Latest complete converter batch in physical channel order. Taking it
/// clears the batch-complete state.
pub static ADC_BATCH: Mutex<CriticalSectionRawMutex, Cell<Option<[u16; KNOB_COUNT]>>> =
    Mutex::new(Cell::new(None));

/// Progress text rendered by the OLED task.
pub static SCREEN: SharedScreen = Mutex::new(RefCell::new(StatusScreen::new()));

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

pub struct PicoBoard {
    /// Active-low, pulled up.
    keys: [Input<'static>; KEY_PINS],
    red: Output<'static>,
    green: Output<'static>,
    blue: Output<'static>,
    slip: SlipDecoder<MAX_PACKET_LEN>,
}

impl PicoBoard {
    pub fn new(
        keys: [Input<'static>; KEY_PINS],
        red: Output<'static>,
        green: Output<'static>,
        blue: Output<'static>,
    ) -> Self {
        Self {
            keys,
            red,
            green,
            blue,
            slip: SlipDecoder::new(),
        }
    }
}

impl MidiIn for PicoBoard {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match MIDI_RX.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

impl MidiOut for PicoBoard {
    fn write_bytes(&mut self, bytes: &[u8]) {
        if MIDI_TX.free_capacity() < bytes.len() {
            warn!("MIDI out full, {} bytes dropped", bytes.len());
            return;
        }
        let _ = MIDI_TX.try_write(bytes);
    }
}

impl Transport for PicoBoard {
    fn receive(&mut self) -> Option<Message> {
        let mut byte = [0u8; 1];
        while let Ok(1) = HOST_RX.try_read(&mut byte) {
            match self.slip.push(byte[0]) {
                Ok(Some(packet)) => match osc::decode(packet) {
                    Ok(msg) => return Some(msg),
                    Err(e) => warn!("dropped OSC packet: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("dropped SLIP frame: {}", e),
            }
        }
        None
    }

    fn send(&mut self, message: &Outbound) {
        let mut frame = [0u8; MAX_FRAME_LEN];
        let len = match wire::encode_frame(message, &mut frame) {
            Ok(len) => len,
            Err(e) => {
                warn!("cannot encode {}: {}", message.address(), e);
                return;
            }
        };
        // Whole frames only; a partial frame would corrupt the next one.
        if HOST_TX.free_capacity() < len {
            debug!("host link busy, dropped {}", message.address());
            return;
        }
        let _ = HOST_TX.try_write(&frame[..len]);
    }
}

impl DigitalInputs for PicoBoard {
    fn key_pressed(&mut self, index: usize) -> bool {
        self.keys.get(index).is_some_and(|k| k.is_low())
    }
}

impl AnalogInputs for PicoBoard {
    fn take_batch(&mut self) -> Option<[u16; KNOB_COUNT]> {
        ADC_BATCH.lock(|batch| batch.take())
    }
}

impl Indicator for PicoBoard {
    fn set_rgb(&mut self, rgb: Rgb) {
        self.red.set_level(Level::from(rgb.red));
        self.green.set_level(Level::from(rgb.green));
        self.blue.set_level(Level::from(rgb.blue));
    }
}

impl StatusDisplay for PicoBoard {
    fn clear(&mut self) {
        SCREEN.lock(|screen| screen.borrow_mut().clear());
    }

    fn draw_text(&mut self, line: u8, text: &str) {
        SCREEN.lock(|screen| screen.borrow_mut().draw_text(line, text));
    }

    fn refresh(&mut self) {
        SCREEN.lock(|screen| screen.borrow_mut().refresh());
    }
}
