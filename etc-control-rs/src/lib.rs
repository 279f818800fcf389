//! Real-time control core for the ETC control board.
//!
//! The board bridges a key row, six analog channels (five knobs and a foot
//! switch) and a MIDI input to a host computer over a SLIP-framed OSC
//! link, and applies host commands (indicator colour, shutdown) back to the
//! hardware.
//!
//! # Architecture
//!
//! ```text
//!  SysTick ──► Timebase ─────────────────────────────┐
//!                                                    ▼
//!  MIDI in ──► MidiDecoder ──► LiveState ──────► Scheduler ──► Transport ──► host
//!  keys    ──► KeyScanner ───────────────────────►   ▲
//!  ADC     ──► KnobBank ──► FootSwitch ─────────►    │
//!  host    ──► Transport ──► Router ──► Command ─────┘
//! ```
//!
//! - [`timebase`] — the only state shared with interrupt context.
//! - [`midi`] — byte-at-a-time decoder with running status, and the
//!   matching encoder for MIDI thru.
//! - [`live_state`] — the 23-byte `/mblob` snapshot.
//! - [`input`] — debounced keys, remapped knobs, hysteretic foot switch.
//! - [`router`] — inbound address → [`Command`].
//! - [`scheduler`] — the Boot-Wait / Run / shutdown control loop.
//! - [`wire`] — SLIP framing and OSC message encoding for the host link.
//! - [`io`] — collaborator traits the firmware implements.
//!
//! Nothing here touches a peripheral or a static; the firmware crate owns
//! both and injects them through [`io::Board`] and a `&'static Timebase`.
//!
//! # Features
//!
//! - **`defmt`** — Enable `defmt::Format` on public types and log
//!   protocol events.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod input;
pub mod io;
pub mod live_state;
pub mod midi;
pub mod profile;
pub mod router;
pub mod scheduler;
pub mod timebase;
pub mod wire;

pub use error::{ConfigError, WireError};
pub use input::MAX_KEYS;
pub use io::{Board, Rgb};
pub use live_state::{LiveState, BLOB_LEN};
pub use midi::{MidiDecoder, MidiEncoder, MidiEvent};
pub use profile::{Profile, RouteSet, TimingConfig, MAX_PROGRESS};
pub use router::{Command, Router};
pub use scheduler::{Phase, Scheduler};
pub use timebase::{Timebase, TIMER_FREQUENCY_HZ};
