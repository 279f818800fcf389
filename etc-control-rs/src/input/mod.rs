//! Debounced scanning of the physical controls.
//!
//! - [`KeyScanner`] — digital key inputs with a 4-of-4 generation debounce.
//! - [`KnobBank`] — potentiometer samples remapped into logical knob order.
//! - [`FootSwitch`] — the foot switch, read through a knob channel with
//!   hysteresis and a 2-slot agreement buffer.
//!
//! All three are polled once per scheduler cycle and report only state
//! *changes*.

mod foot_switch;
mod keys;
mod knobs;

pub use foot_switch::{FootSwitch, FootSwitchConfig};
pub use keys::{KeyEvent, KeyEvents, KeyScanner};
pub use knobs::KnobBank;

/// Upper bound on the number of scanned keys.
pub const MAX_KEYS: usize = 16;

/// Consecutive scan cycles that must agree before a key changes state.
pub const DEBOUNCE_GENERATIONS: usize = 4;

/// Number of analog channels (five knobs plus the foot switch).
pub const KNOB_COUNT: usize = 6;

/// Logical knob `k` takes physical sample `KNOB_CHANNEL_MAP[k]`.
///
/// The converter scans its channels in reverse board order, so the
/// mapping is not the identity.
pub const KNOB_CHANNEL_MAP: [usize; KNOB_COUNT] = [1, 2, 4, 3, 0, 5];

/// Logical knob index that carries the foot switch.
pub const FOOT_SWITCH_KNOB: usize = 5;

/// Wire value for a pressed key.
pub const KEY_PRESSED_VALUE: i32 = 100;

/// Wire value for a released key.
pub const KEY_RELEASED_VALUE: i32 = 0;
