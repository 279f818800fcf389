//! Device capability descriptor.
//!
//! One scheduler serves every board variant; what differs between them is
//! described here. A [`Profile`] is validated once when the scheduler is
//! built and is read-only afterwards.
//!
//! ```
//! use etc_control::{Profile, TimingConfig};
//!
//! let profile = Profile {
//!     key_count: 4,
//!     timing: TimingConfig {
//!         snapshot_gate_ticks: 500,
//!         ..TimingConfig::default()
//!     },
//!     ..Profile::etc()
//! };
//! assert!(profile.validate().is_ok());
//! ```

use crate::error::ConfigError;
use crate::input::{FootSwitchConfig, MAX_KEYS};
use crate::midi::OMNI;
use crate::timebase::ticks_from_millis;

/// Progress counters (boot wait, shutdown) stop here.
pub const MAX_PROGRESS: u8 = 99;

/// Highest MIDI channel number accepted by the channel filter.
pub const MAX_MIDI_CHANNEL: u8 = 16;

/// Which optional host commands the router accepts. `/ready` is always
/// routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteSet {
    /// `/led`
    pub led: bool,
    /// `/shutdown`
    pub shutdown: bool,
    /// `/nf`
    pub new_frame: bool,
    /// `/getknobs`
    pub get_knobs: bool,
}

impl RouteSet {
    pub const ALL: RouteSet = RouteSet {
        led: true,
        shutdown: true,
        new_frame: true,
        get_knobs: true,
    };
}

impl Default for RouteSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// Scheduler thresholds in timebase ticks (100 µs each by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Boot-wait progress step while no `/ready` arrives. Default: 1500
    /// (150 ms).
    pub boot_stall_ticks: u32,
    /// Minimum gap between `/nf` and the snapshot it requests. Default: 250
    /// (25 ms).
    pub snapshot_gate_ticks: u32,
    /// Shutdown progress step. Default: 500 (50 ms).
    pub shutdown_step_ticks: u32,
    /// One power-settle period before the scheduler starts. Default: 500
    /// (50 ms).
    pub power_settle_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            boot_stall_ticks: ticks_from_millis(150),
            snapshot_gate_ticks: ticks_from_millis(25),
            shutdown_step_ticks: ticks_from_millis(50),
            power_settle_ticks: ticks_from_millis(50),
        }
    }
}

/// Capability descriptor for one board variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    /// Number of scanned keys, 1 to [`MAX_KEYS`].
    pub key_count: usize,
    /// Whether progress text is drawn on a [`StatusDisplay`](crate::io::StatusDisplay).
    pub has_display: bool,
    /// Optional host commands.
    pub routes: RouteSet,
    /// MIDI input channel filter; [`OMNI`] (0) accepts every channel.
    pub midi_channel: u8,
    /// Send decoded MIDI events to the host as notifications.
    pub forward_midi: bool,
    /// Re-emit decoded MIDI on the MIDI output.
    pub midi_thru: bool,
    /// Send a status byte with every thru message instead of relying on
    /// running status.
    pub midi_full_commands: bool,
    /// Zero the live-state blob once it has been sent, so each `/mblob`
    /// carries only what arrived since the previous one.
    pub clear_blob_after_snapshot: bool,
    pub timing: TimingConfig,
    pub foot_switch: FootSwitchConfig,
}

impl Profile {
    /// The ETC board: ten keys, RGB indicator, no display.
    pub fn etc() -> Self {
        Self {
            key_count: 10,
            has_display: false,
            routes: RouteSet::ALL,
            midi_channel: 1,
            forward_midi: true,
            midi_thru: false,
            midi_full_commands: false,
            clear_blob_after_snapshot: false,
            timing: TimingConfig::default(),
            foot_switch: FootSwitchConfig::default(),
        }
    }

    /// A display-equipped variant with fewer keys and no snapshot traffic.
    pub fn organelle_style() -> Self {
        Self {
            key_count: 4,
            has_display: true,
            routes: RouteSet {
                new_frame: false,
                ..RouteSet::ALL
            },
            midi_channel: OMNI,
            forward_midi: true,
            midi_thru: true,
            midi_full_commands: false,
            clear_blob_after_snapshot: false,
            timing: TimingConfig::default(),
            foot_switch: FootSwitchConfig::default(),
        }
    }

    /// Check the descriptor for values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_count == 0 || self.key_count > MAX_KEYS {
            return Err(ConfigError::InvalidKeyCount(self.key_count));
        }
        if self.midi_channel > MAX_MIDI_CHANNEL {
            return Err(ConfigError::InvalidMidiChannel(self.midi_channel));
        }
        let fs = &self.foot_switch;
        if fs.press_below >= fs.release_above {
            return Err(ConfigError::InvalidFootSwitchThresholds {
                low: fs.press_below,
                high: fs.release_above,
            });
        }
        let t = &self.timing;
        if t.boot_stall_ticks == 0 || t.shutdown_step_ticks == 0 {
            return Err(ConfigError::ZeroTiming);
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::etc()
    }
}
