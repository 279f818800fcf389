//! Error types for the control core.
//!
//! Only two things in the core are fallible: decoding bytes that arrived
//! over the host link, and validating a [`Profile`](crate::Profile) at
//! startup. Neither error ever escapes the real-time path; malformed frames
//! are dropped where they are detected.

use core::fmt;

/// Errors produced by the SLIP/OSC wire codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// A SLIP frame exceeded the receive buffer and was dropped.
    FrameTooLong,
    /// A SLIP escape byte was followed by something other than
    /// `ESC_END` / `ESC_ESC`.
    BadEscape,
    /// The OSC packet ended before a complete field was read.
    Truncated,
    /// The OSC address pattern does not start with `/` or is not UTF-8.
    BadAddress,
    /// The OSC type tag string is missing its leading `,`.
    BadTypeTags,
    /// The type tag string names an argument type this device does not parse.
    UnsupportedType(u8),
    /// A string, blob, or argument list does not fit its fixed-size buffer.
    CapacityExceeded,
    /// The output buffer is too small for the encoded packet.
    BufferTooSmall,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WireError::FrameTooLong => write!(f, "SLIP frame too long"),
            WireError::BadEscape => write!(f, "invalid SLIP escape sequence"),
            WireError::Truncated => write!(f, "OSC packet truncated"),
            WireError::BadAddress => write!(f, "invalid OSC address"),
            WireError::BadTypeTags => write!(f, "invalid OSC type tag string"),
            WireError::UnsupportedType(t) => write!(f, "unsupported OSC type tag '{}'", *t as char),
            WireError::CapacityExceeded => write!(f, "OSC field exceeds buffer capacity"),
            WireError::BufferTooSmall => write!(f, "output buffer too small"),
        }
    }
}

/// Invalid device [`Profile`](crate::Profile). Fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Key count is zero or larger than [`MAX_KEYS`](crate::MAX_KEYS).
    InvalidKeyCount(usize),
    /// MIDI channel filter must be 0 (omni) or 1–16.
    InvalidMidiChannel(u8),
    /// Foot-switch press threshold must lie below the release threshold.
    InvalidFootSwitchThresholds { low: u16, high: u16 },
    /// A timing threshold of zero ticks would fire on every poll.
    ZeroTiming,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidKeyCount(n) => write!(f, "invalid key count {}", n),
            ConfigError::InvalidMidiChannel(ch) => write!(f, "invalid MIDI channel {}", ch),
            ConfigError::InvalidFootSwitchThresholds { low, high } => {
                write!(f, "foot switch thresholds inverted (low {} >= high {})", low, high)
            }
            ConfigError::ZeroTiming => write!(f, "timing thresholds must be non-zero"),
        }
    }
}
