//! Error type for the status screen driver.

use core::fmt;

use display_interface::DisplayError;

/// Errors from bringing up or flushing the OLED.
///
/// Bus failures arrive wrapped in [`DisplayError`] by `ssd1306`, so the
/// enum does not carry the I2C error type.
#[derive(Debug)]
pub enum OledError {
    /// Bus-level failure while talking to the panel.
    Display(DisplayError),
    /// The panel did not accept the initialisation sequence.
    InitializationFailed,
    /// [`OledDriver::init()`](crate::OledDriver::init) has not succeeded yet.
    NotInitialized,
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Display(e)
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::Display(e) => write!(f, "display interface error: {:?}", e),
            OledError::InitializationFailed => write!(f, "OLED initialisation failed"),
            OledError::NotInitialized => write!(f, "OLED not initialised"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::Display(_e) => defmt::write!(f, "Display interface error"),
            OledError::InitializationFailed => defmt::write!(f, "Initialization failed"),
            OledError::NotInitialized => defmt::write!(f, "Not initialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(
            OledError::NotInitialized.to_string(),
            "OLED not initialised"
        );
        assert_eq!(
            OledError::from(DisplayError::BusWriteError).to_string(),
            "display interface error: BusWriteError"
        );
    }
}
