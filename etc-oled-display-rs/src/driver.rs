//! SSD1306 wrapper in async buffered-graphics mode.
//!
//! [`OledDriver`] owns the panel: construction sends nothing, [`init()`]
//! brings it up, [`draw()`] renders a [`StatusFrame`] into the frame buffer
//! and [`flush()`] sends that buffer over I2C.
//!
//! [`init()`]: OledDriver::init
//! [`draw()`]: OledDriver::draw
//! [`flush()`]: OledDriver::flush

use display_interface_i2c::I2CInterface;
use embedded_hal_async::i2c::I2c;
use ssd1306::{
    mode::BufferedGraphicsModeAsync, prelude::*, I2CDisplayInterface, Ssd1306Async,
};

use crate::error::OledError;
use crate::layout::{render_status, DisplayConfig, StatusFrame};

/// Default 7-bit address of the SSD1306 breakout.
pub const DEFAULT_ADDRESS: u8 = 0x3C;

type Display<I2C> = Ssd1306Async<
    I2CInterface<I2C>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

/// Async SSD1306 128×64 driver over I2C.
///
/// ```no_run
/// use etc_oled_display_rs::{DisplayConfig, OledDriver, StatusFrame, DEFAULT_ADDRESS};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut oled = OledDriver::new(i2c, DEFAULT_ADDRESS);
/// oled.init().await.unwrap();
/// oled.draw(&StatusFrame::new(), &DisplayConfig::default()).unwrap();
/// oled.flush().await.unwrap();
/// # }
/// ```
pub struct OledDriver<I2C> {
    display: Display<I2C>,
    initialized: bool,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c,
{
    /// Construct the driver without any bus traffic. Call
    /// [`init()`](Self::init) before drawing.
    pub fn new(i2c: I2C, address: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self {
            display,
            initialized: false,
        }
    }

    /// Send the SSD1306 initialisation sequence and blank the panel.
    pub async fn init(&mut self) -> Result<(), OledError> {
        self.display
            .init()
            .await
            .map_err(|_| OledError::InitializationFailed)?;
        self.initialized = true;

        self.display.clear_buffer();
        self.display.flush().await?;
        Ok(())
    }

    /// Replace the frame buffer contents with `frame`. No bus traffic.
    pub fn draw(&mut self, frame: &StatusFrame, config: &DisplayConfig) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::NotInitialized);
        }
        self.display.clear_buffer();
        // The buffered draw target cannot fail; out-of-panel pixels are
        // clipped.
        let _ = render_status(&mut self.display, frame, config);
        Ok(())
    }

    /// Transfer the frame buffer to the panel (about 20 ms at 400 kHz).
    pub async fn flush(&mut self) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::NotInitialized);
        }
        self.display.flush().await?;
        Ok(())
    }
}
