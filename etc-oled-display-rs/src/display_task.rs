//! Periodic panel refresh.
//!
//! [`status_display_task`] polls the shared [`StatusScreen`] and pushes a
//! new frame to the panel whenever its revision changes. The lock is held
//! only long enough to copy the published frame; rendering and the I2C
//! flush happen outside it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embedded_hal_async::i2c::I2c;

use crate::driver::OledDriver;
use crate::layout::{DisplayConfig, StatusScreen};

/// Screen shared between the control loop and the display task.
pub type SharedScreen = Mutex<CriticalSectionRawMutex, RefCell<StatusScreen>>;

/// Display refresh loop.
///
/// A regular `async fn`, not an Embassy task: tasks cannot be generic, so
/// the firmware wraps it in a concrete one.
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn oled_task(driver: OledDriver<I2c<'static, I2C0, Async>>) {
///     status_display_task(driver, &SCREEN, DisplayConfig::default()).await;
/// }
/// ```
///
/// Returns if the panel fails to initialise. Draw and flush failures are
/// logged and retried on the next change.
#[allow(clippy::needless_pass_by_value)]
pub async fn status_display_task<I2C>(
    mut driver: OledDriver<I2C>,
    screen: &'static SharedScreen,
    config: DisplayConfig,
) where
    I2C: I2c,
{
    if let Err(_e) = driver.init().await {
        #[cfg(feature = "defmt")]
        defmt::error!("OLED init failed: {}", _e);
        return;
    }

    #[cfg(feature = "defmt")]
    defmt::info!("OLED initialised");

    let period = embassy_time::Duration::from_millis(config.update_period_ms());
    let mut shown = 0u32;

    loop {
        embassy_time::Timer::after(period).await;

        let update = screen.lock(|cell| {
            let screen = cell.borrow();
            (screen.revision() != shown).then(|| (screen.revision(), screen.published().clone()))
        });
        let Some((revision, frame)) = update else {
            continue;
        };

        if let Err(_e) = driver.draw(&frame, &config) {
            #[cfg(feature = "defmt")]
            defmt::error!("Render failed: {}", _e);
            continue;
        }
        if let Err(_e) = driver.flush().await {
            #[cfg(feature = "defmt")]
            defmt::error!("Flush failed: {}", _e);
            continue;
        }

        shown = revision;
    }
}
