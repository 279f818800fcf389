//! Status text screen for the ETC control board on an SSD1306 (128×64).
//!
//! The control loop writes progress text through
//! [`etc_control::io::StatusDisplay`], implemented here by
//! [`StatusScreen`]. [`status_display_task`] renders the published frame
//! with `embedded-graphics` and flushes it to the panel through
//! [`OledDriver`], so the control loop never blocks on I2C.
//!
//! # Quick Start
//!
//! ```ignore
//! use core::cell::RefCell;
//! use etc_oled_display_rs::{status_display_task, DisplayConfig, OledDriver, SharedScreen, StatusScreen};
//!
//! static SCREEN: SharedScreen = Mutex::new(RefCell::new(StatusScreen::new()));
//!
//! let oled = OledDriver::new(i2c, DEFAULT_ADDRESS);
//! spawner.spawn(oled_task(oled)).unwrap();
//!
//! #[embassy_executor::task]
//! async fn oled_task(driver: OledDriver<MyI2cType>) {
//!     status_display_task(driver, &SCREEN, DisplayConfig::default()).await;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`** — structured logging via `defmt`.
//! - **`task`** — the Embassy refresh task ([`status_display_task`]).

#![no_std]

#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod layout;

// ── Re-exports for convenience ───────────────────────────────────────────

#[cfg(feature = "task")]
pub use display_task::{status_display_task, SharedScreen};
pub use driver::{OledDriver, DEFAULT_ADDRESS};
pub use error::OledError;
pub use layout::{render_status, DisplayConfig, StatusFrame, StatusScreen, LINE_CHARS, TEXT_LINES};
