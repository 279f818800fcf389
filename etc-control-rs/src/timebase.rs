//! Hardware tick counter shared between the tick interrupt and the
//! foreground scheduler.
//!
//! The tick interrupt is the only writer that *advances* the counters:
//! [`Timebase::tick()`] decrements `countdown` and increments `stopwatch`.
//! Foreground code only reads them or resets them to a known value. Each
//! counter has a single advancing writer, so plain atomic load/store pairs
//! are enough and the type works on cores without compare-and-swap.
//!
//! A foreground reset racing an interrupt increment can lose at most one
//! tick, which no consumer cares about.
//!
//! # Example
//!
//! ```
//! use etc_control::Timebase;
//!
//! static TIMEBASE: Timebase = Timebase::new();
//!
//! TIMEBASE.stopwatch_reset();
//! for _ in 0..250 {
//!     TIMEBASE.tick(); // normally called from the SysTick handler
//! }
//! assert_eq!(TIMEBASE.stopwatch_read(), 250);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Tick interrupt frequency. One tick is 100 µs.
pub const TIMER_FREQUENCY_HZ: u32 = 10_000;

/// Free-running tick source with a countdown delay and a resettable stopwatch.
pub struct Timebase {
    /// Monotonic tick count; wraps at `u32::MAX`.
    ticks: AtomicU32,
    /// Decremented to zero by the interrupt; polled by [`sleep()`](Self::sleep).
    countdown: AtomicU32,
    /// Incremented by the interrupt (saturating); reset by the foreground.
    stopwatch: AtomicU32,
}

impl Default for Timebase {
    fn default() -> Self {
        Self::new()
    }
}

impl Timebase {
    /// Create a stopped timebase with all counters at zero.
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            countdown: AtomicU32::new(0),
            stopwatch: AtomicU32::new(0),
        }
    }

    // ── Interrupt context ────────────────────────────────────────────

    /// Advance the clock by one tick. Call from the periodic interrupt only.
    ///
    /// `countdown` saturates at zero, `stopwatch` saturates at `u32::MAX`.
    #[inline]
    pub fn tick(&self) {
        let ticks = self.ticks.load(Ordering::Relaxed);
        self.ticks.store(ticks.wrapping_add(1), Ordering::Relaxed);

        let countdown = self.countdown.load(Ordering::Relaxed);
        if countdown != 0 {
            self.countdown.store(countdown - 1, Ordering::Release);
        }

        let stopwatch = self.stopwatch.load(Ordering::Relaxed);
        self.stopwatch
            .store(stopwatch.saturating_add(1), Ordering::Release);
    }

    // ── Foreground context ───────────────────────────────────────────

    /// Ticks since power-on, wrapping.
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Block the caller until `ticks` interrupts have elapsed.
    ///
    /// Busy-waits on the countdown. Only for startup sequencing before the
    /// scheduler runs; never call from interrupt context, where it would
    /// spin forever.
    pub fn sleep(&self, ticks: u32) {
        self.countdown.store(ticks, Ordering::Release);
        while self.countdown.load(Ordering::Acquire) != 0 {
            core::hint::spin_loop();
        }
    }

    /// Remaining ticks of the current [`sleep()`](Self::sleep).
    pub fn countdown(&self) -> u32 {
        self.countdown.load(Ordering::Acquire)
    }

    /// Restart the stopwatch from zero.
    pub fn stopwatch_reset(&self) {
        self.stopwatch.store(0, Ordering::Release);
    }

    /// Ticks since the last [`stopwatch_reset()`](Self::stopwatch_reset).
    pub fn stopwatch_read(&self) -> u32 {
        self.stopwatch.load(Ordering::Acquire)
    }
}

/// Convert milliseconds to timebase ticks.
pub const fn ticks_from_millis(ms: u32) -> u32 {
    ms * (TIMER_FREQUENCY_HZ / 1000)
}
