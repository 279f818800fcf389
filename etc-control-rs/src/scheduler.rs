//! The cooperative control loop.
//!
//! [`Scheduler::poll()`] runs one iteration and returns. The caller loops
//! on it (the firmware yields to the executor between calls), so no phase
//! ever blocks:
//!
//! ```text
//!  begin()
//!    │
//!    ▼
//!  BootWait ──/ready──► Run ──/shutdown──► ShuttingDown ──99 steps──► Halted
//!    │  ▲                 │  ▲
//!    └──┘ stall           └──┘ MIDI, one frame, keys, knobs, snapshot gate
//! ```
//!
//! The [`Timebase`] stopwatch is the only clock. It measures boot stalls,
//! the `/nf` snapshot gate and shutdown steps; each phase resets it on
//! entry, so they never overlap.
//!
//! # Example
//!
//! ```ignore
//! let mut scheduler = Scheduler::new(Profile::etc(), &TIMEBASE)?;
//! scheduler.begin(&mut board);
//! loop {
//!     if scheduler.poll(&mut board) == Phase::Halted {
//!         break;
//!     }
//! }
//! ```

use core::fmt::Write;

use heapless::String;

use crate::error::ConfigError;
use crate::input::{FootSwitch, KeyScanner, KnobBank};
use crate::io::{Board, Rgb};
use crate::live_state::LiveState;
use crate::midi::{MidiDecoder, MidiEncoder, MidiEvent};
use crate::profile::{Profile, MAX_PROGRESS};
use crate::router::{Command, Router};
use crate::timebase::Timebase;
use crate::wire::Outbound;

/// Display row used for progress text.
const PROGRESS_LINE: u8 = 0;

/// Where the control loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Waiting for `/ready`. `progress` counts stall periods, capped at
    /// [`MAX_PROGRESS`].
    BootWait { progress: u8 },
    /// Normal operation.
    Run,
    /// `/shutdown` received; counting up to [`MAX_PROGRESS`].
    ShuttingDown { progress: u8 },
    /// Terminal. Only a power cycle leaves this phase.
    Halted,
}

/// Owns all control state and drives it against a [`Board`].
pub struct Scheduler<'t> {
    profile: Profile,
    timebase: &'t Timebase,
    phase: Phase,
    router: Router,
    decoder: MidiDecoder,
    encoder: MidiEncoder,
    live: LiveState,
    keys: KeyScanner,
    knobs: KnobBank,
    foot_switch: FootSwitch,
    /// Set by `/nf`, cleared once the snapshot pair has been sent.
    snapshot_pending: bool,
}

impl<'t> Scheduler<'t> {
    /// Validate `profile` and build the control state for it.
    pub fn new(profile: Profile, timebase: &'t Timebase) -> Result<Self, ConfigError> {
        profile.validate()?;
        let mut encoder = MidiEncoder::new();
        encoder.set_send_full_commands(profile.midi_full_commands);
        Ok(Self {
            profile,
            timebase,
            phase: Phase::BootWait { progress: 0 },
            router: Router::new(profile.routes),
            decoder: MidiDecoder::new(profile.midi_channel),
            encoder,
            live: LiveState::new(),
            keys: KeyScanner::new(profile.key_count),
            knobs: KnobBank::new(),
            foot_switch: FootSwitch::new(profile.foot_switch),
            snapshot_pending: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn live_state(&self) -> &LiveState {
        &self.live
    }

    pub fn snapshot_pending(&self) -> bool {
        self.snapshot_pending
    }

    /// Enter Boot-Wait: indicator green, stopwatch restarted.
    pub fn begin<B: Board>(&mut self, board: &mut B) {
        self.phase = Phase::BootWait { progress: 0 };
        board.set_rgb(Rgb::GREEN);
        self.timebase.stopwatch_reset();
        if self.profile.has_display {
            board.clear();
            self.show_progress(board, "Booting", 0);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("waiting for /ready");
    }

    /// Run one iteration of the current phase and return the phase after it.
    pub fn poll<B: Board>(&mut self, board: &mut B) -> Phase {
        match self.phase {
            Phase::BootWait { progress } => self.poll_boot_wait(board, progress),
            Phase::Run => self.poll_run(board),
            Phase::ShuttingDown { progress } => self.poll_shutdown(board, progress),
            Phase::Halted => {}
        }
        self.phase
    }

    // ── Boot-Wait ────────────────────────────────────────────────────

    fn poll_boot_wait<B: Board>(&mut self, board: &mut B, progress: u8) {
        if let Some(msg) = board.receive() {
            if self.router.route(&msg) == Some(Command::Ready) {
                self.enter_run(board);
                return;
            }
        }

        if self.timebase.stopwatch_read() > self.profile.timing.boot_stall_ticks {
            self.timebase.stopwatch_reset();
            if progress < MAX_PROGRESS {
                let progress = progress + 1;
                self.phase = Phase::BootWait { progress };
                if self.profile.has_display {
                    self.show_progress(board, "Booting", progress);
                }
            } else {
                board.set_rgb(Rgb::RED);

                #[cfg(feature = "defmt")]
                defmt::warn!("boot stalled, host never sent /ready");
            }
        }
    }

    fn enter_run<B: Board>(&mut self, board: &mut B) {
        self.phase = Phase::Run;
        self.timebase.stopwatch_reset();
        if self.profile.has_display {
            board.clear();
            board.refresh();
        }

        #[cfg(feature = "defmt")]
        defmt::info!("host ready, running");
    }

    // ── Run ──────────────────────────────────────────────────────────

    fn poll_run<B: Board>(&mut self, board: &mut B) {
        self.drain_midi(board);

        if let Some(msg) = board.receive() {
            match self.router.route(&msg) {
                Some(command) => self.dispatch(board, command),
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("dropped unrouted message {}", msg.address());
                }
            }
            if self.phase != Phase::Run {
                return;
            }
        }

        for event in self.keys.scan(|index| board.key_pressed(index)) {
            board.send(&Outbound::from(event));
        }

        self.knobs.update(board.take_batch());
        if let Some(pressed) = self.foot_switch.update(self.knobs.foot_switch_raw()) {
            board.send(&Outbound::FootSwitch { pressed });
        }

        if self.snapshot_pending
            && self.timebase.stopwatch_read() > self.profile.timing.snapshot_gate_ticks
        {
            board.send(&Outbound::MidiBlob(self.live.snapshot()));
            board.send(&Outbound::Knobs(self.knobs.snapshot()));
            if self.profile.clear_blob_after_snapshot {
                self.live.clear();
            }
            self.snapshot_pending = false;
        }
    }

    /// Feed every buffered MIDI byte through the decoder.
    fn drain_midi<B: Board>(&mut self, board: &mut B) {
        while let Some(byte) = board.read_byte() {
            if let Some(event) = self.decoder.feed(byte) {
                self.handle_midi(board, &event);
            }
        }
    }

    fn handle_midi<B: Board>(&mut self, board: &mut B, event: &MidiEvent) {
        self.live.apply(event);
        if self.profile.forward_midi {
            if let Some(out) = Outbound::from_midi(event) {
                board.send(&out);
            }
        }
        if self.profile.midi_thru {
            let bytes = self.encoder.encode(event);
            if !bytes.is_empty() {
                board.write_bytes(&bytes);
            }
        }
    }

    fn dispatch<B: Board>(&mut self, board: &mut B, command: Command) {
        match command {
            // Already running; a repeated boot signal changes nothing.
            Command::Ready => {}
            Command::Led(rgb) => board.set_rgb(rgb),
            Command::Shutdown => self.enter_shutdown(board),
            Command::NewFrame => {
                self.timebase.stopwatch_reset();
                self.snapshot_pending = true;
            }
            Command::GetKnobs => board.send(&Outbound::Knobs(self.knobs.snapshot())),
        }
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    fn enter_shutdown<B: Board>(&mut self, board: &mut B) {
        self.phase = Phase::ShuttingDown { progress: 0 };
        self.snapshot_pending = false;
        board.set_rgb(Rgb::OFF);
        if self.profile.has_display {
            board.clear();
            board.refresh();
        }
        self.timebase.stopwatch_reset();

        #[cfg(feature = "defmt")]
        defmt::info!("shutting down");
    }

    fn poll_shutdown<B: Board>(&mut self, board: &mut B, progress: u8) {
        if self.timebase.stopwatch_read() <= self.profile.timing.shutdown_step_ticks {
            return;
        }
        self.timebase.stopwatch_reset();

        let progress = progress + 1;
        if self.profile.has_display {
            self.show_progress(board, "Shutting down", progress);
        }
        self.phase = if progress >= MAX_PROGRESS {
            #[cfg(feature = "defmt")]
            defmt::info!("shutdown complete");

            Phase::Halted
        } else {
            Phase::ShuttingDown { progress }
        };
    }

    fn show_progress<B: Board>(&self, board: &mut B, label: &str, progress: u8) {
        let mut text: String<24> = String::new();
        // "Shutting down 99%" is well inside capacity.
        let _ = write!(text, "{} {}%", label, progress);
        board.draw_text(PROGRESS_LINE, &text);
        board.refresh();
    }
}
