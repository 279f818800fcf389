//! etc-hw-interface
//!
//! ETC control-board firmware for the Raspberry Pi Pico 2. Wires the
//! `etc-control` scheduler to the board:
//!
//! 1. SysTick fires at `TIMER_FREQUENCY_HZ` and advances the shared
//!    [`Timebase`].
//! 2. UART tasks shuttle MIDI and host-link bytes into pipes; the ADC task
//!    publishes a complete knob batch every few milliseconds.
//! 3. The main task runs `Scheduler::poll()` against a [`PicoBoard`] and
//!    yields to the executor between iterations.
//! 4. The OLED task renders progress text when the profile has a display.
//!
//! After `/shutdown` completes the main task parks forever; only a power
//! cycle brings the board back.

#![no_std]
#![no_main]

mod board;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, UART0, UART1};
use embassy_rp::uart::{self, Uart, UartRx, UartTx};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use etc_control::input::KNOB_COUNT;
use etc_control::{Phase, Profile, Rgb, Scheduler, Timebase, TIMER_FREQUENCY_HZ};
use etc_control::io::Indicator;
use etc_oled_display_rs::{status_display_task, DisplayConfig, OledDriver, DEFAULT_ADDRESS};

use board::{BytePipe, PicoBoard, ADC_BATCH, HOST_RX, HOST_TX, KEY_PINS, MIDI_RX, MIDI_TX, SCREEN};

// ---------------------------------------------------------------------------
// Boot block, interrupts and the tick source
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    UART0_IRQ => uart::InterruptHandler<UART0>;
    UART1_IRQ => uart::InterruptHandler<UART1>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// Advanced only by the SysTick exception.
static TIMEBASE: Timebase = Timebase::new();

#[cortex_m_rt::exception]
fn SysTick() {
    TIMEBASE.tick();
}

/// SysTick's reload register is 24 bits wide.
const SYST_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Arm SysTick at `TIMER_FREQUENCY_HZ` from the core clock.
fn start_timebase(mut syst: SYST) {
    let reload = embassy_rp::clocks::clk_sys_freq() / TIMER_FREQUENCY_HZ - 1;
    if reload == 0 || reload > SYST_MAX_RELOAD {
        defmt::panic!("SysTick reload {} out of range", reload);
    }
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(reload);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const HOST_BAUD: u32 = 115_200;
const MIDI_BAUD: u32 = 31_250;

/// Settle time after switching the analog multiplexer.
const MUX_SETTLE_US: u64 = 10;

/// Gap between converter batches.
const ADC_BATCH_INTERVAL_MS: u64 = 2;

/// The converter is 12-bit; foot-switch thresholds are in 10-bit counts.
const ADC_SHIFT: u32 = 2;

/// Power-settle periods the indicator holds green.
const POWER_SETTLE_PERIODS: usize = 3;

#[cfg(not(feature = "organelle"))]
fn board_profile() -> Profile {
    Profile::etc()
}

#[cfg(feature = "organelle")]
fn board_profile() -> Profile {
    Profile::organelle_style()
}

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type OledI2c = I2c<'static, I2C0, i2c::Async>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn pump_rx<const N: usize>(mut rx: UartRx<'static, uart::Async>, pipe: &'static BytePipe<N>) {
    let mut byte = [0u8; 1];
    loop {
        if rx.read(&mut byte).await.is_err() {
            warn!("UART receive error");
            continue;
        }
        if pipe.try_write(&byte).is_err() {
            warn!("receive pipe full, byte dropped");
        }
    }
}

async fn pump_tx<const N: usize>(mut tx: UartTx<'static, uart::Async>, pipe: &'static BytePipe<N>) {
    let mut buf = [0u8; 64];
    loop {
        let n = pipe.read(&mut buf).await;
        if tx.write(&buf[..n]).await.is_err() {
            warn!("UART transmit error");
        }
    }
}

#[embassy_executor::task]
async fn host_rx_task(rx: UartRx<'static, uart::Async>) {
    pump_rx(rx, &HOST_RX).await;
}

#[embassy_executor::task]
async fn host_tx_task(tx: UartTx<'static, uart::Async>) {
    pump_tx(tx, &HOST_TX).await;
}

#[embassy_executor::task]
async fn midi_rx_task(rx: UartRx<'static, uart::Async>) {
    pump_rx(rx, &MIDI_RX).await;
}

#[embassy_executor::task]
async fn midi_tx_task(tx: UartTx<'static, uart::Async>) {
    pump_tx(tx, &MIDI_TX).await;
}

/// Scan the six analog channels through the external 8-way multiplexer and
/// publish each complete batch.
#[embassy_executor::task]
async fn adc_task(
    mut adc: Adc<'static, adc::Async>,
    mut input: adc::Channel<'static>,
    mut select: [Output<'static>; 3],
) {
    let mut batch = [0u16; KNOB_COUNT];
    loop {
        for (channel, sample) in batch.iter_mut().enumerate() {
            for (bit, pin) in select.iter_mut().enumerate() {
                pin.set_level(Level::from(channel & (1 << bit) != 0));
            }
            Timer::after_micros(MUX_SETTLE_US).await;
            match adc.read(&mut input).await {
                Ok(raw) => *sample = raw >> ADC_SHIFT,
                Err(_) => warn!("ADC read failed on channel {}", channel),
            }
        }
        ADC_BATCH.lock(|slot| slot.set(Some(batch)));
        Timer::after_millis(ADC_BATCH_INTERVAL_MS).await;
    }
}

/// Monomorphises the generic `status_display_task` for the concrete bus.
#[embassy_executor::task]
async fn oled_task(driver: OledDriver<OledI2c>, config: DisplayConfig) {
    status_display_task(driver, &SCREEN, config).await;
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("etc-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // HOST TX/RX  → GP0 / GP1    (UART0, SLIP/OSC)
    // MIDI TX/RX  → GP4 / GP5    (UART1)
    // KEYS 1–10   → GP2, GP3, GP6–GP12, GP22   active-low, pull-up
    // MUX S0–S2   → GP13–GP15
    // MUX COM     → GP26 (ADC0)
    // LED R/G/B   → GP16–GP18
    // OLED SDA/SCL→ GP20 / GP21  (I2C0)
    // ———————————————————————————————————————————————————————————————————————

    let profile = board_profile();
    if let Err(e) = profile.validate() {
        defmt::panic!("invalid board profile: {}", e);
    }
    if profile.key_count > KEY_PINS {
        defmt::panic!("profile wants {} keys, board has {}", profile.key_count, KEY_PINS);
    }

    let keys = [
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_22, Pull::Up),
    ];
    let mut board = PicoBoard::new(
        keys,
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_17, Level::Low),
        Output::new(p.PIN_18, Level::Low),
    );

    // —— Tick source and power settle ———————————————————————————————————————

    let core = unwrap!(cortex_m::Peripherals::take());
    start_timebase(core.SYST);

    board.set_rgb(Rgb::GREEN);
    for _ in 0..POWER_SETTLE_PERIODS {
        TIMEBASE.sleep(profile.timing.power_settle_ticks);
    }
    board.set_rgb(Rgb::OFF);
    info!("supply settled at tick {}", TIMEBASE.now());

    // —— Peripherals ————————————————————————————————————————————————————————

    let mut host_config = uart::Config::default();
    host_config.baudrate = HOST_BAUD;
    let host = Uart::new(
        p.UART0, p.PIN_0, p.PIN_1, Irqs, p.DMA_CH0, p.DMA_CH1, host_config,
    );
    let (host_tx, host_rx) = host.split();

    let mut midi_config = uart::Config::default();
    midi_config.baudrate = MIDI_BAUD;
    let midi = Uart::new(
        p.UART1, p.PIN_4, p.PIN_5, Irqs, p.DMA_CH2, p.DMA_CH3, midi_config,
    );
    let (midi_tx, midi_rx) = midi.split();

    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let mux_input = adc::Channel::new_pin(p.PIN_26, Pull::None);
    let mux_select = [
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
    ];

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(host_rx_task(host_rx)).unwrap();
    spawner.spawn(host_tx_task(host_tx)).unwrap();
    spawner.spawn(midi_rx_task(midi_rx)).unwrap();
    spawner.spawn(midi_tx_task(midi_tx)).unwrap();
    spawner.spawn(adc_task(adc, mux_input, mux_select)).unwrap();

    if profile.has_display {
        let i2c = I2c::new_async(p.I2C0, p.PIN_21, p.PIN_20, Irqs, i2c::Config::default());
        let oled = OledDriver::new(i2c, DEFAULT_ADDRESS);
        spawner.spawn(oled_task(oled, DisplayConfig::default())).unwrap();
    }

    info!("All tasks spawned");

    // —— Control loop ———————————————————————————————————————————————————————

    let mut scheduler = match Scheduler::new(profile, &TIMEBASE) {
        Ok(scheduler) => scheduler,
        Err(e) => defmt::panic!("scheduler rejected profile: {}", e),
    };
    scheduler.begin(&mut board);

    loop {
        if scheduler.poll(&mut board) == Phase::Halted {
            break;
        }
        embassy_futures::yield_now().await;
    }

    info!("halted at tick {}; power cycle to restart", TIMEBASE.now());
    core::future::pending::<()>().await;
}
