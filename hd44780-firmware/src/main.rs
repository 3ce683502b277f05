//! HD44780 demo firmware
//!
//! Drives a 20x4 character LCD in 4-bit mode from an RP2040. The queue
//! runner owns the seven GPIO lines; the main task and the uptime task
//! share the display through the queue.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hd44780_core::{DriverConfig, Geometry, RegisterSelect};
use hd44780_driver::{BusLines, BusTransport, Completion, Hd44780, TransactionQueue};
use hd44780_hal::BusPinConfig;

use crate::board::{BoardLines, LCD_PINS};

mod board;
mod tasks;

/// Queue capacity in nibbles
const QUEUE_DEPTH: usize = 64;

type Queue = TransactionQueue<CriticalSectionRawMutex, QUEUE_DEPTH>;
type Lcd = Hd44780<CriticalSectionRawMutex, QUEUE_DEPTH>;

/// The one queue in front of the LCD bus
static LCD_QUEUE: Queue = TransactionQueue::new();

/// Completion for the blink toggle
static BLINK_DONE: Completion<CriticalSectionRawMutex> = Completion::new();

static LCD: StaticCell<Lcd> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("hd44780 demo starting...");

    let p = embassy_rp::init(Default::default());

    let pins = match BusPinConfig::parse(LCD_PINS) {
        Ok(pins) => pins,
        Err(e) => {
            error!("Bad LCD pin assignment: {:?}", e);
            return;
        }
    };

    // Pin numbers here must match LCD_PINS
    let mut board = BoardLines::new([
        (2, Output::new(p.PIN_2, Level::Low)),
        (3, Output::new(p.PIN_3, Level::Low)),
        (4, Output::new(p.PIN_4, Level::Low)),
        (6, Output::new(p.PIN_6, Level::Low)),
        (7, Output::new(p.PIN_7, Level::Low)),
        (8, Output::new(p.PIN_8, Level::Low)),
        (9, Output::new(p.PIN_9, Level::Low)),
    ]);

    let config = DriverConfig {
        geometry: Geometry::LCD2004,
        ..DriverConfig::default()
    };

    let lines = match BusLines::claim(&pins, &mut board) {
        Ok(lines) => lines,
        Err(e) => {
            error!("LCD lines unavailable: {:?}", e);
            return;
        }
    };
    let bus = match BusTransport::new(lines, Delay, &config.timing).await {
        Ok(bus) => bus,
        Err(e) => {
            error!("LCD bus idle failed: {:?}", e);
            return;
        }
    };
    spawner.spawn(tasks::lcd_bus_task(bus)).unwrap();

    let lcd = match Hd44780::attach(&LCD_QUEUE, config).await {
        Ok(lcd) => LCD.init(lcd),
        Err(e) => {
            error!("LCD attach failed: {:?}", e);
            return;
        }
    };

    // Degree sign for the banner
    let degree = [0x0C, 0x12, 0x12, 0x0C, 0x00, 0x00, 0x00, 0x00];
    if let Err(e) = lcd.create_char(0, &degree, None) {
        warn!("Glyph upload rejected: {:?}", e);
    }

    if let Err(e) = lcd.print("hd44780 queued bus", None).await {
        warn!("Banner failed: {:?}", e);
    }
    if lcd.set_cursor(0, 1, None).is_ok() {
        if let Err(e) = lcd.print("async, 4-bit, 25", None).await {
            warn!("Banner failed: {:?}", e);
        }
        // Glyph 0 is the degree sign uploaded above
        let settle = lcd.config().timing.instruction_settle_us;
        if let Err(e) = lcd.write_byte(RegisterSelect::Data, 0x00, settle, None) {
            warn!("Glyph write rejected: {:?}", e);
        }
    }

    match lcd.blink_on(Some(&BLINK_DONE)) {
        Ok(()) => match BLINK_DONE.wait().await {
            Ok(()) => info!("Cursor blink on"),
            Err(e) => warn!("Blink toggle failed: {:?}", e),
        },
        Err(e) => warn!("Blink toggle rejected: {:?}", e),
    }

    spawner.spawn(tasks::uptime_task(lcd)).unwrap();

    info!("All tasks spawned, display running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat, {} nibbles queued", LCD_QUEUE.pending());
    }
}
