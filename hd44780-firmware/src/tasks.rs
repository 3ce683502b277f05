//! Embassy tasks
//!
//! Tasks cannot be generic, so the queue runner is wrapped here for the
//! board's concrete line and delay types.

use core::fmt::Write;

use defmt::*;
use embassy_time::{Delay, Duration, Instant, Ticker};
use heapless::String;
use hd44780_driver::BusTransport;

use crate::board::LcdLine;
use crate::{Lcd, LCD_QUEUE};

/// Uptime refresh interval
const UPTIME_INTERVAL_MS: u64 = 1000;

/// Queue runner: sole owner of the LCD bus
#[embassy_executor::task]
pub async fn lcd_bus_task(bus: BusTransport<LcdLine, Delay>) {
    info!("LCD bus task started");
    let bus = LCD_QUEUE.run(bus).await;
    let (_lines, _delay) = bus.release();
    info!("LCD bus released");
}

/// Show seconds since boot on the bottom row
#[embassy_executor::task]
pub async fn uptime_task(lcd: &'static Lcd) {
    let mut ticker = Ticker::every(Duration::from_millis(UPTIME_INTERVAL_MS));
    let start = Instant::now();
    let row = lcd.config().geometry.rows - 1;

    loop {
        ticker.next().await;

        let mut text: String<20> = String::new();
        let _ = write!(text, "up {}s", start.elapsed().as_secs());

        if let Err(e) = lcd.set_cursor(0, row, None) {
            warn!("Uptime cursor rejected: {:?}", e);
            continue;
        }
        match lcd.print(&text, None).await {
            Ok(()) => trace!("Uptime line written"),
            Err(e) => warn!("Uptime line failed: {:?}", e),
        }
    }
}
