//! Tile modem link task
//!
//! Owns the tile link after bring-up: ticks the state machine on a
//! fixed cadence, publishes the current epoch time and feeds queued
//! telemetry reports into the modem.

use defmt::*;
use embassy_time::{Duration, Ticker};

use pedon_core::Monotonic;
use pedon_drivers::tile::TileLink;
use pedon_hal_rp2040::clock::UptimeClock;
use pedon_hal_rp2040::uart::TileSerial;

use crate::channels::{EPOCH_SECONDS, REPORT_QUEUE};
use crate::diag::RttSink;

/// Milliseconds between link ticks
const TICK_MS: u64 = 50;

/// Tile task - services the modem link
///
/// The link arrives here already initialized; `begin` ran in main before
/// anything else was spawned.
#[embassy_executor::task]
pub async fn tile_task(mut link: TileLink<TileSerial, RttSink>) {
    info!("tile task started");

    let clock = UptimeClock;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    loop {
        ticker.next().await;
        let now_ms = clock.now_ms();
        link.tick(now_ms);

        EPOCH_SECONDS.signal(link.epoch_seconds(now_ms));

        // dequeue a report only while the link can take it; the link
        // holds a single outstanding command at a time
        if !link.is_busy() {
            if let Ok(report) = REPORT_QUEUE.try_receive() {
                if link.enqueue_message(&report) {
                    debug!("report handed to tile link ({} bytes)", report.len());
                } else {
                    warn!("tile link rejected report, dropping");
                }
            }
        }
    }
}
