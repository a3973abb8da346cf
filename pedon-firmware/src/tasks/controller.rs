//! Measurement controller task
//!
//! The node's top-level schedule: waits for the next interval-aligned
//! instant, runs a measurement round over every configured SDI-12
//! address, formats the telemetry report and hands it to the tile task.

use defmt::*;
use embassy_time::Timer;

use pedon_core::telemetry::{next_scheduled, ChannelPayload, Report, MAX_CHANNELS};
use pedon_core::NodeConfig;

use crate::channels::{
    SensorRequest, BATTERY_MV, EPOCH_SECONDS, REPORT_QUEUE, SENSOR_READING, SENSOR_REQUEST,
};
use crate::config::ConfigStore;

/// Report type code for soil measurement rounds
const REPORT_KIND: [u8; 2] = *b"SM";

/// Per-channel slice of a sensor response kept for the report. The
/// report encoder caps the whole frame anyway; this bounds round RAM.
const CHANNEL_CAPACITY: usize = 128;

/// Controller task - drives the measurement schedule
#[embassy_executor::task]
pub async fn controller_task(
    mut store: ConfigStore<'static>,
    config: &'static NodeConfig,
    mut report_index: u32,
) {
    info!("controller task started");
    info!(
        "schedule: every {} s over {} sensors",
        config.interval_s,
        config.sdi12_addresses.len()
    );

    let mut battery_mv: u16 = 0;

    // dev mode walks the bus once at boot so the log shows who is out there
    if config.dev_mode {
        for &address in config.sdi12_addresses.iter() {
            SENSOR_REQUEST
                .send(SensorRequest::Identify { address })
                .await;
            let reading = SENSOR_READING.receive().await;
            info!(
                "sensor {}: {=[u8]:a}",
                reading.address,
                reading.payload.as_slice()
            );
        }
    }

    loop {
        // sleep until the next aligned slot
        let now = wait_epoch().await;
        let next = next_scheduled(now, config.interval_s);
        debug!("next round at epoch {} (in {} s)", next, next - now);
        Timer::after_secs(next - now).await;

        // measure every configured address; only the first five fit the
        // report's channel slots
        let mut payloads: heapless::Vec<heapless::Vec<u8, CHANNEL_CAPACITY>, MAX_CHANNELS> =
            heapless::Vec::new();
        for &address in config.sdi12_addresses.iter() {
            SENSOR_REQUEST
                .send(SensorRequest::Measure { address })
                .await;
            let reading = SENSOR_READING.receive().await;
            if reading.values == 0 {
                warn!("sensor {} returned no values", reading.address);
            }
            if payloads.len() < MAX_CHANNELS {
                let mut slot: heapless::Vec<u8, CHANNEL_CAPACITY> = heapless::Vec::new();
                let take = reading.payload.len().min(CHANNEL_CAPACITY);
                // Infallible: take is bounded by the slot capacity.
                let _ = slot.extend_from_slice(&reading.payload[..take]);
                let _ = payloads.push(slot);
            }
        }

        // latest battery figure, keeping the previous one when the
        // sampler has not run again yet
        if let Some(mv) = BATTERY_MV.try_take() {
            battery_mv = mv;
        }

        // format and queue the report
        let epoch = wait_epoch().await;
        let mut channels: heapless::Vec<ChannelPayload<'_>, MAX_CHANNELS> = heapless::Vec::new();
        for (i, slot) in payloads.iter().enumerate() {
            let _ = channels.push(ChannelPayload {
                channel: (i + 1) as u8,
                payload: slot.as_slice(),
            });
        }
        let report = Report {
            index: report_index,
            epoch_s: epoch,
            battery_mv,
            kind: Some(REPORT_KIND),
            channels: &channels,
        };
        let frame = report.encode();
        info!("report {}: {} bytes", report_index, frame.len());
        REPORT_QUEUE.send(frame).await;

        // the next report number must survive a reboot
        report_index = report_index.wrapping_add(1);
        store.save_report_index(report_index).await;
    }
}

/// Current epoch seconds from the tile link, waiting out any stale window
async fn wait_epoch() -> u64 {
    loop {
        if let Some(Some(epoch)) = EPOCH_SECONDS.try_take() {
            return epoch;
        }
        Timer::after_secs(1).await;
    }
}
