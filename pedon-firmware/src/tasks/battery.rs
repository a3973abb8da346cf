//! Battery sampling task
//!
//! Keeps a smoothed pack voltage available for the telemetry reports.

use defmt::*;
use embassy_rp::adc::{self, Adc, Blocking};
use embassy_time::Timer;

use pedon_drivers::battery::{AdcReader, BatteryMonitor};

use crate::channels::BATTERY_MV;

/// Seconds between samples
const SAMPLE_PERIOD_S: u64 = 60;

/// ADC reference voltage in millivolts
const VREF_MV: u32 = 3300;

/// External divider between the pack and the sense pin
const DIVIDER_RATIO: u32 = 2;

/// Battery sense input read through the blocking ADC
pub struct BatteryAdc {
    adc: Adc<'static, Blocking>,
    channel: adc::Channel<'static>,
}

impl BatteryAdc {
    pub fn new(adc: Adc<'static, Blocking>, channel: adc::Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for BatteryAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

/// Battery task - periodic sampling into a signal
#[embassy_executor::task]
pub async fn battery_task(adc: BatteryAdc) {
    info!("battery task started");

    let mut monitor = BatteryMonitor::new(adc, VREF_MV, DIVIDER_RATIO);

    loop {
        match monitor.sample() {
            Ok(mv) => {
                trace!("battery: {} mV", mv);
                BATTERY_MV.signal(mv);
            }
            Err(()) => warn!("battery: adc read failed"),
        }
        Timer::after_secs(SAMPLE_PERIOD_S).await;
    }
}
