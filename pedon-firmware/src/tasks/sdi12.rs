//! SDI-12 bus task
//!
//! Serves measurement and identification requests from the controller.
//! Owns the session state machine and the sensor power rail; the rail
//! only carries power while an exchange is running.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker, Timer};

use pedon_core::Monotonic;
use pedon_drivers::power::{BusPower, PowerPin};
use pedon_drivers::sdi12::{MeasureVerb, Sdi12Session};
use pedon_hal_rp2040::clock::UptimeClock;
use pedon_hal_rp2040::uart::Sdi12Serial;

use crate::channels::{
    SensorReading, SensorRequest, RESPONSE_CAPACITY, SENSOR_READING, SENSOR_REQUEST,
};
use crate::diag::RttSink;

/// Milliseconds between session ticks while an exchange is in flight
const TICK_MS: u64 = 100;

/// Sensor settling time after the rail comes up
const WARMUP_MS: u64 = 500;

/// Sensor power rail pin, driven through the BusPower driver
pub struct RailPin(pub Output<'static>);

impl PowerPin for RailPin {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// SDI-12 task - runs one exchange at a time
#[embassy_executor::task]
pub async fn sdi12_task(serial: Sdi12Serial, rail: RailPin) {
    info!("sdi-12 task started");

    let clock = UptimeClock;
    let mut session = Sdi12Session::new(serial, RttSink);
    let mut bus = BusPower::new_active_high(rail);

    loop {
        let request = SENSOR_REQUEST.receive().await;

        bus.set_on(true);
        Timer::after_millis(WARMUP_MS).await;

        let address = match request {
            SensorRequest::Identify { address } => {
                debug!("identify: address {}", address);
                session.request_info(address, clock.now_ms());
                address
            }
            SensorRequest::Measure { address } => {
                debug!("measure: address {}", address);
                session.request_measurement(address, MeasureVerb::Concurrent, clock.now_ms());
                address
            }
        };

        let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
        while !session.is_complete() {
            ticker.next().await;
            session.tick(clock.now_ms());
        }

        bus.set_on(false);

        let values = session.values_received();
        let mut reading = SensorReading {
            address,
            values,
            payload: heapless::Vec::new(),
        };
        let mut buf = [0u8; RESPONSE_CAPACITY];
        let len = session.take_response(&mut buf);
        // Infallible: buffer and payload share RESPONSE_CAPACITY.
        let _ = reading.payload.extend_from_slice(&buf[..len]);

        debug!("exchange done: {} values, {} bytes", values, len);
        SENSOR_READING.send(reading).await;
    }
}
