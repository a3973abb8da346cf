//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

/// Capacity of a raw SDI-12 response carried between tasks. Matches the
/// session's output accumulator.
pub use pedon_drivers::sdi12::RESPONSE_CAPACITY;

/// Capacity of one formatted telemetry report.
pub const REPORT_CAPACITY: usize = pedon_core::telemetry::MAX_REPORT_LEN;

/// A request for the SDI-12 task
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorRequest {
    /// Query sensor identification (`aI!`)
    Identify { address: u8 },
    /// Run a full measurement cycle (`aC!` plus page retrieval)
    Measure { address: u8 },
}

/// Raw outcome of one SDI-12 exchange
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub address: u8,
    /// Number of `+`/`-` value tokens retrieved
    pub values: usize,
    /// Identification line or accumulated page data
    pub payload: Vec<u8, RESPONSE_CAPACITY>,
}

/// Requests from the controller to the SDI-12 task
pub static SENSOR_REQUEST: Channel<CriticalSectionRawMutex, SensorRequest, 2> = Channel::new();

/// Completed exchanges back to the controller
pub static SENSOR_READING: Channel<CriticalSectionRawMutex, SensorReading, 1> = Channel::new();

/// Formatted telemetry reports waiting for the tile link
pub static REPORT_QUEUE: Channel<CriticalSectionRawMutex, Vec<u8, REPORT_CAPACITY>, 2> =
    Channel::new();

/// Latest node time from the tile link (updated every link tick)
/// Value is epoch seconds, or None while unsynchronized or stale
pub static EPOCH_SECONDS: Signal<CriticalSectionRawMutex, Option<u64>> = Signal::new();

/// Latest smoothed battery reading in millivolts (updated by battery task)
pub static BATTERY_MV: Signal<CriticalSectionRawMutex, u16> = Signal::new();
