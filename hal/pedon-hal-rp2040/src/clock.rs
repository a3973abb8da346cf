//! Millisecond uptime from the embassy time driver

use embassy_time::Instant;

use pedon_core::Monotonic;

/// Monotonic milliseconds since boot.
///
/// Zero-sized; construct one wherever a [`Monotonic`] is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UptimeClock;

impl Monotonic for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
