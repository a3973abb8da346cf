//! Monotonic time source trait.

/// Milliseconds since boot.
///
/// Steady-state code receives the current time as a plain `now_ms`
/// argument to its tick. This trait exists for the one deliberately
/// blocking phase, modem bring-up, which has to watch time pass on its
/// own while it waits for the boot banner.
pub trait Monotonic {
    /// Current monotonic time in milliseconds.
    fn now_ms(&self) -> u64;
}
