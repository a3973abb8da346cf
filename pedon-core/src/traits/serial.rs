//! Byte-oriented serial channel trait.

/// A polled serial channel.
///
/// One instance exists per attached device (SDI-12 bus, tile modem).
/// The session state machines drain received bytes from their periodic
/// tick by calling [`poll_byte`] until it returns `None`; nothing here
/// blocks.
///
/// [`poll_byte`]: SerialLink::poll_byte
pub trait SerialLink {
    /// Take the next received byte, if one is waiting.
    fn poll_byte(&mut self) -> Option<u8>;

    /// Queue `bytes` for transmission, returning how many were accepted.
    ///
    /// A short count means the transmit side is saturated; callers treat
    /// it like any other dropped traffic and rely on retries.
    fn write(&mut self, bytes: &[u8]) -> usize;
}
