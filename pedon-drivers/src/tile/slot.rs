//! Outbound command bookkeeping.
//!
//! The link keeps at most one command queued and at most one in flight.
//! Serializing on the single modem endpoint keeps reply correlation
//! unambiguous: whatever comes back belongs to the one pending command.

use heapless::Vec;
use pedon_protocol::frame::MAX_FRAME_LEN;

/// A framed command waiting for the link to go free.
pub(crate) struct QueuedCommand {
    /// Fully framed bytes, checksum and terminator included.
    pub frame: Vec<u8, MAX_FRAME_LEN>,
    /// First three bytes a matching reply must carry.
    pub expect: [u8; 3],
    /// Reply window once sent, milliseconds.
    pub block_ms: u32,
}

/// The single in-flight command awaiting its reply.
pub(crate) struct CommandSlot {
    /// First three bytes a matching reply must carry.
    pub expect: [u8; 3],
    /// Absolute time after which the reply counts as lost.
    pub deadline_ms: u64,
}
