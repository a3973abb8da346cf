//! Capability traits separating core logic from hardware.
//!
//! The protocol drivers are written against these traits and tested on
//! the host with fakes; the board crates provide the real
//! implementations.

mod clock;
mod serial;
mod sink;

pub use clock::Monotonic;
pub use serial::SerialLink;
pub use sink::{DiagnosticSink, NullSink};
