//! Wire formats for the pedon field node.
//!
//! Two line-oriented serial protocols share this crate:
//!
//! - **SDI-12**, the single-wire sensor bus. Commands are `<addr><verb>!`,
//!   responses are ASCII lines ending `\r\n`, and the bus protocol carries
//!   no checksum of its own.
//! - **Tile**, the satellite modem link. Commands and responses are
//!   NMEA-style sentences:
//!
//!   ```text
//!   ┌───────────────┬─────┬────────────┬────┐
//!   │ $COMMAND ...  │ '*' │ 2-hex csum │ \n │
//!   └───────────────┴─────┴────────────┴────┘
//!   ```
//!
//! Everything here is pure: byte-level parsing and formatting with no I/O
//! and no timing. The session state machines that drive these formats over
//! real serial links live in `pedon-drivers`, buffered through the
//! [`LineStack`] defined here.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod frame;
pub mod line;
pub mod sdi12;
pub mod tile;

pub use frame::FrameError;
pub use line::LineStack;
