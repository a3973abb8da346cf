//! Board-agnostic core logic for the pedon field node firmware.
//!
//! Everything in this crate runs identically on the target and on the
//! host:
//!
//! - capability traits the protocol drivers consume ([`traits::SerialLink`],
//!   [`traits::DiagnosticSink`], [`traits::Monotonic`])
//! - persisted node configuration and its range sanitization ([`config`])
//! - telemetry report formatting and measurement scheduling ([`telemetry`])
//!
//! Hardware specifics live behind the traits; the firmware crate wires
//! concrete peripherals to them at startup.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod telemetry;
pub mod traits;

pub use config::NodeConfig;
pub use traits::{DiagnosticSink, Monotonic, NullSink, SerialLink};
