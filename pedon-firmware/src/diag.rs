//! Log-backed diagnostic sink
//!
//! The protocol engines mirror every line they send or accept to a
//! `DiagnosticSink`; on hardware that traffic goes to the defmt log.

use defmt::*;

use pedon_core::DiagnosticSink;

/// Forwards protocol traffic to the defmt log
#[derive(Debug, Default, Clone, Copy)]
pub struct RttSink;

impl DiagnosticSink for RttSink {
    fn show(&mut self, bytes: &[u8]) {
        debug!("io: {=[u8]:a}", bytes);
    }
}
