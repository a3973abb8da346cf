//! Diagnostic output trait.

/// Observational output for protocol traffic.
///
/// The drivers mirror interesting lines here (modem replies, sensor
/// responses, status notes). The sink is purely observational: every
/// state machine must behave the same against [`NullSink`].
pub trait DiagnosticSink {
    /// Show one chunk of traffic or a short status note.
    fn show(&mut self, bytes: &[u8]);
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn show(&mut self, _bytes: &[u8]) {}
}
