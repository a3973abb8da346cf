//! SDI-12 measurement session driver.
//!
//! Drives one multi-page exchange with a sensor on the bus: identify
//! (`aI!`), or start a measurement (`aC!`/`aM!`), wait out the sensor's
//! advertised measuring time, then page through `aD0!`..`aD9!` until
//! the advertised number of values has arrived. The session is polled:
//! each tick ingests pending bus bytes and advances at most one step.
//!
//! Sensors answer slowly or not at all when unplugged, so a watchdog
//! deadline runs alongside every exchange. When it fires the session
//! completes with whatever output accumulated, and the caller gets a
//! partial (possibly empty) response instead of a wedged bus.

use heapless::Vec;

use pedon_core::traits::{DiagnosticSink, SerialLink};
use pedon_protocol::sdi12::{self, MeasureVerb};
use pedon_protocol::LineStack;

/// Inbound line buffer capacity.
const INPUT_CAPACITY: usize = 256;

/// Longest response line worth keeping.
const MAX_LINE_LEN: usize = 128;

/// Accumulated payload capacity, enough for a full ten-page retrieval.
/// Buffers receiving a completed response should be this large.
pub const RESPONSE_CAPACITY: usize = 512;

/// How long a sensor gets to acknowledge a fresh command.
const ACK_WINDOW_MS: u64 = 5_000;

/// Watchdog slack past the sensor's advertised ready time, covering
/// the whole page retrieval that follows.
const RETRIEVAL_GRACE_MS: u64 = 30_000;

/// Where an exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No exchange in flight.
    Idle,
    /// Identification request sent, response pending.
    AwaitIdentify,
    /// Measurement request sent, ack with wait time pending.
    AwaitMeasureAck,
    /// Sensor measuring; retrieval starts once the deadline passes.
    AwaitReady { deadline_ms: u64 },
    /// Paging through `D0!`..`D9!` responses.
    Retrieving { page: u8 },
    /// Output accumulated; waiting for collection.
    Complete,
}

/// One SDI-12 exchange over a polled serial link.
pub struct Sdi12Session<S, D> {
    serial: S,
    sink: D,
    inbound: LineStack<INPUT_CAPACITY>,
    output: Vec<u8, RESPONSE_CAPACITY>,
    state: SessionState,
    address: u8,
    variable_count: u8,
    values_received: usize,
    watchdog_ms: u64,
}

impl<S: SerialLink, D: DiagnosticSink> Sdi12Session<S, D> {
    pub fn new(serial: S, sink: D) -> Self {
        Self {
            serial,
            sink,
            inbound: LineStack::new(),
            output: Vec::new(),
            state: SessionState::Idle,
            address: b'0',
            variable_count: 0,
            values_received: 0,
            watchdog_ms: 0,
        }
    }

    /// Abort any exchange in flight and drop accumulated output.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.inbound.clear();
        self.output.clear();
        self.variable_count = 0;
        self.values_received = 0;
        self.watchdog_ms = 0;
    }

    /// Ask sensor `address` to identify itself.
    pub fn request_info(&mut self, address: u8, now_ms: u64) {
        self.reset();
        self.address = address;
        self.watchdog_ms = now_ms + ACK_WINDOW_MS;
        let cmd = sdi12::identify_command(address);
        self.send(&cmd);
        self.state = SessionState::AwaitIdentify;
    }

    /// Start a measurement on sensor `address`.
    pub fn request_measurement(&mut self, address: u8, verb: MeasureVerb, now_ms: u64) {
        self.reset();
        self.address = address;
        self.watchdog_ms = now_ms + ACK_WINDOW_MS;
        let cmd = sdi12::measure_command(address, verb);
        self.send(&cmd);
        self.state = SessionState::AwaitMeasureAck;
    }

    /// Advance the exchange by at most one step.
    pub fn tick(&mut self, now_ms: u64) {
        self.ingest_serial();

        if self.in_flight() && now_ms >= self.watchdog_ms {
            self.sink.show(b"sdi12: timeout, keeping partial output");
            self.state = SessionState::Complete;
            return;
        }

        // The ready wait ends by deadline, not by a response line.
        if let SessionState::AwaitReady { deadline_ms } = self.state {
            if now_ms >= deadline_ms {
                self.send_retrieve(0);
                self.state = SessionState::Retrieving { page: 0 };
            }
            return;
        }

        let mut raw = [0u8; MAX_LINE_LEN];
        let len = self.inbound.pop(&mut raw);
        if len == 0 {
            return;
        }
        let line = sdi12::trim_carriage_return(&raw[..len]);
        if line.is_empty() {
            return;
        }
        self.sink.show(line);

        match self.state {
            SessionState::AwaitIdentify => {
                // The identification line is the whole result.
                let _ = self.output.extend_from_slice(line);
                self.state = SessionState::Complete;
            }
            SessionState::AwaitMeasureAck => {
                if let Some(ack) = sdi12::parse_measure_ack(line) {
                    let deadline_ms = now_ms + u64::from(ack.wait_s) * 1_000;
                    self.variable_count = ack.count;
                    self.watchdog_ms = deadline_ms + RETRIEVAL_GRACE_MS;
                    self.state = SessionState::AwaitReady { deadline_ms };
                }
                // Anything unparseable here is bus chatter; keep waiting.
            }
            SessionState::Retrieving { page } => self.on_page(line, page),
            SessionState::Idle | SessionState::AwaitReady { .. } | SessionState::Complete => {}
        }
    }

    /// Copy the completed response into `out` and go back to idle.
    ///
    /// Returns 0 while no completed response is available.
    pub fn take_response(&mut self, out: &mut [u8]) -> usize {
        if self.state != SessionState::Complete {
            return 0;
        }
        let len = self.output.len().min(out.len());
        out[..len].copy_from_slice(&self.output[..len]);
        self.output.clear();
        self.state = SessionState::Idle;
        len
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Value tokens seen across all pages so far.
    pub fn values_received(&self) -> usize {
        self.values_received
    }

    /// Value count the sensor advertised in its measurement ack.
    pub fn variable_count(&self) -> u8 {
        self.variable_count
    }

    fn on_page(&mut self, line: &[u8], page: u8) {
        // First byte is the responding sensor's address.
        let payload = &line[1..];
        // A page that would overflow the output is dropped whole.
        let _ = self.output.extend_from_slice(payload);
        self.values_received += sdi12::count_value_tokens(payload);

        let next = page + 1;
        if self.values_received >= usize::from(self.variable_count)
            || next > sdi12::MAX_RETRIEVAL_PAGE
        {
            self.state = SessionState::Complete;
        } else {
            self.send_retrieve(next);
            self.state = SessionState::Retrieving { page: next };
        }
    }

    fn send_retrieve(&mut self, page: u8) {
        let cmd = sdi12::retrieve_command(self.address, page);
        self.send(&cmd);
    }

    fn send(&mut self, cmd: &[u8]) {
        // Stale bus chatter must not be read back as this command's reply.
        self.inbound.clear();
        self.serial.write(cmd);
        self.sink.show(cmd);
    }

    fn ingest_serial(&mut self) {
        while let Some(byte) = self.serial.poll_byte() {
            self.inbound.ingest(byte);
        }
    }

    fn in_flight(&self) -> bool {
        !matches!(self.state, SessionState::Idle | SessionState::Complete)
    }
}
