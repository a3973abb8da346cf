//! Satellite modem link driver.
//!
//! Two distinct phases drive the tile. Bring-up ([`TileLink::begin`])
//! is deliberately blocking: reset the modem, wait for its boot banner,
//! configure broadcast rates and hold until the first valid time fix.
//! It runs once, before anything else needs the executor's attention.
//!
//! Steady state is [`TileLink::tick`], polled non-blocking: ingest
//! modem output one line at a time, track unsolicited time broadcasts,
//! correlate replies with the single outstanding command and push
//! queued telemetry out. Commands time out rather than retry; the
//! caller re-issues on the next round if it still cares.

use pedon_core::traits::{DiagnosticSink, Monotonic, SerialLink};
use pedon_protocol::frame;
use pedon_protocol::tile::{
    self, ACK_SUFFIX, BOOT_MARKER, QUEUE_FLUSH_COMMAND, RATE_COMMANDS, RESET_COMMAND,
};
use pedon_protocol::LineStack;

use super::slot::{CommandSlot, QueuedCommand};

/// Reply window for commands issued during normal operation.
pub const STEADY_BLOCK_MS: u32 = 2_000;

/// Age beyond which the last time fix no longer counts.
pub const TIME_STALE_MS: u64 = 60_000;

/// Reset is re-sent at this interval while waiting for the boot banner.
const BOOT_RETRY_MS: u64 = 30_000;

/// Inbound line buffer capacity.
const INBOUND_CAPACITY: usize = 512;

/// Longest inbound line worth keeping.
const MAX_LINE_LEN: usize = 256;

/// The satellite modem link.
pub struct TileLink<S, D> {
    serial: S,
    sink: D,
    inbound: LineStack<INBOUND_CAPACITY>,
    outbound: Option<QueuedCommand>,
    pending: Option<CommandSlot>,
    initialized: bool,
    epoch_s: Option<u64>,
    epoch_at_ms: u64,
    message_ttl_s: u32,
    dev_mode: bool,
}

impl<S: SerialLink, D: DiagnosticSink> TileLink<S, D> {
    /// Create an unconfigured link.
    ///
    /// `message_ttl_s` is the store-and-forward hold time stamped on
    /// every outbound telemetry envelope. `dev_mode` flushes the
    /// modem's queued backlog during bring-up.
    pub fn new(serial: S, sink: D, message_ttl_s: u32, dev_mode: bool) -> Self {
        Self {
            serial,
            sink,
            inbound: LineStack::new(),
            outbound: None,
            pending: None,
            initialized: false,
            epoch_s: None,
            epoch_at_ms: 0,
            message_ttl_s,
            dev_mode,
        }
    }

    /// Blocking bring-up: reset, configure, wait for the first time fix.
    ///
    /// Does not return until the modem has booted and broadcast a valid
    /// datetime. Rate configuration is best-effort; a missed ack there
    /// costs nothing but a less chatty modem.
    pub fn begin<C: Monotonic>(&mut self, clock: &C) {
        self.send_framed(RESET_COMMAND);
        let mut next_reset = clock.now_ms() + BOOT_RETRY_MS;

        let mut buf = [0u8; MAX_LINE_LEN];
        loop {
            if let Some(len) = self.read_line(&mut buf) {
                let line = &buf[..len];
                self.sink.show(line);
                if frame::find(line, BOOT_MARKER).is_some() {
                    self.initialized = true;
                    break;
                }
            }
            if clock.now_ms() >= next_reset {
                self.send_framed(RESET_COMMAND);
                next_reset = clock.now_ms() + BOOT_RETRY_MS;
            }
        }

        if self.dev_mode {
            self.send_and_await(clock, QUEUE_FLUSH_COMMAND);
        }
        for cmd in RATE_COMMANDS {
            self.send_and_await(clock, cmd);
        }

        // Hold here until the first broadcast lands; nothing downstream
        // can stamp a report without wall-clock time.
        loop {
            let Some(len) = self.read_line(&mut buf) else {
                continue;
            };
            let line = &buf[..len];
            self.sink.show(line);
            if !frame::validate_line(line) {
                continue;
            }
            if let Some(parts) = tile::parse_time_broadcast(line) {
                self.epoch_s = Some(parts.epoch_seconds());
                self.epoch_at_ms = clock.now_ms();
                break;
            }
        }
    }

    /// Advance the link by at most one inbound line and one send.
    pub fn tick(&mut self, now_ms: u64) {
        // Pull in what the modem sent, stopping after one new line so a
        // chatty modem cannot monopolize the tick.
        while let Some(byte) = self.serial.poll_byte() {
            let end_of_line = byte == b'\n';
            self.inbound.ingest(byte);
            if end_of_line {
                break;
            }
        }

        let mut raw = [0u8; MAX_LINE_LEN];
        let len = self.inbound.pop(&mut raw);
        if len > 0 {
            let line = &raw[..len];
            if !frame::validate_line(line) {
                self.sink.show(b"tile: bad checksum");
                return;
            }
            self.sink.show(line);
            self.on_line(line, now_ms);
        }

        // Send once the link is free.
        if self.pending.is_none() {
            if let Some(cmd) = self.outbound.take() {
                self.serial.write(&cmd.frame);
                self.pending = Some(CommandSlot {
                    expect: cmd.expect,
                    deadline_ms: now_ms + u64::from(cmd.block_ms),
                });
            }
        }

        // Give up on a reply that never came.
        if let Some(slot) = &self.pending {
            if now_ms > slot.deadline_ms {
                self.sink.show(b"tile: reply timed out");
                self.pending = None;
            }
        }
    }

    /// Frame `cmd` and queue it for the next free tick.
    ///
    /// A reply counts once its first three bytes equal `expect`. Returns
    /// `false` while another command is queued or awaiting its reply; the
    /// link handles exactly one command at a time.
    pub fn issue_command(&mut self, cmd: &[u8], expect: [u8; 3], block_ms: u32) -> bool {
        if self.pending.is_some() || self.outbound.is_some() {
            return false;
        }
        let Ok(framed) = frame::frame_command(cmd) else {
            return false;
        };
        self.sink.show(cmd);
        self.outbound = Some(QueuedCommand {
            frame: framed,
            expect,
            block_ms,
        });
        true
    }

    /// Queue one telemetry payload for store-and-forward delivery.
    ///
    /// The payload is hex-armored into the telemetry envelope with this
    /// link's hold time. Returns `false` when the payload is oversized
    /// or the link is busy; the caller retries on a later round.
    pub fn enqueue_message(&mut self, payload: &[u8]) -> bool {
        let Ok(envelope) = tile::telemetry_envelope(payload, self.message_ttl_s) else {
            return false;
        };
        let Some(expect) = tile::reply_prefix(&envelope) else {
            return false;
        };
        self.issue_command(&envelope, expect, STEADY_BLOCK_MS)
    }

    /// Wall-clock seconds, extrapolated from the last time fix.
    ///
    /// `None` until a fix arrives, and again once the fix is older than
    /// [`TIME_STALE_MS`].
    pub fn epoch_seconds(&self, now_ms: u64) -> Option<u64> {
        let epoch = self.epoch_s?;
        let age_ms = now_ms.saturating_sub(self.epoch_at_ms);
        if age_ms > TIME_STALE_MS {
            return None;
        }
        Some(epoch + age_ms / 1_000)
    }

    /// Whether the boot banner has been seen.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a command is queued or awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.outbound.is_some()
    }

    fn on_line(&mut self, line: &[u8], now_ms: u64) {
        if let Some(parts) = tile::parse_time_broadcast(line) {
            self.epoch_s = Some(parts.epoch_seconds());
            self.epoch_at_ms = now_ms;
        }

        if let Some(slot) = &self.pending {
            if line.len() >= 3 && line[..3] == slot.expect {
                self.pending = None;
            }
        }

        if frame::find(line, BOOT_MARKER).is_some() {
            self.initialized = true;
        }
    }

    /// Best-effort command during bring-up: send, then wait one reply
    /// window for the matching ack.
    fn send_and_await<C: Monotonic>(&mut self, clock: &C, cmd: &[u8]) -> bool {
        let Some(expect) = tile::reply_prefix(cmd) else {
            return false;
        };
        self.send_framed(cmd);

        let deadline = clock.now_ms() + u64::from(STEADY_BLOCK_MS);
        let mut buf = [0u8; MAX_LINE_LEN];
        while clock.now_ms() < deadline {
            let Some(len) = self.read_line(&mut buf) else {
                continue;
            };
            let line = &buf[..len];
            self.sink.show(line);
            if line.starts_with(&expect) && frame::find(line, ACK_SUFFIX).is_some() {
                return true;
            }
        }
        false
    }

    fn send_framed(&mut self, cmd: &[u8]) {
        if let Ok(framed) = frame::frame_command(cmd) {
            self.serial.write(&framed);
            self.sink.show(cmd);
        }
    }

    fn read_line(&mut self, buf: &mut [u8]) -> Option<usize> {
        while let Some(byte) = self.serial.poll_byte() {
            let end_of_line = byte == b'\n';
            self.inbound.ingest(byte);
            if end_of_line {
                break;
            }
        }
        match self.inbound.pop(buf) {
            0 => None,
            len => Some(len),
        }
    }
}
