//! SDI-12 wire format: command formatting and response parsing.
//!
//! Commands are `<address><verb>!` with no checksum; the bus protocol has
//! none. Responses are ASCII lines terminated `\r\n`. A measurement start
//! (`aC!` or `aM!`) is acknowledged with
//! `<address><3-digit wait seconds><2-digit value count>`, after which data
//! pages are polled with `aD0!` .. `aD9!`.

use heapless::Vec;

/// Longest SDI-12 command this node issues (`aD9!` plus slack).
pub const MAX_COMMAND_LEN: usize = 8;

/// Highest retrieval page the protocol allows.
pub const MAX_RETRIEVAL_PAGE: u8 = 9;

/// Measurement start verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasureVerb {
    /// `aC!` - concurrent measurement, the bus stays free while the sensor
    /// works.
    Concurrent,
    /// `aM!` - classic measurement.
    Measure,
}

impl MeasureVerb {
    fn wire(self) -> u8 {
        match self {
            MeasureVerb::Concurrent => b'C',
            MeasureVerb::Measure => b'M',
        }
    }
}

/// `<addr>I!` - request sensor identification.
pub fn identify_command(addr: u8) -> Vec<u8, MAX_COMMAND_LEN> {
    let mut cmd = Vec::new();
    let _ = cmd.push(addr);
    let _ = cmd.push(b'I');
    let _ = cmd.push(b'!');
    cmd
}

/// `<addr><verb>!` - start a measurement.
pub fn measure_command(addr: u8, verb: MeasureVerb) -> Vec<u8, MAX_COMMAND_LEN> {
    let mut cmd = Vec::new();
    let _ = cmd.push(addr);
    let _ = cmd.push(verb.wire());
    let _ = cmd.push(b'!');
    cmd
}

/// `<addr>D<page>!` - retrieve result page `page`.
///
/// The page index is a plain integer everywhere else; it becomes an ASCII
/// digit only here. Pages past [`MAX_RETRIEVAL_PAGE`] are clamped.
pub fn retrieve_command(addr: u8, page: u8) -> Vec<u8, MAX_COMMAND_LEN> {
    let page = page.min(MAX_RETRIEVAL_PAGE);
    let mut cmd = Vec::new();
    let _ = cmd.push(addr);
    let _ = cmd.push(b'D');
    let _ = cmd.push(b'0' + page);
    let _ = cmd.push(b'!');
    cmd
}

/// Acknowledge for a measurement start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasureAck {
    /// Seconds until results are ready.
    pub wait_s: u16,
    /// Number of values the sensor will report.
    pub count: u8,
}

/// Parse `<addr><3-digit seconds><2-digit count>`.
///
/// Returns `None` when the line is too short for the fixed-width fields or
/// a field is not numeric.
pub fn parse_measure_ack(line: &[u8]) -> Option<MeasureAck> {
    if line.len() < 6 {
        return None;
    }
    let wait_s = parse_digits(&line[1..4])? as u16;
    let count = parse_digits(&line[4..6])? as u8;
    Some(MeasureAck { wait_s, count })
}

/// Count value tokens in a data-page payload: one per `+` or `-` sign.
pub fn count_value_tokens(payload: &[u8]) -> usize {
    payload.iter().filter(|&&b| b == b'+' || b == b'-').count()
}

/// Strip one trailing carriage return.
///
/// Responses end `\r\n` and the line stack consumes only the `\n`.
pub fn trim_carriage_return(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((&b'\r', rest)) => rest,
        _ => line,
    }
}

fn parse_digits(bytes: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u32::from(b - b'0');
    }
    Some(value)
}
