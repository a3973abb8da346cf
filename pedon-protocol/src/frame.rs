//! NMEA-style framing for the tile link.
//!
//! Outbound commands are wrapped as `<cmd>*<2-hex-checksum>\n`; inbound
//! lines are validated against the same checksum before any parsing. The
//! checksum is the XOR of every byte, skipping one leading `$` marker.

use heapless::Vec;

/// Longest unframed command this codec will frame.
///
/// Sized for the telemetry envelope: prefix, hold time, and a hex-doubled
/// 192-byte payload.
pub const MAX_COMMAND_LEN: usize = 512;

/// Longest framed command: command plus `*`, two hex digits and `\n`.
pub const MAX_FRAME_LEN: usize = MAX_COMMAND_LEN + 4;

/// Errors from command framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Command exceeds [`MAX_COMMAND_LEN`].
    CommandTooLong,
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// XOR checksum over `bytes`, skipping one leading `$` marker.
pub fn checksum(bytes: &[u8]) -> u8 {
    let body = match bytes.first() {
        Some(b'$') => &bytes[1..],
        _ => bytes,
    };
    body.iter().fold(0, |acc, &b| acc ^ b)
}

/// Frame `cmd` for the wire: `cmd ++ '*' ++ hex(checksum) ++ '\n'`.
pub fn frame_command(cmd: &[u8]) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    if cmd.len() > MAX_COMMAND_LEN {
        return Err(FrameError::CommandTooLong);
    }
    let cs = checksum(cmd);

    let mut frame = Vec::new();
    // Infallible: MAX_FRAME_LEN leaves room for the four trailer bytes.
    let _ = frame.extend_from_slice(cmd);
    let _ = frame.push(b'*');
    let _ = frame.push(HEX_DIGITS[usize::from(cs >> 4)]);
    let _ = frame.push(HEX_DIGITS[usize::from(cs & 0x0f)]);
    let _ = frame.push(b'\n');
    Ok(frame)
}

/// Hex-encode `src` into `dst`, two lowercase digits per byte.
///
/// Encodes as many whole bytes as `dst` can hold; returns the number of
/// bytes written to `dst` (always even).
pub fn hex_encode(src: &[u8], dst: &mut [u8]) -> usize {
    let mut written = 0;
    for &byte in src {
        if written + 2 > dst.len() {
            break;
        }
        dst[written] = HEX_DIGITS[usize::from(byte >> 4)];
        dst[written + 1] = HEX_DIGITS[usize::from(byte & 0x0f)];
        written += 2;
    }
    written
}

/// First occurrence of `needle` in `haystack`.
///
/// An empty needle is "not found", never a match.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Validate an inbound line against its trailing checksum.
///
/// The line must start with `$` and carry two hex digits after its last
/// `*`; they must equal the checksum of everything before that `*`. Hex
/// digits are accepted in either case.
pub fn validate_line(line: &[u8]) -> bool {
    if line.first() != Some(&b'$') {
        return false;
    }
    let star = match line.iter().rposition(|&b| b == b'*') {
        Some(star) => star,
        None => return false,
    };
    if line.len() < star + 3 {
        return false;
    }
    match (hex_value(line[star + 1]), hex_value(line[star + 2])) {
        (Some(hi), Some(lo)) => (hi << 4 | lo) == checksum(&line[..star]),
        _ => false,
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
