//! Tile modem wire format.
//!
//! The tile speaks NMEA-style sentences (framed and validated by
//! [`crate::frame`]). This module knows the node-side vocabulary: the
//! reset/configuration command set, the acknowledge convention, the
//! store-and-forward telemetry envelope, and the unsolicited `$DT` time
//! broadcast.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::frame::{self, FrameError, MAX_COMMAND_LEN};

/// Soft reset; the tile answers with a boot banner.
pub const RESET_COMMAND: &[u8] = b"$RS";

/// Substring of the banner line that marks the tile as up.
pub const BOOT_MARKER: &[u8] = b"BOOT,RUNNING";

/// Drop all queued-but-unsent messages on the tile (bench configurations
/// that would otherwise burn airtime replaying a backlog).
pub const QUEUE_FLUSH_COMMAND: &[u8] = b"$MT D=U";

/// Unsolicited-broadcast rates: datetime every 20 s; background noise, GPS
/// position and GPS status every 60 s.
pub const RATE_COMMANDS: [&[u8]; 4] = [b"$DT 20", b"$RT 60", b"$GN 60", b"$GS 60"];

/// Prefix of the unsolicited datetime broadcast.
pub const TIME_PREFIX: &[u8] = b"$DT ";

/// A command is acknowledged by its first three bytes plus this suffix.
pub const ACK_SUFFIX: &[u8] = b" OK";

/// Longest payload accepted into the telemetry envelope.
pub const MAX_MESSAGE_LEN: usize = 192;

const TELEMETRY_PREFIX: &[u8] = b"$TD HD=";

// $DT YYYYMMDDHHMMSS,V*xx - fixed offsets from the line start.
const TIME_DIGITS_AT: usize = 4;
const FIX_MARKER_AT: usize = 18;
const FIX_MARKER: &[u8] = b",V*";

/// Correlation key for a command: its first three bytes.
pub fn reply_prefix(cmd: &[u8]) -> Option<[u8; 3]> {
    match cmd {
        [a, b, c, ..] => Some([*a, *b, *c]),
        _ => None,
    }
}

/// Wrap `payload` for store-and-forward: `$TD HD=<hold seconds>,<hex>`.
///
/// The payload is hex-encoded so binary content survives the ASCII command
/// channel. Fails when `payload` exceeds [`MAX_MESSAGE_LEN`].
pub fn telemetry_envelope(
    payload: &[u8],
    hold_s: u32,
) -> Result<Vec<u8, MAX_COMMAND_LEN>, FrameError> {
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(FrameError::CommandTooLong);
    }

    let mut hold: String<10> = String::new();
    let _ = write!(hold, "{}", hold_s);

    let mut hex = [0u8; MAX_MESSAGE_LEN * 2];
    let encoded = frame::hex_encode(payload, &mut hex);

    let mut cmd = Vec::new();
    // Infallible: prefix + hold digits + ',' + doubled payload fits
    // MAX_COMMAND_LEN for any payload within MAX_MESSAGE_LEN.
    let _ = cmd.extend_from_slice(TELEMETRY_PREFIX);
    let _ = cmd.extend_from_slice(hold.as_bytes());
    let _ = cmd.push(b',');
    let _ = cmd.extend_from_slice(&hex[..encoded]);
    Ok(cmd)
}

/// A calendar timestamp from the `$DT` broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeParts {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeParts {
    /// Field ranges the tile guarantees for a valid fix. Seconds run to 61
    /// to admit leap seconds.
    pub fn is_valid(&self) -> bool {
        (2019..=2037).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 61
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> u64 {
        let days = days_from_civil(
            u64::from(self.year),
            u64::from(self.month),
            u64::from(self.day),
        );
        days * 86_400
            + u64::from(self.hour) * 3_600
            + u64::from(self.minute) * 60
            + u64::from(self.second)
    }
}

/// Parse an unsolicited datetime broadcast.
///
/// `line` is a popped, checksum-validated line. Returns `None` unless the
/// prefix, the 14 fixed-width digit fields and the `,V` valid-fix marker
/// are all present and every field is in range. A tile without a GPS fix
/// broadcasts `,I` instead and is ignored.
pub fn parse_time_broadcast(line: &[u8]) -> Option<TimeParts> {
    if !line.starts_with(TIME_PREFIX) {
        return None;
    }
    if line.len() < FIX_MARKER_AT + FIX_MARKER.len() {
        return None;
    }
    if &line[FIX_MARKER_AT..FIX_MARKER_AT + FIX_MARKER.len()] != FIX_MARKER {
        return None;
    }

    let digits = &line[TIME_DIGITS_AT..FIX_MARKER_AT];
    let parts = TimeParts {
        year: parse_digits(&digits[0..4])? as u16,
        month: parse_digits(&digits[4..6])? as u8,
        day: parse_digits(&digits[6..8])? as u8,
        hour: parse_digits(&digits[8..10])? as u8,
        minute: parse_digits(&digits[10..12])? as u8,
        second: parse_digits(&digits[12..14])? as u8,
    };
    parts.is_valid().then_some(parts)
}

/// Days between 1970-01-01 and the given Gregorian date.
///
/// Defined for dates from 1970 on; broadcast validation keeps inputs well
/// inside that.
fn days_from_civil(year: u64, month: u64, day: u64) -> u64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_prefix() {
        assert_eq!(reply_prefix(b"$RS"), Some(*b"$RS"));
        assert_eq!(reply_prefix(b"$TD HD=60,00"), Some(*b"$TD"));
        assert_eq!(reply_prefix(b"$X"), None);
    }

    #[test]
    fn test_telemetry_envelope() {
        let cmd = telemetry_envelope(b"\x01\xab", 86_400).unwrap();
        assert_eq!(&cmd[..], b"$TD HD=86400,01ab");

        let cmd = telemetry_envelope(b"hi", 60).unwrap();
        assert_eq!(&cmd[..], b"$TD HD=60,6869");
    }

    #[test]
    fn test_telemetry_envelope_rejects_oversize() {
        let payload = [0u8; MAX_MESSAGE_LEN + 1];
        assert_eq!(
            telemetry_envelope(&payload, 60),
            Err(FrameError::CommandTooLong)
        );
    }

    #[test]
    fn test_telemetry_envelope_frames_within_bounds() {
        // A maximum-size payload must still frame without overflow.
        let payload = [0xa5u8; MAX_MESSAGE_LEN];
        let cmd = telemetry_envelope(&payload, u32::MAX).unwrap();
        assert!(frame::frame_command(&cmd).is_ok());
    }

    #[test]
    fn test_parse_time_broadcast_golden() {
        let parts = parse_time_broadcast(b"$DT 20240115120000,V*48").unwrap();
        assert_eq!(
            parts,
            TimeParts {
                year: 2024,
                month: 1,
                day: 15,
                hour: 12,
                minute: 0,
                second: 0,
            }
        );
        assert_eq!(parts.epoch_seconds(), 1_705_320_000);
    }

    #[test]
    fn test_parse_time_rejects_invalid_fix() {
        assert!(parse_time_broadcast(b"$DT 20240115120000,I*57").is_none());
    }

    #[test]
    fn test_parse_time_rejects_malformed() {
        // An acknowledge, not a broadcast.
        assert!(parse_time_broadcast(b"$DT OK").is_none());
        // Truncated digit block.
        assert!(parse_time_broadcast(b"$DT 2024011512000").is_none());
        // Non-digit inside a field.
        assert!(parse_time_broadcast(b"$DT 2024x115120000,V*48").is_none());
        // Wrong sentence entirely.
        assert!(parse_time_broadcast(b"$GN 123,456*00").is_none());
    }

    #[test]
    fn test_parse_time_rejects_out_of_range_fields() {
        assert!(parse_time_broadcast(b"$DT 20181231235959,V*41").is_none());
        assert!(parse_time_broadcast(b"$DT 20240015120000,V*49").is_none());
        assert!(parse_time_broadcast(b"$DT 20241315120000,V*4b").is_none());
    }

    #[test]
    fn test_time_validity_boundaries() {
        let base = TimeParts {
            year: 2024,
            month: 6,
            day: 15,
            hour: 12,
            minute: 30,
            second: 30,
        };
        assert!(base.is_valid());

        assert!(!TimeParts { year: 2018, ..base }.is_valid());
        assert!(TimeParts { year: 2019, ..base }.is_valid());
        assert!(TimeParts { year: 2037, ..base }.is_valid());
        assert!(!TimeParts { year: 2038, ..base }.is_valid());

        assert!(!TimeParts { month: 0, ..base }.is_valid());
        assert!(TimeParts { month: 1, ..base }.is_valid());
        assert!(TimeParts { month: 12, ..base }.is_valid());
        assert!(!TimeParts { month: 13, ..base }.is_valid());

        assert!(!TimeParts { day: 0, ..base }.is_valid());
        assert!(!TimeParts { day: 32, ..base }.is_valid());
        assert!(!TimeParts { hour: 24, ..base }.is_valid());
        assert!(!TimeParts { minute: 60, ..base }.is_valid());
        assert!(TimeParts { second: 61, ..base }.is_valid());
        assert!(!TimeParts { second: 62, ..base }.is_valid());
    }

    #[test]
    fn test_epoch_at_2019_start() {
        let parts = TimeParts {
            year: 2019,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert_eq!(parts.epoch_seconds(), 1_546_300_800);
    }

    #[test]
    fn test_epoch_across_leap_day() {
        // 2024 is a leap year; March 1st must account for Feb 29th.
        let feb29 = TimeParts {
            year: 2024,
            month: 2,
            day: 29,
            hour: 0,
            minute: 0,
            second: 0,
        };
        let mar1 = TimeParts {
            year: 2024,
            month: 3,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert_eq!(mar1.epoch_seconds() - feb29.epoch_seconds(), 86_400);
    }
}
