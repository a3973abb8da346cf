//! Field report encoding.
//!
//! A report is one ASCII telemetry record: sequence index, epoch
//! timestamp, battery voltage, an optional two-letter kind code and up
//! to five channel payloads. The encoded form is what travels to the
//! tile modem inside the telemetry envelope:
//!
//! ```text
//! iiiiii,tttttttttt,v.vv[,KK[,ch,payload]...]
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

/// Hard cap on an encoded report; matches the tile envelope's payload cap.
pub const MAX_REPORT_LEN: usize = pedon_protocol::tile::MAX_MESSAGE_LEN;

/// Channel payloads carried per report.
pub const MAX_CHANNELS: usize = 5;

/// One channel payload: a measurement blob tagged with the bus channel
/// it came from. Channel 0 means "unused" and is skipped on encode.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPayload<'a> {
    pub channel: u8,
    pub payload: &'a [u8],
}

/// A telemetry record ready to encode.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report<'a> {
    /// Sequence index, rendered zero-padded to six digits.
    pub index: u32,
    /// Seconds since the Unix epoch, rendered zero-padded to ten digits.
    pub epoch_s: u64,
    /// Battery voltage in millivolts, rendered as volts with two decimals.
    pub battery_mv: u16,
    /// Optional two-letter record kind, e.g. `b"SM"` for soil moisture.
    pub kind: Option<[u8; 2]>,
    /// Channel payloads; at most [`MAX_CHANNELS`] are encoded.
    pub channels: &'a [ChannelPayload<'a>],
}

impl Report<'_> {
    /// Encode to the wire form.
    ///
    /// Fields never split mid-way: a field that does not fit inside
    /// [`MAX_REPORT_LEN`] is dropped whole and `..` is appended as a
    /// truncation marker.
    pub fn encode(&self) -> Vec<u8, MAX_REPORT_LEN> {
        let mut out = Vec::new();
        if self.encode_fields(&mut out).is_err() {
            while out.len() > MAX_REPORT_LEN - 2 {
                let _ = out.pop();
            }
            // Infallible: the loop above left room for the marker.
            let _ = out.extend_from_slice(b"..");
        }
        out
    }

    fn encode_fields(&self, out: &mut Vec<u8, MAX_REPORT_LEN>) -> Result<(), ()> {
        // Rounded centivolts keep the two-decimal rendering exact.
        let centivolts = (u32::from(self.battery_mv) + 5) / 10;
        let mut head: String<24> = String::new();
        // Infallible: 6 + 1 + 10 + 1 + 5 digits fit in 24 bytes.
        let _ = write!(
            head,
            "{:06},{:010},{}.{:02}",
            self.index,
            self.epoch_s,
            centivolts / 100,
            centivolts % 100
        );
        append_field(out, &[head.as_bytes()])?;

        if let Some(kind) = self.kind {
            append_field(out, &[b",", &kind])?;
        }

        for chan in self
            .channels
            .iter()
            .filter(|c| c.channel != 0)
            .take(MAX_CHANNELS)
        {
            let mut tag: String<8> = String::new();
            let _ = write!(tag, ",{},", chan.channel);
            append_field(out, &[tag.as_bytes(), chan.payload])?;
        }
        Ok(())
    }
}

/// All-or-nothing append of one logical field.
fn append_field(out: &mut Vec<u8, MAX_REPORT_LEN>, parts: &[&[u8]]) -> Result<(), ()> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    if out.len() + total > MAX_REPORT_LEN {
        return Err(());
    }
    for part in parts {
        let _ = out.extend_from_slice(part);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bare_report_encodes_header_only() {
        let report = Report {
            index: 42,
            epoch_s: 1_705_320_000,
            battery_mv: 3_456,
            ..Report::default()
        };
        assert_eq!(report.encode().as_slice(), b"000042,1705320000,3.46");
    }

    #[test]
    fn test_kind_code_follows_the_header() {
        let report = Report {
            index: 7,
            epoch_s: 1_546_300_800,
            battery_mv: 3_300,
            kind: Some(*b"SM"),
            ..Report::default()
        };
        assert_eq!(report.encode().as_slice(), b"000007,1546300800,3.30,SM");
    }

    #[test]
    fn test_channels_append_in_order() {
        let channels = [
            ChannelPayload {
                channel: 1,
                payload: b"+22.5+0.33",
            },
            ChannelPayload {
                channel: 0,
                payload: b"ignored",
            },
            ChannelPayload {
                channel: 3,
                payload: b"+7.1",
            },
        ];
        let report = Report {
            index: 1,
            epoch_s: 1_705_320_000,
            battery_mv: 3_456,
            kind: Some(*b"SM"),
            channels: &channels,
        };
        assert_eq!(
            report.encode().as_slice(),
            b"000001,1705320000,3.46,SM,1,+22.5+0.33,3,+7.1"
        );
    }

    #[test]
    fn test_voltage_rounds_half_up() {
        let report = Report {
            battery_mv: 3_005,
            ..Report::default()
        };
        // 3.005 V rounds to 3.01, not 3.00.
        assert!(report.encode().ends_with(b",3.01"));

        let report = Report {
            battery_mv: 999,
            ..Report::default()
        };
        assert!(report.encode().ends_with(b",1.00"));
    }

    #[test]
    fn test_index_widens_past_six_digits() {
        let report = Report {
            index: 1_234_567,
            ..Report::default()
        };
        assert!(report.encode().starts_with(b"1234567,"));
    }

    #[test]
    fn test_oversize_payload_dropped_with_marker() {
        let big = [b'x'; MAX_REPORT_LEN];
        let channels = [
            ChannelPayload {
                channel: 1,
                payload: b"+1.0",
            },
            ChannelPayload {
                channel: 2,
                payload: &big,
            },
        ];
        let report = Report {
            index: 9,
            epoch_s: 1_705_320_000,
            battery_mv: 3_456,
            kind: Some(*b"SM"),
            channels: &channels,
        };
        let encoded = report.encode();
        assert!(encoded.len() <= MAX_REPORT_LEN);
        assert!(encoded.ends_with(b".."));
        // The field that fit is still intact.
        assert_eq!(
            encoded.as_slice(),
            b"000009,1705320000,3.46,SM,1,+1.0.."
        );
    }

    #[test]
    fn test_at_most_five_channels_encode() {
        let channels = [
            ChannelPayload {
                channel: 1,
                payload: b"a",
            };
            7
        ];
        let report = Report {
            channels: &channels,
            ..Report::default()
        };
        let encoded = report.encode();
        let commas = encoded.iter().filter(|&&b| b == b',').count();
        // Header holds two commas, each channel adds two more.
        assert_eq!(commas, 2 + 2 * MAX_CHANNELS);
    }

    proptest! {
        /// The fixed-buffer encoder agrees with an unbounded rendering of
        /// the same report whenever everything fits, and otherwise emits a
        /// prefix of it capped at the limit with the `..` marker.
        #[test]
        fn prop_encode_respects_cap(
            index in 0u32..10_000_000,
            epoch_s in 0u64..100_000_000_000,
            battery_mv in 0u16..5_000,
            entries in prop::collection::vec(
                (0u8..8, prop::collection::vec(0x20u8..0x7f, 0..80)),
                0..8,
            ),
        ) {
            let channels: std::vec::Vec<ChannelPayload> = entries
                .iter()
                .map(|(channel, payload)| ChannelPayload {
                    channel: *channel,
                    payload: payload.as_slice(),
                })
                .collect();
            let report = Report {
                index,
                epoch_s,
                battery_mv,
                kind: Some(*b"SM"),
                channels: &channels,
            };
            let encoded = report.encode();
            prop_assert!(encoded.len() <= MAX_REPORT_LEN);

            let centivolts = (u32::from(battery_mv) + 5) / 10;
            let mut full = std::format!(
                "{:06},{:010},{}.{:02},SM",
                index,
                epoch_s,
                centivolts / 100,
                centivolts % 100
            )
            .into_bytes();
            for chan in channels.iter().filter(|c| c.channel != 0).take(MAX_CHANNELS) {
                full.extend_from_slice(std::format!(",{},", chan.channel).as_bytes());
                full.extend_from_slice(chan.payload);
            }

            if full.len() <= MAX_REPORT_LEN {
                prop_assert_eq!(encoded.as_slice(), full.as_slice());
            } else {
                prop_assert!(encoded.ends_with(b".."));
                prop_assert!(full.starts_with(&encoded[..encoded.len() - 2]));
            }
        }
    }
}
