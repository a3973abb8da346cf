//! Node configuration types.
//!
//! The configuration is persisted in flash as postcard-encoded binary
//! and rebuilt from defaults whenever the stored copy is missing or
//! unreadable. Values read back from flash always pass through
//! [`NodeConfig::sanitize`] before use.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Config layout version, bumped on incompatible changes.
pub const CONFIG_VERSION: u8 = 1;

/// Maximum number of SDI-12 sensors a node polls per round.
pub const MAX_SDI12_SENSORS: usize = 8;

/// Shortest accepted measurement interval, seconds.
pub const MIN_INTERVAL_S: u32 = 60;

/// Longest accepted measurement interval, seconds (one day).
pub const MAX_INTERVAL_S: u32 = 86_400;

/// Fallback measurement interval, seconds (one hour).
pub const DEFAULT_INTERVAL_S: u32 = 3_600;

/// Default store-and-forward hold time for queued telemetry, seconds.
pub const DEFAULT_MESSAGE_TTL_S: u32 = 86_400;

/// Persisted node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Layout version of this struct as stored.
    pub version: u8,
    /// Seconds between measurement rounds.
    pub interval_s: u32,
    /// ASCII addresses of the SDI-12 sensors to poll, in poll order.
    pub sdi12_addresses: Vec<u8, MAX_SDI12_SENSORS>,
    /// Bench mode: flush the modem's queued messages at startup.
    pub dev_mode: bool,
    /// Hold time the modem keeps an undelivered message alive, seconds.
    pub message_ttl_s: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut sdi12_addresses = Vec::new();
        // Infallible: capacity is MAX_SDI12_SENSORS.
        let _ = sdi12_addresses.push(b'0');
        Self {
            version: CONFIG_VERSION,
            interval_s: DEFAULT_INTERVAL_S,
            sdi12_addresses,
            dev_mode: false,
            message_ttl_s: DEFAULT_MESSAGE_TTL_S,
        }
    }
}

impl NodeConfig {
    /// Pull out-of-range values back to their defaults.
    ///
    /// An interval outside one minute to one day reverts to hourly
    /// rather than wedging the schedule. A zero TTL would tell the
    /// modem to drop messages immediately, so it reverts too.
    pub fn sanitize(&mut self) {
        if !Self::interval_in_range(self.interval_s) {
            self.interval_s = DEFAULT_INTERVAL_S;
        }
        if self.message_ttl_s == 0 {
            self.message_ttl_s = DEFAULT_MESSAGE_TTL_S;
        }
    }

    /// True when `interval_s` lies in the accepted range.
    pub fn interval_in_range(interval_s: u32) -> bool {
        (MIN_INTERVAL_S..=MAX_INTERVAL_S).contains(&interval_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config_is_already_sane() {
        let mut config = NodeConfig::default();
        let before = config.clone();
        config.sanitize();
        assert_eq!(config, before);
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.interval_s, DEFAULT_INTERVAL_S);
        assert_eq!(config.sdi12_addresses.as_slice(), b"0");
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_sanitize_clamps_interval_to_default() {
        for bad in [0, 59, MAX_INTERVAL_S + 1, u32::MAX] {
            let mut config = NodeConfig {
                interval_s: bad,
                ..NodeConfig::default()
            };
            config.sanitize();
            assert_eq!(config.interval_s, DEFAULT_INTERVAL_S, "interval {bad}");
        }
    }

    #[test]
    fn test_sanitize_keeps_interval_bounds() {
        for good in [MIN_INTERVAL_S, 600, DEFAULT_INTERVAL_S, MAX_INTERVAL_S] {
            let mut config = NodeConfig {
                interval_s: good,
                ..NodeConfig::default()
            };
            config.sanitize();
            assert_eq!(config.interval_s, good, "interval {good}");
        }
    }

    #[test]
    fn test_sanitize_restores_zero_ttl() {
        let mut config = NodeConfig {
            message_ttl_s: 0,
            ..NodeConfig::default()
        };
        config.sanitize();
        assert_eq!(config.message_ttl_s, DEFAULT_MESSAGE_TTL_S);
    }

    #[test]
    fn test_interval_range_check() {
        assert!(!NodeConfig::interval_in_range(59));
        assert!(NodeConfig::interval_in_range(60));
        assert!(NodeConfig::interval_in_range(86_400));
        assert!(!NodeConfig::interval_in_range(86_401));
    }

    proptest! {
        /// Whatever flash hands back, the sanitized interval lands in the
        /// accepted range and the TTL stays nonzero. Values already in
        /// range pass through untouched.
        #[test]
        fn prop_sanitize_lands_in_range(
            interval_s in any::<u32>(),
            message_ttl_s in any::<u32>(),
        ) {
            let mut config = NodeConfig {
                interval_s,
                message_ttl_s,
                ..NodeConfig::default()
            };
            config.sanitize();
            prop_assert!(NodeConfig::interval_in_range(config.interval_s));
            prop_assert_ne!(config.message_ttl_s, 0);

            if NodeConfig::interval_in_range(interval_s) {
                prop_assert_eq!(config.interval_s, interval_s);
            }
            if message_ttl_s != 0 {
                prop_assert_eq!(config.message_ttl_s, message_ttl_s);
            }
        }
    }
}
