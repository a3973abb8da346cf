//! Persisted node configuration.

mod types;

pub use types::{
    NodeConfig, CONFIG_VERSION, DEFAULT_INTERVAL_S, DEFAULT_MESSAGE_TTL_S, MAX_INTERVAL_S,
    MAX_SDI12_SENSORS, MIN_INTERVAL_S,
};
