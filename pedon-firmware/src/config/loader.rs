//! Node state persistence
//!
//! Binary postcard records behind the `FlashStorage` trait: the node
//! configuration and the telemetry report counter.

use defmt::*;

use pedon_core::config::CONFIG_VERSION;
use pedon_core::NodeConfig;
use pedon_hal_rp2040::flash::{FlashError, FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use pedon_hal_rp2040::FlashStorageTrait;

/// Maximum serialized config size
const MAX_CONFIG_SIZE: usize = 256;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization for storage failed
    Serialize,
    /// Config version mismatch
    VersionMismatch,
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

/// Flash-backed store for node configuration and counters
pub struct ConfigStore<'d> {
    storage: FlashStorage<'d>,
}

impl<'d> ConfigStore<'d> {
    /// Create a new config store
    pub fn new(storage: FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load the node configuration, or defaults when flash holds none
    ///
    /// A fresh board gets the default record written back, so later boots
    /// read it from flash. Out-of-range fields are sanitized either way.
    pub async fn load_or_default(&mut self) -> NodeConfig {
        let mut config = match self.load().await {
            Ok(config) => {
                info!("loaded configuration from flash");
                config
            }
            Err(ConfigError::Flash(FlashError::NotFound)) => {
                info!("no configuration in flash, provisioning defaults");
                let defaults = NodeConfig::default();
                if let Err(e) = self.save(&defaults).await {
                    warn!("failed to provision default config: {:?}", e);
                }
                defaults
            }
            Err(e) => {
                warn!("failed to load configuration: {:?}, using defaults", e);
                NodeConfig::default()
            }
        };
        config.sanitize();
        config
    }

    /// Load and decode the persisted configuration
    async fn load(&mut self) -> Result<NodeConfig, ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self
            .storage
            .read(StorageKey::NodeConfig, &mut buffer)
            .await?;

        debug!("read {} bytes of config from flash", len);

        let config: NodeConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            warn!(
                "config version mismatch: found {}, expected {}",
                config.version, CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        log_config_summary(&config);
        Ok(config)
    }

    /// Persist the node configuration
    pub async fn save(&mut self, config: &NodeConfig) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let used =
            postcard::to_slice(config, &mut buffer).map_err(|_| ConfigError::Serialize)?;
        self.storage.write(StorageKey::NodeConfig, used).await?;
        debug!("wrote {} bytes of config to flash", used.len());
        Ok(())
    }

    /// Load the telemetry report counter, starting at zero on first boot
    pub async fn load_report_index(&mut self) -> u32 {
        let mut buffer = [0u8; 8];
        match self
            .storage
            .read(StorageKey::ReportIndex, &mut buffer)
            .await
        {
            Ok(len) => postcard::from_bytes(&buffer[..len]).unwrap_or(0),
            Err(FlashError::NotFound) => 0,
            Err(e) => {
                warn!("failed to load report index: {:?}", e);
                0
            }
        }
    }

    /// Persist the telemetry report counter
    pub async fn save_report_index(&mut self, index: u32) {
        let mut buffer = [0u8; 8];
        match postcard::to_slice(&index, &mut buffer) {
            Ok(used) => {
                if let Err(e) = self.storage.write(StorageKey::ReportIndex, used).await {
                    warn!("failed to persist report index: {:?}", e);
                }
            }
            Err(_) => warn!("report index serialization failed"),
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &NodeConfig) {
    info!("configuration loaded");
    debug!("  interval: {} s", config.interval_s);
    debug!("  {} sdi-12 sensors", config.sdi12_addresses.len());
    debug!("  dev mode: {}", config.dev_mode);
    debug!("  message ttl: {} s", config.message_ttl_s);
}
