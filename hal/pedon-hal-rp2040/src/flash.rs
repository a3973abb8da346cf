//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! last 64KB of flash, holding the node configuration and the telemetry
//! report counter.
//!
//! Implements the `FlashStorage` trait from `pedon-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from pedon-hal
pub use pedon_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the node board
pub const STATE_PARTITION_SIZE: usize = 64 * 1024; // 64KB for persisted state
pub const STATE_PARTITION_START: usize = FLASH_SIZE - STATE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the state partition
pub const STATE_RANGE: core::ops::Range<u32> =
    (STATE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Largest item the node ever stores. The postcard-encoded config and the
/// report counter are both far below this.
const MAX_ITEM_SIZE: usize = 512;

/// RP2040 Flash storage implementation
///
/// Provides wear-leveled key-value storage for node state.
/// Uses sequential-storage for automatic wear leveling.
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

// Implement the shared FlashStorage trait
impl<'d> pedon_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; MAX_ITEM_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; MAX_ITEM_SIZE];

        map::store_item(
            &mut self.flash,
            STATE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        let mut data_buffer = [0u8; MAX_ITEM_SIZE];

        matches!(
            map::fetch_item::<StorageKey, &[u8], _>(
                &mut self.flash,
                STATE_RANGE,
                &mut NoCache::new(),
                &mut data_buffer,
                &key,
            )
            .await,
            Ok(Some(_))
        )
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        // Erase the state partition sector by sector
        let start = STATE_PARTITION_START as u32;
        let end = FLASH_SIZE as u32;

        self.flash
            .erase(start, end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}

/// Short name used by the firmware crate
pub type FlashStorage<'d> = Rp2040FlashStorage<'d>;
