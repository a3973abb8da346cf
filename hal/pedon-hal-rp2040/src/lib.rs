//! RP2040-specific HAL for the pedon field sensor node
//!
//! This crate provides RP2040 implementations of the shared `pedon-hal`
//! storage trait and the `pedon-core` capabilities the protocol engines
//! are written against:
//!
//! - Buffered-UART `SerialLink` adapters for the tile modem (115200 8N1)
//!   and the SDI-12 bus (1200 7E1, break + direction gating)
//! - Flash key-value storage (implements `pedon_hal::FlashStorage`)
//! - Millisecond uptime clock (implements `pedon_core::Monotonic`)

#![no_std]

pub mod clock;
pub mod flash;
pub mod uart;

// Re-export shared traits from pedon-hal for convenience
pub use pedon_hal::{FlashStorage as FlashStorageTrait, StorageKey};
