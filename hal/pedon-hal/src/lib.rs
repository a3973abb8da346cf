//! Pedon Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction for the pedon node so
//! the firmware's storage and serial wiring stays independent of the
//! controller board it runs on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pedon-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pedon-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pedon-hal-rp2040                       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`flash::FlashStorage`] - Persistent key-value storage
//! - [`uart`] - Serial port configuration shared by the board crates

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod uart;

// Re-export key items at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use uart::UartConfig;
