//! Satellite modem ("tile") link driver.

mod link;
mod slot;

pub use link::{TileLink, STEADY_BLOCK_MS, TIME_STALE_MS};
