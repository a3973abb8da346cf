//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod battery;
pub mod controller;
pub mod sdi12;
pub mod tile;

pub use battery::battery_task;
pub use controller::controller_task;
pub use sdi12::sdi12_task;
pub use tile::tile_task;
