//! Telemetry record formatting and measurement scheduling.

mod report;
mod schedule;

pub use report::{ChannelPayload, Report, MAX_CHANNELS, MAX_REPORT_LEN};
pub use schedule::next_scheduled;
