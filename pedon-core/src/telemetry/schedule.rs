//! Measurement scheduling.

/// Next interval-aligned instant strictly after `epoch_s`.
///
/// Alignment is absolute, anchored at the Unix epoch: with a 3600 s
/// interval wakeups land on the hour no matter when the node booted, so
/// a fleet with the same interval reports in the same windows.
pub fn next_scheduled(epoch_s: u64, interval_s: u32) -> u64 {
    let interval = u64::from(interval_s.max(1));
    (epoch_s / interval + 1) * interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_boundary_schedules_next_slot() {
        assert_eq!(next_scheduled(1_705_320_000, 3_600), 1_705_323_600);
    }

    #[test]
    fn test_mid_interval_rounds_up() {
        assert_eq!(next_scheduled(1_705_320_001, 3_600), 1_705_323_600);
        assert_eq!(next_scheduled(1_705_319_999, 3_600), 1_705_320_000);
    }

    #[test]
    fn test_minute_interval_aligns_to_minutes() {
        assert_eq!(next_scheduled(1_705_320_030, 60), 1_705_320_060);
    }

    #[test]
    fn test_zero_interval_still_advances() {
        assert_eq!(next_scheduled(100, 0), 101);
    }
}
