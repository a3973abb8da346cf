//! Battery voltage monitor.
//!
//! The node's supply runs through a 2:1 resistor divider into an ADC
//! pin. Readings are smoothed over a short rolling window so a single
//! noisy sample (radio transmit droop, cold-start sag) does not skew
//! the reported voltage.

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Samples kept in the smoothing window.
const WINDOW: usize = 4;

/// Battery monitor on a divided ADC channel.
pub struct BatteryMonitor<ADC> {
    adc: ADC,
    /// ADC reference voltage in mV
    vref_mv: u32,
    /// Divider ratio numerator (battery volts = pin volts * ratio)
    divider_ratio: u32,
    samples: [u16; WINDOW],
    filled: usize,
    next: usize,
}

impl<ADC> BatteryMonitor<ADC> {
    /// Create a new battery monitor.
    ///
    /// # Arguments
    /// - `adc`: ADC channel wired to the divider midpoint
    /// - `vref_mv`: Reference voltage in millivolts (typically 3300)
    /// - `divider_ratio`: Multiplier undoing the divider (2 for 2:1)
    pub fn new(adc: ADC, vref_mv: u32, divider_ratio: u32) -> Self {
        Self {
            adc,
            vref_mv,
            divider_ratio,
            samples: [0; WINDOW],
            filled: 0,
            next: 0,
        }
    }
}

impl<ADC: AdcReader> BatteryMonitor<ADC> {
    /// Take one reading and return the smoothed battery voltage in mV.
    #[allow(clippy::result_unit_err)]
    pub fn sample(&mut self) -> Result<u16, ()> {
        let raw = self.adc.read()?;
        self.samples[self.next] = raw;
        self.next = (self.next + 1) % WINDOW;
        if self.filled < WINDOW {
            self.filled += 1;
        }
        Ok(self.millivolts())
    }

    /// Smoothed battery voltage in mV from the samples taken so far.
    ///
    /// Returns 0 until the first call to [`BatteryMonitor::sample`].
    pub fn millivolts(&self) -> u16 {
        if self.filled == 0 {
            return 0;
        }
        let sum: u32 = self.samples[..self.filled]
            .iter()
            .map(|&s| u32::from(s))
            .sum();
        let mean = sum / self.filled as u32;
        // Full scale of the 12-bit converter is 4095.
        let mv = mean * self.vref_mv * self.divider_ratio / 4095;
        mv as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted ADC for testing
    struct ScriptedAdc {
        readings: &'static [u16],
        at: usize,
    }

    impl AdcReader for ScriptedAdc {
        fn read(&mut self) -> Result<u16, ()> {
            let raw = *self.readings.get(self.at).ok_or(())?;
            self.at += 1;
            Ok(raw)
        }
    }

    #[test]
    fn test_single_sample_converts_with_divider() {
        let adc = ScriptedAdc {
            readings: &[2048],
            at: 0,
        };
        let mut monitor = BatteryMonitor::new(adc, 3300, 2);

        // 2048/4095 of 3.3 V, doubled by the divider ratio: ~3301 mV.
        let mv = monitor.sample().unwrap();
        assert!((3290..=3310).contains(&mv), "got {mv}");
    }

    #[test]
    fn test_window_smooths_spikes() {
        let adc = ScriptedAdc {
            readings: &[2048, 2048, 2048, 4095],
            at: 0,
        };
        let mut monitor = BatteryMonitor::new(adc, 3300, 2);
        for _ in 0..3 {
            monitor.sample().unwrap();
        }
        let before = monitor.millivolts();
        let after = monitor.sample().unwrap();

        // One full-scale spike moves the mean by a quarter, not to the rail.
        assert!(after > before);
        assert!(after < 4500, "got {after}");
    }

    #[test]
    fn test_window_drops_oldest_sample() {
        let adc = ScriptedAdc {
            readings: &[4000, 2000, 2000, 2000, 2000],
            at: 0,
        };
        let mut monitor = BatteryMonitor::new(adc, 3300, 2);
        for _ in 0..5 {
            monitor.sample().unwrap();
        }

        // The initial high reading has rotated out of the window.
        let mv = monitor.millivolts();
        let expected = 2000 * 3300 * 2 / 4095;
        assert_eq!(u32::from(mv), expected);
    }

    #[test]
    fn test_empty_monitor_reads_zero() {
        let adc = ScriptedAdc {
            readings: &[],
            at: 0,
        };
        let monitor = BatteryMonitor::new(adc, 3300, 2);
        assert_eq!(monitor.millivolts(), 0);
    }

    #[test]
    fn test_adc_error_propagates() {
        let adc = ScriptedAdc {
            readings: &[],
            at: 0,
        };
        let mut monitor = BatteryMonitor::new(adc, 3300, 2);
        assert!(monitor.sample().is_err());
    }
}
