//! Switched sensor bus power rail.
//!
//! The SDI-12 sensors sit on a power rail behind a high-side switch so
//! they draw nothing between measurement rounds. The controller turns
//! the rail on, waits out the sensors' warm-up time, runs the round and
//! switches back off.

/// Trait for GPIO pin abstraction
pub trait PowerPin {
    /// Set the pin high
    fn set_high(&mut self);

    /// Set the pin low
    fn set_low(&mut self);
}

/// Switched power rail behind a GPIO-driven high-side switch.
pub struct BusPower<P> {
    pin: P,
    /// If true, rail ON = pin LOW
    inverted: bool,
    /// Current logical state (true = rail powered)
    on: bool,
}

impl<P: PowerPin> BusPower<P> {
    /// Create a new rail switch. The rail starts off.
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut rail = Self {
            pin,
            inverted,
            on: false,
        };
        rail.set_on(false);
        rail
    }

    /// Create a rail switch with an active-high enable pin.
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a rail switch with an active-low enable pin.
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Switch the rail.
    pub fn set_on(&mut self, on: bool) {
        self.on = on;
        if on != self.inverted {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }

    /// Whether the rail is currently powered.
    pub fn is_on(&self) -> bool {
        self.on
    }
}
