//! Device: an actuator wired to one output pin, and its runtime state.
//!
//! The catalog of devices is fixed at startup. Every other configuration
//! object (timers, rule actions, sprayer actions) refers to devices by name,
//! compared case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NotFoundError, ValidationError};

/// Sentinel device name marking an unused action slot.
pub const NO_DEVICE: &str = "no device";

/// Device names with hard-wired coupling rules in the timer engine.
pub const SPRAYER: &str = "sprayer";
pub const MIST: &str = "mist";
pub const FAN_IN: &str = "fan_in";
pub const FAN_OUT: &str = "fan_out";

/// How a logical "on" maps to the output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Output level (`true` = high) that puts the device in the given state.
    #[must_use]
    pub fn level(self, on: bool) -> bool {
        match self {
            Self::ActiveHigh => on,
            Self::ActiveLow => !on,
        }
    }
}

/// A controllable actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "device")]
    pub name: String,
    /// Output identity handed to the pin driver.
    pub pin: u8,
    #[serde(default)]
    pub polarity: Polarity,
    /// Whether remaining-life hours are tracked for this device.
    #[serde(default, rename = "lc_counted")]
    pub has_lifetime: bool,
    /// Number of timer slots reserved for this device.
    #[serde(default = "one")]
    pub nr_of_timers: u8,
}

fn one() -> u8 {
    1
}

impl Device {
    /// Create an active-high device with a single timer slot.
    #[must_use]
    pub fn new(name: impl Into<String>, pin: u8) -> Self {
        Self {
            name: name.into(),
            pin,
            polarity: Polarity::ActiveHigh,
            has_lifetime: false,
            nr_of_timers: 1,
        }
    }

    #[must_use]
    pub fn active_low(mut self) -> Self {
        self.polarity = Polarity::ActiveLow;
        self
    }

    #[must_use]
    pub fn with_lifetime(mut self) -> Self {
        self.has_lifetime = true;
        self
    }

    #[must_use]
    pub fn with_timers(mut self, count: u8) -> Self {
        self.nr_of_timers = count;
        self
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The factory catalog: five lights (the fifth a UV lamp with wear tracking),
/// pump, sprayer, mist and two fans.
#[must_use]
pub fn default_catalog() -> Vec<Device> {
    vec![
        Device::new("light1", 0),
        Device::new("light2", 1),
        Device::new("light3", 2),
        Device::new("light4", 3),
        Device::new("uvlight", 4).with_lifetime(),
        Device::new("pump", 21).active_low().with_timers(3),
        Device::new(SPRAYER, 22).active_low(),
        Device::new(MIST, 23).active_low().with_timers(3),
        Device::new(FAN_IN, 24).active_low().with_timers(3),
        Device::new(FAN_OUT, 25).active_low().with_timers(3),
    ]
}

/// Index of the device called `name` in `catalog`.
///
/// # Errors
///
/// Returns [`NotFoundError`] when no device has that name.
pub fn position(catalog: &[Device], name: &str) -> Result<usize, NotFoundError> {
    catalog
        .iter()
        .position(|d| d.is_named(name))
        .ok_or_else(|| NotFoundError {
            entity: "Device",
            id: name.to_string(),
        })
}

/// Check catalog invariants: non-empty, unique names.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or [`ValidationError::DuplicateDevice`].
pub fn validate_catalog(catalog: &[Device]) -> Result<(), ValidationError> {
    for (i, device) in catalog.iter().enumerate() {
        if device.name.trim().is_empty() || device.is_named(NO_DEVICE) {
            return Err(ValidationError::EmptyName);
        }
        if catalog[..i].iter().any(|d| d.is_named(&device.name)) {
            return Err(ValidationError::DuplicateDevice(device.name.clone()));
        }
    }
    Ok(())
}

/// How long a device stays on.
///
/// Encoded on the wire and in traces as a single integer: `0` off, `-1`
/// endless, `-2` until the ideal temperature is reached, positive values are
/// an absolute epoch-second deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum OnPeriod {
    #[default]
    Off,
    Endless,
    UntilIdeal,
    Until(i64),
}

impl OnPeriod {
    pub const ENDLESS: i64 = -1;
    pub const UNTIL_IDEAL: i64 = -2;

    /// Whether this period means the device is energized.
    #[must_use]
    pub fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Concrete deadline in epoch seconds, if any.
    #[must_use]
    pub fn deadline(self) -> Option<i64> {
        match self {
            Self::Until(at) => Some(at),
            _ => None,
        }
    }

    /// Integer encoding.
    #[must_use]
    pub fn raw(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Endless => Self::ENDLESS,
            Self::UntilIdeal => Self::UNTIL_IDEAL,
            Self::Until(at) => at,
        }
    }
}

impl From<i64> for OnPeriod {
    fn from(raw: i64) -> Self {
        match raw {
            0 => Self::Off,
            Self::UNTIL_IDEAL => Self::UntilIdeal,
            at if at > 0 => Self::Until(at),
            _ => Self::Endless,
        }
    }
}

impl From<OnPeriod> for i64 {
    fn from(value: OnPeriod) -> Self {
        value.raw()
    }
}

/// Mutable runtime state of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceState {
    pub on_period: OnPeriod,
    /// Operator flag, informational only.
    pub manual: bool,
    /// Remaining wear hours, meaningful only for wear-tracked devices.
    pub lifetime: u32,
}

impl DeviceState {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on_period.is_on()
    }
}

/// Whether the thermostatic rules may command a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleAuthority {
    /// No active rule references the device.
    #[default]
    Unclaimed,
    /// A timer or the sprayer sequence currently owns the device.
    Suppressed,
    /// Rules may switch the device.
    Active,
}

impl RuleAuthority {
    /// Integer encoding (`-1`, `0`, `1`).
    #[must_use]
    pub fn raw(self) -> i8 {
        match self {
            Self::Unclaimed => -1,
            Self::Suppressed => 0,
            Self::Active => 1,
        }
    }
}

/// One persisted `device=hours` wear counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleCounter {
    pub device: String,
    pub hours: u32,
}

impl fmt::Display for LifecycleCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.device, self.hours)
    }
}

impl FromStr for LifecycleCounter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ValidationError::Malformed {
            name: "lifecycle",
            shape: "device=hours line",
            reason: reason.to_string(),
        };
        let (device, hours) = s.trim().split_once('=').ok_or_else(|| malformed(s))?;
        let hours = hours.trim().parse().map_err(|_| malformed(s))?;
        Ok(Self {
            device: device.trim().to_string(),
            hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_polarity_to_output_level() {
        assert!(Polarity::ActiveHigh.level(true));
        assert!(!Polarity::ActiveHigh.level(false));
        assert!(!Polarity::ActiveLow.level(true));
        assert!(Polarity::ActiveLow.level(false));
    }

    #[test]
    fn should_provide_ten_devices_with_one_wear_tracked() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 10);
        let tracked: Vec<_> = catalog.iter().filter(|d| d.has_lifetime).collect();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].name, "uvlight");
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn should_find_device_case_insensitively() {
        let catalog = default_catalog();
        assert_eq!(position(&catalog, "Fan_In").unwrap(), 8);
        assert!(position(&catalog, "heater").is_err());
    }

    #[test]
    fn should_reject_duplicate_device_names() {
        let catalog = vec![Device::new("pump", 1), Device::new("PUMP", 2)];
        assert_eq!(
            validate_catalog(&catalog),
            Err(ValidationError::DuplicateDevice("PUMP".to_string()))
        );
    }

    #[test]
    fn should_decode_on_period_sentinels() {
        assert_eq!(OnPeriod::from(0), OnPeriod::Off);
        assert_eq!(OnPeriod::from(-1), OnPeriod::Endless);
        assert_eq!(OnPeriod::from(-2), OnPeriod::UntilIdeal);
        assert_eq!(OnPeriod::from(1_600_000_000), OnPeriod::Until(1_600_000_000));
        assert!(!OnPeriod::Off.is_on());
        assert!(OnPeriod::UntilIdeal.is_on());
        assert_eq!(OnPeriod::Until(42).deadline(), Some(42));
        assert_eq!(OnPeriod::Endless.deadline(), None);
    }

    #[test]
    fn should_encode_rule_authority() {
        assert_eq!(RuleAuthority::default().raw(), -1);
        assert_eq!(RuleAuthority::Suppressed.raw(), 0);
        assert_eq!(RuleAuthority::Active.raw(), 1);
    }

    #[test]
    fn should_parse_lifecycle_line() {
        let counter: LifecycleCounter = "uvlight=4400".parse().unwrap();
        assert_eq!(counter.device, "uvlight");
        assert_eq!(counter.hours, 4400);
        assert_eq!(counter.to_string(), "uvlight=4400");
        assert!("uvlight".parse::<LifecycleCounter>().is_err());
        assert!("uvlight=-3".parse::<LifecycleCounter>().is_err());
    }

    #[test]
    fn should_deserialize_device_with_defaults() {
        let device: Device =
            serde_json::from_value(serde_json::json!({"device": "light1", "pin": 0})).unwrap();
        assert_eq!(device.polarity, Polarity::ActiveHigh);
        assert!(!device.has_lifetime);
        assert_eq!(device.nr_of_timers, 1);
    }
}
