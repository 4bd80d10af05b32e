//! Tick driver: turns wall-clock samples into second/minute/hour boundaries.

use terrarium_domain::time::{self, Timestamp};

/// Which boundaries were crossed since the previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    pub second: bool,
    pub minute: bool,
    /// Hour boundaries crossed, more than one after a stall.
    pub hours: u32,
}

/// Remembers the last second seen and nothing else.
#[derive(Debug, Clone)]
pub struct TickDriver {
    last_second: i64,
}

impl TickDriver {
    /// A driver that reports no boundary for the second `now` falls in.
    #[must_use]
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            last_second: time::epoch_seconds(now),
        }
    }

    /// Compare `now` with the last sample.
    pub fn observe(&mut self, now: Timestamp) -> Tick {
        let second = time::epoch_seconds(now);
        if second == self.last_second {
            return Tick::default();
        }
        let previous = std::mem::replace(&mut self.last_second, second);
        let hours = second.div_euclid(3600) - previous.div_euclid(3600);
        Tick {
            second: true,
            minute: second.div_euclid(60) != previous.div_euclid(60),
            hours: u32::try_from(hours).unwrap_or(0),
        }
    }
}
