//! Repeating refresh timers measured in abstract time units.
use serde::{Deserialize, Serialize};

use crate::config::RefreshConfig;

/// A single repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    interval: u32,
    elapsed: u32,
    active: bool,
}

impl RepeatingTimer {
    /// Zero intervals are treated as one unit.
    #[must_use]
    pub const fn new(interval: u32) -> Self {
        Self {
            interval: if interval == 0 { 1 } else { interval },
            elapsed: 0,
            active: true,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `units` and return how many times the timer fired.
    pub fn advance(&mut self, units: u32) -> u32 {
        if !self.active {
            return 0;
        }
        let total = u64::from(self.elapsed) + u64::from(units);
        let interval = u64::from(self.interval);
        self.elapsed = u32::try_from(total % interval).unwrap_or(0);
        u32::try_from(total / interval).unwrap_or(u32::MAX)
    }

    pub const fn cancel(&mut self) {
        self.active = false;
        self.elapsed = 0;
    }
}

/// How many times each timer fired during one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerFires {
    pub congestion: u32,
    pub trains: u32,
    pub countdown: u32,
}

impl TimerFires {
    #[must_use]
    pub const fn any(&self) -> bool {
        self.congestion > 0 || self.trains > 0 || self.countdown > 0
    }
}

/// The congestion, train and countdown refresh cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTimers {
    congestion: RepeatingTimer,
    trains: RepeatingTimer,
    countdown: RepeatingTimer,
}

impl RefreshTimers {
    #[must_use]
    pub const fn new(cfg: &RefreshConfig) -> Self {
        Self {
            congestion: RepeatingTimer::new(cfg.congestion_interval),
            trains: RepeatingTimer::new(cfg.trains_interval),
            countdown: RepeatingTimer::new(cfg.countdown_interval),
        }
    }

    pub fn advance(&mut self, units: u32) -> TimerFires {
        TimerFires {
            congestion: self.congestion.advance(units),
            trains: self.trains.advance(units),
            countdown: self.countdown.advance(units),
        }
    }

    /// Stop every timer; later advances fire nothing.
    pub const fn cancel(&mut self) {
        self.congestion.cancel();
        self.trains.cancel();
        self.countdown.cancel();
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.congestion.is_active() || self.trains.is_active() || self.countdown.is_active()
    }
}

impl Default for RefreshTimers {
    fn default() -> Self {
        Self::new(&RefreshConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_at_their_own_cadence() {
        let mut timers = RefreshTimers::default();
        let fires = timers.advance(9);
        assert_eq!(fires, TimerFires { congestion: 0, trains: 0, countdown: 9 });
        let fires = timers.advance(1);
        assert_eq!(fires.trains, 1);
        assert_eq!(fires.congestion, 0);
        let fires = timers.advance(50);
        // 60 units total: congestion at 30 and 60, trains at 20..=60.
        assert_eq!(fires.congestion, 2);
        assert_eq!(fires.trains, 5);
        assert_eq!(fires.countdown, 50);
    }

    #[test]
    fn cancel_stops_everything() {
        let mut timers = RefreshTimers::default();
        timers.advance(25);
        timers.cancel();
        assert!(!timers.is_active());
        let fires = timers.advance(300);
        assert!(!fires.any());
    }

    #[test]
    fn zero_interval_fires_every_unit() {
        let mut timer = RepeatingTimer::new(0);
        assert_eq!(timer.interval(), 1);
        assert_eq!(timer.advance(4), 4);
    }
}
