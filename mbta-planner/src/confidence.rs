//! Connection-buffer confidence and the live transfer countdown.
use serde::{Deserialize, Serialize};

use crate::config::WalkSpeedConfig;
use crate::constants::{CONFIDENCE_LIKELY_MIN_BUFFER, CONFIDENCE_RISKY_MIN_BUFFER};
use crate::numbers::floor_f64_to_i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Likely,
    Risky,
    Unlikely,
}

impl ConfidenceLevel {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Likely => "likely",
            Self::Risky => "risky",
            Self::Unlikely => "unlikely",
        }
    }
}

/// Classify a transfer buffer in minutes.
#[must_use]
pub const fn classify(buffer: i32) -> ConfidenceLevel {
    if buffer >= CONFIDENCE_LIKELY_MIN_BUFFER {
        ConfidenceLevel::Likely
    } else if buffer >= CONFIDENCE_RISKY_MIN_BUFFER {
        ConfidenceLevel::Risky
    } else {
        ConfidenceLevel::Unlikely
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WalkSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl WalkSpeed {
    #[must_use]
    pub const fn factor(self, cfg: &WalkSpeedConfig) -> f64 {
        match self {
            Self::Slow => cfg.slow,
            Self::Normal => cfg.normal,
            Self::Fast => cfg.fast,
        }
    }
}

/// Countdown to a connecting departure at a transfer station, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCountdown {
    initial_arrival: u32,
    initial_departure: u32,
    arrival_secs: u32,
    departure_secs: u32,
    walk_secs: u32,
    walk_speed: WalkSpeed,
    walk_cfg: WalkSpeedConfig,
}

impl ConnectionCountdown {
    #[must_use]
    pub fn new(
        arrival_secs: u32,
        departure_secs: u32,
        walk_secs: u32,
        walk_speed: WalkSpeed,
    ) -> Self {
        Self::with_config(
            arrival_secs,
            departure_secs,
            walk_secs,
            walk_speed,
            WalkSpeedConfig::default(),
        )
    }

    #[must_use]
    pub const fn with_config(
        arrival_secs: u32,
        departure_secs: u32,
        walk_secs: u32,
        walk_speed: WalkSpeed,
        walk_cfg: WalkSpeedConfig,
    ) -> Self {
        Self {
            initial_arrival: arrival_secs,
            initial_departure: departure_secs,
            arrival_secs,
            departure_secs,
            walk_secs,
            walk_speed,
            walk_cfg,
        }
    }

    #[must_use]
    pub const fn arrival_secs(&self) -> u32 {
        self.arrival_secs
    }

    #[must_use]
    pub const fn departure_secs(&self) -> u32 {
        self.departure_secs
    }

    #[must_use]
    pub const fn walk_speed(&self) -> WalkSpeed {
        self.walk_speed
    }

    pub const fn set_walk_speed(&mut self, walk_speed: WalkSpeed) {
        self.walk_speed = walk_speed;
    }

    /// Walk time scaled by the rider's pace.
    #[must_use]
    pub fn adjusted_walk_secs(&self) -> f64 {
        f64::from(self.walk_secs) * self.walk_speed.factor(&self.walk_cfg)
    }

    /// Whole minutes of slack after walking, floored; negative when the connection is missed.
    #[must_use]
    pub fn buffer_minutes(&self) -> i32 {
        let slack = f64::from(self.departure_secs)
            - f64::from(self.arrival_secs)
            - self.adjusted_walk_secs();
        floor_f64_to_i32(slack / 60.0)
    }

    #[must_use]
    pub fn confidence(&self) -> ConfidenceLevel {
        classify(self.buffer_minutes())
    }

    /// Share of the remaining departure window left after walking, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.departure_secs == 0 {
            return 0.0;
        }
        let departure = f64::from(self.departure_secs);
        ((departure - self.adjusted_walk_secs()) / departure * 100.0).clamp(0.0, 100.0)
    }

    /// Advance one countdown step; both counters floor at zero.
    pub const fn tick(&mut self) {
        self.tick_by(1);
    }

    /// Run `seconds` ticks at once; both counters saturate at 0.
    pub const fn tick_by(&mut self, seconds: u32) {
        self.arrival_secs = self.arrival_secs.saturating_sub(seconds);
        self.departure_secs = self.departure_secs.saturating_sub(seconds);
    }

    pub const fn reset(&mut self) {
        self.arrival_secs = self.initial_arrival;
        self.departure_secs = self.initial_departure;
    }
}

/// `m:ss` rendering of a second count.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(5), ConfidenceLevel::Likely);
        assert_eq!(classify(30), ConfidenceLevel::Likely);
        assert_eq!(classify(4), ConfidenceLevel::Risky);
        assert_eq!(classify(1), ConfidenceLevel::Risky);
        assert_eq!(classify(0), ConfidenceLevel::Unlikely);
        assert_eq!(classify(-3), ConfidenceLevel::Unlikely);
    }

    #[test]
    fn classify_is_total_over_a_sweep() {
        for buffer in -20..=20 {
            let expected = if buffer >= 5 {
                ConfidenceLevel::Likely
            } else if buffer < 1 {
                ConfidenceLevel::Unlikely
            } else {
                ConfidenceLevel::Risky
            };
            assert_eq!(classify(buffer), expected, "buffer {buffer}");
        }
    }

    #[test]
    fn countdown_buffer_follows_walk_speed() {
        // 300 - 180 - 120 = 0s of slack at a normal pace.
        let mut countdown = ConnectionCountdown::new(180, 300, 120, WalkSpeed::Normal);
        assert_eq!(countdown.buffer_minutes(), 0);
        assert_eq!(countdown.confidence(), ConfidenceLevel::Unlikely);

        // Fast walkers need 84s, leaving 36s: still under a minute.
        countdown.set_walk_speed(WalkSpeed::Fast);
        assert_eq!(countdown.buffer_minutes(), 0);

        // Slow walkers need 180s and miss by a minute.
        countdown.set_walk_speed(WalkSpeed::Slow);
        assert_eq!(countdown.buffer_minutes(), -1);
    }

    #[test]
    fn roomy_connection_is_likely() {
        let countdown = ConnectionCountdown::new(60, 600, 120, WalkSpeed::Normal);
        assert_eq!(countdown.buffer_minutes(), 7);
        assert_eq!(countdown.confidence(), ConfidenceLevel::Likely);
    }

    #[test]
    fn tick_clamps_at_zero_and_reset_restores() {
        let mut countdown = ConnectionCountdown::new(1, 3, 0, WalkSpeed::Normal);
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.arrival_secs(), 0);
        assert_eq!(countdown.departure_secs(), 1);
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.departure_secs(), 0);
        assert!(countdown.progress_percent().abs() < f64::EPSILON);
        countdown.reset();
        assert_eq!(countdown.arrival_secs(), 1);
        assert_eq!(countdown.departure_secs(), 3);
    }

    #[test]
    fn tick_by_matches_repeated_ticks() {
        let mut stepped = ConnectionCountdown::new(180, 300, 120, WalkSpeed::Fast);
        let mut jumped = stepped.clone();
        for _ in 0..200 {
            stepped.tick();
        }
        jumped.tick_by(200);
        assert_eq!(stepped, jumped);
        assert_eq!(jumped.arrival_secs(), 0);
        assert_eq!(jumped.departure_secs(), 100);
        jumped.tick_by(u32::MAX);
        assert_eq!(jumped.departure_secs(), 0);
    }

    #[test]
    fn progress_is_clamped() {
        let countdown = ConnectionCountdown::new(180, 300, 120, WalkSpeed::Normal);
        assert!((countdown.progress_percent() - 60.0).abs() < 1e-9);
        let late = ConnectionCountdown::new(0, 60, 120, WalkSpeed::Slow);
        assert!(late.progress_percent().abs() < f64::EPSILON);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_countdown(125), "2:05");
        assert_eq!(format_countdown(0), "0:00");
    }
}
