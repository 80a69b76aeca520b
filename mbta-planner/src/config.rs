//! Planner tuning configuration loaded from the embedded JSON asset.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    CONGESTION_MODERATE_THRESHOLD, CONGESTION_REFRESH_INTERVAL, CONGESTION_SEVERE_THRESHOLD,
    COUNTDOWN_INTERVAL, CROWDING_HEAVY_MULTIPLIER, CROWDING_LIGHT_MULTIPLIER,
    CROWDING_NORMAL_MULTIPLIER, MODERATE_DELAY_MAX, MODERATE_DELAY_MIN, SEVERE_DELAY_MAX,
    SEVERE_DELAY_MIN, TRAIN_ARRIVAL_MAX, TRAIN_ARRIVAL_MIN, TRAIN_JITTER_DEGREES, TRAIN_LINES,
    TRAINS_PER_LINE_MAX, TRAINS_PER_LINE_MIN, TRAINS_REFRESH_INTERVAL, WALK_FAST_FACTOR,
    WALK_NORMAL_FACTOR, WALK_SLOW_FACTOR,
};

const DEFAULT_PLANNER_CONFIG: &str = include_str!("../assets/planner.json");

/// Inclusive minute range for a uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRange {
    pub min: u32,
    pub max: u32,
}

impl MinuteRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Number of whole minutes covered by the range.
    #[must_use]
    pub const fn span(self) -> u32 {
        self.max.saturating_sub(self.min).saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionConfig {
    pub moderate_threshold: f64,
    pub severe_threshold: f64,
    pub moderate_delay: MinuteRange,
    pub severe_delay: MinuteRange,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            moderate_threshold: CONGESTION_MODERATE_THRESHOLD,
            severe_threshold: CONGESTION_SEVERE_THRESHOLD,
            moderate_delay: MinuteRange::new(MODERATE_DELAY_MIN, MODERATE_DELAY_MAX),
            severe_delay: MinuteRange::new(SEVERE_DELAY_MIN, SEVERE_DELAY_MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdingConfig {
    pub light: f64,
    pub normal: f64,
    pub heavy: f64,
}

impl Default for CrowdingConfig {
    fn default() -> Self {
        Self {
            light: CROWDING_LIGHT_MULTIPLIER,
            normal: CROWDING_NORMAL_MULTIPLIER,
            heavy: CROWDING_HEAVY_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub lines: Vec<String>,
    pub min_per_line: u32,
    pub max_per_line: u32,
    /// Full width of the uniform position jitter, in degrees.
    pub jitter_degrees: f64,
    pub arrival: MinuteRange,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lines: TRAIN_LINES.iter().map(ToString::to_string).collect(),
            min_per_line: TRAINS_PER_LINE_MIN,
            max_per_line: TRAINS_PER_LINE_MAX,
            jitter_degrees: TRAIN_JITTER_DEGREES,
            arrival: MinuteRange::new(TRAIN_ARRIVAL_MIN, TRAIN_ARRIVAL_MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub congestion_interval: u32,
    pub trains_interval: u32,
    pub countdown_interval: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            congestion_interval: CONGESTION_REFRESH_INTERVAL,
            trains_interval: TRAINS_REFRESH_INTERVAL,
            countdown_interval: COUNTDOWN_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSpeedConfig {
    pub slow: f64,
    pub normal: f64,
    pub fast: f64,
}

impl Default for WalkSpeedConfig {
    fn default() -> Self {
        Self {
            slow: WALK_SLOW_FACTOR,
            normal: WALK_NORMAL_FACTOR,
            fast: WALK_FAST_FACTOR,
        }
    }
}

/// Errors raised when planner configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("congestion thresholds invalid (moderate {moderate:.2}, severe {severe:.2})")]
    Thresholds { moderate: f64, severe: f64 },
    #[error("{field} range inverted (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("train lines must not be empty")]
    NoTrainLines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    #[serde(default)]
    pub congestion: CongestionConfig,
    #[serde(default)]
    pub crowding: CrowdingConfig,
    #[serde(default)]
    pub trains: TrainConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub walk_speed: WalkSpeedConfig,
}

impl PlannerConfig {
    /// Load planner configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed or if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the embedded `planner.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails to parse or validate.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_PLANNER_CONFIG)
    }

    /// Embedded configuration, or the compiled-in defaults if the asset is rejected.
    #[must_use]
    pub fn default_config() -> Self {
        Self::embedded().unwrap_or_else(|err| {
            log::warn!("embedded planner config rejected: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn shared() -> &'static Self {
        static CONFIG: OnceLock<PlannerConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::default_config)
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.congestion;
        if !(0.0..1.0).contains(&c.moderate_threshold)
            || !(0.0..1.0).contains(&c.severe_threshold)
            || c.moderate_threshold > c.severe_threshold
        {
            return Err(ConfigError::Thresholds {
                moderate: c.moderate_threshold,
                severe: c.severe_threshold,
            });
        }
        check_range("congestion.moderate_delay", c.moderate_delay)?;
        check_range("congestion.severe_delay", c.severe_delay)?;
        check_range("trains.arrival", self.trains.arrival)?;
        check_range(
            "trains.per_line",
            MinuteRange::new(self.trains.min_per_line, self.trains.max_per_line),
        )?;
        if self.trains.lines.is_empty() {
            return Err(ConfigError::NoTrainLines);
        }

        for (field, value) in [
            ("crowding.light", self.crowding.light),
            ("crowding.normal", self.crowding.normal),
            ("crowding.heavy", self.crowding.heavy),
            ("walk_speed.slow", self.walk_speed.slow),
            ("walk_speed.normal", self.walk_speed.normal),
            ("walk_speed.fast", self.walk_speed.fast),
            (
                "refresh.congestion_interval",
                f64::from(self.refresh.congestion_interval),
            ),
            (
                "refresh.trains_interval",
                f64::from(self.refresh.trains_interval),
            ),
            (
                "refresh.countdown_interval",
                f64::from(self.refresh.countdown_interval),
            ),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}

fn check_range(field: &'static str, range: MinuteRange) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::InvertedRange {
            field,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}
