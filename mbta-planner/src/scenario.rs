//! What-if scenarios folded into congestion.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{CrowdingConfig, PlannerConfig};
use crate::congestion::{CongestionState, generate_congestion};
use crate::constants::{
    LINE_DELAY_MAX, RED_LINE_TAG, TIME_SHIFT_MAX, TIME_SHIFT_MIN, TIME_SHIFT_STEP,
};
use crate::network::TransitNetwork;
use crate::numbers::round_f64_to_u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrowdingLevel {
    Light,
    #[default]
    Normal,
    Heavy,
}

impl CrowdingLevel {
    #[must_use]
    pub const fn multiplier(self, cfg: &CrowdingConfig) -> f64 {
        match self {
            Self::Light => cfg.light,
            Self::Normal => cfg.normal,
            Self::Heavy => cfg.heavy,
        }
    }
}

/// The four subway lines a scenario can delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubwayLine {
    Red,
    Orange,
    Blue,
    Green,
}

impl SubwayLine {
    pub const ALL: [Self; 4] = [Self::Red, Self::Orange, Self::Blue, Self::Green];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Scenario {
    /// Departure shift in minutes.
    pub time_shift: i32,
    pub red_line_delay: u32,
    pub orange_line_delay: u32,
    pub blue_line_delay: u32,
    pub green_line_delay: u32,
    pub crowding: CrowdingLevel,
    pub weather_impact: bool,
}

impl Scenario {
    #[must_use]
    pub const fn line_delay(&self, line: SubwayLine) -> u32 {
        match line {
            SubwayLine::Red => self.red_line_delay,
            SubwayLine::Orange => self.orange_line_delay,
            SubwayLine::Blue => self.blue_line_delay,
            SubwayLine::Green => self.green_line_delay,
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Copy with one field changed, clamped to the slider ranges.
    #[must_use]
    pub fn adjusted(mut self, adjustment: ScenarioAdjustment) -> Self {
        match adjustment {
            ScenarioAdjustment::TimeShift(minutes) => {
                let clamped = minutes.clamp(TIME_SHIFT_MIN, TIME_SHIFT_MAX);
                self.time_shift = clamped - clamped % TIME_SHIFT_STEP;
            }
            ScenarioAdjustment::LineDelay(line, minutes) => {
                let minutes = minutes.min(LINE_DELAY_MAX);
                match line {
                    SubwayLine::Red => self.red_line_delay = minutes,
                    SubwayLine::Orange => self.orange_line_delay = minutes,
                    SubwayLine::Blue => self.blue_line_delay = minutes,
                    SubwayLine::Green => self.green_line_delay = minutes,
                }
            }
            ScenarioAdjustment::Crowding(level) => self.crowding = level,
            ScenarioAdjustment::Weather(enabled) => self.weather_impact = enabled,
        }
        self
    }
}

/// A single user edit to the scenario panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioAdjustment {
    TimeShift(i32),
    LineDelay(SubwayLine, u32),
    Crowding(CrowdingLevel),
    Weather(bool),
}

/// Apply a scenario to an already drawn baseline.
///
/// Only the red-line delay is folded, matched by substring on segment
/// endpoint ids; the crowding multiplier then scales every delay. Levels
/// are never changed.
#[must_use]
pub fn apply_scenario(
    baseline: &CongestionState,
    scenario: &Scenario,
    crowding: &CrowdingConfig,
) -> CongestionState {
    let multiplier = scenario.crowding.multiplier(crowding);
    baseline.map_delays(|segment| {
        let additional = if segment.touches(RED_LINE_TAG) {
            scenario.red_line_delay
        } else {
            0
        };
        let delay = f64::from(segment.delay.saturating_add(additional));
        round_f64_to_u32(delay * multiplier)
    })
}

/// Draw a fresh baseline and fold the scenario into it.
pub fn fold_scenario<R>(
    network: &TransitNetwork,
    scenario: &Scenario,
    cfg: &PlannerConfig,
    rng: &mut R,
) -> CongestionState
where
    R: Rng + ?Sized,
{
    let baseline = generate_congestion(network, &cfg.congestion, rng);
    let folded = apply_scenario(&baseline, scenario, &cfg.crowding);
    log::debug!(
        "folded scenario (red +{}m, crowding {:?}): total delay {} -> {}",
        scenario.red_line_delay,
        scenario.crowding,
        baseline.total_delay(),
        folded.total_delay()
    );
    folded
}

/// Holds the scenario panel's current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEngine {
    scenario: Scenario,
}

impl ScenarioEngine {
    #[must_use]
    pub const fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Apply one field edit and return the updated scenario.
    pub fn adjust(&mut self, adjustment: ScenarioAdjustment) -> Scenario {
        self.scenario = self.scenario.adjusted(adjustment);
        self.scenario
    }

    pub fn replace(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    pub fn reset(&mut self) -> Scenario {
        self.scenario = Scenario::default();
        self.scenario
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.scenario.is_default()
    }

    pub fn fold<R>(
        &self,
        network: &TransitNetwork,
        cfg: &PlannerConfig,
        rng: &mut R,
    ) -> CongestionState
    where
        R: Rng + ?Sized,
    {
        fold_scenario(network, &self.scenario, cfg, rng)
    }
}
