//! Per-segment congestion signals.
//!
//! A [`CongestionState`] is sparse: only moderate and severe segments are
//! stored, and any station pair without an entry is running normally.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CongestionConfig;
use crate::network::TransitNetwork;
use crate::numbers::scale_unit_roll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    #[default]
    Normal,
    Moderate,
    Severe,
}

impl CongestionLevel {
    #[must_use]
    pub const fn is_congested(self) -> bool {
        matches!(self, Self::Moderate | Self::Severe)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Congestion on the directed link between two adjacent stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongestionSegment {
    pub from_station: String,
    pub to_station: String,
    pub level: CongestionLevel,
    /// Minutes of delay.
    pub delay: u32,
}

impl CongestionSegment {
    #[must_use]
    pub fn new(
        from_station: impl Into<String>,
        to_station: impl Into<String>,
        level: CongestionLevel,
        delay: u32,
    ) -> Self {
        Self {
            from_station: from_station.into(),
            to_station: to_station.into(),
            level,
            delay,
        }
    }

    /// Whether either endpoint id contains `tag`.
    #[must_use]
    pub fn touches(&self, tag: &str) -> bool {
        self.from_station.contains(tag) || self.to_station.contains(tag)
    }
}

/// Sparse snapshot of non-normal segments, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CongestionState {
    segments: Vec<CongestionSegment>,
}

impl CongestionState {
    /// Build a state, dropping any segment whose level is normal.
    #[must_use]
    pub fn from_segments(segments: impl IntoIterator<Item = CongestionSegment>) -> Self {
        Self {
            segments: segments
                .into_iter()
                .filter(|s| s.level.is_congested())
                .collect(),
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[CongestionSegment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &CongestionSegment> {
        self.segments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segment(&self, from: &str, to: &str) -> Option<&CongestionSegment> {
        self.segments
            .iter()
            .find(|s| s.from_station == from && s.to_station == to)
    }

    /// Level on `from -> to`; absent pairs are normal.
    #[must_use]
    pub fn level_between(&self, from: &str, to: &str) -> CongestionLevel {
        self.segment(from, to).map_or(CongestionLevel::Normal, |s| s.level)
    }

    #[must_use]
    pub fn delay_between(&self, from: &str, to: &str) -> u32 {
        self.segment(from, to).map_or(0, |s| s.delay)
    }

    /// Any moderate or severe segment present.
    #[must_use]
    pub fn has_congestion(&self) -> bool {
        self.segments.iter().any(|s| s.level.is_congested())
    }

    #[must_use]
    pub fn has_severe(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.level == CongestionLevel::Severe)
    }

    #[must_use]
    pub fn count(&self, level: CongestionLevel) -> usize {
        self.segments.iter().filter(|s| s.level == level).count()
    }

    #[must_use]
    pub fn total_delay(&self) -> u32 {
        self.segments
            .iter()
            .fold(0_u32, |acc, s| acc.saturating_add(s.delay))
    }

    /// New state with every segment's delay rewritten; levels are kept.
    #[must_use]
    pub fn map_delays(&self, mut f: impl FnMut(&CongestionSegment) -> u32) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| CongestionSegment {
                    delay: f(s),
                    ..s.clone()
                })
                .collect(),
        }
    }
}

/// Level implied by a unit roll, or `None` when the segment runs normally.
#[must_use]
pub fn level_for_roll(cfg: &CongestionConfig, level_roll: f64) -> Option<CongestionLevel> {
    if level_roll > cfg.severe_threshold {
        Some(CongestionLevel::Severe)
    } else if level_roll > cfg.moderate_threshold {
        Some(CongestionLevel::Moderate)
    } else {
        None
    }
}

/// Delay in minutes for a congested level from a unit roll.
#[must_use]
pub fn delay_for_roll(cfg: &CongestionConfig, level: CongestionLevel, delay_roll: f64) -> u32 {
    let range = match level {
        CongestionLevel::Severe => cfg.severe_delay,
        CongestionLevel::Moderate => cfg.moderate_delay,
        CongestionLevel::Normal => return 0,
    };
    range.min + scale_unit_roll(delay_roll, range.span())
}

/// Classify one segment from its own pair of unit rolls.
#[must_use]
pub fn classify_draw(
    cfg: &CongestionConfig,
    level_roll: f64,
    delay_roll: f64,
) -> Option<(CongestionLevel, u32)> {
    level_for_roll(cfg, level_roll).map(|level| (level, delay_for_roll(cfg, level, delay_roll)))
}

/// Draw a fresh baseline congestion state for every segment of every route.
///
/// The delay roll is only drawn for segments that came up congested.
pub fn generate_congestion<R>(
    network: &TransitNetwork,
    cfg: &CongestionConfig,
    rng: &mut R,
) -> CongestionState
where
    R: Rng + ?Sized,
{
    let mut segments = Vec::new();
    for route in &network.routes {
        for (from, to) in route.segments() {
            let level_roll: f64 = rng.r#gen();
            let Some(level) = level_for_roll(cfg, level_roll) else {
                continue;
            };
            let delay = delay_for_roll(cfg, level, rng.r#gen());
            segments.push(CongestionSegment::new(from, to, level, delay));
        }
    }

    let state = CongestionState { segments };
    log::debug!(
        "generated congestion: {} moderate, {} severe of {} segments",
        state.count(CongestionLevel::Moderate),
        state.count(CongestionLevel::Severe),
        network.segment_count()
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn cfg() -> CongestionConfig {
        CongestionConfig::default()
    }

    #[test]
    fn roll_thresholds_are_strict() {
        assert_eq!(level_for_roll(&cfg(), 0.70), None);
        assert_eq!(level_for_roll(&cfg(), 0.7001), Some(CongestionLevel::Moderate));
        assert_eq!(level_for_roll(&cfg(), 0.85), Some(CongestionLevel::Moderate));
        assert_eq!(level_for_roll(&cfg(), 0.8501), Some(CongestionLevel::Severe));
        assert_eq!(level_for_roll(&cfg(), 0.0), None);
    }

    #[test]
    fn delay_rolls_cover_inclusive_ranges() {
        let c = cfg();
        assert_eq!(delay_for_roll(&c, CongestionLevel::Severe, 0.0), 5);
        assert_eq!(delay_for_roll(&c, CongestionLevel::Severe, 0.9999), 14);
        assert_eq!(delay_for_roll(&c, CongestionLevel::Moderate, 0.0), 2);
        assert_eq!(delay_for_roll(&c, CongestionLevel::Moderate, 0.9999), 6);
        assert_eq!(delay_for_roll(&c, CongestionLevel::Normal, 0.5), 0);
    }

    #[test]
    fn classify_draw_omits_normal() {
        assert_eq!(classify_draw(&cfg(), 0.2, 0.9), None);
        assert_eq!(
            classify_draw(&cfg(), 0.9, 0.45),
            Some((CongestionLevel::Severe, 9))
        );
    }

    #[test]
    fn from_segments_drops_normal_entries() {
        let state = CongestionState::from_segments([
            CongestionSegment::new("a", "b", CongestionLevel::Normal, 0),
            CongestionSegment::new("b", "c", CongestionLevel::Moderate, 3),
        ]);
        assert_eq!(state.len(), 1);
        assert_eq!(state.level_between("a", "b"), CongestionLevel::Normal);
        assert_eq!(state.level_between("b", "c"), CongestionLevel::Moderate);
        // Segments are directed.
        assert_eq!(state.level_between("c", "b"), CongestionLevel::Normal);
        assert_eq!(state.delay_between("b", "c"), 3);
    }

    #[test]
    fn generated_state_never_contains_normal() {
        let network = TransitNetwork::default_network();
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..50 {
            let state = generate_congestion(network, &cfg(), &mut rng);
            assert!(state.iter().all(|s| s.level.is_congested()));
            assert!(state.len() <= network.segment_count());
            for segment in state.iter() {
                let range = match segment.level {
                    CongestionLevel::Severe => cfg().severe_delay,
                    _ => cfg().moderate_delay,
                };
                assert!(range.contains(segment.delay));
            }
        }
    }

    #[test]
    fn map_delays_keeps_levels() {
        let state = CongestionState::from_segments([CongestionSegment::new(
            "a",
            "b",
            CongestionLevel::Severe,
            6,
        )]);
        let doubled = state.map_delays(|s| s.delay * 2);
        assert_eq!(doubled.segments()[0].delay, 12);
        assert_eq!(doubled.segments()[0].level, CongestionLevel::Severe);
        assert_eq!(doubled.total_delay(), 12);
    }
}
