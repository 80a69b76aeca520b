use anyhow::{Result, ensure};
use mbta_planner::{
    ConfidenceLevel, CongestionLevel, CongestionSegment, CongestionState, CrowdingLevel,
    PlannerConfig, PlannerSession, Scenario, apply_scenario,
};

use crate::logic::runner::{RunPlan, RunSummary};

/// A named, runnable scenario.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: RunPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: RunPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const CATALOG: &[(&str, &str)] = &[
    ("smoke", "Plan the requested trip and check the ranked options"),
    ("congestion-sparsity", "Generated congestion never stores normal segments"),
    ("red-line-delay", "Red delay with heavy crowding folds into the baseline"),
    ("light-crowding", "Light crowding halves every baseline delay"),
    ("same-route-path", "Primary path on one route is the same in both directions"),
    ("cross-line", "Stations on different routes get a straight-line path"),
    ("severe-alternates", "A severe segment opens the alternates panel"),
    ("timer-cadence", "Refresh timers fire at 30/10/1 and stop after teardown"),
    ("connection-countdown", "Transfer countdown ticks with the countdown timer"),
    ("deterministic-replay", "The same seed reproduces every snapshot"),
];

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.to_vec()
}

pub fn all_scenario_keys() -> Vec<String> {
    CATALOG.iter().map(|(key, _)| (*key).to_string()).collect()
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let plan = match name {
        "smoke" => RunPlan::new()
            .with_expectation(three_ranked_options)
            .with_expectation(trains_on_every_core_line),
        "congestion-sparsity" => RunPlan::new().with_expectation(congestion_is_sparse),
        "red-line-delay" => RunPlan::new()
            .with_scenario(Scenario {
                red_line_delay: 20,
                crowding: CrowdingLevel::Heavy,
                ..Scenario::default()
            })
            .with_expectation(fold_matches_baseline),
        "light-crowding" => RunPlan::new()
            .with_scenario(Scenario {
                crowding: CrowdingLevel::Light,
                ..Scenario::default()
            })
            .with_expectation(fold_matches_baseline),
        "same-route-path" => RunPlan::new()
            .with_trip("oak-grove", "forest-hills")
            .with_expectation(path_is_symmetric)
            .with_expectation(path_follows_route),
        "cross-line" => RunPlan::new()
            .with_trip("harvard", "wonderland")
            .with_expectation(path_is_straight),
        "severe-alternates" => RunPlan::new()
            .with_trip("alewife", "airport")
            .with_setup(force_severe_segment)
            .with_expectation(panel_offers_alternates),
        "timer-cadence" => RunPlan::new()
            .with_advance(60)
            .with_expectation(timers_fire_on_cadence),
        "connection-countdown" => RunPlan::new()
            .with_advance(45)
            .with_expectation(countdown_ticks),
        "deterministic-replay" => RunPlan::new()
            .with_scenario(Scenario {
                red_line_delay: 5,
                ..Scenario::default()
            })
            .with_advance(30)
            .with_expectation(replays_identically),
        _ => return None,
    };
    Some(TestScenario::new(name, plan))
}

fn force_severe_segment(session: &mut PlannerSession) {
    session.with_state_mut(|state| {
        state.congestion = CongestionState::from_segments([CongestionSegment::new(
            "airport",
            "maverick",
            CongestionLevel::Severe,
            12,
        )]);
    });
}

fn three_ranked_options(summary: &RunSummary) -> Result<()> {
    let options = &summary.plan.options;
    ensure!(options.len() == 3, "expected 3 options, got {}", options.len());
    let bands: Vec<ConfidenceLevel> = options.iter().map(|o| o.confidence).collect();
    ensure!(
        bands
            == [
                ConfidenceLevel::Likely,
                ConfidenceLevel::Risky,
                ConfidenceLevel::Unlikely
            ],
        "unexpected confidence order {bands:?}"
    );
    let base = options[0].duration;
    ensure!((10..=24).contains(&base), "base duration {base} out of range");
    ensure!(
        options[1].duration == base + 6 && options[2].duration == base + 10,
        "durations must step +6 and +10 from {base}"
    );
    Ok(())
}

fn trains_on_every_core_line(summary: &RunSummary) -> Result<()> {
    for line in &PlannerConfig::shared().trains.lines {
        let count = summary.trains.iter().filter(|t| &t.line == line).count();
        ensure!((2..=4).contains(&count), "{line} has {count} trains");
    }
    Ok(())
}

fn congestion_is_sparse(summary: &RunSummary) -> Result<()> {
    let cfg = &PlannerConfig::shared().congestion;
    for segment in summary.congestion.iter() {
        let range = match segment.level {
            CongestionLevel::Normal => anyhow::bail!(
                "normal segment {} -> {} materialized",
                segment.from_station,
                segment.to_station
            ),
            CongestionLevel::Moderate => cfg.moderate_delay,
            CongestionLevel::Severe => cfg.severe_delay,
        };
        ensure!(
            range.contains(segment.delay),
            "delay {} outside {range:?}",
            segment.delay
        );
    }
    Ok(())
}

fn fold_matches_baseline(summary: &RunSummary) -> Result<()> {
    let (Some(baseline), Some(scenario)) = (&summary.baseline, &summary.scenario) else {
        anyhow::bail!("scenario run recorded no baseline");
    };
    let expected = apply_scenario(baseline, scenario, &PlannerConfig::shared().crowding);
    ensure!(
        expected == summary.congestion,
        "folded congestion differs from baseline fold"
    );
    Ok(())
}

fn path_is_symmetric(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.plan.path == summary.reverse_path,
        "primary path depends on direction"
    );
    Ok(())
}

fn path_follows_route(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.plan.path.len() > 2,
        "same-route trip collapsed to {} points",
        summary.plan.path.len()
    );
    Ok(())
}

fn path_is_straight(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.plan.path
            == [
                summary.plan.origin.coordinate(),
                summary.plan.destination.coordinate()
            ],
        "cross-route trip should be a straight segment"
    );
    Ok(())
}

fn panel_offers_alternates(summary: &RunSummary) -> Result<()> {
    let ids: Vec<&str> = summary.panel.iter().map(|a| a.id.as_str()).collect();
    ensure!(ids == ["alt-0", "alt-1"], "unexpected panel ids {ids:?}");
    ensure!(
        summary.panel[0].route.label == "Via Orange Line",
        "red endpoint should offer the Orange alternate first"
    );
    Ok(())
}

fn timers_fire_on_cadence(summary: &RunSummary) -> Result<()> {
    let fires = summary.fires;
    ensure!(
        fires.congestion == 2 && fires.trains == 6 && fires.countdown == 60,
        "unexpected fires {fires:?}"
    );
    ensure!(
        !summary.fires_after_teardown.any(),
        "timers fired after teardown"
    );
    Ok(())
}

fn countdown_ticks(summary: &RunSummary) -> Result<()> {
    let transfers = summary.plan.options[0].transfers;
    match &summary.countdown {
        Some(countdown) => {
            ensure!(transfers > 0, "countdown shown without a transfer");
            ensure!(
                countdown.departure_secs() == 300 - 45,
                "departure countdown at {}",
                countdown.departure_secs()
            );
        }
        None => ensure!(transfers == 0, "transfer trip has no countdown"),
    }
    Ok(())
}

fn replays_identically(summary: &RunSummary) -> Result<()> {
    ensure!(summary.replay_matches, "seed {} did not replay", summary.seed);
    Ok(())
}
