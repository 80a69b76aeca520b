use anyhow::{Context, Result};
use mbta_planner::{
    ConnectionCountdown, Coordinate, CongestionState, EmbeddedNetwork, LabeledAlternate,
    PlannerEngine, PlannerSession, Scenario, TimerFires, TrainPosition, TripPlan, primary_path,
};
use std::fmt;

pub type Expectation = fn(&RunSummary) -> Result<()>;
pub type SessionSetup = fn(&mut PlannerSession);

/// Units advanced after teardown to confirm nothing fires.
const TEARDOWN_PROBE_UNITS: u32 = 120;

/// What a scenario does to a fresh session before its expectations run.
#[derive(Clone)]
pub struct RunPlan {
    pub origin: Option<&'static str>,
    pub destination: Option<&'static str>,
    pub setup: Option<SessionSetup>,
    pub scenario: Option<Scenario>,
    pub advance_units: u32,
    pub expectations: Vec<Expectation>,
}

impl fmt::Debug for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunPlan")
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("has_setup", &self.setup.is_some())
            .field("scenario", &self.scenario)
            .field("advance_units", &self.advance_units)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

impl Default for RunPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl RunPlan {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            origin: None,
            destination: None,
            setup: None,
            scenario: None,
            advance_units: 0,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_trip(mut self, origin: &'static str, destination: &'static str) -> Self {
        self.origin = Some(origin);
        self.destination = Some(destination);
        self
    }

    #[must_use]
    pub const fn with_setup(mut self, setup: SessionSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub const fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    #[must_use]
    pub const fn with_advance(mut self, units: u32) -> Self {
        self.advance_units = units;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

/// Snapshot of one seeded run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub origin: String,
    pub destination: String,
    /// Congestion drawn by an untouched session at the same stream position as the fold.
    pub baseline: Option<CongestionState>,
    pub scenario: Option<Scenario>,
    pub congestion: CongestionState,
    pub trains: Vec<TrainPosition>,
    pub plan: TripPlan,
    pub reverse_path: Vec<Coordinate>,
    pub panel: Vec<LabeledAlternate>,
    pub fires: TimerFires,
    pub countdown: Option<ConnectionCountdown>,
    pub fires_after_teardown: TimerFires,
    pub ticket: Option<String>,
    pub replay_matches: bool,
}

pub struct TripRunner {
    engine: PlannerEngine<EmbeddedNetwork>,
    default_origin: String,
    default_destination: String,
}

impl TripRunner {
    pub fn new(default_origin: impl Into<String>, default_destination: impl Into<String>) -> Self {
        Self {
            engine: PlannerEngine::new(EmbeddedNetwork),
            default_origin: default_origin.into(),
            default_destination: default_destination.into(),
        }
    }

    fn endpoints<'a>(&'a self, plan: &'a RunPlan) -> (&'a str, &'a str) {
        (
            plan.origin.map_or(self.default_origin.as_str(), |o| o),
            plan.destination.map_or(self.default_destination.as_str(), |d| d),
        )
    }

    /// Build a session, apply the plan's setup and scenario, and plan the trip.
    fn prepare(
        &self,
        plan: &RunPlan,
        seed: u64,
    ) -> Result<(PlannerSession, Option<CongestionState>, TripPlan)> {
        let (origin, destination) = self.endpoints(plan);
        let mut session = self
            .engine
            .create_session(seed)
            .context("loading embedded network")?;
        if let Some(setup) = plan.setup {
            setup(&mut session);
        }

        let baseline = match plan.scenario {
            Some(scenario) => {
                let mut reference = self.engine.create_session(seed)?;
                let baseline = reference.refresh_congestion().clone();
                session.apply_scenario(scenario);
                Some(baseline)
            }
            None => None,
        };

        let trip = session
            .plan_trip(origin, destination)
            .cloned()
            .with_context(|| format!("unknown station in {origin} -> {destination}"))?;
        Ok((session, baseline, trip))
    }

    /// Run one plan for a seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded or a station id is unknown.
    pub fn run(&self, plan: &RunPlan, seed: u64) -> Result<RunSummary> {
        let (mut session, baseline, trip) = self.prepare(plan, seed)?;
        let congestion = session.state().congestion.clone();
        let trains = session.state().trains.clone();
        let panel = session.alternate_panel();
        let ticket = session.recommended_ticket().map(|t| t.id.clone());
        let reverse_path = primary_path(session.network(), &trip.destination, &trip.origin);

        let fires = session.advance(plan.advance_units);
        let countdown = session.state().countdown.clone();
        session.teardown();
        let fires_after_teardown = session.advance(TEARDOWN_PROBE_UNITS);

        let (replay, replay_baseline, replay_trip) = self.prepare(plan, seed)?;
        let replay_matches = replay_trip == trip
            && replay_baseline == baseline
            && replay.state().congestion == congestion
            && replay.state().trains == trains;
        if !replay_matches {
            log::warn!("seed {seed} did not replay identically");
        }

        Ok(RunSummary {
            seed,
            origin: trip.origin.id.clone(),
            destination: trip.destination.id.clone(),
            baseline,
            scenario: plan.scenario,
            congestion,
            trains,
            plan: trip,
            reverse_path,
            panel,
            fires,
            countdown,
            fires_after_teardown,
            ticket,
            replay_matches,
        })
    }
}
