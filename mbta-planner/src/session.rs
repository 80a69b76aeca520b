//! Planner session: the explicit view-state container and the operations
//! that replace its parts.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::PlannerConfig;
use crate::confidence::{ConnectionCountdown, WalkSpeed};
use crate::congestion::{CongestionState, generate_congestion};
use crate::constants::{
    ALTERNATE_ID_PREFIX, COUNTDOWN_ARRIVAL_SECS, COUNTDOWN_DEPARTURE_SECS, COUNTDOWN_WALK_SECS,
};
use crate::itinerary::{
    AlternateRoute, ItineraryBuilder, ItineraryTemplates, SyntheticTemplates, TransferOption,
    TripPlan,
};
use crate::network::{Station, TransitMode, TransitNetwork};
use crate::rng::RngBundle;
use crate::scenario::{Scenario, ScenarioAdjustment, ScenarioEngine};
use crate::tickets::{TicketCatalog, TicketType};
use crate::timers::{RefreshTimers, TimerFires};
use crate::trains::{StationArrival, TrainPosition, generate_arrivals, generate_positions};

/// An alternate with the presentation id the panel selects it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledAlternate {
    pub id: String,
    #[serde(flatten)]
    pub route: AlternateRoute,
}

/// Assign `alt-{index}` ids in presentation order.
#[must_use]
pub fn label_alternates(alternates: Vec<AlternateRoute>) -> Vec<LabeledAlternate> {
    alternates
        .into_iter()
        .enumerate()
        .map(|(i, route)| LabeledAlternate {
            id: format!("{ALTERNATE_ID_PREFIX}{i}"),
            route,
        })
        .collect()
}

/// Everything the planner shows at one moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    pub congestion: CongestionState,
    pub trains: Vec<TrainPosition>,
    #[serde(default)]
    pub trip: Option<TripPlan>,
    #[serde(default)]
    pub selected_option: Option<usize>,
    #[serde(default)]
    pub selected_alternate: Option<String>,
    #[serde(default)]
    pub scenario: ScenarioEngine,
    pub selected_modes: BTreeSet<TransitMode>,
    #[serde(default)]
    pub walk_speed: WalkSpeed,
    #[serde(default)]
    pub countdown: Option<ConnectionCountdown>,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            congestion: CongestionState::empty(),
            trains: Vec::new(),
            trip: None,
            selected_option: None,
            selected_alternate: None,
            scenario: ScenarioEngine::default(),
            selected_modes: TransitMode::ALL.into_iter().collect(),
            walk_speed: WalkSpeed::default(),
            countdown: None,
        }
    }
}

impl PlannerState {
    /// Any severe segment anywhere on the network.
    #[must_use]
    pub fn is_main_route_congested(&self) -> bool {
        self.congestion.has_severe()
    }

    /// Flip a mode in the filter; returns whether it is now selected.
    pub fn toggle_mode(&mut self, mode: TransitMode) -> bool {
        if self.selected_modes.remove(&mode) {
            false
        } else {
            self.selected_modes.insert(mode);
            true
        }
    }

    #[must_use]
    pub fn is_mode_selected(&self, mode: TransitMode) -> bool {
        self.selected_modes.contains(&mode)
    }

    /// Stations served by at least one selected mode.
    #[must_use]
    pub fn visible_stations<'a>(&self, network: &'a TransitNetwork) -> Vec<&'a Station> {
        network
            .stations
            .iter()
            .filter(|s| s.modes.iter().any(|m| self.selected_modes.contains(m)))
            .collect()
    }

    #[must_use]
    pub fn options(&self) -> &[TransferOption] {
        match &self.trip {
            Some(trip) => &trip.options,
            None => &[],
        }
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&TransferOption> {
        self.selected_option.and_then(|i| self.options().get(i))
    }

    /// Transfers on the selected option, zero without a selection.
    #[must_use]
    pub fn current_transfers(&self) -> u32 {
        self.selected_option().map_or(0, |o| o.transfers)
    }
}

/// Owns the fixture, the RNG streams, the refresh timers and the current
/// [`PlannerState`].
#[derive(Debug)]
pub struct PlannerSession<T: ItineraryTemplates = SyntheticTemplates> {
    network: TransitNetwork,
    config: PlannerConfig,
    builder: ItineraryBuilder<T>,
    rng: RngBundle,
    timers: RefreshTimers,
    state: PlannerState,
}

impl PlannerSession<SyntheticTemplates> {
    /// Start a session and draw the initial congestion and train snapshots.
    #[must_use]
    pub fn new(network: TransitNetwork, config: PlannerConfig, seed: u64) -> Self {
        Self::with_templates(network, config, seed, SyntheticTemplates)
    }
}

impl<T: ItineraryTemplates> PlannerSession<T> {
    #[must_use]
    pub fn with_templates(
        network: TransitNetwork,
        config: PlannerConfig,
        seed: u64,
        templates: T,
    ) -> Self {
        let timers = RefreshTimers::new(&config.refresh);
        let mut session = Self {
            network,
            config,
            builder: ItineraryBuilder::new(templates),
            rng: RngBundle::from_user_seed(seed),
            timers,
            state: PlannerState::default(),
        };
        session.refresh_congestion();
        session.refresh_trains();
        session
    }

    #[must_use]
    pub const fn network(&self) -> &TransitNetwork {
        &self.network
    }

    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &PlannerState {
        &self.state
    }

    #[must_use]
    pub const fn timers(&self) -> &RefreshTimers {
        &self.timers
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Apply a closure to the mutable planner state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut PlannerState) -> R) -> R {
        f(&mut self.state)
    }

    /// Swap in a whole new state, returning the previous one.
    pub fn replace_state(&mut self, state: PlannerState) -> PlannerState {
        std::mem::replace(&mut self.state, state)
    }

    /// Deterministically reseed every RNG stream.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
    }

    /// Replace congestion with a fresh baseline draw.
    pub fn refresh_congestion(&mut self) -> &CongestionState {
        let congestion = {
            let mut rng = self.rng.congestion();
            generate_congestion(&self.network, &self.config.congestion, &mut *rng)
        };
        self.state.congestion = congestion;
        &self.state.congestion
    }

    pub fn refresh_trains(&mut self) -> &[TrainPosition] {
        let trains = {
            let mut rng = self.rng.trains();
            generate_positions(&self.network, &self.config.trains, &mut *rng)
        };
        self.state.trains = trains;
        &self.state.trains
    }

    /// Plan a trip between two station ids.
    ///
    /// Unknown ids leave the state untouched and return `None`. A new plan
    /// selects its first option and clears any alternate selection.
    pub fn plan_trip(&mut self, origin_id: &str, destination_id: &str) -> Option<&TripPlan> {
        let plan = {
            let (Some(origin), Some(destination)) = (
                self.network.station(origin_id),
                self.network.station(destination_id),
            ) else {
                log::debug!("ignoring trip request {origin_id} -> {destination_id}");
                return None;
            };
            let mut rng = self.rng.itinerary();
            self.builder.plan(
                &self.network,
                origin,
                destination,
                &self.state.congestion,
                &mut *rng,
            )
        };

        self.state.selected_option = (!plan.options.is_empty()).then_some(0);
        self.state.selected_alternate = None;
        self.state.trip = Some(plan);
        self.sync_countdown();
        self.state.trip.as_ref()
    }

    /// Select a ranked option by index; out-of-range indices change nothing.
    pub fn select_option(&mut self, index: usize) -> Option<&TransferOption> {
        if index >= self.state.options().len() {
            return None;
        }
        self.state.selected_option = Some(index);
        self.sync_countdown();
        self.state.selected_option()
    }

    /// Alternates offered in the panel, drawn against the current congestion.
    ///
    /// Empty unless a trip is planned and some segment is severe.
    #[must_use]
    pub fn alternate_panel(&self) -> Vec<LabeledAlternate> {
        let Some(trip) = &self.state.trip else {
            return Vec::new();
        };
        if !self.state.is_main_route_congested() {
            return Vec::new();
        }
        label_alternates(self.builder.templates().alternates(
            &trip.origin,
            &trip.destination,
            &self.state.congestion,
        ))
    }

    /// Select a panel alternate by id; returns whether the id was offered.
    pub fn select_alternate(&mut self, id: &str) -> bool {
        let offered = self.alternate_panel().iter().any(|a| a.id == id);
        if offered {
            self.state.selected_alternate = Some(id.to_string());
        }
        offered
    }

    pub fn toggle_mode(&mut self, mode: TransitMode) -> bool {
        self.state.toggle_mode(mode)
    }

    pub fn set_walk_speed(&mut self, walk_speed: WalkSpeed) {
        self.state.walk_speed = walk_speed;
        if let Some(countdown) = self.state.countdown.as_mut() {
            countdown.set_walk_speed(walk_speed);
        }
    }

    /// Replace the scenario and fold it into a fresh baseline.
    pub fn apply_scenario(&mut self, scenario: Scenario) -> &CongestionState {
        self.state.scenario.replace(scenario);
        self.refold()
    }

    pub fn adjust_scenario(&mut self, adjustment: ScenarioAdjustment) -> &CongestionState {
        self.state.scenario.adjust(adjustment);
        self.refold()
    }

    pub fn reset_scenario(&mut self) -> &CongestionState {
        self.state.scenario.reset();
        self.refold()
    }

    fn refold(&mut self) -> &CongestionState {
        let congestion = {
            let mut rng = self.rng.congestion();
            self.state
                .scenario
                .fold(&self.network, &self.config, &mut *rng)
        };
        self.state.congestion = congestion;
        &self.state.congestion
    }

    /// Advance the refresh timers, running every refresh that fell due.
    ///
    /// Each due refresh still draws from its stream so that one long advance
    /// leaves the streams where several short ones would.
    pub fn advance(&mut self, units: u32) -> TimerFires {
        let fires = self.timers.advance(units);
        for _ in 0..fires.congestion {
            self.refresh_congestion();
        }
        for _ in 0..fires.trains {
            self.refresh_trains();
        }
        if let Some(countdown) = self.state.countdown.as_mut() {
            countdown.tick_by(fires.countdown);
        }
        fires
    }

    /// Cancel every refresh timer.
    pub fn teardown(&mut self) {
        self.timers.cancel();
        log::debug!("planner session torn down");
    }

    /// Mock arrival board for a station.
    pub fn arrivals(&self, station_id: &str) -> Vec<StationArrival> {
        let mut rng = self.rng.arrivals();
        generate_arrivals(&self.network, station_id, &mut *rng)
    }

    /// Ticket suggested for the selected option.
    #[must_use]
    pub fn recommended_ticket(&self) -> Option<&'static TicketType> {
        TicketCatalog::default_catalog().recommend(self.state.current_transfers(), None)
    }

    /// The countdown exists only while the selected option has a transfer.
    fn sync_countdown(&mut self) {
        if self.state.current_transfers() == 0 {
            self.state.countdown = None;
        } else if self.state.countdown.is_none() {
            self.state.countdown = Some(ConnectionCountdown::with_config(
                COUNTDOWN_ARRIVAL_SECS,
                COUNTDOWN_DEPARTURE_SECS,
                COUNTDOWN_WALK_SECS,
                self.state.walk_speed,
                self.config.walk_speed.clone(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::ConfidenceLevel;
    use crate::congestion::{CongestionLevel, CongestionSegment};
    use crate::scenario::{CrowdingLevel, apply_scenario};

    fn session(seed: u64) -> PlannerSession {
        PlannerSession::new(
            TransitNetwork::default_network().clone(),
            PlannerConfig::default_config(),
            seed,
        )
    }

    fn severe_state() -> CongestionState {
        CongestionState::from_segments([CongestionSegment::new(
            "harvard",
            "central",
            CongestionLevel::Severe,
            9,
        )])
    }

    #[test]
    fn same_seed_same_snapshots() {
        let mut a = session(77);
        let mut b = session(77);
        assert_eq!(a.state().congestion, b.state().congestion);
        assert_eq!(a.state().trains, b.state().trains);
        let pa = a.plan_trip("harvard", "kendall").cloned();
        let pb = b.plan_trip("harvard", "kendall").cloned();
        assert_eq!(pa, pb);
    }

    #[test]
    fn unknown_station_is_ignored() {
        let mut s = session(1);
        assert!(s.plan_trip("harvard", "atlantis").is_none());
        assert!(s.state().trip.is_none());
        assert!(s.state().selected_option.is_none());
    }

    #[test]
    fn planning_selects_first_option_and_starts_countdown() {
        let mut s = session(2);
        let plan = s.plan_trip("harvard", "kendall").unwrap();
        assert_eq!(plan.path.len(), 3);
        assert_eq!(s.state().selected_option, Some(0));
        assert_eq!(s.state().current_transfers(), 1);
        let countdown = s.state().countdown.as_ref().unwrap();
        assert_eq!(countdown.confidence(), ConfidenceLevel::Unlikely);
        assert_eq!(s.recommended_ticket().unwrap().id, "single-subway");

        // The direct Orange option has no transfer.
        assert_eq!(s.select_option(1).unwrap().transfers, 0);
        assert!(s.state().countdown.is_none());
        assert!(s.select_option(3).is_none());
        assert_eq!(s.state().selected_option, Some(1));
    }

    #[test]
    fn alternate_panel_requires_severe_segment() {
        let mut s = session(3);
        s.plan_trip("harvard", "kendall");
        s.with_state_mut(|state| {
            state.congestion = CongestionState::from_segments([CongestionSegment::new(
                "harvard",
                "central",
                CongestionLevel::Moderate,
                3,
            )]);
        });
        assert!(s.alternate_panel().is_empty());

        s.with_state_mut(|state| state.congestion = severe_state());
        let panel = s.alternate_panel();
        let ids: Vec<&str> = panel.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["alt-0", "alt-1"]);
        assert_eq!(panel[0].route.label, "Via Orange Line");
        assert!(s.select_alternate("alt-1"));
        assert!(!s.select_alternate("alt-7"));
        assert_eq!(s.state().selected_alternate.as_deref(), Some("alt-1"));
    }

    #[test]
    fn scenario_fold_replaces_congestion() {
        let mut folded = session(40);
        let mut reference = session(40);
        let light = folded
            .adjust_scenario(ScenarioAdjustment::Crowding(CrowdingLevel::Light))
            .clone();
        let baseline = reference.refresh_congestion().clone();
        let expected = apply_scenario(
            &baseline,
            folded.state().scenario.scenario(),
            &PlannerConfig::default_config().crowding,
        );
        assert_eq!(light, expected);
        assert!(folded.state().scenario.has_changes());
        folded.reset_scenario();
        assert!(!folded.state().scenario.has_changes());
    }

    #[test]
    fn advance_runs_due_refreshes_and_ticks_countdown() {
        let mut s = session(5);
        s.plan_trip("porter", "park-street");
        let fires = s.advance(10);
        assert_eq!(fires.trains, 1);
        assert_eq!(fires.congestion, 0);
        let countdown = s.state().countdown.as_ref().unwrap();
        assert_eq!(countdown.arrival_secs(), 170);
        assert_eq!(countdown.departure_secs(), 290);

        s.teardown();
        let before = s.state().clone();
        assert!(!s.advance(100).any());
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn long_advance_drains_countdown_in_one_step() {
        let mut long = session(8);
        let mut short = session(8);
        long.plan_trip("porter", "park-street");
        short.plan_trip("porter", "park-street");
        long.advance(400);
        for _ in 0..4 {
            short.advance(100);
        }
        let countdown = long.state().countdown.as_ref().unwrap();
        assert_eq!(countdown.arrival_secs(), 0);
        assert_eq!(countdown.departure_secs(), 0);
        assert_eq!(long.state(), short.state());
    }

    #[test]
    fn mode_filter_hides_stations() {
        let mut s = session(6);
        let network = TransitNetwork::default_network();
        let all = s.state().visible_stations(network).len();
        assert_eq!(all, network.stations.len());
        assert!(!s.toggle_mode(TransitMode::Subway));
        assert!(!s.state().is_mode_selected(TransitMode::Subway));
        assert!(s.state().visible_stations(network).len() < all);
        assert!(s.toggle_mode(TransitMode::Subway));
    }

    #[test]
    fn replace_state_swaps_wholesale() {
        let mut s = session(9);
        let previous = s.replace_state(PlannerState::default());
        assert!(!previous.trains.is_empty());
        assert!(s.state().trains.is_empty());
        assert!(s.state().congestion.is_empty());
    }

    #[test]
    fn reseed_restarts_streams() {
        let fresh = session(12);
        let mut s = session(99);
        s.reseed(12);
        assert_eq!(s.seed(), 12);
        assert_eq!(s.refresh_congestion(), &fresh.state().congestion);
    }
}
