//! MBTA Trip Planner Core
//!
//! Platform-agnostic planning logic over the embedded Boston transit fixture:
//! simulated congestion and train positions, connection confidence, ranked
//! itineraries with congestion-aware alternates, and what-if scenarios.
//! This crate performs no I/O beyond parsing its embedded assets.

pub mod confidence;
pub mod config;
pub mod congestion;
pub mod constants;
pub mod itinerary;
pub mod network;
pub mod numbers;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod tickets;
pub mod timers;
pub mod trains;

use thiserror::Error;

// Re-export commonly used types
pub use confidence::{ConfidenceLevel, ConnectionCountdown, WalkSpeed, classify, format_countdown};
pub use config::{
    ConfigError, CongestionConfig, CrowdingConfig, MinuteRange, PlannerConfig, RefreshConfig,
    TrainConfig, WalkSpeedConfig,
};
pub use congestion::{
    CongestionLevel, CongestionSegment, CongestionState, classify_draw, generate_congestion,
};
pub use itinerary::{
    AlternateCongestion, AlternateRoute, ItineraryBuilder, ItineraryTemplates, RouteStep,
    SyntheticTemplates, TransferOption, TripPlan, build_alternates, build_ranked_options,
    primary_path,
};
pub use network::{
    CommuterRailLine, Coordinate, NetworkError, Route, Station, TransitMode, TransitNetwork,
};
pub use rng::{CountingRng, RngBundle};
pub use scenario::{
    CrowdingLevel, Scenario, ScenarioAdjustment, ScenarioEngine, SubwayLine, apply_scenario,
    fold_scenario,
};
pub use session::{LabeledAlternate, PlannerSession, PlannerState, label_alternates};
pub use tickets::{TicketCatalog, TicketType, recommended_ticket_id};
pub use timers::{RefreshTimers, RepeatingTimer, TimerFires};
pub use trains::{Direction, StationArrival, TrainPosition, generate_arrivals, generate_positions};

/// Trait for abstracting where the fixture and tuning come from
/// Platform-specific implementations should provide this
pub trait NetworkLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the transit network fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded or fails validation.
    fn load_network(&self) -> Result<TransitNetwork, Self::Error>;

    /// Load planner tuning
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or fails validation.
    fn load_config(&self) -> Result<PlannerConfig, Self::Error>;
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Loader backed by the assets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedNetwork;

impl NetworkLoader for EmbeddedNetwork {
    type Error = LoadError;

    fn load_network(&self) -> Result<TransitNetwork, Self::Error> {
        Ok(TransitNetwork::embedded()?)
    }

    fn load_config(&self) -> Result<PlannerConfig, Self::Error> {
        Ok(PlannerConfig::embedded()?)
    }
}

/// Entry point that builds planner sessions from a loader
pub struct PlannerEngine<L>
where
    L: NetworkLoader,
{
    loader: L,
}

impl<L> PlannerEngine<L>
where
    L: NetworkLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Start a session with the default itinerary templates
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture or configuration cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<PlannerSession, L::Error> {
        self.create_session_with(seed, SyntheticTemplates)
    }

    /// Start a session with a custom itinerary template provider
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture or configuration cannot be loaded.
    pub fn create_session_with<T>(
        &self,
        seed: u64,
        templates: T,
    ) -> Result<PlannerSession<T>, L::Error>
    where
        T: ItineraryTemplates,
    {
        let network = self.loader.load_network()?;
        let config = self.loader.load_config()?;
        Ok(PlannerSession::with_templates(network, config, seed, templates))
    }

    /// One-shot trip plan for a seed
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or either station id is unknown.
    pub fn plan_trip(
        &self,
        seed: u64,
        origin_id: &str,
        destination_id: &str,
    ) -> Result<TripPlan, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let mut session = self.create_session(seed).map_err(Into::into)?;
        session
            .plan_trip(origin_id, destination_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown station in {origin_id} -> {destination_id}"))
    }
}
