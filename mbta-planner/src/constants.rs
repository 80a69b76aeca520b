//! Centralized tuning constants for the planner core.
//!
//! The JSON assets under `assets/` carry the same values; these are the
//! fallbacks used when an asset is missing a section and the literals that
//! the synthetic itinerary templates are built from.

use crate::network::Coordinate;

// Congestion draw ----------------------------------------------------------
pub(crate) const CONGESTION_MODERATE_THRESHOLD: f64 = 0.70;
pub(crate) const CONGESTION_SEVERE_THRESHOLD: f64 = 0.85;
pub(crate) const MODERATE_DELAY_MIN: u32 = 2;
pub(crate) const MODERATE_DELAY_MAX: u32 = 6;
pub(crate) const SEVERE_DELAY_MIN: u32 = 5;
pub(crate) const SEVERE_DELAY_MAX: u32 = 14;

// Scenario fold ------------------------------------------------------------
/// Substring matched against segment endpoint ids when folding the red-line delay.
pub(crate) const RED_LINE_TAG: &str = "red";
pub(crate) const CROWDING_LIGHT_MULTIPLIER: f64 = 0.5;
pub(crate) const CROWDING_NORMAL_MULTIPLIER: f64 = 1.0;
pub(crate) const CROWDING_HEAVY_MULTIPLIER: f64 = 1.5;
pub(crate) const TIME_SHIFT_MIN: i32 = -30;
pub(crate) const TIME_SHIFT_MAX: i32 = 30;
pub(crate) const TIME_SHIFT_STEP: i32 = 5;
pub(crate) const LINE_DELAY_MAX: u32 = 30;

// Confidence ---------------------------------------------------------------
pub(crate) const CONFIDENCE_LIKELY_MIN_BUFFER: i32 = 5;
pub(crate) const CONFIDENCE_RISKY_MIN_BUFFER: i32 = 1;

// Train positions ----------------------------------------------------------
pub(crate) const TRAIN_LINES: [&str; 4] = ["red", "orange", "blue", "green"];
pub(crate) const TRAINS_PER_LINE_MIN: u32 = 2;
pub(crate) const TRAINS_PER_LINE_MAX: u32 = 4;
pub(crate) const TRAIN_JITTER_DEGREES: f64 = 0.005;
pub(crate) const TRAIN_ARRIVAL_MIN: u32 = 1;
pub(crate) const TRAIN_ARRIVAL_MAX: u32 = 5;
pub(crate) const UNKNOWN_STATION_NAME: &str = "Unknown";

// Station arrivals ---------------------------------------------------------
pub(crate) const INBOUND_ARRIVAL_MIN: u32 = 1;
pub(crate) const INBOUND_ARRIVAL_MAX: u32 = 8;
pub(crate) const OUTBOUND_ARRIVAL_MIN: u32 = 2;
pub(crate) const OUTBOUND_ARRIVAL_MAX: u32 = 13;

// Refresh cadence (abstract time units) -------------------------------------
pub(crate) const CONGESTION_REFRESH_INTERVAL: u32 = 30;
pub(crate) const TRAINS_REFRESH_INTERVAL: u32 = 10;
pub(crate) const COUNTDOWN_INTERVAL: u32 = 1;

// Connection countdown (seconds) -------------------------------------------
pub(crate) const COUNTDOWN_ARRIVAL_SECS: u32 = 180;
pub(crate) const COUNTDOWN_DEPARTURE_SECS: u32 = 300;
pub(crate) const COUNTDOWN_WALK_SECS: u32 = 120;

// Walk speed ---------------------------------------------------------------
pub(crate) const WALK_SLOW_FACTOR: f64 = 1.5;
pub(crate) const WALK_NORMAL_FACTOR: f64 = 1.0;
pub(crate) const WALK_FAST_FACTOR: f64 = 0.7;

// Alternates ---------------------------------------------------------------
pub(crate) const DOWNTOWN_CROSSING: Coordinate = Coordinate::new(42.3555, -71.0603);
pub(crate) const BACK_BAY: Coordinate = Coordinate::new(42.3473, -71.0756);
pub(crate) const ORANGE_ALTERNATE_COLOR: &str = "#8B5CF6";
pub(crate) const ORANGE_ALTERNATE_DURATION: u32 = 22;
pub(crate) const ORANGE_ALTERNATE_SAVINGS: u32 = 5;
pub(crate) const BUS_ALTERNATE_COLOR: &str = "#14B8A6";
pub(crate) const BUS_ALTERNATE_DURATION: u32 = 28;
pub(crate) const BUS_ALTERNATE_SAVINGS: u32 = 2;
pub(crate) const BUS_ALTERNATE_ORIGIN_OFFSET: (f64, f64) = (0.01, -0.02);
pub(crate) const BUS_ALTERNATE_DESTINATION_OFFSET: (f64, f64) = (-0.01, 0.01);

// Ranked options -----------------------------------------------------------
pub(crate) const BASE_DURATION_MIN: u32 = 10;
pub(crate) const BASE_DURATION_MAX: u32 = 24;
pub(crate) const SUBWAY_FARE: f64 = 2.4;
pub(crate) const TRANSFER_HUB_PARK_STREET: &str = "Park Street";
pub(crate) const TRANSFER_HUB_HARVARD: &str = "Harvard";
pub(crate) const ALTERNATE_ID_PREFIX: &str = "alt-";

// Tickets ------------------------------------------------------------------
pub(crate) const TICKET_DAY_PASS: &str = "day-pass";
pub(crate) const TICKET_SINGLE_SUBWAY: &str = "single-subway";
pub(crate) const DAY_PASS_MIN_TRANSFERS: u32 = 2;

// Geometry -----------------------------------------------------------------
pub(crate) const EARTH_RADIUS_MILES: f64 = 3959.0;
