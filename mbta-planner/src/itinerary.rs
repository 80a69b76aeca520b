//! Primary paths, alternates, and ranked transfer options for a trip request.
//!
//! The alternates and ranked options are authored templates rather than
//! search results; they sit behind [`ItineraryTemplates`] so a real
//! provider can replace [`SyntheticTemplates`] without touching callers.
use chrono::NaiveTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::config::MinuteRange;
use crate::confidence::{ConfidenceLevel, classify};
use crate::congestion::{CongestionLevel, CongestionState};
use crate::constants::{
    BACK_BAY, BASE_DURATION_MAX, BASE_DURATION_MIN, BUS_ALTERNATE_COLOR,
    BUS_ALTERNATE_DESTINATION_OFFSET, BUS_ALTERNATE_DURATION, BUS_ALTERNATE_ORIGIN_OFFSET,
    BUS_ALTERNATE_SAVINGS, DOWNTOWN_CROSSING, ORANGE_ALTERNATE_COLOR, ORANGE_ALTERNATE_DURATION,
    ORANGE_ALTERNATE_SAVINGS, RED_LINE_TAG, SUBWAY_FARE, TRANSFER_HUB_HARVARD,
    TRANSFER_HUB_PARK_STREET,
};
use crate::network::{Coordinate, Station, TransitMode, TransitNetwork};

/// Wall-clock times rendered the way itinerary cards show them, e.g. `2:15 PM`.
pub mod clock_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%-I:%M %p";

    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    /// # Errors
    ///
    /// Returns an error if the value is not an `h:mm AM/PM` string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Afternoon clock time; out-of-range literals collapse to midnight.
fn pm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour + 12, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub mode: TransitMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(with = "clock_format")]
    pub depart_time: NaiveTime,
    #[serde(with = "clock_format")]
    pub arrive_time: NaiveTime,
    pub duration: u32,
    pub direction: String,
}

pub type RouteSteps = SmallVec<[RouteStep; 2]>;
pub type ModeSet = SmallVec<[TransitMode; 2]>;

/// A candidate itinerary with its connection confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOption {
    #[serde(with = "clock_format")]
    pub departure_time: NaiveTime,
    #[serde(with = "clock_format")]
    pub arrival_time: NaiveTime,
    /// Minutes door to door; authored independently of the step durations.
    pub duration: u32,
    pub transfers: u32,
    pub confidence: ConfidenceLevel,
    /// Minutes of slack at the transfer; may be negative.
    pub buffer: i32,
    pub modes: ModeSet,
    pub route: RouteSteps,
    pub congestion_level: CongestionLevel,
    pub fare: f64,
}

impl TransferOption {
    #[must_use]
    pub fn step_duration_total(&self) -> u32 {
        self.route.iter().map(|s| s.duration).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlternateCongestion {
    Low,
    Moderate,
    High,
}

/// Alternate path offered while the main route is congested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateRoute {
    pub path: Vec<Coordinate>,
    pub color: String,
    pub label: String,
    pub duration: u32,
    pub congestion: AlternateCongestion,
    pub savings: u32,
    pub reason: String,
}

/// Source of the authored alternates and ranked options.
pub trait ItineraryTemplates {
    /// Alternates for a congested network; must be empty when nothing is congested.
    fn alternates(
        &self,
        origin: &Station,
        destination: &Station,
        congestion: &CongestionState,
    ) -> Vec<AlternateRoute>;

    /// Ranked options in presentation order, given a drawn base duration.
    fn ranked_options(
        &self,
        origin: &Station,
        destination: &Station,
        base_duration: u32,
    ) -> Vec<TransferOption>;

    /// Range the base duration is drawn from.
    fn base_duration_range(&self) -> MinuteRange {
        MinuteRange::new(BASE_DURATION_MIN, BASE_DURATION_MAX)
    }
}

/// The literal Boston templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticTemplates;

impl SyntheticTemplates {
    fn orange_alternate(origin: &Station, destination: &Station) -> AlternateRoute {
        AlternateRoute {
            path: vec![
                origin.coordinate(),
                DOWNTOWN_CROSSING,
                BACK_BAY,
                destination.coordinate(),
            ],
            color: ORANGE_ALTERNATE_COLOR.to_string(),
            label: "Via Orange Line".to_string(),
            duration: ORANGE_ALTERNATE_DURATION,
            congestion: AlternateCongestion::Low,
            savings: ORANGE_ALTERNATE_SAVINGS,
            reason: "Orange Line currently has better on-time performance".to_string(),
        }
    }

    fn bus_alternate(origin: &Station, destination: &Station) -> AlternateRoute {
        let from = origin.coordinate();
        let to = destination.coordinate();
        AlternateRoute {
            path: vec![
                from,
                from.offset(BUS_ALTERNATE_ORIGIN_OFFSET),
                to.offset(BUS_ALTERNATE_DESTINATION_OFFSET),
                to,
            ],
            color: BUS_ALTERNATE_COLOR.to_string(),
            label: "Bus + Subway".to_string(),
            duration: BUS_ALTERNATE_DURATION,
            congestion: AlternateCongestion::Moderate,
            savings: BUS_ALTERNATE_SAVINGS,
            reason: "Bus 66 avoids underground delays, then transfer to subway".to_string(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn step(
    mode: TransitMode,
    line: &str,
    from: &str,
    to: &str,
    depart_time: NaiveTime,
    arrive_time: NaiveTime,
    duration: u32,
    direction: &str,
) -> RouteStep {
    RouteStep {
        mode,
        line: Some(line.to_string()),
        from: from.to_string(),
        to: to.to_string(),
        depart_time,
        arrive_time,
        duration,
        direction: direction.to_string(),
    }
}

impl ItineraryTemplates for SyntheticTemplates {
    fn alternates(
        &self,
        origin: &Station,
        destination: &Station,
        congestion: &CongestionState,
    ) -> Vec<AlternateRoute> {
        if !congestion.has_congestion() {
            return Vec::new();
        }

        let mut alternates = Vec::with_capacity(2);
        if origin.serves_line(RED_LINE_TAG) || destination.serves_line(RED_LINE_TAG) {
            alternates.push(Self::orange_alternate(origin, destination));
        }
        alternates.push(Self::bus_alternate(origin, destination));
        alternates
    }

    fn ranked_options(
        &self,
        origin: &Station,
        destination: &Station,
        base_duration: u32,
    ) -> Vec<TransferOption> {
        let from = origin.name.as_str();
        let to = destination.name.as_str();

        vec![
            TransferOption {
                departure_time: pm(2, 15),
                arrival_time: pm(2, 35),
                duration: base_duration,
                transfers: 1,
                confidence: classify(7),
                buffer: 7,
                modes: smallvec![TransitMode::Subway],
                route: smallvec![
                    step(
                        TransitMode::Subway,
                        "Red Line",
                        from,
                        TRANSFER_HUB_PARK_STREET,
                        pm(2, 15),
                        pm(2, 25),
                        10,
                        "Inbound",
                    ),
                    step(
                        TransitMode::Subway,
                        "Green Line",
                        TRANSFER_HUB_PARK_STREET,
                        to,
                        pm(2, 27),
                        pm(2, 35),
                        8,
                        "Outbound",
                    ),
                ],
                congestion_level: CongestionLevel::Normal,
                fare: SUBWAY_FARE,
            },
            TransferOption {
                departure_time: pm(2, 18),
                arrival_time: pm(2, 42),
                duration: base_duration + 6,
                transfers: 0,
                confidence: classify(3),
                buffer: 3,
                modes: smallvec![TransitMode::Subway],
                route: smallvec![step(
                    TransitMode::Subway,
                    "Orange Line",
                    from,
                    to,
                    pm(2, 18),
                    pm(2, 42),
                    24,
                    "Southbound",
                )],
                congestion_level: CongestionLevel::Moderate,
                fare: SUBWAY_FARE,
            },
            TransferOption {
                departure_time: pm(2, 20),
                arrival_time: pm(2, 50),
                duration: base_duration + 10,
                transfers: 1,
                confidence: classify(0),
                buffer: 0,
                modes: smallvec![TransitMode::Bus, TransitMode::Subway],
                route: smallvec![
                    step(
                        TransitMode::Bus,
                        "Bus 66",
                        from,
                        TRANSFER_HUB_HARVARD,
                        pm(2, 20),
                        pm(2, 35),
                        15,
                        "Outbound",
                    ),
                    step(
                        TransitMode::Subway,
                        "Red Line",
                        TRANSFER_HUB_HARVARD,
                        to,
                        pm(2, 38),
                        pm(2, 50),
                        12,
                        "Inbound",
                    ),
                ],
                congestion_level: CongestionLevel::Severe,
                fare: SUBWAY_FARE,
            },
        ]
    }
}

/// Path drawn for the main route.
///
/// When both stations sit on the same fixed route the result is that route's
/// coordinate slice between them in canonical route order, whichever end the
/// trip starts from. Anything else is a straight two-point segment.
#[must_use]
pub fn primary_path(
    network: &TransitNetwork,
    origin: &Station,
    destination: &Station,
) -> Vec<Coordinate> {
    let straight = || vec![origin.coordinate(), destination.coordinate()];

    let (Some(from_route), Some(to_route)) = (
        network.route_containing(&origin.id),
        network.route_containing(&destination.id),
    ) else {
        return straight();
    };
    if from_route.id != to_route.id {
        return straight();
    }
    let (Some(from_idx), Some(to_idx)) = (
        from_route.position_of(&origin.id),
        from_route.position_of(&destination.id),
    ) else {
        return straight();
    };

    let start = from_idx.min(to_idx);
    let end = from_idx.max(to_idx);
    from_route
        .coordinates
        .get(start..=end)
        .map_or_else(straight, <[Coordinate]>::to_vec)
}

/// Alternates from the default templates.
#[must_use]
pub fn build_alternates(
    origin: &Station,
    destination: &Station,
    congestion: &CongestionState,
) -> Vec<AlternateRoute> {
    SyntheticTemplates.alternates(origin, destination, congestion)
}

/// Ranked options from the default templates with a freshly drawn base duration.
pub fn build_ranked_options<R>(
    origin: &Station,
    destination: &Station,
    rng: &mut R,
) -> Vec<TransferOption>
where
    R: Rng + ?Sized,
{
    ItineraryBuilder::new(SyntheticTemplates).ranked_options(origin, destination, rng)
}

/// Everything produced for one trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub origin: Station,
    pub destination: Station,
    pub path: Vec<Coordinate>,
    pub alternates: Vec<AlternateRoute>,
    pub options: Vec<TransferOption>,
}

/// Builds trip plans from a template provider.
#[derive(Debug, Clone, Default)]
pub struct ItineraryBuilder<T: ItineraryTemplates> {
    templates: T,
}

impl<T: ItineraryTemplates> ItineraryBuilder<T> {
    #[must_use]
    pub const fn new(templates: T) -> Self {
        Self { templates }
    }

    #[must_use]
    pub const fn templates(&self) -> &T {
        &self.templates
    }

    pub fn ranked_options<R>(
        &self,
        origin: &Station,
        destination: &Station,
        rng: &mut R,
    ) -> Vec<TransferOption>
    where
        R: Rng + ?Sized,
    {
        let range = self.templates.base_duration_range();
        let base = rng.gen_range(range.min..=range.max);
        self.templates.ranked_options(origin, destination, base)
    }

    pub fn plan<R>(
        &self,
        network: &TransitNetwork,
        origin: &Station,
        destination: &Station,
        congestion: &CongestionState,
        rng: &mut R,
    ) -> TripPlan
    where
        R: Rng + ?Sized,
    {
        let path = primary_path(network, origin, destination);
        let alternates = self.templates.alternates(origin, destination, congestion);
        let options = self.ranked_options(origin, destination, rng);
        log::debug!(
            "planned {} -> {}: {} path points, {} alternates, {} options",
            origin.id,
            destination.id,
            path.len(),
            alternates.len(),
            options.len()
        );
        TripPlan {
            origin: origin.clone(),
            destination: destination.clone(),
            path,
            alternates,
            options,
        }
    }
}
