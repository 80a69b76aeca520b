//! Static transit network fixture: stations, routes, line colors.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::EARTH_RADIUS_MILES;

const DEFAULT_NETWORK_DATA: &str = include_str!("../assets/network.json");

/// Geographic point in degrees, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by a `(lat, lng)` delta.
    #[must_use]
    pub fn offset(self, delta: (f64, f64)) -> Self {
        Self::new(self.lat + delta.0, self.lng + delta.1)
    }

    /// Great-circle distance in miles.
    #[must_use]
    pub fn distance_miles(self, other: Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_MILES * c
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coord: Coordinate) -> Self {
        (coord.lat, coord.lng)
    }
}

/// Transit modes a station or route can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Subway,
    Commuter,
    Bus,
    Ferry,
    Silver,
    /// Paratransit (The RIDE).
    Ride,
}

impl TransitMode {
    pub const ALL: [Self; 6] = [
        Self::Subway,
        Self::Commuter,
        Self::Bus,
        Self::Ferry,
        Self::Silver,
        Self::Ride,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Subway => "subway",
            Self::Commuter => "commuter",
            Self::Bus => "bus",
            Self::Ferry => "ferry",
            Self::Silver => "silver",
            Self::Ride => "ride",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub lines: Vec<String>,
    pub modes: Vec<TransitMode>,
    pub accessible: bool,
    /// Minutes to change between lines at this station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_time: Option<u32>,
}

impl Station {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    #[must_use]
    pub fn serves_line(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    #[must_use]
    pub fn is_transfer_station(&self) -> bool {
        self.lines.len() > 1 || self.modes.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub mode: TransitMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    pub color: String,
    pub stations: Vec<String>,
    pub coordinates: Vec<Coordinate>,
}

impl Route {
    #[must_use]
    pub fn position_of(&self, station_id: &str) -> Option<usize> {
        self.stations.iter().position(|s| s == station_id)
    }

    #[must_use]
    pub fn contains(&self, station_id: &str) -> bool {
        self.position_of(station_id).is_some()
    }

    /// Adjacent station pairs in route order.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stations
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuterRailLine {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Errors raised when a network fixture violates its shape invariants.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate station id {id}")]
    DuplicateStation { id: String },
    #[error("station {station} must belong to at least one line")]
    EmptyLines { station: String },
    #[error("station {station} must support at least one mode")]
    EmptyModes { station: String },
    #[error("route {route} references unknown station {station}")]
    UnknownStation { route: String, station: String },
    #[error("route {route} has {stations} stations but {coordinates} coordinates")]
    CoordinateMismatch {
        route: String,
        stations: usize,
        coordinates: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransitNetwork {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub commuter_rail_lines: Vec<CommuterRailLine>,
}

impl TransitNetwork {
    /// Parse and validate a network fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the fixture is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        let network: Self = serde_json::from_str(json)?;
        network.validate()?;
        Ok(network)
    }

    /// Parse the embedded MBTA fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails to parse or validate.
    pub fn embedded() -> Result<Self, NetworkError> {
        Self::from_json(DEFAULT_NETWORK_DATA)
    }

    /// Load the embedded MBTA fixture, falling back to an empty network.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::embedded().unwrap_or_else(|err| {
            log::warn!("embedded network fixture rejected: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_network() -> &'static Self {
        static NETWORK: OnceLock<TransitNetwork> = OnceLock::new();
        NETWORK.get_or_init(Self::load_from_static)
    }

    /// Check fixture invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), NetworkError> {
        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id.as_str()) {
                return Err(NetworkError::DuplicateStation {
                    id: station.id.clone(),
                });
            }
            if station.lines.is_empty() {
                return Err(NetworkError::EmptyLines {
                    station: station.id.clone(),
                });
            }
            if station.modes.is_empty() {
                return Err(NetworkError::EmptyModes {
                    station: station.id.clone(),
                });
            }
        }

        for route in &self.routes {
            if route.stations.len() != route.coordinates.len() {
                return Err(NetworkError::CoordinateMismatch {
                    route: route.id.clone(),
                    stations: route.stations.len(),
                    coordinates: route.coordinates.len(),
                });
            }
            if let Some(missing) = route.stations.iter().find(|id| !seen.contains(id.as_str())) {
                return Err(NetworkError::UnknownStation {
                    route: route.id.clone(),
                    station: missing.clone(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// First route (in fixture order) whose station sequence includes `station_id`.
    #[must_use]
    pub fn route_containing(&self, station_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.contains(station_id))
    }

    #[must_use]
    pub fn stations_by_line(&self, line: &str) -> Vec<&Station> {
        self.stations.iter().filter(|s| s.serves_line(line)).collect()
    }

    #[must_use]
    pub fn transfer_stations(&self) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|s| s.is_transfer_station())
            .collect()
    }

    #[must_use]
    pub fn line_color(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    /// Number of directed segments across every route.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.routes
            .iter()
            .map(|r| r.stations.len().saturating_sub(1))
            .sum()
    }
}
