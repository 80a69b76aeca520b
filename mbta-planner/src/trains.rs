//! Simulated vehicle positions and station arrival boards.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::TrainConfig;
use crate::constants::{
    INBOUND_ARRIVAL_MAX, INBOUND_ARRIVAL_MIN, OUTBOUND_ARRIVAL_MAX, OUTBOUND_ARRIVAL_MIN,
    UNKNOWN_STATION_NAME,
};
use crate::network::{Coordinate, TransitNetwork};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainPosition {
    pub id: String,
    pub line: String,
    pub lat: f64,
    pub lng: f64,
    pub direction: Direction,
    pub next_station: String,
    pub arrival_minutes: u32,
}

impl TrainPosition {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Place a handful of trains along each configured line.
///
/// Lines without a route, or whose route has fewer than two coordinates,
/// are skipped.
pub fn generate_positions<R>(
    network: &TransitNetwork,
    cfg: &TrainConfig,
    rng: &mut R,
) -> Vec<TrainPosition>
where
    R: Rng + ?Sized,
{
    let mut trains = Vec::new();
    for line in &cfg.lines {
        let Some(route) = network.route(line) else {
            continue;
        };
        let waypoints = route.coordinates.len();
        if waypoints < 2 {
            continue;
        }

        let count = rng.gen_range(cfg.min_per_line..=cfg.max_per_line);
        for n in 0..count {
            let index = rng.gen_range(0..waypoints - 1);
            let anchor = route.coordinates[index];
            let lat_roll: f64 = rng.r#gen();
            let lng_roll: f64 = rng.r#gen();
            let direction = if rng.r#gen::<f64>() > 0.5 {
                Direction::Inbound
            } else {
                Direction::Outbound
            };
            let next_station = route
                .stations
                .get((index + 1).min(route.stations.len().saturating_sub(1)))
                .and_then(|id| network.station(id))
                .map_or_else(|| UNKNOWN_STATION_NAME.to_string(), |s| s.name.clone());

            trains.push(TrainPosition {
                id: format!("{line}-{n}"),
                line: line.clone(),
                lat: anchor.lat + (lat_roll - 0.5) * cfg.jitter_degrees,
                lng: anchor.lng + (lng_roll - 0.5) * cfg.jitter_degrees,
                direction,
                next_station,
                arrival_minutes: rng.gen_range(cfg.arrival.min..=cfg.arrival.max),
            });
        }
    }

    log::debug!("generated {} train positions", trains.len());
    trains
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationArrival {
    pub line: String,
    pub direction: Direction,
    pub minutes: u32,
}

/// Mock arrival board for a station: one inbound and one outbound train per
/// line, soonest first. Unknown stations have no arrivals.
pub fn generate_arrivals<R>(
    network: &TransitNetwork,
    station_id: &str,
    rng: &mut R,
) -> Vec<StationArrival>
where
    R: Rng + ?Sized,
{
    let Some(station) = network.station(station_id) else {
        return Vec::new();
    };

    let mut arrivals = Vec::with_capacity(station.lines.len() * 2);
    for line in &station.lines {
        arrivals.push(StationArrival {
            line: line.clone(),
            direction: Direction::Inbound,
            minutes: rng.gen_range(INBOUND_ARRIVAL_MIN..=INBOUND_ARRIVAL_MAX),
        });
        arrivals.push(StationArrival {
            line: line.clone(),
            direction: Direction::Outbound,
            minutes: rng.gen_range(OUTBOUND_ARRIVAL_MIN..=OUTBOUND_ARRIVAL_MAX),
        });
    }
    arrivals.sort_by_key(|a| a.minutes);
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Route, Station, TransitMode};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn positions_stay_near_route_waypoints() {
        let network = TransitNetwork::default_network();
        let cfg = TrainConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let trains = generate_positions(network, &cfg, &mut rng);
            for line in &cfg.lines {
                let count = trains.iter().filter(|t| &t.line == line).count();
                assert!((2..=4).contains(&count), "{line}: {count}");
            }
            for train in &trains {
                let route = network.route(&train.line).unwrap();
                let near = route.coordinates[..route.coordinates.len() - 1]
                    .iter()
                    .any(|c| {
                        (train.lat - c.lat).abs() <= 0.0025 && (train.lng - c.lng).abs() <= 0.0025
                    });
                assert!(near, "{} drifted off its line", train.id);
                assert!((1..=5).contains(&train.arrival_minutes));
                assert_ne!(train.next_station, UNKNOWN_STATION_NAME);
            }
        }
    }

    #[test]
    fn ids_count_up_per_line() {
        let network = TransitNetwork::default_network();
        let mut rng = SmallRng::seed_from_u64(8);
        let trains = generate_positions(network, &TrainConfig::default(), &mut rng);
        let red: Vec<&str> = trains
            .iter()
            .filter(|t| t.line == "red")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(red[0], "red-0");
        assert_eq!(red[1], "red-1");
    }

    #[test]
    fn short_or_missing_routes_are_skipped() {
        let lonely = Station {
            id: "solo".to_string(),
            name: "Solo".to_string(),
            lat: 42.0,
            lng: -71.0,
            lines: vec!["red".to_string()],
            modes: vec![TransitMode::Subway],
            accessible: true,
            transfer_time: None,
        };
        let network = TransitNetwork {
            stations: vec![lonely.clone()],
            routes: vec![Route {
                id: "red".to_string(),
                name: "Red Line".to_string(),
                mode: TransitMode::Subway,
                line: Some("red".to_string()),
                color: "#DA291C".to_string(),
                stations: vec![lonely.id.clone()],
                coordinates: vec![lonely.coordinate()],
            }],
            ..TransitNetwork::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(generate_positions(&network, &TrainConfig::default(), &mut rng).is_empty());
    }

    #[test]
    fn arrivals_are_sorted_and_bounded() {
        let network = TransitNetwork::default_network();
        let mut rng = SmallRng::seed_from_u64(21);
        let arrivals = generate_arrivals(network, "park-street", &mut rng);
        assert_eq!(arrivals.len(), 4);
        assert!(arrivals.windows(2).all(|w| w[0].minutes <= w[1].minutes));
        for arrival in &arrivals {
            match arrival.direction {
                Direction::Inbound => assert!((1..=8).contains(&arrival.minutes)),
                Direction::Outbound => assert!((2..=13).contains(&arrival.minutes)),
            }
        }
    }

    #[test]
    fn unknown_station_has_no_arrivals() {
        let mut rng = SmallRng::seed_from_u64(0);
        let board = generate_arrivals(TransitNetwork::default_network(), "nowhere", &mut rng);
        assert!(board.is_empty());
    }
}
