#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod accounts;
mod drivers;
mod fares;
mod feedback;
mod ids;
mod latlon;
mod notices;
mod route_stops;
mod routes;
mod shapes;
mod stops;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use geom::GPSBounds;

pub use accounts::{Account, AccountStatus, Role};
pub use drivers::Driver;
pub use fares::FareEntry;
pub use feedback::{Feedback, FeedbackCategory, FeedbackID, FeedbackStatus};
pub use ids::{orig, CheapID, DriverID, IDMapping, RouteID, StopID};
pub use latlon::LatLon;
pub use notices::{Notice, Severity};
pub use routes::{parse_time, NewRoute, Popularity, Route, RouteStop};
pub use stops::{Stop, StopKind};

/// The whole jeepney network, plus the seed data that goes with it. This is the one source of
/// truth for routes and stops; every page reads from here.
#[derive(Clone)]
pub struct Network {
    pub stops: BTreeMap<StopID, Stop>,
    pub routes: BTreeMap<RouteID, Route>,
    /// The published fare matrix
    pub fares: Vec<FareEntry>,
    pub drivers: BTreeMap<DriverID, Driver>,
    pub accounts: Vec<Account>,
    pub feedback: Vec<Feedback>,
    pub notices: Vec<Notice>,

    stop_ids: IDMapping<orig::StopID, StopID>,
    route_ids: IDMapping<orig::RouteID, RouteID>,
}

/// Where to read the CSV tables from
#[derive(Clone, Debug)]
pub enum Source {
    /// The copy compiled into the binary
    Embedded,
    /// A directory containing routes.csv, stops.csv, etc
    Directory(String),
}

impl Source {
    fn read(&self, table: &str) -> Result<String> {
        match self {
            Source::Embedded => embedded_table(table)
                .map(|x| x.to_string())
                .ok_or_else(|| anyhow!("no embedded table {table}")),
            Source::Directory(dir) => {
                let path = format!("{}/{table}", dir.trim_end_matches('/'));
                fs_err::read_to_string(&path).map_err(|err| anyhow!("{path}: {err}"))
            }
        }
    }
}

fn embedded_table(table: &str) -> Option<&'static str> {
    Some(match table {
        "routes.csv" => include_str!("../data/routes.csv"),
        "route_shapes.csv" => include_str!("../data/route_shapes.csv"),
        "route_stops.csv" => include_str!("../data/route_stops.csv"),
        "stops.csv" => include_str!("../data/stops.csv"),
        "fares.csv" => include_str!("../data/fares.csv"),
        "drivers.csv" => include_str!("../data/drivers.csv"),
        "accounts.csv" => include_str!("../data/accounts.csv"),
        "feedback.csv" => include_str!("../data/feedback.csv"),
        "notices.csv" => include_str!("../data/notices.csv"),
        _ => return None,
    })
}

// Adds the table name in the error message
fn parse_table<T, F: FnOnce(&[u8]) -> Result<T>>(
    source: &Source,
    table: &str,
    parse: F,
) -> Result<T> {
    let contents = source.read(table)?;
    parse(contents.as_bytes()).map_err(|err| anyhow!("{table}: {err}"))
}

impl Network {
    pub fn load_embedded() -> Result<Self> {
        Self::load(&Source::Embedded)
    }

    pub fn load_from_dir(dir: String) -> Result<Self> {
        Self::load(&Source::Directory(dir))
    }

    pub fn load(source: &Source) -> Result<Self> {
        let (mut stops, stop_ids) = parse_table(source, "stops.csv", |x| stops::load(x))?;
        let (mut routes, route_ids) = parse_table(source, "routes.csv", |x| routes::load(x))?;

        let mut shapes = parse_table(source, "route_shapes.csv", |x| shapes::load(x))?;
        for route in routes.values_mut() {
            match shapes.remove(&route.orig_id) {
                Some(shape) => {
                    route.shape = shape;
                }
                None => warn!("{:?} has no shape", route.orig_id),
            }
        }
        if !shapes.is_empty() {
            bail!(
                "route_shapes.csv: shapes defined for unknown routes {:?}",
                shapes.keys().collect::<Vec<_>>()
            );
        }

        let mut stops_per_route = parse_table(source, "route_stops.csv", |x| {
            route_stops::load(x, &route_ids, &stop_ids)
        })?;
        for route in routes.values_mut() {
            if let Some(list) = stops_per_route.remove(&route.id) {
                route.stops = list;
            }
            if route.stops.len() < 2 {
                warn!("{:?} has fewer than two stops", route.orig_id);
            }
        }
        link_stops_to_routes(&mut stops, &routes);

        let fares = parse_table(source, "fares.csv", |x| fares::load(x, &stop_ids))?;
        let drivers = parse_table(source, "drivers.csv", |x| drivers::load(x, &route_ids))?;
        let accounts = parse_table(source, "accounts.csv", |x| accounts::load(x))?;
        for account in &accounts {
            if let Some(id) = account.driver {
                if !drivers.contains_key(&id) {
                    bail!("accounts.csv: {} refers to unknown {:?}", account.email, id);
                }
            }
        }
        let feedback = parse_table(source, "feedback.csv", |x| feedback::load(x, &route_ids))?;
        for f in &feedback {
            if let Some(id) = f.driver {
                if !drivers.contains_key(&id) {
                    bail!("feedback.csv: {:?} refers to unknown {:?}", f.id, id);
                }
            }
        }
        let notices = parse_table(source, "notices.csv", |x| notices::load(x))?;

        let network = Self {
            stops,
            routes,
            fares,
            drivers,
            accounts,
            feedback,
            notices,
            stop_ids,
            route_ids,
        };
        info!(
            "Loaded {} routes, {} stops, {} drivers from {:?}",
            network.routes.len(),
            network.stops.len(),
            network.drivers.len(),
            source
        );
        Ok(network)
    }

    pub fn empty() -> Self {
        Self {
            stops: BTreeMap::new(),
            routes: BTreeMap::new(),
            fares: Vec::new(),
            drivers: BTreeMap::new(),
            accounts: Vec::new(),
            feedback: Vec::new(),
            notices: Vec::new(),
            stop_ids: IDMapping::new(),
            route_ids: IDMapping::new(),
        }
    }

    pub fn stop_id(&self, orig: &orig::StopID) -> Result<StopID> {
        self.stop_ids.lookup(orig)
    }

    pub fn route_id(&self, orig: &orig::RouteID) -> Result<RouteID> {
        self.route_ids.lookup(orig)
    }

    /// Covers every finite stop position and shape point.
    pub fn gps_bounds(&self) -> GPSBounds {
        let mut bounds = GPSBounds::new();
        for stop in self.stops.values() {
            if let Some(pt) = stop.pos.to_lonlat() {
                bounds.update(pt);
            }
        }
        for route in self.routes.values() {
            for pt in &route.shape {
                if let Some(pt) = pt.to_lonlat() {
                    bounds.update(pt);
                }
            }
        }
        bounds
    }

    pub fn drivers_on_route(&self, route: RouteID) -> Vec<&Driver> {
        self.drivers
            .values()
            .filter(|d| d.route == route)
            .collect()
    }

    pub fn add_stop(
        &mut self,
        orig_id: orig::StopID,
        name: String,
        kind: StopKind,
        pos: LatLon,
    ) -> Result<StopID> {
        if name.trim().is_empty() {
            bail!("A stop needs a name");
        }
        if !pos.is_finite() {
            bail!("{name} has an unusable position {pos:?}");
        }
        let id = self.stop_ids.insert_new(orig_id.clone())?;
        self.stops.insert(
            id,
            Stop {
                id,
                orig_id,
                name,
                kind,
                pos,
                landmarks: Vec::new(),
                facilities: Vec::new(),
                tips: String::new(),
                routes: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    pub fn add_route(&mut self, new: NewRoute) -> Result<RouteID> {
        if new.name.trim().is_empty() {
            bail!("A route needs a name");
        }
        if new.fare_min > new.fare_max {
            bail!("The minimum fare can't exceed the maximum");
        }
        if !(new.distance_km.is_finite() && new.distance_km > 0.0) {
            bail!("Route distance must be positive");
        }
        let id = self.route_ids.insert_new(new.orig_id.clone())?;
        self.routes.insert(
            id,
            Route {
                id,
                orig_id: new.orig_id,
                name: new.name,
                origin: new.origin,
                destination: new.destination,
                color: new.color,
                fare_min: new.fare_min,
                fare_max: new.fare_max,
                distance_km: new.distance_km,
                duration: String::new(),
                popularity: Popularity::Low,
                first_trip: parse_time("06:00")?,
                last_trip: parse_time("20:00")?,
                headway_minutes: 15,
                landmarks: Vec::new(),
                shape: Vec::new(),
                stops: Vec::new(),
            },
        );
        Ok(id)
    }
}

fn link_stops_to_routes(stops: &mut BTreeMap<StopID, Stop>, routes: &BTreeMap<RouteID, Route>) {
    for route in routes.values() {
        for rs in &route.stops {
            if let Some(stop) = stops.get_mut(&rs.stop) {
                stop.routes.insert(route.id);
            }
        }
    }
}

/// Splits a `;`-separated cell, dropping blank entries
pub fn split_list(x: &str) -> Vec<String> {
    x.split(';')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_embedded() {
        let network = Network::load_embedded().unwrap();
        assert_eq!(network.routes.len(), 7);
        assert_eq!(network.stops.len(), 12);
        assert_eq!(network.drivers.len(), 6);

        let desmark = &network.routes[&network
            .route_id(&orig::RouteID("desmark".to_string()))
            .unwrap()];
        assert_eq!(desmark.color, "#2E7D32");
        assert!(desmark.shape.len() >= 2);
        let (first, last) = desmark.terminals().unwrap();
        assert_eq!(network.stops[&first].kind, StopKind::Terminal);
        assert_eq!(network.stops[&last].name, "Desmark");

        // Every route starts at Suarez
        let suarez = network
            .stop_id(&orig::StopID("suarez_terminal".to_string()))
            .unwrap();
        assert_eq!(network.stops[&suarez].routes.len(), 7);
    }

    #[test]
    fn every_embedded_point_is_usable() {
        let network = Network::load_embedded().unwrap();
        for route in network.routes.values() {
            assert!(route.shape.iter().all(|pt| pt.is_finite()), "{}", route.name);
        }
        let bounds = network.gps_bounds();
        for stop in network.stops.values() {
            let pt = stop.pos;
            assert!(pt.lat >= bounds.min_lat - 1e-6 && pt.lat <= bounds.max_lat + 1e-6);
            assert!(pt.lon >= bounds.min_lon - 1e-6 && pt.lon <= bounds.max_lon + 1e-6);
        }
    }

    #[test]
    fn missing_directory_names_the_table() {
        let err = Network::load_from_dir("/definitely/not/here".to_string())
            .err()
            .unwrap();
        assert!(err.to_string().contains("stops.csv"));
    }

    #[test]
    fn add_stop_and_route() {
        let mut network = Network::load_embedded().unwrap();
        let id = network
            .add_stop(
                orig::StopID("tambo".to_string()),
                "Tambo".to_string(),
                StopKind::Regular,
                LatLon::new(8.21, 124.23),
            )
            .unwrap();
        assert_eq!(network.stops[&id].name, "Tambo");
        assert!(network
            .add_stop(
                orig::StopID("tambo".to_string()),
                "Tambo again".to_string(),
                StopKind::Regular,
                LatLon::new(8.21, 124.23),
            )
            .is_err());
        assert!(network
            .add_stop(
                orig::StopID("nowhere".to_string()),
                "Nowhere".to_string(),
                StopKind::Regular,
                LatLon::new(f64::NAN, 124.23),
            )
            .is_err());

        let route = network
            .add_route(NewRoute {
                orig_id: orig::RouteID("tambo".to_string()),
                name: "Suarez to Tambo".to_string(),
                origin: "Barangay Suarez Terminal".to_string(),
                destination: "Tambo".to_string(),
                color: "#455A64".to_string(),
                distance_km: 3.0,
                fare_min: 10,
                fare_max: 10,
            })
            .unwrap();
        assert!(network.routes[&route].shape.is_empty());
        assert_eq!(network.routes.len(), 8);
    }

    #[test]
    fn geojson_export() {
        let network = Network::load_embedded().unwrap();
        let route = network.routes.values().next().unwrap();
        let gj = route.to_geojson(&network).unwrap();
        assert!(gj.contains("\"LineString\""));
        assert_eq!(gj.matches("\"stop_sequence\"").count(), route.stops.len());
    }

    #[test]
    fn split() {
        assert_eq!(split_list(" a; b ;;c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
