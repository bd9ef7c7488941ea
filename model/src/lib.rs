#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod admin;
pub mod auth;
pub mod fares;
pub mod feedback;
pub mod map;
pub mod navigation;
pub mod scan;
pub mod search;

use std::collections::BTreeSet;

use anyhow::Result;
use geom::{Bounds, GPSBounds};

use network::{Network, RouteID, Source, StopID, StopKind};

use self::auth::AccountStore;
use self::fares::FareTable;
use self::feedback::FeedbackStore;
use self::map::{MarkerDescriptor, MarkerKind, RouteDescriptor};

pub struct Model {
    pub network: Network,
    pub bounds: Bounds,
    pub gps_bounds: GPSBounds,
    pub accounts: AccountStore,
    pub feedback: FeedbackStore,
    pub fare_table: FareTable,
}

/// Which part of the network a map shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapFilter {
    Everything,
    Route(RouteID),
    /// The stop and every route serving it
    Stop(StopID),
    Nothing,
}

impl Model {
    pub fn load(source: &Source) -> Result<Self> {
        Ok(Self::new(Network::load(source)?))
    }

    pub fn new(mut network: Network) -> Self {
        let accounts = AccountStore::new(std::mem::take(&mut network.accounts));
        let feedback = FeedbackStore::new(std::mem::take(&mut network.feedback));
        let gps_bounds = network.gps_bounds();
        Self {
            bounds: gps_bounds.to_bounds(),
            gps_bounds,
            network,
            accounts,
            feedback,
            fare_table: FareTable::default(),
        }
    }

    fn routes_matching(&self, filter: MapFilter) -> Vec<RouteID> {
        match filter {
            MapFilter::Everything => self.network.routes.keys().cloned().collect(),
            MapFilter::Route(r) => vec![r],
            MapFilter::Stop(s) => self
                .network
                .stops
                .get(&s)
                .map(|stop| stop.routes.iter().cloned().collect())
                .unwrap_or_else(Vec::new),
            MapFilter::Nothing => Vec::new(),
        }
    }

    pub fn route_descriptors(&self, filter: MapFilter) -> Vec<RouteDescriptor> {
        self.routes_matching(filter)
            .into_iter()
            .filter_map(|r| self.network.routes.get(&r))
            .map(|route| RouteDescriptor::new(&route.name, &route.color, route.shape.clone()))
            .collect()
    }

    /// The first and last stops of shown routes become terminal markers, along with stops that
    /// are terminals themselves.
    pub fn stop_markers(&self, filter: MapFilter) -> Vec<MarkerDescriptor> {
        let routes = self.routes_matching(filter);
        let mut terminals = BTreeSet::new();
        for r in &routes {
            if let Some((first, last)) = self.network.routes.get(r).and_then(|r| r.terminals()) {
                terminals.insert(first);
                terminals.insert(last);
            }
        }

        let stops: Vec<StopID> = match filter {
            MapFilter::Everything => self.network.stops.keys().cloned().collect(),
            MapFilter::Route(r) => self
                .network
                .routes
                .get(&r)
                .map(|route| route.stops.iter().map(|rs| rs.stop).collect())
                .unwrap_or_else(Vec::new),
            MapFilter::Stop(s) => vec![s],
            MapFilter::Nothing => Vec::new(),
        };

        stops
            .into_iter()
            .filter_map(|s| self.network.stops.get(&s))
            .map(|stop| {
                let kind = if stop.kind == StopKind::Terminal || terminals.contains(&stop.id) {
                    MarkerKind::Terminal
                } else {
                    MarkerKind::Stop
                };
                MarkerDescriptor::new(stop.pos, &stop.name, kind)
            })
            .collect()
    }

    /// Measured along the route's shape
    pub fn route_length_km(&self, route: RouteID) -> f64 {
        self.network
            .routes
            .get(&route)
            .map(|r| map::path_length_meters(&r.shape) / 1000.0)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network::orig;

    fn model() -> Model {
        Model::load(&Source::Embedded).unwrap()
    }

    #[test]
    fn one_descriptor_per_route() {
        let model = model();
        let all = model.route_descriptors(MapFilter::Everything);
        assert_eq!(all.len(), model.network.routes.len());
        assert!(model.route_descriptors(MapFilter::Nothing).is_empty());
        assert_eq!(
            model.stop_markers(MapFilter::Everything).len(),
            model.network.stops.len()
        );
    }

    #[test]
    fn route_terminals() {
        let model = model();
        let r = model
            .network
            .route_id(&orig::RouteID("robinsons".to_string()))
            .unwrap();
        let markers = model.stop_markers(MapFilter::Route(r));
        let route = &model.network.routes[&r];
        assert_eq!(markers.len(), route.stops.len());
        assert_eq!(markers[0].kind, MarkerKind::Terminal);
        assert_eq!(markers[markers.len() - 1].kind, MarkerKind::Terminal);
        assert_eq!(markers[1].kind, MarkerKind::Stop);

        let descriptors = model.route_descriptors(MapFilter::Route(r));
        assert_eq!(descriptors[0].color, route.color);
    }

    #[test]
    fn routes_through_a_stop() {
        let model = model();
        let s = model
            .network
            .stop_id(&orig::StopID("palao".to_string()))
            .unwrap();
        let routes = model.route_descriptors(MapFilter::Stop(s));
        assert_eq!(routes.len(), model.network.stops[&s].routes.len());
        assert_eq!(model.stop_markers(MapFilter::Stop(s)).len(), 1);
    }

    #[test]
    fn lengths_are_plausible() {
        let model = model();
        for route in model.network.routes.values() {
            let km = model.route_length_km(route.id);
            assert!(km > 1.0 && km < 15.0, "{} is {km} km", route.name);
        }
    }
}
