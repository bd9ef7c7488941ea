use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{orig, split_list, IDMapping, LatLon, Network, RouteID, StopID};

#[derive(Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteID,
    pub orig_id: orig::RouteID,
    pub name: String,
    pub origin: String,
    pub destination: String,
    /// "#RRGGBB"
    pub color: String,
    pub fare_min: usize,
    pub fare_max: usize,
    pub distance_km: f64,
    /// Free text, like "15-20 mins"
    pub duration: String,
    pub popularity: Popularity,
    pub first_trip: NaiveTime,
    pub last_trip: NaiveTime,
    pub headway_minutes: u32,
    pub landmarks: Vec<String>,

    /// May be empty for routes added at runtime. Points aren't guaranteed to be finite.
    pub shape: Vec<LatLon>,
    /// Sorted by sequence
    pub stops: Vec<RouteStop>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub stop: StopID,
    pub minutes_from_start: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Popularity {
    Low,
    Medium,
    High,
}

/// The fields an admin fills out to add a route. There's no shape or stop list yet.
#[derive(Clone, Debug)]
pub struct NewRoute {
    pub orig_id: orig::RouteID,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub color: String,
    pub distance_km: f64,
    pub fare_min: usize,
    pub fare_max: usize,
}

impl Route {
    pub fn describe(&self) -> String {
        format!("{} ({} → {})", self.name, self.origin, self.destination)
    }

    pub fn fare_range(&self) -> String {
        if self.fare_min == self.fare_max {
            format!("₱{}", self.fare_min)
        } else {
            format!("₱{}-{}", self.fare_min, self.fare_max)
        }
    }

    /// The first and last stop, if the route has at least two.
    pub fn terminals(&self) -> Option<(StopID, StopID)> {
        if self.stops.len() < 2 {
            return None;
        }
        Some((self.stops[0].stop, self.stops[self.stops.len() - 1].stop))
    }

    /// Every scheduled departure from the origin, from the first to the last trip.
    pub fn departures(&self) -> Vec<NaiveTime> {
        let mut result = Vec::new();
        if self.headway_minutes == 0 {
            result.push(self.first_trip);
            return result;
        }
        let step = chrono::Duration::minutes(self.headway_minutes as i64);
        let mut t = self.first_trip;
        while t <= self.last_trip {
            result.push(t);
            let (next, wrapped) = t.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            t = next;
        }
        result
    }

    /// The next departure at or after `now`, if there's one left today.
    pub fn next_departure(&self, now: NaiveTime) -> Option<NaiveTime> {
        self.departures().into_iter().find(|t| *t >= now)
    }

    pub fn to_geojson(&self, network: &Network) -> Result<String> {
        use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

        let mut features = Vec::new();

        let line: Vec<Vec<f64>> = self
            .shape
            .iter()
            .filter(|pt| pt.is_finite())
            .map(|pt| vec![pt.lon, pt.lat])
            .collect();
        if line.len() >= 2 {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(line))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("type", "route");
            feature.set_property("name", self.name.clone());
            feature.set_property("color", self.color.clone());
            features.push(feature);
        }

        for (idx, rs) in self.stops.iter().enumerate() {
            let stop = &network.stops[&rs.stop];
            if !stop.pos.is_finite() {
                continue;
            }
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![stop.pos.lon, stop.pos.lat]))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("type", "stop");
            feature.set_property("name", stop.name.clone());
            feature.set_property("stop_sequence", idx + 1);
            feature.set_property("minutes_from_start", rs.minutes_from_start);
            features.push(feature);
        }

        let gj = GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        });
        Ok(serde_json::to_string_pretty(&gj)?)
    }

    pub fn export_to_geojson(&self, path: String, network: &Network) -> Result<()> {
        fs_err::write(path, self.to_geojson(network)?)?;
        Ok(())
    }
}

pub fn load<R: std::io::Read>(
    reader: R,
) -> Result<(BTreeMap<RouteID, Route>, IDMapping<orig::RouteID, RouteID>)> {
    let mut routes = BTreeMap::new();
    let mut ids = IDMapping::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let id = ids.insert_new(rec.route_id.clone())?;
        let first_trip = parse_time(&rec.first_trip)?;
        let last_trip = parse_time(&rec.last_trip)?;
        if last_trip < first_trip {
            bail!(
                "{:?} has its last trip {last_trip} before the first {first_trip}",
                rec.route_id
            );
        }
        if rec.fare_min > rec.fare_max {
            bail!("{:?} has fare_min > fare_max", rec.route_id);
        }
        routes.insert(
            id,
            Route {
                id,
                orig_id: rec.route_id,
                name: rec.name,
                origin: rec.origin,
                destination: rec.destination,
                color: rec.color,
                fare_min: rec.fare_min,
                fare_max: rec.fare_max,
                distance_km: rec.distance_km,
                duration: rec.duration,
                popularity: rec.popularity,
                first_trip,
                last_trip,
                headway_minutes: rec.headway_minutes,
                landmarks: split_list(&rec.landmarks),

                shape: Vec::new(),
                stops: Vec::new(),
            },
        );
    }
    Ok((routes, ids))
}

/// Parses "HH:MM"
pub fn parse_time(x: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(x.trim(), "%H:%M").map_err(|err| anyhow!("bad time {x}: {err}"))
}

#[derive(Deserialize)]
struct Record {
    route_id: orig::RouteID,
    name: String,
    origin: String,
    destination: String,
    color: String,
    fare_min: usize,
    fare_max: usize,
    distance_km: f64,
    duration: String,
    popularity: Popularity,
    first_trip: String,
    last_trip: String,
    headway_minutes: u32,
    landmarks: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(first: &str, last: &str, headway_minutes: u32) -> Route {
        Route {
            id: RouteID(0),
            orig_id: orig::RouteID("r".to_string()),
            name: "Test".to_string(),
            origin: "A".to_string(),
            destination: "B".to_string(),
            color: "#000000".to_string(),
            fare_min: 10,
            fare_max: 10,
            distance_km: 1.0,
            duration: "5 mins".to_string(),
            popularity: Popularity::Low,
            first_trip: parse_time(first).unwrap(),
            last_trip: parse_time(last).unwrap(),
            headway_minutes,
            landmarks: Vec::new(),
            shape: Vec::new(),
            stops: Vec::new(),
        }
    }

    #[test]
    fn departures() {
        let r = route("05:30", "06:00", 10);
        let times: Vec<String> = r
            .departures()
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect();
        assert_eq!(times, vec!["05:30", "05:40", "05:50", "06:00"]);

        assert_eq!(
            r.next_departure(parse_time("05:41").unwrap()),
            Some(parse_time("05:50").unwrap())
        );
        assert_eq!(r.next_departure(parse_time("06:01").unwrap()), None);
    }

    #[test]
    fn departures_near_midnight_stop() {
        let r = route("23:00", "23:59", 45);
        assert_eq!(r.departures().len(), 2);
        assert_eq!(route("08:00", "09:00", 0).departures().len(), 1);
    }

    #[test]
    fn rejects_bad_times() {
        let input = "route_id,name,origin,destination,color,fare_min,fare_max,distance_km,duration,popularity,first_trip,last_trip,headway_minutes,landmarks\n\
                     a,A,X,Y,#000000,10,10,1.0,5 mins,low,21:00,05:00,10,\n";
        assert!(load(input.as_bytes()).is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn fare_range() {
        let mut r = route("05:00", "06:00", 10);
        assert_eq!(r.fare_range(), "₱10");
        r.fare_max = 14;
        assert_eq!(r.fare_range(), "₱10-14");
    }
}
