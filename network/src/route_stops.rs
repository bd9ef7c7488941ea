use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::{orig, IDMapping, RouteID, RouteStop, StopID};

/// The ordered stop list of every route. Unknown stops or routes are errors.
pub fn load<R: std::io::Read>(
    reader: R,
    route_ids: &IDMapping<orig::RouteID, RouteID>,
    stop_ids: &IDMapping<orig::StopID, StopID>,
) -> Result<BTreeMap<RouteID, Vec<RouteStop>>> {
    let mut per_route: BTreeMap<RouteID, Vec<(usize, RouteStop)>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let route = route_ids.lookup(&rec.route_id)?;
        let stop = stop_ids.lookup(&rec.stop_id)?;
        per_route.entry(route).or_insert_with(Vec::new).push((
            rec.sequence,
            RouteStop {
                stop,
                minutes_from_start: rec.minutes_from_start,
            },
        ));
    }

    let mut results = BTreeMap::new();
    for (route, mut list) in per_route {
        list.sort_by_key(|(seq, _)| *seq);
        for pair in list.windows(2) {
            if pair[0].0 == pair[1].0 {
                bail!("{:?} has two stops with sequence {}", route, pair[0].0);
            }
            if pair[1].1.minutes_from_start < pair[0].1.minutes_from_start {
                warn!(
                    "{:?} reaches stop #{} before stop #{}",
                    route, pair[1].0, pair[0].0
                );
            }
        }
        results.insert(route, list.into_iter().map(|(_, rs)| rs).collect());
    }
    Ok(results)
}

#[derive(Deserialize)]
struct Record {
    route_id: orig::RouteID,
    sequence: usize,
    stop_id: orig::StopID,
    minutes_from_start: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> (
        IDMapping<orig::RouteID, RouteID>,
        IDMapping<orig::StopID, StopID>,
    ) {
        let mut routes = IDMapping::new();
        routes.insert_new(orig::RouteID("r".to_string())).unwrap();
        let mut stops = IDMapping::new();
        for x in ["a", "b"] {
            stops.insert_new(orig::StopID(x.to_string())).unwrap();
        }
        (routes, stops)
    }

    #[test]
    fn ordered_by_sequence() {
        let (routes, stops) = mappings();
        let input = "route_id,sequence,stop_id,minutes_from_start\nr,2,b,5\nr,1,a,0\n";
        let result = load(input.as_bytes(), &routes, &stops).unwrap();
        let list = &result[&RouteID(0)];
        assert_eq!(list[0].stop, StopID(0));
        assert_eq!(list[1].stop, StopID(1));
        assert_eq!(list[1].minutes_from_start, 5);
    }

    #[test]
    fn unknown_stop() {
        let (routes, stops) = mappings();
        let input = "route_id,sequence,stop_id,minutes_from_start\nr,1,nowhere,0\n";
        assert!(load(input.as_bytes(), &routes, &stops).is_err());
    }
}
