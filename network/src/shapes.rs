use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::{orig, LatLon};

/// Route geometry, keyed by the route it belongs to. Points that aren't finite are kept; the map
/// drops them when drawing.
pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<orig::RouteID, Vec<LatLon>>> {
    let mut pts_per_route: BTreeMap<orig::RouteID, Vec<(usize, LatLon)>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        pts_per_route
            .entry(rec.route_id)
            .or_insert_with(Vec::new)
            .push((rec.sequence, LatLon::new(rec.lat, rec.lon)));
    }

    // Sort by sequence, in case the file isn't in order
    let mut results = BTreeMap::new();
    for (route_id, mut pts) in pts_per_route {
        pts.sort_by_key(|(seq, _)| *seq);
        if let Some(pair) = pts.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            bail!("{:?} has two points with sequence {}", route_id, pair[0].0);
        }
        let bad = pts.iter().filter(|(_, pt)| !pt.is_finite()).count();
        if bad > 0 {
            warn!("Shape for {:?} has {bad} points that aren't finite", route_id);
        }
        results.insert(route_id, pts.into_iter().map(|(_, pt)| pt).collect());
    }
    Ok(results)
}

#[derive(Deserialize)]
struct Record {
    route_id: orig::RouteID,
    sequence: usize,
    lat: f64,
    lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_sequence_and_keeps_bad_points() {
        let input = "route_id,sequence,lat,lon\n\
                     a,2,8.2,124.22\n\
                     a,1,8.19,124.21\n\
                     a,3,NaN,124.23\n\
                     b,1,8.0,124.0\n";
        let shapes = load(input.as_bytes()).unwrap();
        let a = &shapes[&orig::RouteID("a".to_string())];
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], LatLon::new(8.19, 124.21));
        assert_eq!(a[1], LatLon::new(8.2, 124.22));
        assert!(!a[2].is_finite());
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn duplicate_sequence() {
        let input = "route_id,sequence,lat,lon\na,1,8.19,124.21\na,1,8.2,124.22\n";
        assert!(load(input.as_bytes()).is_err());
    }
}
