use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{orig, split_list, IDMapping, LatLon, RouteID, StopID};

#[derive(Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopID,
    pub orig_id: orig::StopID,
    pub name: String,
    pub kind: StopKind,
    pub pos: LatLon,
    pub landmarks: Vec<String>,
    pub facilities: Vec<String>,
    pub tips: String,

    // Filled out after routes are loaded
    pub routes: BTreeSet<RouteID>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Terminal,
    Major,
    Regular,
}

impl StopKind {
    pub fn describe(self) -> &'static str {
        match self {
            StopKind::Terminal => "Terminal",
            StopKind::Major => "Major Stop",
            StopKind::Regular => "Regular Stop",
        }
    }
}

pub fn load<R: std::io::Read>(
    reader: R,
) -> Result<(BTreeMap<StopID, Stop>, IDMapping<orig::StopID, StopID>)> {
    let mut stops = BTreeMap::new();
    let mut ids = IDMapping::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let id = ids.insert_new(rec.stop_id.clone())?;
        let pos = LatLon::new(rec.lat, rec.lon);
        if !pos.is_finite() {
            warn!("{:?} has an unusable position {:?}", rec.stop_id, pos);
        }
        stops.insert(
            id,
            Stop {
                id,
                orig_id: rec.stop_id,
                name: rec.name,
                kind: rec.kind,
                pos,
                landmarks: split_list(&rec.landmarks),
                facilities: split_list(&rec.facilities),
                tips: rec.tips,
                routes: BTreeSet::new(),
            },
        );
    }
    Ok((stops, ids))
}

#[derive(Deserialize)]
struct Record {
    stop_id: orig::StopID,
    name: String,
    kind: StopKind,
    lat: f64,
    lon: f64,
    landmarks: String,
    facilities: String,
    tips: String,
}
