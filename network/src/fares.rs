use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{orig, IDMapping, StopID};

/// One entry of the published fare matrix. The fare applies in both directions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareEntry {
    pub origin: StopID,
    pub destination: StopID,
    pub distance_km: f64,
    pub fare: usize,
}

impl FareEntry {
    pub fn connects(&self, a: StopID, b: StopID) -> bool {
        (self.origin == a && self.destination == b) || (self.origin == b && self.destination == a)
    }
}

pub fn load<R: std::io::Read>(
    reader: R,
    stop_ids: &IDMapping<orig::StopID, StopID>,
) -> Result<Vec<FareEntry>> {
    let mut entries: Vec<FareEntry> = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let origin = stop_ids.lookup(&rec.origin)?;
        let destination = stop_ids.lookup(&rec.destination)?;
        if origin == destination {
            bail!("Fare from {:?} to itself", rec.origin);
        }
        if !(rec.distance_km.is_finite() && rec.distance_km > 0.0) {
            bail!(
                "Fare from {:?} to {:?} has distance {}",
                rec.origin,
                rec.destination,
                rec.distance_km
            );
        }
        if entries.iter().any(|e| e.connects(origin, destination)) {
            bail!(
                "Duplicate fare between {:?} and {:?}",
                rec.origin,
                rec.destination
            );
        }
        entries.push(FareEntry {
            origin,
            destination,
            distance_km: rec.distance_km,
            fare: rec.fare,
        });
    }
    Ok(entries)
}

#[derive(Deserialize)]
struct Record {
    origin: orig::StopID,
    destination: orig::StopID,
    distance_km: f64,
    fare: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn either_direction_counts_as_duplicate() {
        let mut stops = IDMapping::new();
        for x in ["a", "b"] {
            stops.insert_new(orig::StopID(x.to_string())).unwrap();
        }
        let ok = "origin,destination,distance_km,fare\na,b,1.5,10\n";
        let entries = load(ok.as_bytes(), &stops).unwrap();
        assert!(entries[0].connects(StopID(1), StopID(0)));

        let dupe = "origin,destination,distance_km,fare\na,b,1.5,10\nb,a,1.5,10\n";
        assert!(load(dupe.as_bytes(), &stops).is_err());
        let zero = "origin,destination,distance_km,fare\na,b,0,10\n";
        assert!(load(zero.as_bytes(), &stops).is_err());
    }
}
