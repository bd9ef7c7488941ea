use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{orig, DriverID, IDMapping, RouteID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverID,
    pub name: String,
    pub license: String,
    pub route: RouteID,
    /// Out of 5
    pub rating: f64,
    pub total_trips: usize,
    pub years_of_service: usize,
    pub phone: String,
    pub email: String,
    pub plate: String,
}

impl Driver {
    /// What the driver's printed QR code contains
    pub fn qr_code(&self) -> String {
        format!("DRIVER-{}", self.id.0)
    }
}

pub fn load<R: std::io::Read>(
    reader: R,
    route_ids: &IDMapping<orig::RouteID, RouteID>,
) -> Result<BTreeMap<DriverID, Driver>> {
    let mut drivers = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let id = DriverID(rec.driver_id);
        if drivers.contains_key(&id) {
            bail!("Duplicate {:?}", id);
        }
        if !(0.0..=5.0).contains(&rec.rating) {
            bail!("{:?} has rating {}", id, rec.rating);
        }
        drivers.insert(
            id,
            Driver {
                id,
                name: rec.name,
                license: rec.license,
                route: route_ids.lookup(&rec.route_id)?,
                rating: rec.rating,
                total_trips: rec.total_trips,
                years_of_service: rec.years_of_service,
                phone: rec.phone,
                email: rec.email,
                plate: rec.plate,
            },
        );
    }
    Ok(drivers)
}

#[derive(Deserialize)]
struct Record {
    driver_id: usize,
    name: String,
    license: String,
    route_id: orig::RouteID,
    rating: f64,
    total_trips: usize,
    years_of_service: usize,
    phone: String,
    email: String,
    plate: String,
}
