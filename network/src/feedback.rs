use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{orig, DriverID, IDMapping, RouteID};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedbackID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    DriverService,
    RouteInformation,
    FareInformation,
    Vehicle,
    Safety,
    Overall,
}

impl FeedbackCategory {
    pub fn all() -> Vec<Self> {
        use FeedbackCategory::*;
        vec![
            DriverService,
            RouteInformation,
            FareInformation,
            Vehicle,
            Safety,
            Overall,
        ]
    }

    pub fn describe(self) -> &'static str {
        match self {
            FeedbackCategory::DriverService => "Driver Service",
            FeedbackCategory::RouteInformation => "Route Information",
            FeedbackCategory::FareInformation => "Fare Information",
            FeedbackCategory::Vehicle => "Vehicle Condition",
            FeedbackCategory::Safety => "Safety",
            FeedbackCategory::Overall => "Overall Experience",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Reviewed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackID,
    /// None for anonymous feedback
    pub author: Option<String>,
    /// 1 to 5 stars
    pub rating: u8,
    pub category: FeedbackCategory,
    pub route: Option<RouteID>,
    pub driver: Option<DriverID>,
    pub message: String,
    pub date: NaiveDate,
    pub status: FeedbackStatus,
    pub helpful: usize,
}

pub fn load<R: std::io::Read>(
    reader: R,
    route_ids: &IDMapping<orig::RouteID, RouteID>,
) -> Result<Vec<Feedback>> {
    let mut results = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if !(1..=5).contains(&rec.rating) {
            bail!("Feedback #{} has rating {}", results.len() + 1, rec.rating);
        }
        let route = match rec.route_id {
            Some(id) => Some(route_ids.lookup(&id)?),
            None => None,
        };
        results.push(Feedback {
            id: FeedbackID(results.len()),
            author: rec.author.filter(|x| !x.trim().is_empty()),
            rating: rec.rating,
            category: rec.category,
            route,
            driver: rec.driver_id.map(DriverID),
            message: rec.message,
            date: rec.date,
            status: rec.status,
            helpful: rec.helpful,
        });
    }
    Ok(results)
}

#[derive(Deserialize)]
struct Record {
    author: Option<String>,
    rating: u8,
    category: FeedbackCategory,
    route_id: Option<orig::RouteID>,
    driver_id: Option<usize>,
    message: String,
    date: NaiveDate,
    status: FeedbackStatus,
    helpful: usize,
}
