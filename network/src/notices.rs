use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An announcement shown on the driver dashboard
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notice {
    pub posted: NaiveDate,
    pub severity: Severity,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// Newest first
pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Notice>> {
    let mut notices = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Notice = rec?;
        notices.push(rec);
    }
    notices.sort_by(|a, b| b.posted.cmp(&a.posted));
    Ok(notices)
}
