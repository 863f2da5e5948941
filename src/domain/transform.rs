use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::models::ParkingRecord;
use crate::domain::parking_payload::{ParseError, parse_results};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reshapes every element of `results` into a storage row.
///
/// The clock is read once per record, so two records of the same batch may
/// carry different capture timestamps.
pub fn transform<C: Clock>(payload: &Value, clock: &C) -> Result<Vec<ParkingRecord>, ParseError> {
    let raw_records = parse_results(payload)?;

    Ok(raw_records
        .into_iter()
        .map(|raw| ParkingRecord::from_raw(raw, clock.now()))
        .collect())
}
