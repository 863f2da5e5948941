use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of the open-data `results` array.
///
/// Every field must be present in the payload and any of them may be `null`.
/// Counts are carried as published; the warehouse decides whether they fit
/// the column type. Extra fields published by the dataset are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawParkingRecord {
    #[serde(deserialize_with = "Option::deserialize")]
    pub id: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub etat: Option<String>,
    pub dispo: Value,
    pub max: Value,
    #[serde(deserialize_with = "Option::deserialize")]
    pub aff: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub datemaj: Option<String>,
}

/// Row shape of the `records` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingRecord {
    pub station_id: Option<String>,
    pub state: Option<String>,
    pub available: Value,
    pub max: Value,
    pub display: Option<String>,
    pub last_update: Option<String>,
    pub record_timestamp: DateTime<Utc>,
}

impl ParkingRecord {
    pub fn from_raw(raw: RawParkingRecord, record_timestamp: DateTime<Utc>) -> Self {
        Self {
            station_id: raw.id,
            state: raw.etat,
            available: raw.dispo,
            max: raw.max,
            display: raw.aff,
            last_update: raw.datemaj,
            record_timestamp,
        }
    }
}
