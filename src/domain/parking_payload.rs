use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::models::RawParkingRecord;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload must be a JSON object")]
    InvalidPayloadType,
    #[error("missing required field: results")]
    MissingResults,
    #[error("invalid record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes the `results` array of an explore API response, keeping source order.
pub fn parse_results(payload: &Value) -> Result<Vec<RawParkingRecord>, ParseError> {
    let object = payload.as_object().ok_or(ParseError::InvalidPayloadType)?;
    let results = object
        .get("results")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingResults)?;

    results
        .iter()
        .enumerate()
        .map(|(index, element)| {
            RawParkingRecord::deserialize(element)
                .map_err(|source| ParseError::InvalidRecord { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ParseError, parse_results};

    #[test]
    fn keeps_source_order() {
        let payload = json!({
            "total_count": 3,
            "results": [
                {"id": "C", "etat": "OUVERT", "dispo": 1, "max": 2, "aff": "C", "datemaj": "2023-01-01T00:00:00Z"},
                {"id": "A", "etat": "OUVERT", "dispo": 3, "max": 4, "aff": "A", "datemaj": "2023-01-01T00:00:00Z"},
                {"id": "B", "etat": "FERME", "dispo": 0, "max": 6, "aff": "B", "datemaj": "2023-01-01T00:00:00Z"}
            ]
        });

        let records = parse_results(&payload).expect("payload should parse");
        let ids: Vec<&str> = records.iter().map(|record| record.id.as_deref().expect("id should be present")).collect();

        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn rejects_payload_without_results() {
        let payload = json!({"error_code": "ODSQLError", "message": "bad query"});

        let result = parse_results(&payload);

        assert!(matches!(result, Err(ParseError::MissingResults)));
    }

    #[test]
    fn rejects_non_object_payload() {
        let result = parse_results(&json!([1, 2, 3]));

        assert!(matches!(result, Err(ParseError::InvalidPayloadType)));
    }

    #[test]
    fn reports_index_of_malformed_element() {
        let payload = json!({
            "results": [
                {"id": "A", "etat": "OUVERT", "dispo": 3, "max": 4, "aff": "A", "datemaj": "2023-01-01T00:00:00Z"},
                {"id": "B", "etat": "OUVERT", "max": 4, "aff": "B", "datemaj": "2023-01-01T00:00:00Z"}
            ]
        });

        let error = parse_results(&payload).expect_err("second element lacks dispo");

        assert!(matches!(error, ParseError::InvalidRecord { index: 1, .. }));
        assert_eq!(
            error.to_string(),
            "invalid record at index 1: missing field `dispo`"
        );
    }

    #[test]
    fn accepts_empty_results() {
        let records = parse_results(&json!({"results": []})).expect("empty results are valid");

        assert!(records.is_empty());
    }
}
