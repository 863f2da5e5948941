use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adapters::credentials::{ServiceAccountKey, ServiceAccountTokenSource};
use crate::adapters::warehouse::{
    RowInsertError, TableHandle, TableRef, Warehouse, WarehouseError,
};
use crate::domain::models::ParkingRecord;

pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

#[derive(Debug, Deserialize)]
struct TableResource {
    #[serde(default)]
    schema: Option<TableSchema>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRequest<'a> {
    rows: Vec<InsertAllRow<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRow<'a> {
    insert_id: String,
    json: &'a ParkingRecord,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<RowErrors>,
}

#[derive(Debug, Deserialize)]
struct RowErrors {
    index: usize,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

/// BigQuery v2 REST client limited to `tables.get` and `tabledata.insertAll`.
pub struct BigQueryClient {
    http: Client,
    api_base: String,
    tokens: ServiceAccountTokenSource,
}

impl BigQueryClient {
    pub fn connect(credentials_path: &Path) -> Result<Self, WarehouseError> {
        let key = ServiceAccountKey::from_file(credentials_path)?;
        Self::with_api_base(key, DEFAULT_API_BASE)
    }

    pub fn with_api_base(key: ServiceAccountKey, api_base: &str) -> Result<Self, WarehouseError> {
        let http = Client::builder().timeout(None::<Duration>).build()?;

        Ok(Self {
            tokens: ServiceAccountTokenSource::new(key, http.clone()),
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, reference: &TableRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}",
            self.api_base, reference.project, reference.dataset, reference.table
        )
    }
}

impl Warehouse for BigQueryClient {
    fn get_table(&self, reference: &TableRef) -> Result<TableHandle, WarehouseError> {
        let response = self
            .http
            .get(self.table_url(reference))
            .bearer_auth(self.tokens.access_token()?)
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(WarehouseError::TableNotFound(reference.to_string()));
        }
        let resource: TableResource = success_json(response)?;

        let columns = resource
            .schema
            .map(|schema| schema.fields.into_iter().map(|field| field.name).collect())
            .unwrap_or_default();

        Ok(TableHandle {
            reference: reference.clone(),
            columns,
        })
    }

    fn insert_rows(
        &self,
        table: &TableHandle,
        rows: &[ParkingRecord],
    ) -> Result<Vec<RowInsertError>, WarehouseError> {
        if rows.is_empty() {
            tracing::debug!(table = %table.reference, "empty batch, insertAll skipped");
            return Ok(Vec::new());
        }

        let request = InsertAllRequest {
            rows: rows
                .iter()
                .map(|row| InsertAllRow {
                    insert_id: Uuid::new_v4().to_string(),
                    json: row,
                })
                .collect(),
        };

        let response = self
            .http
            .post(format!("{}/insertAll", self.table_url(&table.reference)))
            .bearer_auth(self.tokens.access_token()?)
            .json(&request)
            .send()?;
        let reply: InsertAllResponse = success_json(response)?;

        Ok(reply
            .insert_errors
            .into_iter()
            .flat_map(|row| {
                let index = row.index;
                row.errors.into_iter().map(move |error| RowInsertError {
                    index,
                    reason: error.reason,
                    message: error.message,
                })
            })
            .collect())
    }
}

fn success_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, WarehouseError> {
    let status = response.status();
    if status.is_success() {
        return response.json().map_err(WarehouseError::from);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    Err(WarehouseError::Api {
        status: status.as_u16(),
        message,
    })
}
