use std::path::PathBuf;
use std::str::FromStr;

use crate::adapters::opendata::DEFAULT_SOURCE_URL;
use crate::app::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseBackend {
    BigQuery,
    Sqlite,
}

impl FromStr for WarehouseBackend {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "bigquery" => Ok(Self::BigQuery),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(AppError::config(format!(
                "WAREHOUSE_BACKEND must be bigquery or sqlite, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_url: String,
    pub project_id: String,
    pub dataset_id: String,
    pub credentials_path: PathBuf,
    pub backend: WarehouseBackend,
    pub sqlite_path: String,
    pub http_bind: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // .env is optional.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match non_empty(&lookup, "WAREHOUSE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => WarehouseBackend::BigQuery,
        };

        let mut http_bind =
            non_empty(&lookup, "HTTP_BIND").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        if let Some(port) = non_empty(&lookup, "PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| AppError::config("PORT must be a valid number"))?;
            let host = http_bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            http_bind = format!("{host}:{port}");
        }

        Ok(Self {
            source_url: non_empty(&lookup, "PARKINGS_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            project_id: non_empty(&lookup, "GCP_PROJECT")
                .unwrap_or_else(|| "parkings-mel".to_string()),
            dataset_id: non_empty(&lookup, "BQ_DATASET")
                .unwrap_or_else(|| "parkings_mel".to_string()),
            credentials_path: non_empty(&lookup, "GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("key.json")),
            backend,
            sqlite_path: non_empty(&lookup, "SQLITE_PATH")
                .unwrap_or_else(|| "./data/parkings_mel.db".to_string()),
            http_bind,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{AppConfig, WarehouseBackend};
    use crate::adapters::opendata::DEFAULT_SOURCE_URL;

    #[test]
    fn applies_defaults_for_all_fields() {
        let result = AppConfig::from_lookup(|_| None).expect("config should be valid");

        assert_eq!(result.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(result.project_id, "parkings-mel");
        assert_eq!(result.dataset_id, "parkings_mel");
        assert_eq!(result.credentials_path, PathBuf::from("key.json"));
        assert_eq!(result.backend, WarehouseBackend::BigQuery);
        assert_eq!(result.sqlite_path, "./data/parkings_mel.db");
        assert_eq!(result.http_bind, "0.0.0.0:8080");
    }

    #[test]
    fn treats_blank_values_as_unset() {
        let result = AppConfig::from_lookup(|key| match key {
            "GCP_PROJECT" => Some("   ".to_string()),
            "BQ_DATASET" => Some("staging".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(result.project_id, "parkings-mel");
        assert_eq!(result.dataset_id, "staging");
    }

    #[test]
    fn selects_sqlite_backend() {
        let result = AppConfig::from_lookup(|key| match key {
            "WAREHOUSE_BACKEND" => Some("SQLite".to_string()),
            "SQLITE_PATH" => Some("/tmp/parkings.db".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(result.backend, WarehouseBackend::Sqlite);
        assert_eq!(result.sqlite_path, "/tmp/parkings.db");
    }

    #[test]
    fn rejects_unknown_backend() {
        let result = AppConfig::from_lookup(|key| match key {
            "WAREHOUSE_BACKEND" => Some("postgres".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: WAREHOUSE_BACKEND must be bigquery or sqlite, got postgres"
        );
    }

    #[test]
    fn port_overrides_bind_port() {
        let result = AppConfig::from_lookup(|key| match key {
            "HTTP_BIND" => Some("127.0.0.1:8080".to_string()),
            "PORT" => Some("9090".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(result.http_bind, "127.0.0.1:9090");
    }

    #[test]
    fn rejects_invalid_port() {
        let result = AppConfig::from_lookup(|key| match key {
            "PORT" => Some("eighty".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: PORT must be a valid number"
        );
    }
}
