use thiserror::Error;

use crate::adapters::opendata::FetchError;
use crate::domain::parking_payload::ParseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("transform failed: {0}")]
    Transform(#[from] ParseError),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl AppError {
    pub fn logging_init<E: std::fmt::Display>(error: E) -> Self {
        Self::LoggingInit(error.to_string())
    }

    pub fn config<E: std::fmt::Display>(error: E) -> Self {
        Self::Config(error.to_string())
    }

    pub fn runtime<E: std::fmt::Display>(error: E) -> Self {
        Self::Runtime(error.to_string())
    }
}
