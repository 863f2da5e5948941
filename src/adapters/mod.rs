pub mod bigquery;
pub mod credentials;
pub mod opendata;
pub mod sqlite_sink;
pub mod trigger;
pub mod warehouse;
