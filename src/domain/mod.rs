pub mod models;
pub mod parking_payload;
pub mod transform;
