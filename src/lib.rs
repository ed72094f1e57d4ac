//! Records service library.
//!
//! A small HTTP API (`POST /records`, `GET /records/{id}`, `GET /records`)
//! over an external key-value store.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod records;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
