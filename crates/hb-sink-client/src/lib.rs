//! # hb-sink-client -- HTTP client for the registration sink
//!
//! Writes lead rows to the hosted `regional_registrations` table through
//! its REST interface and implements [`hb_core::RegistrationSink`].
//!
//! ## Outcome Mapping
//!
//! | Response                              | [`hb_core::SinkError`] |
//! |---------------------------------------|------------------------|
//! | 2xx                                   | (success)              |
//! | body carries Postgres code `23505`    | `Duplicate`            |
//! | transport timeout                     | `Timeout`              |
//! | other 4xx                             | `Rejected`             |
//! | 5xx, connection or decode failure     | `Unavailable`          |
//!
//! This crate is the only place in the workspace that speaks HTTP to the
//! sink.

pub mod client;
pub mod config;
pub mod error;
pub mod row;

pub use client::HttpRegistrationSink;
pub use config::SinkConfig;
pub use error::SinkClientError;
pub use row::RegistrationRow;
