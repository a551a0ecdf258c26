//! EcoDenuncias core — citizen environmental-complaint reporting.
//!
//! Complaint CRUD with a status state machine and audit history, append-only
//! comments with pagination, and an aggregation engine over the complaint
//! table. Transport, upload handling and response shaping live outside this
//! crate; everything here speaks typed operations over a SQLite store.

pub mod clock;
pub mod comment_repository;
pub mod complaint_repository;
pub mod config;
pub mod error;
pub mod report_engine;
pub mod store;
pub mod types;
pub mod validation;

pub use clock::Clock;
pub use config::RepoConfig;
pub use error::{ApiError, ApiResult};
pub use store::{DateRange, Store};
