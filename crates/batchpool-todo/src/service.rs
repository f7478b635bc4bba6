//! Batch-create service and the pieces wired around it.
//!
//! ## Structure
//!
//! - [`config`] - CLI and environment configuration.
//! - [`handler`] - `TodoService`, the caller of the worker pool.
//! - [`repository`] - Storage trait and the in-memory implementation.
//! - [`telemetry`] - Log subscriber setup.

pub mod config;
pub mod handler;
pub mod repository;
pub mod telemetry;
