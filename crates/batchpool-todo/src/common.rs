//! Shared types: the todo model, its validation rules, and the service error.

pub mod error;
pub mod model;
pub mod validation;

pub use error::{Error, Result};
