//! # API Route Handlers
//!
//! This module organizes the Axum route handlers for the `askdb-server`.

pub mod general;
pub mod query;

pub use general::*;
pub use query::*;

use super::{errors::AppError, state::AppState};
