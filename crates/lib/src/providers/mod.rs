//! # Providers
//!
//! External collaborators of the query engine: language models (`ai`) and the
//! caller-supplied databases queries run against (`db`).

pub mod ai;
pub mod db;
pub mod factory;
