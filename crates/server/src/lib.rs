pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;
