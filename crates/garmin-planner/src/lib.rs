pub mod cli;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod models;
pub mod plan;
pub mod upload;

pub use error::{PlannerError, Result};
