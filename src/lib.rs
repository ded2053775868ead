//! Depot charge planner: turns vehicle service records into run documents
//! for the charging optimiser.

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod mapper;
pub mod pipeline;
pub mod source;
pub mod telemetry;
pub mod template;
pub mod validation;

pub use error::{Error, Result};
