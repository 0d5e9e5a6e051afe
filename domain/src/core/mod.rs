//! Core value objects and errors shared across the domain

pub mod error;
pub mod ids;
pub mod model_id;
pub mod query;
