//! Use cases - application services orchestrating domain logic through ports

pub mod insights;
pub mod run_council;
pub mod select_persona;
pub mod synthesize;
