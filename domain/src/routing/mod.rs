//! Model routing data: fallback chains and the short-message downgrade table

pub mod chains;
pub mod downgrade;

pub use chains::FallbackChains;
pub use downgrade::{downgrade_model, is_short_acknowledgement};
