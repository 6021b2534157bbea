//! Clinical safety warnings.
//!
//! Rules are pure functions returning `WarningItem`s; the regimen pipeline
//! decides which apply and `aggregate` orders and deduplicates the result.

pub mod aggregate;
pub mod messages;
pub mod rules;
pub mod types;

pub use aggregate::aggregate;
pub use rules::{effective_reduction, min_reduction};
pub use types::{ParamValue, WarningItem};
