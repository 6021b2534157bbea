//! Rounding of theoretical doses to what can actually be administered.
//!
//! - `tablets`: greedy tablet combinations, down and up
//! - `distribution`: daily total → per-administration schedule
//! - `patch`: fentanyl patch strength → concurrent patch set

pub mod distribution;
pub mod patch;
pub mod tablets;

pub use distribution::distribute;
pub use patch::{combine_patches, STANDARD_PATCH_SIZES};
pub use tablets::{round_down, round_up, tablet_total};
