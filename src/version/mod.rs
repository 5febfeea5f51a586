//! Version handling primitives
//!
//! This module provides:
//! - Normalization of raw scalar values into bare version tokens
//! - Lax semantic version parsing and prerelease detection
//! - Offset-based selection from a set of tags
//! - Release-cycle containment and downgrade checks

mod compare;
mod normalize;
mod select;

pub use compare::{cycle_contains_version, is_downgrade};
pub use normalize::{extract_version, is_commit_hash, trim_version_prefix};
pub use select::{is_prerelease, parse_lax, select_version};
