//! stackver - dependency freshness and end-of-life tracker library
//!
//! This library provides the core functionality for checking declared
//! dependencies against their upstreams:
//! - endoflife.date release cycles
//! - GitHub releases and commits
//! - Git remote tags
//! - Helm repository indexes
//! - OCI registry tags
//!
//! and for rewriting the files that pin them without disturbing formatting.

pub mod check;
pub mod cli;
pub mod domain;
pub mod error;
pub mod output;
pub mod progress;
pub mod selector;
pub mod tracker;
pub mod updater;
pub mod version;
