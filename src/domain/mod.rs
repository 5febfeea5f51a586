//! Core domain models for stackver
//!
//! This module contains the fundamental types used throughout the application:
//! - Declared dependencies, their sources and tracker declarations
//! - The stack document and its stack-wide settings
//! - Resolved status and the severity order

mod dependency;
mod stack;
mod status;

pub use dependency::{Dependency, Source, TrackerKind, TrackerSpec};
pub use stack::{ObjectMeta, Stack, StackConfig, StackSpec};
pub use status::{Severity, Status};
