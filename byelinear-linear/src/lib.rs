//! byelinear Linear - source side of the migration
//!
//! Lists Linear issues page by page (newest first) and converts them into
//! the canonical [`byelinear_core::SourceIssue`] shape.

mod client;
mod query;

pub use client::{IssueFilter, IssuePage, LinearClient};
