//! byelinear GitHub - target side of the migration
//!
//! Creates issues and comments through the REST API and places them on a
//! Projects (v2) board through the GraphQL API.

mod client;
mod envelope;
mod export;
mod issues;
mod project;

pub use client::{parse_github_url, GitHubClient};
pub use export::Exporter;
pub use issues::{CreatedIssue, IssueRequest, Reservation};
pub use project::{Project, ProjectState, StatusFieldInfo};
