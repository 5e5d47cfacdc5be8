//! byelinear core - shared pieces of the Linear → GitHub migration engine
//!
//! This crate holds the canonical issue model, the pure issue transformer,
//! the GraphQL transport both remotes are spoken through, and the
//! rate-limit/error policy shared by the fetcher and the exporter.

pub mod config;
pub mod error;
pub mod graphql;
pub mod identity;
pub mod model;
pub mod ratelimit;
pub mod secrets;
pub mod state;
pub mod transform;
pub mod transport;

pub use config::{CliOverrides, Config};
pub use error::{Error, RemoteError, Result, TransportError};
pub use graphql::{GraphQLRequest, GraphQLResponse};
pub use identity::IdentityMap;
pub use model::{Person, ProjectRef, SourceComment, SourceIssue, TargetIssue};
pub use secrets::Secrets;
pub use state::{CloseReason, StatusBucket, WorkflowState};
pub use transform::to_target_issue;
pub use transport::{RawResponse, Transport};
