//! Linear API client

use byelinear_core::config::LINEAR_GRAPHQL_URL;
use byelinear_core::graphql::{self, GraphQLRequest, GraphQLResponse};
use byelinear_core::transport::authenticated_client;
use byelinear_core::{ratelimit, Error, Result, SourceIssue, Transport};
use tracing::{debug, info};

use crate::query::{IssuesData, ISSUES_QUERY, PAGE_SIZE};

/// Issue listing filters
///
/// When both are set they AND together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Exact team-scoped issue number
    pub number: Option<u64>,
    /// Team name
    pub team: String,
}

/// One page of issues, newest first
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub issues: Vec<SourceIssue>,
    previous_cursor: Option<String>,
}

impl IssuePage {
    /// Cursor to pass as `before` for the next (older) page
    ///
    /// `None` once the oldest page has been reached.
    pub fn next_before(&self) -> Option<&str> {
        self.previous_cursor.as_deref()
    }
}

/// Linear GraphQL client
pub struct LinearClient<T = reqwest::Client> {
    transport: T,
    endpoint: String,
}

impl LinearClient<reqwest::Client> {
    /// Create a client authenticated with a personal API key
    pub fn new(api_key: &str) -> Result<Self> {
        let transport = authenticated_client(api_key, &[])?;
        info!("Created Linear client");
        Ok(Self::with_transport(transport, LINEAR_GRAPHQL_URL))
    }
}

impl<T: Transport> LinearClient<T> {
    /// Create a client over an existing transport
    pub fn with_transport(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Point the client at a different GraphQL endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch the page of issues preceding `before` (or the newest page)
    ///
    /// Archived issues are included. Results are returned in the order
    /// Linear sends them.
    pub async fn fetch_issues(
        &self,
        before: Option<&str>,
        filter: &IssueFilter,
    ) -> Result<IssuePage> {
        debug!(?before, ?filter, page_size = PAGE_SIZE, "Fetching Linear issues");

        let request = GraphQLRequest::new(ISSUES_QUERY)
            .optional_variable("before", before)
            .optional_variable("number", filter.number)
            .variable("team", filter.team.as_str());

        let response = match graphql::execute(&self.transport, &self.endpoint, &request).await {
            Ok(response) => response,
            Err(e) => {
                ratelimit::report(&e);
                return Err(e);
            }
        };

        if let Some(complexity) = response
            .headers
            .get("x-complexity")
            .and_then(|v| v.to_str().ok())
        {
            debug!(complexity, "Linear query complexity");
        }

        let envelope: GraphQLResponse<IssuesData> = serde_json::from_slice(&response.body)?;
        let data = match envelope {
            GraphQLResponse {
                data: None,
                errors: Some(errors),
            } if !errors.is_empty() => return Err(Error::RemoteValidation(errors)),
            envelope => envelope.into_data()?,
        };

        let previous_cursor = data
            .issues
            .page_info
            .filter(|p| p.has_previous_page)
            .and_then(|p| p.start_cursor);
        let issues: Vec<SourceIssue> = data
            .issues
            .nodes
            .into_iter()
            .map(SourceIssue::from)
            .collect();

        info!(count = issues.len(), "Fetched Linear issues");

        Ok(IssuePage {
            issues,
            previous_cursor,
        })
    }
}

impl<T> std::fmt::Debug for LinearClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
