//! Issue and comment creation

use std::cmp::Ordering;

use byelinear_core::{CloseReason, Error, GraphQLRequest, Result, TargetIssue, Transport};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::GitHubClient;

/// Title used for number-reservation placeholders
const PLACEHOLDER_TITLE: &str = "Empty issue";

/// Body of a create-issue call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl From<&TargetIssue> for IssueRequest {
    fn from(issue: &TargetIssue) -> Self {
        IssueRequest {
            title: issue.title.clone(),
            body: Some(issue.body.clone()),
            assignees: if issue.assignee.is_empty() {
                vec![]
            } else {
                vec![issue.assignee.clone()]
            },
        }
    }
}

/// The parts of a freshly created issue the exporter needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    /// GraphQL node id
    pub node_id: String,
    pub html_url: String,
}

/// Outcome of [`GitHubClient::reserve_number`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Open placeholder holding the wanted number, to be filled by the real issue
    pub issue: CreatedIssue,
    /// Placeholders created and deleted on the way
    pub burned: u64,
}

#[derive(Debug, Deserialize)]
struct LatestNumbers {
    repository: Option<LatestRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestRepository {
    issues: Connection<LatestIssue>,
    pull_requests: Connection<NumberNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<N> {
    nodes: Vec<N>,
}

#[derive(Debug, Deserialize)]
struct LatestIssue {
    number: u64,
    id: String,
    title: String,
    state: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct NumberNode {
    number: u64,
}

/// Newest visible issue and pull request
#[derive(Debug, Default)]
struct Latest {
    number: u64,
    /// Set when the newest issue is an open placeholder
    placeholder: Option<CreatedIssue>,
}

impl<T: Transport> GitHubClient<T> {
    /// Create an issue
    pub async fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue> {
        debug!(title = %request.title, "Creating issue");
        self.rest(Method::POST, "issues", &serde_json::to_value(request)?)
            .await
    }

    /// Close an issue with a state reason
    pub async fn close_issue(&self, number: u64, reason: CloseReason) -> Result<()> {
        debug!(number, ?reason, "Closing issue");
        let _: Value = self
            .rest(
                Method::PATCH,
                &format!("issues/{}", number),
                &json!({"state": "closed", "state_reason": reason}),
            )
            .await?;
        Ok(())
    }

    /// Add a comment to an issue
    pub async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let _: Value = self
            .rest(
                Method::POST,
                &format!("issues/{}/comments", number),
                &json!({ "body": body }),
            )
            .await?;
        Ok(())
    }

    /// Create a title-only placeholder issue
    pub async fn create_empty_issue(&self) -> Result<CreatedIssue> {
        self.create_issue(&IssueRequest {
            title: PLACEHOLDER_TITLE.to_string(),
            body: None,
            assignees: vec![],
        })
        .await
    }

    /// Delete an issue by node id (requires admin on the repository)
    pub async fn delete_issue(&self, node_id: &str) -> Result<()> {
        let request = GraphQLRequest::new(
            r#"mutation($issueId: ID!) {
  deleteIssue(input: {issueId: $issueId}) {
    clientMutationId
  }
}"#,
        )
        .variable("issueId", node_id);
        let _: Value = self.graphql(&request).await?;
        Ok(())
    }

    /// Replace the title, body and assignees of an existing issue
    pub async fn update_issue(&self, number: u64, request: &IssueRequest) -> Result<CreatedIssue> {
        debug!(number, title = %request.title, "Updating issue");
        self.rest(
            Method::PATCH,
            &format!("issues/{}", number),
            &serde_json::to_value(request)?,
        )
        .await
    }

    /// Newest issue and pull request currently visible in the repository
    ///
    /// Deleted issues are not visible but still use up their numbers, so
    /// the result is only a lower bound for the last number handed out.
    async fn latest(&self) -> Result<Latest> {
        let request = GraphQLRequest::new(
            r#"query($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    issues(last: 1) { nodes { number id title state url } }
    pullRequests(last: 1) { nodes { number } }
  }
}"#,
        )
        .variable("owner", self.owner())
        .variable("repo", self.repo());

        let data: LatestNumbers = self.graphql(&request).await?;
        let Some(repository) = data.repository else {
            return Ok(Latest::default());
        };

        let issue = repository.issues.nodes.into_iter().next();
        let pull = repository.pull_requests.nodes.iter().map(|n| n.number).max();
        let number = issue.as_ref().map(|i| i.number).max(pull).unwrap_or(0);
        let placeholder = issue
            .filter(|i| i.number == number && i.state == "OPEN" && i.title == PLACEHOLDER_TITLE)
            .map(|i| CreatedIssue {
                number: i.number,
                node_id: i.id,
                html_url: i.url,
            });
        Ok(Latest {
            number,
            placeholder,
        })
    }

    /// Make sure the next issue filled in gets `number`
    ///
    /// Placeholders below `number` are created and deleted. The placeholder
    /// that lands on `number` is left open and returned, ready to be
    /// overwritten with [`update_issue`](Self::update_issue). An open
    /// placeholder already sitting on `number` (from an earlier reservation)
    /// is reused. Fails with [`Error::NumberTaken`] once the repository is
    /// past `number`.
    pub async fn reserve_number(&self, number: u64) -> Result<Reservation> {
        let latest = self.latest().await?;
        if let Some(issue) = latest.placeholder.filter(|p| p.number == number) {
            debug!(number, "Reusing open placeholder");
            return Ok(Reservation { issue, burned: 0 });
        }
        if latest.number >= number {
            return Err(Error::NumberTaken {
                wanted: number,
                next: latest.number + 1,
            });
        }

        let mut burned = 0;
        loop {
            let placeholder = self.create_empty_issue().await?;
            match placeholder.number.cmp(&number) {
                Ordering::Less => {
                    self.delete_issue(&placeholder.node_id).await?;
                    burned += 1;
                    debug!(number = placeholder.number, "Burned placeholder issue");
                }
                Ordering::Equal => {
                    info!(number, burned, "Reserved issue number");
                    return Ok(Reservation {
                        issue: placeholder,
                        burned,
                    });
                }
                Ordering::Greater => {
                    warn!(
                        wanted = number,
                        reached = placeholder.number,
                        "Repository already passed the requested issue number"
                    );
                    self.delete_issue(&placeholder.node_id).await?;
                    return Err(Error::NumberTaken {
                        wanted: number,
                        next: placeholder.number + 1,
                    });
                }
            }
        }
    }
}
