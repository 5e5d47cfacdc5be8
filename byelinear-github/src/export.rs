//! Issue export pipeline
//!
//! create issue → close (Done/Canceled) → comments → project board.
//! Each step runs only if the previous one succeeded; nothing is rolled back.

use std::time::Duration;

use byelinear_core::config::DEFAULT_EXPORT_TIMEOUT;
use byelinear_core::{Error, Result, TargetIssue, Transport, WorkflowState};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{CreatedIssue, GitHubClient, IssueRequest, ProjectState};

/// Replays [`TargetIssue`]s against a GitHub repository
pub struct Exporter<T = reqwest::Client> {
    client: GitHubClient<T>,
    project: Option<String>,
    timeout: Duration,
    /// Resolved once per run; `None` inside means the board was not found
    project_state: OnceCell<Option<ProjectState>>,
}

impl<T: Transport> Exporter<T> {
    /// Create an exporter; issues are added to `project` when it is non-empty
    pub fn new(client: GitHubClient<T>, project: Option<String>) -> Self {
        Self {
            client,
            project: project.filter(|p| !p.is_empty()),
            timeout: DEFAULT_EXPORT_TIMEOUT,
            project_state: OnceCell::new(),
        }
    }

    /// Set the per-issue deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &GitHubClient<T> {
        &self.client
    }

    /// Export one issue and return its GitHub URL
    ///
    /// `ident` is the Linear identifier, used only to correlate log lines.
    pub async fn export(&self, ident: &str, issue: &TargetIssue) -> Result<String> {
        self.export_onto(ident, issue, None).await
    }

    /// Export one issue by overwriting a reserved placeholder
    ///
    /// Same pipeline as [`export`](Self::export), except the first step
    /// updates `placeholder` instead of creating a new issue, so the
    /// issue keeps the placeholder's number.
    pub async fn export_into(
        &self,
        ident: &str,
        issue: &TargetIssue,
        placeholder: &CreatedIssue,
    ) -> Result<String> {
        self.export_onto(ident, issue, Some(placeholder)).await
    }

    async fn export_onto(
        &self,
        ident: &str,
        issue: &TargetIssue,
        placeholder: Option<&CreatedIssue>,
    ) -> Result<String> {
        tokio::time::timeout(self.timeout, self.run(ident, issue, placeholder))
            .await
            .unwrap_or(Err(Error::Timeout(self.timeout)))
    }

    async fn run(
        &self,
        ident: &str,
        issue: &TargetIssue,
        placeholder: Option<&CreatedIssue>,
    ) -> Result<String> {
        let request = IssueRequest::from(issue);
        let created = match placeholder {
            Some(placeholder) => {
                info!(ident, number = placeholder.number, "filling reserved issue");
                self.client.update_issue(placeholder.number, &request).await?
            }
            None => {
                info!(ident, "creating issue");
                self.client.create_issue(&request).await?
            }
        };

        if let Some(reason) = issue.state.close_reason() {
            debug!(ident, number = created.number, ?reason, "closing issue");
            self.client.close_issue(created.number, reason).await?;
        }

        for (i, body) in issue.comments.iter().enumerate() {
            info!(ident, "creating comment {}", i);
            self.client.create_comment(created.number, body).await?;
        }

        if let Some(project) = self.project_state().await? {
            self.link(ident, project, &created, &issue.state).await?;
        }

        Ok(created.html_url)
    }

    async fn project_state(&self) -> Result<Option<&ProjectState>> {
        let Some(title) = self.project.as_deref() else {
            return Ok(None);
        };
        let state = self
            .project_state
            .get_or_try_init(|| self.client.resolve_project(title))
            .await?;
        Ok(state.as_ref())
    }

    async fn link(
        &self,
        ident: &str,
        project: &ProjectState,
        created: &CreatedIssue,
        state: &WorkflowState,
    ) -> Result<()> {
        info!(ident, project = %project.project.title, "adding issue to project");
        let item_id = self
            .client
            .add_to_project(&project.project.id, &created.node_id)
            .await?;

        let Some(status) = &project.status else {
            return Ok(());
        };
        let Some(option_id) = status.option_for(state) else {
            debug!(ident, %state, "leaving project status at default");
            return Ok(());
        };

        info!(ident, %state, "setting project status");
        self.client
            .set_item_status(&project.project.id, &item_id, &status.field_id, option_id)
            .await
    }
}

impl<T> std::fmt::Debug for Exporter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("client", &self.client)
            .field("project", &self.project)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
