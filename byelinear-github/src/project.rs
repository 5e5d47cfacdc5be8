//! Projects (v2) board resolution and status updates

use byelinear_core::{GraphQLRequest, Result, StatusBucket, Transport, WorkflowState};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::GitHubClient;

/// Only this many organization projects are searched
pub const PROJECT_SEARCH_LIMIT: usize = 25;

const PROJECTS_QUERY: &str = r#"query($login: String!) {
  organization(login: $login) {
    id
    projectsV2(first: 25) {
      nodes {
        id
        title
        shortDescription
        number
      }
    }
  }
}"#;

const STATUS_FIELD_QUERY: &str = r#"query($login: String!, $projectNumber: Int!) {
  organization(login: $login) {
    projectV2(number: $projectNumber) {
      field(name: "Status") {
        ... on ProjectV2SingleSelectField {
          id
          options {
            id
            name
          }
        }
      }
    }
  }
}"#;

const ADD_ITEM_MUTATION: &str = r#"mutation($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item {
      id
    }
  }
}"#;

const SET_STATUS_MUTATION: &str = r#"mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!, $optionId: String) {
  updateProjectV2ItemFieldValue(input: {projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: { singleSelectOptionId: $optionId }}) {
    clientMutationId
  }
}"#;

/// An organization project board
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    pub number: u64,
}

/// The board's "Status" single-select field and its bucket option ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFieldInfo {
    pub field_id: String,
    pub todo: Option<String>,
    pub in_progress: Option<String>,
    pub done: Option<String>,
}

impl StatusFieldInfo {
    /// Option id for a bucket, if the board has that option
    pub fn option(&self, bucket: StatusBucket) -> Option<&str> {
        match bucket {
            StatusBucket::Todo => self.todo.as_deref(),
            StatusBucket::InProgress => self.in_progress.as_deref(),
            StatusBucket::Done => self.done.as_deref(),
        }
    }

    /// Option id to select for a Linear state; `None` leaves the default
    pub fn option_for(&self, state: &WorkflowState) -> Option<&str> {
        self.option(state.status_bucket()?)
    }
}

/// A resolved project board, immutable for the rest of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    pub project: Project,
    /// `None` when the board has no single-select "Status" field
    pub status: Option<StatusFieldInfo>,
}

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organization {
    #[serde(default)]
    projects_v2: Option<ProjectConnection>,
    #[serde(default)]
    project_v2: Option<ProjectFields>,
}

#[derive(Debug, Deserialize)]
struct ProjectConnection {
    nodes: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct ProjectFields {
    field: Option<FieldNode>,
}

#[derive(Debug, Deserialize)]
struct FieldNode {
    id: Option<String>,
    #[serde(default)]
    options: Vec<OptionNode>,
}

#[derive(Debug, Deserialize)]
struct OptionNode {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemData {
    add_project_v2_item_by_id: AddedItem,
}

#[derive(Debug, Deserialize)]
struct AddedItem {
    item: ItemNode,
}

#[derive(Debug, Deserialize)]
struct ItemNode {
    id: String,
}

impl<T: Transport> GitHubClient<T> {
    /// First 25 project boards of the organization
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let request = GraphQLRequest::new(PROJECTS_QUERY).variable("login", self.owner());
        let data: OrganizationData = self.graphql(&request).await?;

        Ok(data
            .organization
            .and_then(|o| o.projects_v2)
            .map(|c| c.nodes)
            .unwrap_or_default())
    }

    /// The "Status" field of a project board
    pub async fn status_field(&self, project_number: u64) -> Result<Option<StatusFieldInfo>> {
        let request = GraphQLRequest::new(STATUS_FIELD_QUERY)
            .variable("login", self.owner())
            .variable("projectNumber", project_number);
        let data: OrganizationData = self.graphql(&request).await?;

        let field = data
            .organization
            .and_then(|o| o.project_v2)
            .and_then(|p| p.field);
        let Some(FieldNode {
            id: Some(field_id),
            options,
        }) = field
        else {
            return Ok(None);
        };

        let mut info = StatusFieldInfo {
            field_id,
            ..Default::default()
        };
        for option in options {
            match StatusBucket::from_option_name(&option.name) {
                Some(StatusBucket::Todo) => info.todo = Some(option.id),
                Some(StatusBucket::InProgress) => info.in_progress = Some(option.id),
                Some(StatusBucket::Done) => info.done = Some(option.id),
                None => {}
            }
        }
        Ok(Some(info))
    }

    /// Find a project by exact title and load its status field
    ///
    /// `Ok(None)` when no project among the first 25 has that title.
    pub async fn resolve_project(&self, title: &str) -> Result<Option<ProjectState>> {
        let projects = self.list_projects().await?;
        let Some(project) = projects.into_iter().find(|p| p.title == title) else {
            info!(
                project = title,
                searched = PROJECT_SEARCH_LIMIT,
                "Project not found, skipping project board"
            );
            return Ok(None);
        };

        let status = self.status_field(project.number).await?;
        if status.is_none() {
            info!(project = title, "Project has no Status field");
        }
        debug!(project = title, id = %project.id, "Resolved project");
        Ok(Some(ProjectState { project, status }))
    }

    /// Add an issue (by node id) to a project and return the item id
    pub async fn add_to_project(&self, project_id: &str, content_id: &str) -> Result<String> {
        let request = GraphQLRequest::new(ADD_ITEM_MUTATION)
            .variable("projectId", project_id)
            .variable("contentId", content_id);
        let data: AddItemData = self.graphql(&request).await?;
        Ok(data.add_project_v2_item_by_id.item.id)
    }

    /// Select a status option for a project item
    pub async fn set_item_status(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<()> {
        let request = GraphQLRequest::new(SET_STATUS_MUTATION)
            .variable("projectId", project_id)
            .variable("itemId", item_id)
            .variable("fieldId", field_id)
            .variable("optionId", option_id);
        let _: Value = self.graphql(&request).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byelinear_core::transport::{RecordedRequest, ScriptedTransport};
    use byelinear_core::RawResponse;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    /// GraphQL answers for an organization with a "Roadmap" board
    pub(crate) fn board_response(req: &RecordedRequest) -> Option<RawResponse> {
        let query = req.query()?;
        let data = if query.contains("projectsV2(first: 25)") {
            json!({"organization": {"id": "O_1", "projectsV2": {"nodes": [
                {"id": "PVT_other", "title": "Backlog board", "shortDescription": null, "number": 1},
                {"id": "PVT_road", "title": "Roadmap", "shortDescription": "Plans", "number": 7}
            ]}}})
        } else if query.contains("field(name: \"Status\")") {
            json!({"organization": {"projectV2": {"field": {
                "id": "F_status",
                "options": [
                    {"id": "O_todo", "name": "Todo"},
                    {"id": "O_prog", "name": "In Progress"},
                    {"id": "O_done", "name": "Done"},
                    {"id": "O_blocked", "name": "Blocked"}
                ]
            }}}})
        } else if query.contains("addProjectV2ItemById") {
            json!({"addProjectV2ItemById": {"item": {"id": "PVTI_1"}}})
        } else if query.contains("updateProjectV2ItemFieldValue") {
            json!({"updateProjectV2ItemFieldValue": {"clientMutationId": null}})
        } else {
            return None;
        };
        Some(RawResponse::json(StatusCode::OK, &json!({ "data": data })))
    }

    fn client() -> (Arc<ScriptedTransport>, GitHubClient<Arc<ScriptedTransport>>) {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            Ok(board_response(req).expect("unexpected request"))
        }));
        let client = GitHubClient::with_transport(Arc::clone(&transport), "acme", "tracker");
        (transport, client)
    }

    #[test]
    fn test_option_for_state_table() {
        let info = StatusFieldInfo {
            field_id: "F".to_string(),
            todo: Some("t".to_string()),
            in_progress: Some("p".to_string()),
            done: Some("d".to_string()),
        };
        let cases = [
            ("Backlog", None),
            ("Todo", Some("t")),
            ("In Progress", Some("p")),
            ("In Review", Some("p")),
            ("Done", Some("d")),
            ("Canceled", Some("d")),
            ("Triage", None),
        ];
        for (state, want) in cases {
            assert_eq!(info.option_for(&WorkflowState::from(state)), want, "{}", state);
        }
    }

    #[test]
    fn test_missing_option_is_none() {
        let info = StatusFieldInfo {
            field_id: "F".to_string(),
            todo: Some("t".to_string()),
            ..Default::default()
        };
        assert_eq!(info.option_for(&WorkflowState::Done), None);
    }

    #[tokio::test]
    async fn test_resolve_project_by_exact_title() {
        let (transport, client) = client();

        let state = client.resolve_project("Roadmap").await.unwrap().unwrap();
        assert_eq!(state.project.id, "PVT_road");
        assert_eq!(state.project.number, 7);
        let status = state.status.unwrap();
        assert_eq!(status.field_id, "F_status");
        assert_eq!(status.todo.as_deref(), Some("O_todo"));
        assert_eq!(status.in_progress.as_deref(), Some("O_prog"));
        assert_eq!(status.done.as_deref(), Some("O_done"));

        let requests = transport.requests();
        assert_eq!(requests[0].variable("login"), Some(&json!("acme")));
        assert_eq!(requests[1].variable("projectNumber"), Some(&json!(7)));
    }

    #[tokio::test]
    async fn test_resolve_project_not_found() {
        let (transport, client) = client();

        assert!(client.resolve_project("roadmap").await.unwrap().is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_status_field_absent() {
        let transport = ScriptedTransport::new(|_| {
            Ok(RawResponse::json(
                StatusCode::OK,
                &json!({"data": {"organization": {"projectV2": {"field": {}}}}}),
            ))
        });
        let client = GitHubClient::with_transport(transport, "acme", "tracker");

        assert_eq!(client.status_field(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_and_set_status() {
        let (transport, client) = client();

        let item = client.add_to_project("PVT_road", "I_5").await.unwrap();
        assert_eq!(item, "PVTI_1");
        client
            .set_item_status("PVT_road", &item, "F_status", "O_done")
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].variable("contentId"), Some(&json!("I_5")));
        assert_eq!(requests[1].variable("itemId"), Some(&json!("PVTI_1")));
        assert_eq!(requests[1].variable("optionId"), Some(&json!("O_done")));
    }
}
