//! Issue listing query and its wire types

use byelinear_core::{Person, ProjectRef, SourceComment, SourceIssue, WorkflowState};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Page size of the issue listing
pub(crate) const PAGE_SIZE: u32 = 50;

// Nested collections are capped at 10 entries; larger ones are truncated.
pub(crate) const ISSUES_QUERY: &str = r#"
query($before: String, $number: Float, $team: String) {
  issues(last: 50, before: $before, filter: {number: {eq: $number}, team: {name: {eq: $team}}}, includeArchived: true) {
    pageInfo {
      hasPreviousPage
      startCursor
    }
    nodes {
      id
      url
      identifier
      title
      description
      creator {
        name
        email
      }
      assignee {
        name
        email
      }
      priorityLabel
      state {
        name
      }
      project {
        name
        description
      }
      createdAt
      comments(last: 10) {
        nodes {
          url
          user {
            name
            email
          }
          createdAt
          body
        }
      }
      attachments(last: 10) {
        nodes {
          url
        }
      }
      relations(last: 10) {
        nodes {
          relatedIssue {
            identifier
          }
        }
      }
      parent {
        identifier
      }
      children(last: 10) {
        nodes {
          identifier
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub(crate) struct IssuesData {
    pub issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueConnection {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    pub nodes: Vec<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct User {
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Identified {
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Relation {
    related_issue: Identified,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Comment {
    url: String,
    user: Option<User>,
    created_at: DateTime<Utc>,
    body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueNode {
    id: String,
    url: String,
    identifier: String,
    title: String,
    description: Option<String>,
    creator: Option<User>,
    assignee: Option<User>,
    priority_label: String,
    state: Named,
    project: Option<Project>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    comments: Connection<Comment>,
    #[serde(default)]
    attachments: Connection<Attachment>,
    #[serde(default)]
    relations: Connection<Relation>,
    parent: Option<Identified>,
    #[serde(default)]
    children: Connection<Identified>,
}

impl From<User> for Person {
    fn from(user: User) -> Self {
        Person {
            name: user.name,
            email: user.email,
        }
    }
}

impl From<IssueNode> for SourceIssue {
    fn from(node: IssueNode) -> Self {
        SourceIssue {
            id: node.id,
            identifier: node.identifier,
            url: node.url,
            title: node.title,
            description: node.description,
            creator: node.creator.map(Person::from),
            assignee: node.assignee.map(Person::from),
            priority_label: node.priority_label,
            state: WorkflowState::from(node.state.name),
            project: node.project.map(|p| ProjectRef {
                name: p.name,
                description: p.description.unwrap_or_default(),
            }),
            created_at: node.created_at,
            comments: node
                .comments
                .nodes
                .into_iter()
                .map(|c| SourceComment {
                    url: c.url,
                    author_email: c.user.map(|u| u.email),
                    created_at: c.created_at,
                    body: c.body,
                })
                .collect(),
            relations: node
                .relations
                .nodes
                .into_iter()
                .map(|r| r.related_issue.identifier)
                .collect(),
            parent: node.parent.map(|p| p.identifier),
            children: node
                .children
                .nodes
                .into_iter()
                .map(|c| c.identifier)
                .collect(),
            attachments: node.attachments.nodes.into_iter().map(|a| a.url).collect(),
        }
    }
}
