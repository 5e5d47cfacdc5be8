//! Canonical source (Linear) and target (GitHub) issue shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::WorkflowState;

/// A Linear user as seen on an issue or comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

/// Project an issue belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub name: String,
    pub description: String,
}

/// A Linear comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceComment {
    pub url: String,
    pub author_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub body: String,
}

/// A Linear issue with everything the migration carries over
///
/// `identifier` (e.g. `ENG-123`) is used for log correlation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIssue {
    pub id: String,
    pub identifier: String,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<Person>,
    pub assignee: Option<Person>,
    pub priority_label: String,
    pub state: WorkflowState,
    pub project: Option<ProjectRef>,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<SourceComment>,
    /// Identifiers of related issues
    pub relations: Vec<String>,
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Attachment URLs
    pub attachments: Vec<String>,
}

impl SourceIssue {
    /// Team-scoped issue number, e.g. `123` for `ENG-123`
    pub fn number(&self) -> Option<u64> {
        self.identifier.rsplit_once('-')?.1.parse().ok()
    }
}

/// A GitHub issue ready to be created
///
/// Built once per [`SourceIssue`] and consumed once by the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetIssue {
    pub title: String,
    /// Rendered metadata table followed by the original description
    pub body: String,
    /// GitHub handle, empty when unresolved
    pub assignee: String,
    pub state: WorkflowState,
    /// Rendered comment bodies, in source order
    pub comments: Vec<String>,
    pub project: Option<ProjectRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(identifier: &str) -> SourceIssue {
        SourceIssue {
            id: "uuid".to_string(),
            identifier: identifier.to_string(),
            url: String::new(),
            title: String::new(),
            description: None,
            creator: None,
            assignee: None,
            priority_label: String::new(),
            state: WorkflowState::Todo,
            project: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            comments: vec![],
            relations: vec![],
            parent: None,
            children: vec![],
            attachments: vec![],
        }
    }

    #[test]
    fn test_number_from_identifier() {
        assert_eq!(issue("ENG-123").number(), Some(123));
        assert_eq!(issue("MY-TEAM-7").number(), Some(7));
        assert_eq!(issue("ENG").number(), None);
        assert_eq!(issue("ENG-x").number(), None);
    }
}
