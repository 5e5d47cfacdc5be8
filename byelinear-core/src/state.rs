//! Linear workflow states and their GitHub counterparts
//!
//! Both mappings (issue close reason and project status option) are plain
//! lookup tables over [`WorkflowState`] with an explicit unmapped branch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Linear workflow state name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowState {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
    Canceled,
    /// Any state without special handling, kept verbatim
    Other(String),
}

/// GitHub `state_reason` used when closing a migrated issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Completed,
    NotPlanned,
}

/// Option bucket of a project's "Status" single-select field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    Todo,
    InProgress,
    Done,
}

impl WorkflowState {
    /// Verbatim state name
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowState::Backlog => "Backlog",
            WorkflowState::Todo => "Todo",
            WorkflowState::InProgress => "In Progress",
            WorkflowState::InReview => "In Review",
            WorkflowState::Done => "Done",
            WorkflowState::Canceled => "Canceled",
            WorkflowState::Other(name) => name,
        }
    }

    /// Close reason for finished states; `None` leaves the issue open
    pub fn close_reason(&self) -> Option<CloseReason> {
        match self {
            WorkflowState::Done => Some(CloseReason::Completed),
            WorkflowState::Canceled => Some(CloseReason::NotPlanned),
            _ => None,
        }
    }

    /// Project status option to select; `None` keeps the project default
    pub fn status_bucket(&self) -> Option<StatusBucket> {
        match self {
            WorkflowState::Todo => Some(StatusBucket::Todo),
            WorkflowState::InProgress | WorkflowState::InReview => Some(StatusBucket::InProgress),
            WorkflowState::Done | WorkflowState::Canceled => Some(StatusBucket::Done),
            WorkflowState::Backlog | WorkflowState::Other(_) => None,
        }
    }
}

impl From<&str> for WorkflowState {
    fn from(name: &str) -> Self {
        match name {
            "Backlog" => WorkflowState::Backlog,
            "Todo" => WorkflowState::Todo,
            "In Progress" => WorkflowState::InProgress,
            "In Review" => WorkflowState::InReview,
            "Done" => WorkflowState::Done,
            "Canceled" => WorkflowState::Canceled,
            other => WorkflowState::Other(other.to_string()),
        }
    }
}

impl From<String> for WorkflowState {
    fn from(name: String) -> Self {
        WorkflowState::from(name.as_str())
    }
}

impl From<WorkflowState> for String {
    fn from(state: WorkflowState) -> Self {
        match state {
            WorkflowState::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StatusBucket {
    /// Option name as it appears on the project board
    pub fn option_name(&self) -> &'static str {
        match self {
            StatusBucket::Todo => "Todo",
            StatusBucket::InProgress => "In Progress",
            StatusBucket::Done => "Done",
        }
    }

    /// Bucket for a board option name; other options are ignored
    pub fn from_option_name(name: &str) -> Option<Self> {
        match name {
            "Todo" => Some(StatusBucket::Todo),
            "In Progress" => Some(StatusBucket::InProgress),
            "Done" => Some(StatusBucket::Done),
            _ => None,
        }
    }
}
