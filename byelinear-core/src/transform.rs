//! Linear issue → GitHub issue mapping
//!
//! Pure and deterministic: the same [`SourceIssue`] always renders to the
//! same [`TargetIssue`].

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use crate::identity::IdentityMap;
use crate::model::{SourceComment, SourceIssue, TargetIssue};

/// Date format used in rendered tables (`Mon Jan  2 15:04:05 +09:00 2006`)
pub const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

/// Render a timestamp in the local time zone
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_FORMAT).to_string()
}

/// Comma-and-space join; empty input renders as `""`
pub fn format_list(items: &[String]) -> String {
    items.join(", ")
}

/// `@handle`, or `""` for an unresolved handle
fn mention(handle: &str) -> String {
    if handle.is_empty() {
        String::new()
    } else {
        format!("@{}", handle)
    }
}

/// Map a Linear issue onto the GitHub issue that will replace it
pub fn to_target_issue(issue: &SourceIssue, identities: &IdentityMap) -> TargetIssue {
    let assignee = identities
        .handle(issue.assignee.as_ref().map(|p| p.email.as_str()))
        .to_string();

    TargetIssue {
        title: issue.title.clone(),
        body: render_body(issue, identities, &assignee),
        assignee,
        state: issue.state.clone(),
        comments: issue
            .comments
            .iter()
            .map(|c| render_comment(c, identities))
            .collect(),
        project: issue.project.clone(),
    }
}

fn render_body(issue: &SourceIssue, identities: &IdentityMap, assignee: &str) -> String {
    let author = identities.handle(issue.creator.as_ref().map(|p| p.email.as_str()));
    let rows = [
        ("url", issue.url.clone()),
        ("author", mention(author)),
        ("date", format_time(&issue.created_at)),
        ("state", issue.state.to_string()),
        (
            "project",
            issue
                .project
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        ),
        ("priority", issue.priority_label.clone()),
        ("assignee", assignee.to_string()),
        ("related", format_list(&issue.relations)),
        ("parent", issue.parent.clone().unwrap_or_default()),
        ("children", format_list(&issue.children)),
        ("attachments", format_list(&issue.attachments)),
    ];

    let mut body = String::from("field | value\n| - | - |\n");
    for (field, value) in rows {
        let _ = writeln!(body, "{} | {}", field, value);
    }

    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        body.push('\n');
        body.push_str(description);
    }
    body
}

fn render_comment(comment: &SourceComment, identities: &IdentityMap) -> String {
    format!(
        "field | value\n|-|-|\nurl | {}\nauthor | {}\ndate | {}\n\n{}",
        comment.url,
        mention(identities.handle(comment.author_email.as_deref())),
        format_time(&comment.created_at),
        comment.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Person, ProjectRef};
    use crate::state::WorkflowState;
    use chrono::TimeZone;

    fn identities() -> IdentityMap {
        [
            ("mae@chai.finance", "moonjihae"),
            ("alex@chai.finance", "imcheck"),
        ]
        .into_iter()
        .collect()
    }

    fn person(email: &str) -> Person {
        Person {
            name: "Someone".to_string(),
            email: email.to_string(),
        }
    }

    fn bare_issue() -> SourceIssue {
        SourceIssue {
            id: "9f1c".to_string(),
            identifier: "ENG-1".to_string(),
            url: "https://linear.app/acme/issue/ENG-1".to_string(),
            title: "Fix bug".to_string(),
            description: None,
            creator: None,
            assignee: None,
            priority_label: "No priority".to_string(),
            state: WorkflowState::Backlog,
            project: None,
            created_at: Utc.with_ymd_and_hms(2023, 3, 14, 9, 30, 0).unwrap(),
            comments: vec![],
            relations: vec![],
            parent: None,
            children: vec![],
            attachments: vec![],
        }
    }

    fn full_issue() -> SourceIssue {
        SourceIssue {
            description: Some("Steps to reproduce".to_string()),
            creator: Some(person("alex@chai.finance")),
            assignee: Some(person("mae@chai.finance")),
            state: WorkflowState::Done,
            project: Some(ProjectRef {
                name: "Payments".to_string(),
                description: "Payment rails".to_string(),
            }),
            comments: vec![
                SourceComment {
                    url: "https://linear.app/acme/issue/ENG-1#comment-1".to_string(),
                    author_email: Some("mae@chai.finance".to_string()),
                    created_at: Utc.with_ymd_and_hms(2023, 3, 15, 1, 0, 0).unwrap(),
                    body: "Looking into it".to_string(),
                },
                SourceComment {
                    url: "https://linear.app/acme/issue/ENG-1#comment-2".to_string(),
                    author_email: None,
                    created_at: Utc.with_ymd_and_hms(2023, 3, 16, 1, 0, 0).unwrap(),
                    body: "Bot comment".to_string(),
                },
            ],
            relations: vec!["ENG-2".to_string(), "ENG-3".to_string()],
            parent: Some("ENG-0".to_string()),
            children: vec!["ENG-4".to_string()],
            attachments: vec!["https://github.com/acme/app/pull/9".to_string()],
            ..bare_issue()
        }
    }

    fn field(body: &str, name: &str) -> String {
        body.lines()
            .find_map(|line| line.strip_prefix(&format!("{} | ", name)))
            .unwrap_or_else(|| panic!("missing field {}", name))
            .to_string()
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[]), "");
        assert_eq!(
            format_list(&["A-1".to_string(), "A-2".to_string()]),
            "A-1, A-2"
        );
    }

    #[test]
    fn test_missing_people_degrade_to_empty() {
        let target = to_target_issue(&bare_issue(), &identities());
        assert_eq!(field(&target.body, "author"), "");
        assert_eq!(field(&target.body, "assignee"), "");
        assert_eq!(field(&target.body, "project"), "");
        assert_eq!(field(&target.body, "parent"), "");
        assert_eq!(field(&target.body, "related"), "");
        assert_eq!(target.assignee, "");
        assert!(target.project.is_none());
    }

    #[test]
    fn test_field_order() {
        for issue in [bare_issue(), full_issue()] {
            let target = to_target_issue(&issue, &identities());
            let fields: Vec<&str> = target
                .body
                .lines()
                .skip(2)
                .take_while(|line| !line.is_empty())
                .map(|line| line.split(" | ").next().unwrap())
                .collect();
            assert_eq!(
                fields,
                [
                    "url",
                    "author",
                    "date",
                    "state",
                    "project",
                    "priority",
                    "assignee",
                    "related",
                    "parent",
                    "children",
                    "attachments"
                ]
            );
        }
    }

    #[test]
    fn test_full_issue_rendering() {
        let issue = full_issue();
        let target = to_target_issue(&issue, &identities());

        let expected = format!(
            "field | value\n| - | - |\n\
             url | https://linear.app/acme/issue/ENG-1\n\
             author | @imcheck\n\
             date | {}\n\
             state | Done\n\
             project | Payments\n\
             priority | No priority\n\
             assignee | moonjihae\n\
             related | ENG-2, ENG-3\n\
             parent | ENG-0\n\
             children | ENG-4\n\
             attachments | https://github.com/acme/app/pull/9\n\
             \nSteps to reproduce",
            format_time(&issue.created_at)
        );
        assert_eq!(target.body, expected);
        assert_eq!(target.title, "Fix bug");
        assert_eq!(target.state, WorkflowState::Done);
        assert_eq!(target.project.as_ref().unwrap().name, "Payments");
    }

    #[test]
    fn test_empty_description_is_omitted() {
        let issue = SourceIssue {
            description: Some(String::new()),
            ..bare_issue()
        };
        let target = to_target_issue(&issue, &identities());
        assert!(target.body.ends_with("attachments | \n"));
    }

    #[test]
    fn test_comments_resolve_authors_independently() {
        let issue = full_issue();
        let target = to_target_issue(&issue, &identities());

        assert_eq!(target.comments.len(), 2);
        assert_eq!(
            target.comments[0],
            format!(
                "field | value\n|-|-|\nurl | https://linear.app/acme/issue/ENG-1#comment-1\n\
                 author | @moonjihae\ndate | {}\n\nLooking into it",
                format_time(&issue.comments[0].created_at)
            )
        );
        assert_eq!(field(&target.comments[1], "author"), "");
        assert!(target.comments[1].ends_with("\n\nBot comment"));
    }

    #[test]
    fn test_assignee_scenario() {
        let issue = SourceIssue {
            state: WorkflowState::Done,
            assignee: Some(person("mae@chai.finance")),
            ..bare_issue()
        };
        let target = to_target_issue(&issue, &identities());
        assert_eq!(target.assignee, "moonjihae");
        assert_eq!(target.state.to_string(), "Done");
    }

    #[test]
    fn test_unmapped_assignee_is_empty() {
        let issue = SourceIssue {
            assignee: Some(person("stranger@example.com")),
            ..bare_issue()
        };
        let target = to_target_issue(&issue, &identities());
        assert_eq!(target.assignee, "");
        assert_eq!(field(&target.body, "assignee"), "");
    }

    #[test]
    fn test_transform_is_deterministic() {
        let issue = full_issue();
        let map = identities();
        assert_eq!(to_target_issue(&issue, &map), to_target_issue(&issue, &map));
    }
}
