//! Migrate command - move Linear issues into GitHub

use std::time::Duration;

use anyhow::Context;
use byelinear_core::{to_target_issue, CliOverrides, Config, Secrets, SourceIssue, TargetIssue};
use byelinear_github::Exporter;
use byelinear_linear::{IssueFilter, LinearClient};
use clap::Args;
use tracing::{error, info};

use super::{github_client, split_repo};

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Linear team to migrate issues from
    #[arg(short, long)]
    pub team: Option<String>,

    /// Only migrate the issue with this number
    #[arg(short, long)]
    pub number: Option<u64>,

    /// GitHub project board to add issues to
    #[arg(short, long)]
    pub project: Option<String>,

    /// Target repository (owner/repo); the owner is also the project's organization
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Per-issue export deadline (e.g. "2m", "90s")
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Print the GitHub issues that would be created without creating them
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going when an issue fails to export
    #[arg(long)]
    pub continue_on_error: bool,

    /// Burn GitHub issue numbers so each issue keeps its Linear number
    #[arg(long)]
    pub preserve_numbers: bool,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

impl MigrateArgs {
    /// Command-line values that override the config file and environment
    pub fn overrides(&self) -> anyhow::Result<CliOverrides> {
        let (org, repo) = split_repo(self.repo.as_deref())?;
        Ok(CliOverrides {
            org,
            repo,
            project: self.project.clone(),
            team: self.team.clone(),
            number: self.number,
            timeout: self.timeout,
            continue_on_error: self.continue_on_error,
        })
    }

    /// Execute the migrate command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        config.validate()?;
        let secrets = Secrets::load()?;

        let linear_token = secrets.linear_token().context(
            "Linear API key not found. Set LINEAR_API_KEY environment variable \
             or add token to ~/.config/byelinear/secrets.toml",
        )?;
        let linear = LinearClient::new(&linear_token)?.endpoint(&config.linear.graphql_url);

        let exporter = if self.dry_run {
            None
        } else {
            let client = github_client(config, &secrets)?;
            Some(
                Exporter::new(client, config.project_name().map(str::to_string))
                    .with_timeout(config.export.timeout),
            )
        };

        let filter = IssueFilter {
            number: config.linear.number,
            team: config.linear.team.clone(),
        };
        info!(team = %filter.team, number = ?filter.number, "Starting migration");

        let mut before: Option<String> = None;
        let mut summary = Summary::default();
        // Numbers can only be preserved when issues are created in ascending order
        let mut pending = Vec::new();
        loop {
            let page = linear
                .fetch_issues(before.as_deref(), &filter)
                .await
                .context("Failed to fetch Linear issues")?;
            let cursor = page.next_before().map(str::to_string);

            if self.preserve_numbers {
                pending.extend(page.issues);
            } else {
                for issue in &page.issues {
                    self.handle(exporter.as_ref(), config, issue, &mut summary)
                        .await?;
                }
            }

            match cursor {
                Some(cursor) => before = Some(cursor),
                None => break,
            }
        }

        for issue in &oldest_first(pending) {
            self.handle(exporter.as_ref(), config, issue, &mut summary)
                .await?;
        }

        println!();
        println!(
            "Migrated {} issue(s), {} failed",
            summary.exported,
            summary.failed.len()
        );
        if !summary.failed.is_empty() {
            anyhow::bail!("Failed to export: {}", summary.failed.join(", "));
        }
        Ok(())
    }

    async fn handle(
        &self,
        exporter: Option<&Exporter>,
        config: &Config,
        issue: &SourceIssue,
        summary: &mut Summary,
    ) -> anyhow::Result<()> {
        let target = to_target_issue(issue, &config.identities);
        match exporter {
            None => {
                print_dry_run(issue, &target);
                Ok(())
            }
            Some(exporter) => {
                self.export_one(exporter, config, issue, &target, summary)
                    .await
            }
        }
    }

    async fn export_one(
        &self,
        exporter: &Exporter,
        config: &Config,
        issue: &SourceIssue,
        target: &TargetIssue,
        summary: &mut Summary,
    ) -> anyhow::Result<()> {
        let ident = issue.identifier.as_str();
        let result = match issue.number().filter(|_| self.preserve_numbers) {
            Some(number) => match exporter.client().reserve_number(number).await {
                Ok(reservation) => {
                    exporter
                        .export_into(ident, target, &reservation.issue)
                        .await
                }
                Err(e) => Err(e),
            },
            None => exporter.export(ident, target).await,
        };

        match result {
            Ok(url) => {
                println!("{} -> {}", issue.identifier, url);
                summary.exported += 1;
                Ok(())
            }
            Err(e) if config.export.continue_on_error => {
                error!(ident = %issue.identifier, error = %e, "Export failed, continuing");
                summary.failed.push(issue.identifier.clone());
                Ok(())
            }
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("Failed to export {}", issue.identifier)))
            }
        }
    }
}

/// Order issues by Linear number, oldest first
///
/// Pages arrive newest first; creating in this order lets each issue claim
/// its number before any later one passes it.
fn oldest_first(mut issues: Vec<SourceIssue>) -> Vec<SourceIssue> {
    issues.sort_by_key(|issue| (issue.number(), issue.created_at));
    issues
}

#[derive(Debug, Default)]
struct Summary {
    exported: usize,
    failed: Vec<String>,
}

fn print_dry_run(issue: &SourceIssue, target: &TargetIssue) {
    println!("=== {} ({})", issue.identifier, target.state);
    println!("title: {}", target.title);
    if !target.assignee.is_empty() {
        println!("assignee: {}", target.assignee);
    }
    println!();
    println!("{}", target.body);
    for comment in &target.comments {
        println!("--- comment");
        println!("{}", comment);
    }
    println!();
}
