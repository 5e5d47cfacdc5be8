//! CLI command implementations

pub mod migrate;
pub mod reserve;

pub use migrate::MigrateArgs;
pub use reserve::ReserveArgs;

use anyhow::Context;
use byelinear_core::{Config, Secrets};
use byelinear_github::{parse_github_url, GitHubClient};

/// Split an `owner/repo` (or URL) argument
pub fn split_repo(repo: Option<&str>) -> anyhow::Result<(Option<String>, Option<String>)> {
    match repo {
        Some(repo) => {
            let (owner, name) = parse_github_url(repo)?;
            Ok((Some(owner), Some(name)))
        }
        None => Ok((None, None)),
    }
}

/// Build an authenticated GitHub client for the configured repository
pub fn github_client(config: &Config, secrets: &Secrets) -> anyhow::Result<GitHubClient> {
    let token = secrets.github_token().context(
        "GitHub token not found. Set GITHUB_TOKEN environment variable \
         or add token to ~/.config/byelinear/secrets.toml",
    )?;
    Ok(
        GitHubClient::new(&token, &config.github.org, &config.github.repo)?
            .endpoints(&config.github.api_url, &config.github.graphql_url),
    )
}
