//! Configuration management for byelinear
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BYELINEAR_*)
//! 3. Config file (~/.config/byelinear/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityMap;
use crate::{Error, Result};

/// Linear GraphQL endpoint
pub const LINEAR_GRAPHQL_URL: &str = "https://api.linear.app/graphql";
/// GitHub GraphQL endpoint
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
/// GitHub REST API base
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default per-issue export deadline
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(120);

/// GitHub (target) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Organization owning the repository and project board
    pub org: String,

    /// Repository issues are created in
    pub repo: String,

    /// Project board (v2) title; issues are only added to a board when set
    pub project: Option<String>,

    /// REST API base URL
    pub api_url: String,

    /// GraphQL endpoint
    pub graphql_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            org: String::new(),
            repo: String::new(),
            project: None,
            api_url: GITHUB_API_URL.to_string(),
            graphql_url: GITHUB_GRAPHQL_URL.to_string(),
        }
    }
}

/// Linear (source) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinearConfig {
    /// Team name issues are fetched from
    pub team: String,

    /// Only fetch the issue with this number
    pub number: Option<u64>,

    /// GraphQL endpoint
    pub graphql_url: String,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            team: String::new(),
            number: None,
            graphql_url: LINEAR_GRAPHQL_URL.to_string(),
        }
    }
}

/// Export behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Deadline for exporting a single issue
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Keep going after an issue fails to export
    pub continue_on_error: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXPORT_TIMEOUT,
            continue_on_error: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub linear: LinearConfig,
    pub export: ExportConfig,
    /// Linear email → GitHub handle
    pub identities: IdentityMap,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub org: Option<String>,
    pub repo: Option<String>,
    pub project: Option<String>,
    pub team: Option<String>,
    pub number: Option<u64>,
    pub timeout: Option<Duration>,
    pub continue_on_error: bool,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/byelinear/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("byelinear").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - BYELINEAR_GITHUB_ORG
    /// - BYELINEAR_GITHUB_REPO
    /// - BYELINEAR_PROJECT_NAME
    /// - BYELINEAR_TEAM_NAME
    /// - BYELINEAR_ISSUE_NUMBER (ignored unless numeric)
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(org) = var("BYELINEAR_GITHUB_ORG") {
            self.github.org = org;
        }
        if let Some(repo) = var("BYELINEAR_GITHUB_REPO") {
            self.github.repo = repo;
        }
        if let Some(project) = var("BYELINEAR_PROJECT_NAME") {
            self.github.project = Some(project);
        }
        if let Some(team) = var("BYELINEAR_TEAM_NAME") {
            self.linear.team = team;
        }
        if let Some(number) = var("BYELINEAR_ISSUE_NUMBER").and_then(|n| n.trim().parse().ok()) {
            self.linear.number = Some(number);
        }
        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Self {
        if let Some(org) = cli.org {
            self.github.org = org;
        }
        if let Some(repo) = cli.repo {
            self.github.repo = repo;
        }
        if let Some(project) = cli.project {
            self.github.project = Some(project);
        }
        if let Some(team) = cli.team {
            self.linear.team = team;
        }
        if let Some(number) = cli.number {
            self.linear.number = Some(number);
        }
        if let Some(timeout) = cli.timeout {
            self.export.timeout = timeout;
        }
        if cli.continue_on_error {
            self.export.continue_on_error = true;
        }
        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides().with_cli_overrides(cli))
    }

    /// Project board title, treating an empty name as unset
    pub fn project_name(&self) -> Option<&str> {
        self.github.project.as_deref().filter(|p| !p.is_empty())
    }

    /// Check that the values the engine cannot run without are present
    pub fn validate(&self) -> Result<()> {
        if self.github.org.is_empty() {
            return Err(Error::Config("GitHub organization is not set".to_string()));
        }
        if self.github.repo.is_empty() {
            return Err(Error::Config("GitHub repository is not set".to_string()));
        }
        if self.linear.team.is_empty() {
            return Err(Error::Config("Linear team name is not set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.linear.graphql_url, LINEAR_GRAPHQL_URL);
        assert_eq!(config.github.graphql_url, GITHUB_GRAPHQL_URL);
        assert_eq!(config.github.api_url, GITHUB_API_URL);
        assert_eq!(config.export.timeout, Duration::from_secs(120));
        assert!(!config.export.continue_on_error);
        assert!(config.identities.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[github]
org = "acme"
repo = "tracker"
project = "Roadmap"

[linear]
team = "Engineering"
number = 42

[export]
timeout = "30s"

[identities]
"mae@chai.finance" = "moonjihae"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.org, "acme");
        assert_eq!(config.github.repo, "tracker");
        assert_eq!(config.project_name(), Some("Roadmap"));
        assert_eq!(config.linear.team, "Engineering");
        assert_eq!(config.linear.number, Some(42));
        assert_eq!(config.export.timeout, Duration::from_secs(30));
        assert_eq!(
            config.identities.handle(Some("mae@chai.finance")),
            "moonjihae"
        );
        // endpoints keep their defaults
        assert_eq!(config.github.api_url, GITHUB_API_URL);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[linear]\nteam = \"Core\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.linear.team, "Core");
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[linear\nteam = ").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BYELINEAR_GITHUB_ORG", "env-org"),
            ("BYELINEAR_TEAM_NAME", "Platform"),
            ("BYELINEAR_ISSUE_NUMBER", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.github.org, "env-org");
        assert_eq!(config.linear.team, "Platform");
        assert_eq!(config.linear.number, None);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default()
            .with_overrides_from(|key| {
                (key == "BYELINEAR_GITHUB_REPO").then(|| "from-env".to_string())
            })
            .with_cli_overrides(CliOverrides {
                repo: Some("from-cli".to_string()),
                number: Some(5),
                continue_on_error: true,
                ..Default::default()
            });
        assert_eq!(config.github.repo, "from-cli");
        assert_eq!(config.linear.number, Some(5));
        assert!(config.export.continue_on_error);
    }

    #[test]
    fn test_empty_project_is_unset() {
        let mut config = Config::default();
        config.github.project = Some(String::new());
        assert_eq!(config.project_name(), None);
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.github.org = "acme".to_string();
        config.github.repo = "tracker".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("team"));

        config.linear.team = "Engineering".to_string();
        assert!(config.validate().is_ok());
    }
}
