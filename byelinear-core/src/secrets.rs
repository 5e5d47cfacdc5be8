//! Secrets management for byelinear
//!
//! API tokens live apart from configuration in
//! `~/.config/byelinear/secrets.toml`, which must have restrictive
//! permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (LINEAR_API_KEY, GITHUB_TOKEN)
//! 2. Secrets file (~/.config/byelinear/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub linear: TokenSecret,
    pub github: TokenSecret,
}

/// A single API token
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenSecret {
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(
                path = %path.display(),
                mode = format!("{:o}", mode & 0o777),
                "Secrets file permissions OK"
            );
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        for token in [&mut secrets.linear.token, &mut secrets.github.token]
            .into_iter()
            .flatten()
        {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/byelinear/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("byelinear").join("secrets.toml"))
    }

    /// Linear API key; LINEAR_API_KEY wins over the secrets file
    pub fn linear_token(&self) -> Option<String> {
        resolve("LINEAR_API_KEY", std::env::var("LINEAR_API_KEY").ok(), &self.linear)
    }

    /// GitHub token; GITHUB_TOKEN wins over the secrets file
    pub fn github_token(&self) -> Option<String> {
        resolve("GITHUB_TOKEN", std::env::var("GITHUB_TOKEN").ok(), &self.github)
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# byelinear secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[linear]
# Linear personal API key
# Create at: https://linear.app/settings/api
token = ""

[github]
# GitHub Personal Access Token
# Required permissions: repo, project (and admin on the repo to delete placeholder issues)
token = ""
"#;

        std::fs::write(path, template).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your tokens");

        Ok(())
    }
}

fn resolve(var: &str, env: Option<String>, file: &TokenSecret) -> Option<String> {
    if let Some(token) = env.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        debug!(var, "Using token from environment variable");
        return Some(token);
    }

    file.token
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| {
            debug!(var, "Using token from secrets file");
            t.clone()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[linear]
token = "lin_api_xxx"

[github]
token = "ghp_xxxxxxxxxxxx"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.linear.token, Some("lin_api_xxx".to_string()));
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
    }

    #[test]
    fn test_resolve_prefers_env() {
        let file = TokenSecret {
            token: Some("from_file".to_string()),
        };
        assert_eq!(
            resolve("X", Some(" from_env ".to_string()), &file),
            Some("from_env".to_string())
        );
        assert_eq!(
            resolve("X", Some("   ".to_string()), &file),
            Some("from_file".to_string())
        );
        assert_eq!(resolve("X", None, &TokenSecret::default()), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = Secrets::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted_and_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[linear]\ntoken = \"  lin_test  \"").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.linear.token, Some("lin_test".to_string()));
        assert_eq!(secrets.github.token, None);
    }

    #[test]
    fn test_create_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("byelinear").join("secrets.toml");

        Secrets::create_template_at(&path).unwrap();
        assert!(path.exists());
        assert!(Secrets::create_template_at(&path).is_err());
    }
}
