use crate::client::ClientType;
use crate::inspect::MatchPolicy;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Contents of `game-patcher.toml`. Every field is optional; command-line
/// flags and environment variables take precedence.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub game_dir: Option<PathBuf>,
    #[serde(default)]
    pub patch_dir: Option<PathBuf>,
    /// Overrides client detection
    #[serde(default)]
    pub client: Option<ClientType>,
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self
            .game_dir
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            issues.push(ValidationIssue::EmptyPath { field: "game_dir" });
        }
        if self
            .patch_dir
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            issues.push(ValidationIssue::EmptyPath { field: "patch_dir" });
        }

        if let Some(client) = self.client {
            if !client.is_valid() {
                issues.push(ValidationIssue::UnsupportedClient { client });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Join relative directory entries onto `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        for dir in [&mut self.game_dir, &mut self.patch_dir]
            .into_iter()
            .flatten()
        {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("'{field}' must not be empty")]
    EmptyPath { field: &'static str },
    #[error("client '{client}' cannot be patched (expected 'chinese' or 'ocean')")]
    UnsupportedClient { client: ClientType },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_collects_every_issue() {
        let settings = Settings {
            game_dir: Some(PathBuf::new()),
            patch_dir: None,
            client: Some(ClientType::NotSupported),
            match_policy: MatchPolicy::Strict,
        };

        let err = settings.validate().unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(
            err.to_string(),
            "'game_dir' must not be empty\n\
             client 'not-supported' cannot be patched (expected 'chinese' or 'ocean')"
        );
    }

    #[test]
    fn test_resolve_relative_keeps_absolute_dirs() {
        let mut settings = Settings {
            game_dir: Some(PathBuf::from("game")),
            patch_dir: Some(PathBuf::from("/abs/patches")),
            ..Settings::default()
        };

        settings.resolve_relative(Path::new("/home/player"));

        assert_eq!(settings.game_dir, Some(PathBuf::from("/home/player/game")));
        assert_eq!(settings.patch_dir, Some(PathBuf::from("/abs/patches")));
    }
}
