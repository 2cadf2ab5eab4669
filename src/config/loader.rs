use crate::config::schema::{Settings, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "game-patcher.toml";

/// Failure to load a settings file. Parse and validation failures carry the
/// file they came from unless the settings were given as a string.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings TOML{}: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },
    #[error("invalid settings{}: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Parse and validate settings. `origin_path` is only used for error context.
fn parse(input: &str, origin_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = || origin_path.map(Path::to_path_buf);
    let settings: Settings = toml_edit::de::from_str(input).map_err(|source| {
        ConfigError::Toml {
            path: path(),
            source,
        }
    })?;
    settings
        .validate()
        .map_err(|source| ConfigError::Validation {
            path: path(),
            source,
        })?;
    Ok(settings)
}

pub fn load_from_str(input: &str) -> Result<Settings, ConfigError> {
    parse(input, None)
}

/// Load settings from `path`. Relative `game_dir`/`patch_dir` entries are
/// resolved against the settings file's directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut settings = parse(&contents, Some(path))?;
    if let Some(base) = path.parent() {
        settings.resolve_relative(base);
    }
    log::debug!("loaded settings from {}", path.display());
    Ok(settings)
}

/// Load `explicit` if given, else `./game-patcher.toml` if it exists, else
/// defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let default_path = Path::new(DEFAULT_SETTINGS_FILE);
    if default_path.is_file() {
        load_from_path(default_path)
    } else {
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_string_errors_have_no_origin() {
        let err = load_from_str("client = [").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse settings TOML: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game-patcher.toml");
        fs::write(&path, "client = \"none\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid settings ("), "{message}");
        assert!(message.contains("game-patcher.toml"));
        assert!(message.ends_with("cannot be patched (expected 'chinese' or 'ocean')"));
    }

    #[test]
    fn test_explicit_missing_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load_settings(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }
}
