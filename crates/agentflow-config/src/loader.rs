// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Config, ConfigError};

/// Sample configuration template embedded in the binary, copied into place
/// by `agentflow setup`.
pub const SAMPLE_CONFIG: &str = include_str!("../assets/settings.sample.yaml");

/// Default config path: `<project_root>/settings.yaml`, with no env var
/// required. `project_root` is the current working directory; callers that know the
/// actual project root should pass an explicit `--config` instead.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("settings.yaml")
}

/// Load configuration from `path`, or the default path when `path` is `None`.
///
/// Reads a single file at an explicit location (or an explicit `--config`
/// override), rather than searching a layered set of candidate paths.
///
/// # Errors
/// Returns [`ConfigError::Missing`] if the file does not exist, or
/// [`ConfigError::Invalid`] if it cannot be parsed as the expected schema.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !path.is_file() {
        return Err(ConfigError::Missing(path));
    }

    debug!(path = %path.display(), "loading config");
    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Invalid {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    serde_yaml::from_str(&text).map_err(|e| ConfigError::Invalid {
        path,
        reason: e.to_string(),
    })
}

/// `check_settings` fails if the file is missing, or if `openai.api_key` is
/// absent or an obvious placeholder.
pub fn check_settings(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = load(path)?;
    let resolved = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let key = config.openai.api_key.trim();
    let is_placeholder = key.is_empty()
        || key.eq_ignore_ascii_case("changeme")
        || key.eq_ignore_ascii_case("your-api-key-here")
        || key.eq_ignore_ascii_case("sk-...")
        || key.starts_with("<") && key.ends_with(">");

    if is_placeholder {
        return Err(ConfigError::ApiKeyMissing(resolved));
    }

    Ok(config)
}

/// Copy the sample config template to `path` (or the default path) if no
/// file exists there yet. Returns the path written to, or `None` if a file
/// already existed and was left untouched.
pub fn setup(path: Option<&Path>) -> std::io::Result<Option<PathBuf>> {
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if target.exists() {
        return Ok(None);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&target, SAMPLE_CONFIG)?;
    Ok(Some(target))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_missing_file_errors() {
        let result = load(Some(Path::new("/tmp/agentflow_nonexistent_xyz.yaml")));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn load_explicit_file_parses_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "openai:\n  api_key: sk-real\n  model: gpt-4o").unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.openai.api_key, "sk-real");
        assert_eq!(cfg.openai.model, "gpt-4o");
    }

    #[test]
    fn load_invalid_yaml_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "openai: [this is not a mapping").unwrap();
        let result = load(Some(f.path()));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn check_settings_fails_on_missing_key() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "openai:\n  model: gpt-4o").unwrap();
        let result = check_settings(Some(f.path()));
        assert!(matches!(result, Err(ConfigError::ApiKeyMissing(_))));
    }

    #[test]
    fn check_settings_fails_on_placeholder_key() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "openai:\n  api_key: changeme\n  model: gpt-4o").unwrap();
        let result = check_settings(Some(f.path()));
        assert!(matches!(result, Err(ConfigError::ApiKeyMissing(_))));
    }

    #[test]
    fn check_settings_succeeds_on_real_key() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "openai:\n  api_key: sk-abc123\n  model: gpt-4o").unwrap();
        let cfg = check_settings(Some(f.path())).unwrap();
        assert_eq!(cfg.openai.api_key, "sk-abc123");
    }

    #[test]
    fn setup_writes_template_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("settings.yaml");
        let written = setup(Some(&target)).unwrap();
        assert_eq!(written, Some(target.clone()));
        assert!(target.is_file());
    }

    #[test]
    fn setup_does_not_overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("settings.yaml");
        std::fs::write(&target, "openai:\n  api_key: keep-me\n").unwrap();
        let written = setup(Some(&target)).unwrap();
        assert_eq!(written, None);
        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.contains("keep-me"));
    }
}
