//! Secret loading for live providers.
//!
//! The Gemini API key is read from `GEMINI_API_KEY` or `API_KEY`, then from
//! `~/.config/teos-studio/secret.json`.

use std::fs;
use std::path::Path;
use studio_core::config::{SecretConfig, secret_path};
use studio_core::error::{Result, StudioError};

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Loads a secret configuration file.
pub fn load_secret_config_from(path: &Path) -> Result<SecretConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        StudioError::config(format!(
            "Failed to read secret file at {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        StudioError::config(format!(
            "Failed to parse secret file at {}: {}",
            path.display(),
            e
        ))
    })
}

/// Loads `~/.config/teos-studio/secret.json`; a missing file yields an empty config.
pub fn load_secret_config() -> Result<SecretConfig> {
    let path = secret_path()?;
    if !path.exists() {
        return Ok(SecretConfig::default());
    }
    load_secret_config_from(&path)
}

/// Resolves the Gemini API key from the environment, then the secret file.
///
/// Blank values are treated as absent.
pub fn resolve_api_key(secrets: &SecretConfig) -> Option<String> {
    resolve_api_key_with(secrets, |var| std::env::var(var).ok())
}

/// Same as `resolve_api_key` with an explicit variable lookup.
pub fn resolve_api_key_with<F>(secrets: &SecretConfig, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .chain(secrets.gemini.as_ref().map(|g| g.api_key.clone()))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_secret_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(
            &path,
            r#"{"gemini": {"api_key": "abc123", "model_name": "gemini-2.5-pro"}}"#,
        )
        .unwrap();

        let secrets = load_secret_config_from(&path).unwrap();
        let gemini = secrets.gemini.unwrap();
        assert_eq!(gemini.api_key, "abc123");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-pro"));
    }

    fn env(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<_> = vars.to_vec();
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    fn file_secrets(key: &str) -> SecretConfig {
        serde_json::from_str(&format!(r#"{{"gemini": {{"api_key": "{key}"}}}}"#)).unwrap()
    }

    #[test]
    fn test_api_key_precedence() {
        let secrets = file_secrets("from-file");

        let both = env(&[("GEMINI_API_KEY", "gemini"), ("API_KEY", "generic")]);
        assert_eq!(resolve_api_key_with(&secrets, both).as_deref(), Some("gemini"));

        let generic = env(&[("API_KEY", "generic")]);
        assert_eq!(resolve_api_key_with(&secrets, generic).as_deref(), Some("generic"));

        assert_eq!(
            resolve_api_key_with(&secrets, env(&[])).as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_blank_api_keys_are_skipped() {
        let lookup = env(&[("GEMINI_API_KEY", "   "), ("API_KEY", "")]);
        assert_eq!(
            resolve_api_key_with(&file_secrets(" from-file "), lookup).as_deref(),
            Some("from-file")
        );

        let lookup = env(&[("GEMINI_API_KEY", " ")]);
        assert_eq!(resolve_api_key_with(&file_secrets(""), lookup), None);
        assert_eq!(resolve_api_key_with(&SecretConfig::default(), env(&[])), None);
    }

    #[test]
    fn test_malformed_secret_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_secret_config_from(&path).unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }
}
