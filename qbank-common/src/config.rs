//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Service configuration assembled at startup.
///
/// The JWT secret is required process-wide; the server refuses to start
/// without one. Synthesis URLs have compiled defaults and are overridable
/// from the config file or environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt_secret: String,
    pub speech_base_url: String,
    pub explanation_base_url: String,
}

const DEFAULT_SPEECH_URL: &str = "http://127.0.0.1:5790/synthesize";
const DEFAULT_EXPLANATION_URL: &str = "http://127.0.0.1:5791/explain";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `QBANK_ROOT` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("QBANK_ROOT") {
        return PathBuf::from(path);
    }

    if let Some(root) = read_config_key("root_folder") {
        return PathBuf::from(root);
    }

    get_default_root_folder()
}

/// Database file path inside the root folder.
pub fn database_path(root: &std::path::Path) -> PathBuf {
    root.join("qbank.db")
}

/// Load the full service configuration.
///
/// Secret resolution: `QBANK_JWT_SECRET` env var, then `jwt_secret` in the
/// config file. Missing secret is a hard startup error.
pub fn load_service_config() -> Result<ServiceConfig> {
    let jwt_secret = std::env::var("QBANK_JWT_SECRET")
        .ok()
        .or_else(|| read_config_key("jwt_secret"))
        .ok_or_else(|| {
            Error::Config(
                "JWT secret not configured (set QBANK_JWT_SECRET or jwt_secret in config.toml)"
                    .to_string(),
            )
        })?;

    let speech_base_url = std::env::var("QBANK_SPEECH_URL")
        .ok()
        .or_else(|| read_config_key("speech_url"))
        .unwrap_or_else(|| DEFAULT_SPEECH_URL.to_string());

    let explanation_base_url = std::env::var("QBANK_EXPLANATION_URL")
        .ok()
        .or_else(|| read_config_key("explanation_url"))
        .unwrap_or_else(|| DEFAULT_EXPLANATION_URL.to_string());

    Ok(ServiceConfig {
        jwt_secret,
        speech_base_url,
        explanation_base_url,
    })
}

/// Read a single string key from the TOML config file, if present.
fn read_config_key(key: &str) -> Option<String> {
    let path = find_config_file()?;
    let content = std::fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Locate the platform config file.
fn find_config_file() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/qbank/config.toml first, then /etc/qbank/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("qbank").join("config.toml")) {
            if path.exists() {
                return Some(path);
            }
        }
        let system = PathBuf::from("/etc/qbank/config.toml");
        if system.exists() {
            return Some(system);
        }
        None
    } else {
        dirs::config_dir()
            .map(|d| d.join("qbank").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("qbank"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/qbank"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("qbank"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/qbank"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("qbank"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\qbank"))
    } else {
        PathBuf::from("./qbank_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/qbank-test-root"));
        assert_eq!(root, PathBuf::from("/tmp/qbank-test-root"));
    }

    #[test]
    fn test_database_path_is_inside_root() {
        let root = PathBuf::from("/data/qbank");
        assert_eq!(database_path(&root), PathBuf::from("/data/qbank/qbank.db"));
    }
}
