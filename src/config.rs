//! Configuration for studyhall.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STUDYHALL_HOME, STUDYHALL_API_URL, STUDYHALL_MEDIA_URL)
//! 2. Config file (.studyhall/config.yaml)
//! 3. Defaults (~/.studyhall, http://localhost:8001)
//!
//! Config file discovery:
//! - Searches current directory and parents for .studyhall/config.yaml
//! - Paths in the config file are relative to the config file's parent

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_API_URL: &str = "http://localhost:8001";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub media: Option<MediaConfig>,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Base URL uploads are served from; defaults to the API base URL.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Client state directory (relative to config file)
    pub home: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to studyhall home (session token, local state)
    pub home: PathBuf,
    /// Backend API base URL
    pub api_url: String,
    /// Base URL for backend-served media
    pub media_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Path the session token is persisted at.
    pub fn token_path(&self) -> PathBuf {
        self.home.join("token")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".studyhall").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".studyhall");

    let config_file = find_config_file();
    let file = match &config_file {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    let home = if let Ok(env_home) = std::env::var("STUDYHALL_HOME") {
        PathBuf::from(env_home)
    } else if let Some(home_path) = file.as_ref().and_then(|f| f.paths.home.as_deref()) {
        // home is relative to the .studyhall/ directory
        let base = config_file
            .as_ref()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));
        resolve_path(base, home_path)
    } else {
        default_home
    };

    let api_url = std::env::var("STUDYHALL_API_URL")
        .ok()
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.api.as_ref())
                .and_then(|a| a.base_url.clone())
        })
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    // Media defaults to the API host; uploads are served by the backend.
    let media_url = std::env::var("STUDYHALL_MEDIA_URL")
        .ok()
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.media.as_ref())
                .and_then(|m| m.base_url.clone())
        })
        .unwrap_or_else(|| api_url.clone());

    let timeout_seconds = file
        .as_ref()
        .and_then(|f| f.api.as_ref())
        .and_then(|a| a.timeout_seconds)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    Ok(ResolvedConfig {
        home,
        api_url: api_url.trim_end_matches('/').to_string(),
        media_url: media_url.trim_end_matches('/').to_string(),
        timeout: Duration::from_secs(timeout_seconds),
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".studyhall");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
api:
  base_url: http://192.168.1.10:8001
  timeout_seconds: 30
media:
  base_url: http://192.168.1.10:8001
paths:
  home: ./
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(
            config.api.as_ref().unwrap().base_url.as_deref(),
            Some("http://192.168.1.10:8001")
        );
        assert_eq!(config.api.unwrap().timeout_seconds, Some(30));
        assert_eq!(config.paths.home, Some("./".to_string()));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            resolve_path(&base, "../sibling"),
            PathBuf::from("/home/user/project/../sibling")
        );
    }

    #[test]
    fn test_token_path_under_home() {
        let config = ResolvedConfig {
            home: PathBuf::from("/test/.studyhall"),
            api_url: DEFAULT_API_URL.to_string(),
            media_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            config_file: None,
        };
        assert_eq!(config.token_path(), PathBuf::from("/test/.studyhall/token"));
    }
}
