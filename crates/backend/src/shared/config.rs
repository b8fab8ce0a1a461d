use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/app.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Uploaded template files
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Document library root; one folder per template
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            documents_dir: default_documents_dir(),
        }
    }
}

fn default_templates_dir() -> String {
    "target/templates".to_string()
}

fn default_documents_dir() -> String {
    "target/documents".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// External render service; generation is unavailable without it
    pub endpoint: Option<String>,
    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_render_timeout(),
        }
    }
}

fn default_render_timeout() -> u64 {
    60
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[storage]
templates_dir = "target/templates"
documents_dir = "target/documents"

[render]
timeout_secs = 60
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Install the process-wide configuration (first call wins)
pub fn set_config(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized; ignoring reload");
    }
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Resolve a configured path.
/// Relative paths are resolved relative to the executable directory.
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.render.endpoint, None);
        assert_eq!(config.storage.documents_dir, "target/documents");
    }

    #[test]
    fn test_optional_sections_default() {
        let config: Config = toml::from_str("[database]\npath = \"x.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.render.timeout_secs, 60);
        assert_eq!(config.storage.templates_dir, "target/templates");
    }

    #[test]
    fn test_render_endpoint() {
        let config: Config = toml::from_str(
            "[database]\npath = \"x.db\"\n[render]\nendpoint = \"http://render:8080/render\"\n",
        )
        .unwrap();
        assert_eq!(
            config.render.endpoint.as_deref(),
            Some("http://render:8080/render")
        );
        assert_eq!(config.render.timeout_secs, 60);
    }

    #[test]
    fn test_absolute_path_kept() {
        let abs = if cfg!(windows) { "C:\\data\\app.db" } else { "/data/app.db" };
        assert_eq!(resolve_path(abs), PathBuf::from(abs));
    }
}
