use rltr_core::{PageLimits, RltrError, RltrResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_PATH_ENV: &str = "RLTR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "rltr.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = RltrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(RltrError::configuration(
                format!("unknown log format '{other}', expected 'json' or 'pretty'"),
                Some("logging.format"),
            )),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::default() }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { default_limit: default_limit(), max_limit: default_max_limit() }
    }
}

impl From<PagingConfig> for PageLimits {
    fn from(paging: PagingConfig) -> Self {
        PageLimits { default_limit: paging.default_limit, max_limit: paging.max_limit }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DataConfig {
    /// Directory holding `<collection>.json` files that replace the built-in seeds
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was not found and built-in defaults are in use
    Defaults { missing: PathBuf },
}

impl ConfigSource {
    /// Report the source. Call once a subscriber is installed.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration file"),
            ConfigSource::Defaults { missing } => warn!(
                "Configuration file '{}' not found. Using default configuration.",
                missing.display()
            ),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RltrConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl RltrConfig {
    /// Load from an explicit path, or from `RLTR_CONFIG_PATH`, or from `rltr.toml`.
    ///
    /// A missing file falls back to defaults, reported through [`ConfigSource::Defaults`]
    /// because logging is usually not set up yet. A file that exists but does not parse
    /// is an error.
    pub fn load(path: Option<&Path>) -> RltrResult<(Self, ConfigSource)> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
        });

        match fs::read_to_string(&config_path) {
            Ok(raw) => Ok((Self::from_toml(&raw)?, ConfigSource::File(config_path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), ConfigSource::Defaults { missing: config_path }))
            }
            Err(source) => {
                Err(RltrError::Io { path: config_path.display().to_string(), source })
            }
        }
    }

    pub fn from_toml(raw: &str) -> RltrResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| RltrError::configuration(format!("invalid TOML: {e}"), None))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RLTR_*` environment variable overrides
    pub fn apply_env(self) -> RltrResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> RltrResult<Self> {
        if let Some(host) = lookup("RLTR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RLTR_PORT") {
            self.server.port = port.parse().map_err(|_| {
                RltrError::configuration(format!("invalid port '{port}'"), Some("RLTR_PORT"))
            })?;
        }
        if let Some(level) = lookup("RLTR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("RLTR_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        if let Some(dir) = lookup("RLTR_DATA_DIR") {
            self.data.data_dir = Some(PathBuf::from(dir));
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> RltrResult<()> {
        if self.paging.default_limit == 0 || self.paging.max_limit == 0 {
            return Err(RltrError::configuration("paging limits must be positive", Some("paging")));
        }
        if self.paging.default_limit > self.paging.max_limit {
            return Err(RltrError::configuration(
                "default_limit cannot exceed max_limit",
                Some("paging.default_limit"),
            ));
        }
        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            return Err(RltrError::configuration(
                "api_prefix must start with '/'",
                Some("server.api_prefix"),
            ));
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        self.paging.into()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_api_prefix() -> String {
    "/api".to_string()
}
fn default_log_level() -> String {
    "rltr=info,rltr_api=info,rltr_core=info,tower_http=info".to_string()
}
fn default_limit() -> usize {
    PageLimits::default().default_limit
}
fn default_max_limit() -> usize {
    PageLimits::default().max_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RltrConfig::from_toml("").unwrap();
        assert_eq!(config, RltrConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.page_limits(), PageLimits { default_limit: 25, max_limit: 100 });
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RltrConfig::from_toml(
            r#"
            [server]
            port = 8080
            cors_origins = ["http://localhost:5173"]

            [logging]
            format = "pretty"

            [paging]
            max_limit = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.paging.default_limit, 25);
        assert_eq!(config.paging.max_limit, 50);
    }

    #[test]
    fn rejects_inconsistent_paging() {
        let err = RltrConfig::from_toml("[paging]\ndefault_limit = 200\nmax_limit = 100").unwrap_err();
        assert!(matches!(err, RltrError::Configuration { .. }));
        assert!(RltrConfig::from_toml("[server\nport = 1").is_err());
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("RLTR_HOST", "0.0.0.0"),
            ("RLTR_PORT", "9090"),
            ("RLTR_LOG_FORMAT", "Pretty"),
            ("RLTR_DATA_DIR", "/srv/rltr"),
        ]
        .into_iter()
        .collect();
        let config = RltrConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.data.data_dir, Some(PathBuf::from("/srv/rltr")));

        let bad_port = RltrConfig::default()
            .apply_overrides(|key| (key == "RLTR_PORT").then(|| "http".to_string()));
        assert!(bad_port.is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let missing = Path::new("/nonexistent/rltr.toml");
        let (config, source) = RltrConfig::load(Some(missing)).unwrap();
        assert_eq!(config, RltrConfig::default());
        assert_eq!(source, ConfigSource::Defaults { missing: missing.to_path_buf() });
    }

    #[test]
    fn existing_file_is_reported_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rltr.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let (config, source) = RltrConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(source, ConfigSource::File(path));
    }
}
