use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment prefix for overrides, e.g. `CLOUD__API__BASE_URL`.
pub const ENV_PREFIX: &str = "CLOUD__";

/// SDK client configuration: where the API lives and how to log.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API endpoint and credentials.
    pub api: ApiConfig,
    /// Logging configuration (optional, uses defaults if None).
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto.
    pub base_url: Url,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// The maximum time limit for an API request. Defaults to 30 seconds.
    #[serde(default = "defaults::timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

// The API key must never end up in logs, so Debug is written by hand.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/sdk.log", empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

mod defaults {
    use std::time::Duration;

    pub fn timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn user_agent() -> String {
        concat!("cloud-sdk-rs/", env!("CARGO_PKG_VERSION")).to_string()
    }
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            timeout: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        // Static literal, parsing cannot fail.
        let base_url = Url::parse("https://api.cloudservices.io/v1/").expect("valid default URL");
        Self::new(base_url)
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl ClientConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Optional sections stay None unless YAML/ENV provide them.
        let base = ClientConfig {
            api: ApiConfig::default(),
            logging: None,
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            // Example: CLOUD__API__TIMEOUT=5s maps to api.timeout
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: ClientConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to default values.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.cannot_be_a_base() {
            anyhow::bail!("api.base_url '{}' cannot be used as a base URL", self.api.base_url);
        }
        if self.api.timeout.is_zero() {
            anyhow::bail!("api.timeout must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_structure() {
        let config = ClientConfig::default();

        assert_eq!(config.api.base_url.as_str(), "https://api.cloudservices.io/v1/");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("cloud-sdk-rs/"));

        let logging = config.logging.as_ref().unwrap();
        let default_section = &logging["default"];
        assert_eq!(default_section.console_level, "info");
        assert_eq!(default_section.file, "");
    }

    #[test]
    fn test_load_layered_from_yaml() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");

        let yaml = r#"
api:
  base_url: "https://cdn.example.com/api/"
  api_key: "secret-token"
  timeout: 5s

logging:
  default:
    console_level: debug
    file: "logs/default.log"
  connection:
    console_level: trace
    file: ""
"#;
        fs::write(&cfg_path, yaml).unwrap();

        let config = ClientConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://cdn.example.com/api/");
        assert_eq!(config.api.api_key.as_deref(), Some("secret-token"));
        assert_eq!(config.api.timeout, Duration::from_secs(5));

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "debug");
        assert_eq!(logging["default"].file, "logs/default.log");
        assert_eq!(logging["connection"].console_level, "trace");
    }

    #[test]
    fn test_minimal_yaml_config() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");

        fs::write(&cfg_path, "api:\n  base_url: \"http://localhost:8080/\"\n").unwrap();

        let config = ClientConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cfg.yaml",
                "api:\n  base_url: \"http://localhost:8080/\"\n  user_agent: \"from-yaml\"\n",
            )?;
            jail.set_env("CLOUD__API__USER_AGENT", "from-env");

            let config = ClientConfig::load_layered("cfg.yaml").unwrap();
            assert_eq!(config.api.user_agent, "from-env");
            assert_eq!(config.api.base_url.as_str(), "http://localhost:8080/");
            Ok(())
        });
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            "api:\n  base_url: \"http://localhost:8080/\"\n  timeout: 0s\n",
        )
        .unwrap();

        let err = ClientConfig::load_layered(&cfg_path).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            "api:\n  base_url: \"http://localhost:8080/\"\n  retries: 3\n",
        )
        .unwrap();

        assert!(ClientConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = ClientConfig::load_or_default(None::<&str>).unwrap();
        assert!(config.logging.is_some());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let api = ApiConfig::default().with_api_key("super-secret");
        let rendered = format!("{:?}", api);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_to_yaml_roundtrip_basic() {
        let config = ClientConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("api:"));
        assert!(yaml.contains("logging:"));

        let roundtrip: ClientConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(roundtrip.api.base_url, config.api.base_url);
        assert_eq!(roundtrip.api.timeout, config.api.timeout);
    }
}
