// Bridge configuration: backend endpoints, query budget and the predefined
// analysis templates. Keys are camelCase to match existing config.json files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::duration::parse_duration;
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "PROM_CONFIG_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_SERVER_PORT: u16 = 7000;
pub const DEFAULT_INTERVAL: &str = "5m";
pub const DEFAULT_QUERY_TIMEOUT_SECS: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTemplate {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstance {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub query_templates: Vec<QueryTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_step: Option<String>,
    /// Smallest step a range query may use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_step: Option<String>,
    /// Window substituted for `{{interval}}` when the caller gives none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LokiConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(default)]
    pub app_instances: Vec<AppInstance>,
    pub prometheus_config: PrometheusConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loki_config: Option<LokiConfig>,
}

impl GlobalConfig {
    /// Deserialize from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prometheus_config.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "prometheusConfig.baseUrl must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for instance in &self.app_instances {
            if !seen.insert(instance.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate app instance name: {}",
                    instance.name
                )));
            }
        }
        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server_port.unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Prometheus request timeout in seconds
    pub fn query_timeout(&self) -> f64 {
        parse_duration(
            self.prometheus_config.query_timeout.as_deref(),
            DEFAULT_QUERY_TIMEOUT_SECS,
        )
    }

    pub fn effective_interval(&self, requested: Option<&str>) -> String {
        requested
            .filter(|s| !s.trim().is_empty())
            .or(self.prometheus_config.default_interval.as_deref())
            .unwrap_or(DEFAULT_INTERVAL)
            .to_string()
    }

    pub fn find_instance(&self, name: &str) -> Option<&AppInstance> {
        self.app_instances.iter().find(|ai| ai.name == name)
    }
}

impl LokiConfig {
    /// Loki request timeout in seconds
    pub fn query_timeout(&self) -> f64 {
        parse_duration(self.query_timeout.as_deref(), DEFAULT_QUERY_TIMEOUT_SECS)
    }
}

/// Resolves and loads the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub path: PathBuf,
    pub global_config: GlobalConfig,
}

impl ConfigManager {
    /// Resolve the config path: explicit argument, then `PROM_CONFIG_PATH`,
    /// then `./config.json`.
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(path);
        debug!("Loading config file: {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let global_config = if is_toml {
            GlobalConfig::from_toml_str(&content)?
        } else {
            GlobalConfig::from_json_str(&content)?
        };

        info!(
            "Config loaded: appInstances={} baseUrl={}",
            global_config.app_instances.len(),
            global_config.prometheus_config.base_url
        );
        Ok(Self {
            path,
            global_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.global_config.prometheus_config.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_JSON: &str = r#"{
        "serverPort": 7100,
        "appInstances": [
            {
                "name": "mysql",
                "description": "MySQL health",
                "queryTemplates": [
                    { "metric": "qps", "template": "rate(mysql_global_status_queries{{labels}}[{{interval}}])" }
                ]
            }
        ],
        "prometheusConfig": {
            "baseUrl": "http://prometheus:9090/",
            "queryTimeout": "15s",
            "defaultStep": "30s",
            "minStep": "15s",
            "maxPoints": 200
        },
        "lokiConfig": { "baseUrl": "http://loki:3100" }
    }"#;

    #[test]
    fn test_json_deserialization() {
        let config = GlobalConfig::from_json_str(SAMPLE_JSON).unwrap();

        assert_eq!(config.server_port(), 7100);
        assert_eq!(config.app_instances.len(), 1);
        assert_eq!(config.app_instances[0].query_templates[0].metric, "qps");
        assert_eq!(config.prometheus_config.max_points, Some(200));
        assert_eq!(config.prometheus_config.min_step.as_deref(), Some("15s"));
        assert_eq!(config.query_timeout(), 15.0);
        assert_eq!(config.loki_config.unwrap().query_timeout(), 30.0);
    }

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::from_json_str(
            r#"{ "prometheusConfig": { "baseUrl": "http://localhost:9090" } }"#,
        )
        .unwrap();

        assert_eq!(config.server_port(), DEFAULT_SERVER_PORT);
        assert!(config.app_instances.is_empty());
        assert!(config.loki_config.is_none());
        assert_eq!(config.query_timeout(), DEFAULT_QUERY_TIMEOUT_SECS);
        assert_eq!(config.effective_interval(None), "5m");
        assert_eq!(config.effective_interval(Some("1m")), "1m");
    }

    #[test]
    fn test_effective_interval_prefers_request_then_config() {
        let mut config = GlobalConfig::from_json_str(SAMPLE_JSON).unwrap();
        config.prometheus_config.default_interval = Some("2m".to_string());
        assert_eq!(config.effective_interval(None), "2m");
        assert_eq!(config.effective_interval(Some("  ")), "2m");
        assert_eq!(config.effective_interval(Some("10m")), "10m");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
serverPort = 8000

[prometheusConfig]
baseUrl = "http://localhost:9090"
maxPoints = 100

[[appInstances]]
name = "node"

[[appInstances.queryTemplates]]
metric = "load"
template = "node_load1{{labels}}"
"#;
        let config = GlobalConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server_port(), 8000);
        assert_eq!(config.find_instance("node").unwrap().query_templates.len(), 1);
        assert!(config.find_instance("mysql").is_none());
    }

    #[test]
    fn test_validation_errors() {
        let empty_url = GlobalConfig::from_json_str(r#"{ "prometheusConfig": { "baseUrl": " " } }"#);
        assert!(matches!(empty_url, Err(ConfigError::Invalid(_))));

        let duplicate = GlobalConfig::from_json_str(
            r#"{
                "appInstances": [{ "name": "a" }, { "name": "a" }],
                "prometheusConfig": { "baseUrl": "http://localhost:9090" }
            }"#,
        );
        assert!(matches!(duplicate, Err(ConfigError::Invalid(_))));

        let missing = GlobalConfig::from_json_str(r#"{ "appInstances": [] }"#);
        assert!(matches!(missing, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SAMPLE_JSON.as_bytes()).unwrap();

        let manager = ConfigManager::load(Some(file.path())).unwrap();
        assert_eq!(manager.base_url(), "http://prometheus:9090/");
        assert_eq!(manager.path, file.path());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::load(Some(&dir.path().join("absent.json")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
