//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of environment-specific overrides.

use super::error::{ConfigResult, ConfigurationError};
use super::SchedulerConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAMES: &[&str] = &["workflow-scheduler.yaml", "workflow-scheduler.yml"];
const ENVIRONMENTS: &[&str] = &["development", "test", "production"];

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: SchedulerConfig,
    environment: String,
    config_file: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Tests use this to avoid touching process environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config_file = Self::find_config_file(&config_directory)?;
        let config = Self::load_and_merge_config(&config_file, environment)?;

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = %environment,
            config_file = %config_file.display(),
            page_size = config.job.page_size,
            target_action_id = %config.job.target_action_id,
            dispatch_concurrency = config.execution.dispatch_concurrency,
            "⚙️ Scheduler configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_file,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Configuration as JSON with sensitive fields masked, safe to log
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Detect current environment: SCHEDULER_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("SCHEDULER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.is_file() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    /// Read a configuration file, refusing anything that is not a small regular file
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024; // 1MB limit

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                format!("Configuration file exceeds the {MAX_CONFIG_FILE_SIZE} byte limit"),
            ));
        }

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file",
                "Configuration path must point to a regular file",
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(config_file: &Path, environment: &str) -> ConfigResult<SchedulerConfig> {
        let yaml_content = Self::read_config_file_safely(config_file)?;
        Self::parse_with_environment(&yaml_content, &config_file.display().to_string(), environment)
    }

    /// Parse YAML text, merging the section named after `environment` over the base
    pub fn parse_with_environment(
        yaml_content: &str,
        source: &str,
        environment: &str,
    ) -> ConfigResult<SchedulerConfig> {
        let mut yaml_data: YamlValue = serde_yaml::from_str(yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(source, e))?;

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!("Applying environment-specific overrides for: {}", environment);
            Self::merge_yaml_values(&mut yaml_data, env_overrides)?;
        }

        // Remove environment sections so they never reach deserialization
        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for name in ENVIRONMENTS {
                map.remove(YamlValue::String((*name).to_string()));
            }
        }

        serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                source,
                format!("Failed to deserialize configuration: {e}"),
            )
        })
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) -> ConfigResult<()> {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value)?;
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            // An empty section (`test:` with nothing under it) overrides nothing
            (YamlValue::Mapping(_), YamlValue::Null) => {}
            (YamlValue::Mapping(_), _) => {
                return Err(ConfigurationError::merge_error(
                    "environment override must be a mapping",
                ));
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
        Ok(())
    }

    fn sanitize_config_for_logging(config: &SchedulerConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential", "auth"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    /// Recursively mask fields whose names look like credentials
    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        *val = match val {
                            serde_json::Value::String(s) if s.is_empty() => {
                                serde_json::Value::String("[EMPTY]".to_string())
                            }
                            serde_json::Value::String(s) if s.chars().count() > 4 => {
                                let chars: Vec<char> = s.chars().collect();
                                let head: String = chars[..2].iter().collect();
                                let tail: String = chars[chars.len() - 2..].iter().collect();
                                serde_json::Value::String(format!("[MASKED: {head}***{tail}]"))
                            }
                            _ => serde_json::Value::String("[MASKED]".to_string()),
                        };
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = r#"
job:
  query: |
    <fetch><entity name="account"/></fetch>
  target_action_id: "6c8f0c5e-4a55-4a3e-9d3e-2a7b9a1f0c11"
  page_size: 250
execution:
  max_pages: 100
  dispatch_concurrency: 1
test:
  job:
    page_size: 10
  execution:
    fetch_timeout_ms: 500
production:
  execution:
    dispatch_concurrency: 4
"#;

    #[test]
    fn base_configuration_without_overrides() {
        let config = ConfigManager::parse_with_environment(BASE, "inline", "development").unwrap();
        assert_eq!(config.job.page_size, 250);
        assert_eq!(config.execution.max_pages, Some(100));
        assert_eq!(config.execution.fetch_timeout_ms, Some(30_000));
        assert_eq!(config.execution.dispatch_concurrency, 1);
    }

    #[test]
    fn environment_section_merges_over_base() {
        let config = ConfigManager::parse_with_environment(BASE, "inline", "test").unwrap();
        assert_eq!(config.job.page_size, 10);
        assert_eq!(config.execution.fetch_timeout_ms, Some(500));
        assert_eq!(config.execution.max_pages, Some(100));
        assert!(config.job.query.contains("<entity name=\"account\"/>"));

        let config = ConfigManager::parse_with_environment(BASE, "inline", "production").unwrap();
        assert_eq!(config.execution.dispatch_concurrency, 4);
        assert_eq!(config.job.page_size, 250);
    }

    #[test]
    fn invalid_yaml_is_reported_with_source() {
        let err = ConfigManager::parse_with_environment("job: [", "broken.yaml", "test").unwrap_err();
        match err {
            ConfigurationError::InvalidYaml { file_path, .. } => assert_eq!(file_path, "broken.yaml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sanitizer_masks_sensitive_keys() {
        let mut value = json!({
            "job": { "page_size": 10 },
            "auth": { "client_secret": "supersecretvalue", "api_token": "" },
            "nested": [{ "password": 1234 }]
        });
        ConfigManager::sanitize_json_recursive(&mut value, &["secret", "token", "password", "auth"]);
        assert_eq!(value["job"]["page_size"], json!(10));
        assert_eq!(value["auth"], json!("[MASKED]"));
        assert_eq!(value["nested"][0]["password"], json!("[MASKED]"));

        let mut value = json!({ "client_secret": "supersecretvalue", "api_token": "" });
        ConfigManager::sanitize_json_recursive(&mut value, &["secret", "token"]);
        assert_eq!(value["client_secret"], json!("[MASKED: su***ue]"));
        assert_eq!(value["api_token"], json!("[EMPTY]"));
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("workflow-scheduler.yaml"), BASE).unwrap();

        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap();
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().job.page_size, 10);
        assert!(manager.config_file().ends_with("workflow-scheduler.yaml"));
        assert_eq!(manager.debug_config()["job"]["page_size"], json!(10));
    }

    #[test]
    fn missing_file_lists_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap_err();
        match err {
            ConfigurationError::ConfigFileNotFound { searched_paths } => {
                assert_eq!(searched_paths.len(), 2)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
