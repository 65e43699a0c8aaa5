//! Configuration Tests
//!
//! Loads the shipped configuration file for each environment.

use std::path::PathBuf;
use workflow_scheduler::config::{ConfigManager, ConfigurationError};
use workflow_scheduler::models::BulkDispatchJob;

fn shipped_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

#[test]
fn shipped_config_is_valid_in_every_environment() {
    for environment in ["development", "test", "production"] {
        let manager =
            ConfigManager::load_from_directory_with_env(Some(shipped_config_dir()), environment)
                .unwrap_or_else(|e| panic!("{environment} config failed to load: {e}"));
        let job = BulkDispatchJob::from_config(&manager.config().job)
            .unwrap_or_else(|e| panic!("{environment} job is not runnable: {e}"));
        assert_eq!(job.query().root_name(), "fetch");
    }
}

#[test]
fn environment_overrides_apply() {
    let test = ConfigManager::load_from_directory_with_env(Some(shipped_config_dir()), "test")
        .unwrap();
    assert_eq!(test.config().job.page_size, 5);
    assert_eq!(test.config().execution.max_pages, Some(100));
    assert_eq!(test.config().execution.fetch_timeout_ms, Some(1000));

    let production =
        ConfigManager::load_from_directory_with_env(Some(shipped_config_dir()), "production")
            .unwrap();
    assert_eq!(production.config().job.page_size, 5000);
    assert_eq!(production.config().execution.dispatch_concurrency, 4);
    assert_eq!(production.config().execution.max_pages, Some(10_000));
}

#[test]
fn invalid_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("workflow-scheduler.yaml"),
        r#"
job:
  query: "<fetch/>"
  target_action_id: "0f1a2b3c-4d5e-4f60-8a7b-9c0d1e2f3a4b"
  page_size: 0
"#,
    )
    .unwrap();

    let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidValue { ref field, .. } if field == "job.page_size"));
}

#[test]
fn yml_extension_is_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("workflow-scheduler.yml"),
        r#"
job:
  query: "<fetch><entity name='contact'/></fetch>"
  target_action_id: "0f1a2b3c-4d5e-4f60-8a7b-9c0d1e2f3a4b"
  page_size: 20
execution:
  max_pages: null
"#,
    )
    .unwrap();

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "development")
            .unwrap();
    assert_eq!(manager.config().job.page_size, 20);
    assert_eq!(manager.config().execution.max_pages, None);
    assert_eq!(manager.config().execution.dispatch_concurrency, 1);
}
