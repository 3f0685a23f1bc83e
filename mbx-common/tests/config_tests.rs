//! Tests for data folder resolution and graceful defaults
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate MBX_DATA_FOLDER are marked with #[serial].

use mbx_common::config::{
    default_data_folder, ensure_directory_exists, DataFolderResolver, DATA_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_FOLDER_ENV);

    let resolved = DataFolderResolver::new().resolve();
    assert_eq!(resolved, default_data_folder());
}

#[test]
#[serial]
fn test_resolver_env_var_beats_config_file() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/mbx-test-env-folder");

    let resolved = DataFolderResolver::new()
        .with_config_value(Some(PathBuf::from("/tmp/mbx-from-toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/mbx-test-env-folder"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env_var() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/mbx-test-env-folder");

    let resolved = DataFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/tmp/mbx-from-cli")))
        .with_config_value(Some(PathBuf::from("/tmp/mbx-from-toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/mbx-from-cli"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_config_value_used_without_env() {
    env::remove_var(DATA_FOLDER_ENV);

    let resolved = DataFolderResolver::new()
        .with_config_value(Some(PathBuf::from("/tmp/mbx-from-toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/mbx-from-toml"));
}

#[test]
#[serial]
fn test_resolver_ignores_empty_env_var() {
    env::set_var(DATA_FOLDER_ENV, "");

    let resolved = DataFolderResolver::new()
        .with_config_value(Some(PathBuf::from("/tmp/mbx-from-toml")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/mbx-from-toml"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
fn test_ensure_directory_creates_nested() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");

    ensure_directory_exists(&nested).unwrap();
    assert!(nested.is_dir());

    // Second call is a no-op
    ensure_directory_exists(&nested).unwrap();
}
