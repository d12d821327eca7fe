//! Layered configuration: defaults, TOML file, environment.

use killdupes::config::{Config, ConfigError};
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

// Environment variables are process-global.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    env::remove_var("KILLDUPES_CHUNK_SIZE");
    env::remove_var("KILLDUPES_PERMANENT");
    env::remove_var("KILLDUPES_PROGRESS");
}

#[test]
fn test_figment_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config: Config = Config::figment(None).extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 4096\npermanent = true\n").unwrap();

    let config = Config::load_from(Some(path.as_path())).unwrap();
    assert_eq!(config.chunk_size, 4096);
    assert!(config.permanent);
    // Unset keys keep their defaults.
    assert!(config.progress);
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 4096\nprogress = true\n").unwrap();

    env::set_var("KILLDUPES_CHUNK_SIZE", "512");
    env::set_var("KILLDUPES_PROGRESS", "false");
    let result = Config::load_from(Some(path.as_path()));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.chunk_size, 512);
    assert!(!config.progress);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = \"lots\"\n").unwrap();

    let err = Config::load_from(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_zero_chunk_size_in_env_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    env::set_var("KILLDUPES_CHUNK_SIZE", "0");
    let result = Config::load_from(Some(path.as_path()));
    clear_env();

    assert!(matches!(result, Err(ConfigError::ZeroChunkSize)));
}

#[test]
fn test_rendered_toml_loads_back() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let original = Config {
        chunk_size: 1 << 20,
        permanent: true,
        progress: false,
    };
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, original.to_toml().unwrap()).unwrap();

    assert_eq!(Config::load_from(Some(path.as_path())).unwrap(), original);
}

#[test]
fn test_oversized_chunk_size_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 1099511627776\n").unwrap();

    let err = Config::load_from(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::ChunkSizeTooLarge(1_099_511_627_776)));
}
