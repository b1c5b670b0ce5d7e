use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use minserve::config::{CONFIG_PATH_VAR, Config};

// Tests in this file mutate process-wide environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    CONFIG_PATH_VAR,
    "LISTEN",
    "MINSERVE_QUEUE_SIZE",
    "MINSERVE_WORKERS",
    "MINSERVE_READ_TIMEOUT_MS",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
fn test_config_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let cfg = Config::load().unwrap();

    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.queue_size, 1024);
    assert_eq!(cfg.workers, 0);
}

#[test]
fn test_config_custom_address_from_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
        std::env::set_var("MINSERVE_WORKERS", "4");
    }

    let cfg = Config::load().unwrap();
    clear_env();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.workers, 4);
}

#[test]
fn test_config_rejects_non_numeric_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("MINSERVE_QUEUE_SIZE", "lots");
    }

    let result = Config::load();
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("MINSERVE_QUEUE_SIZE"));
}

#[test]
fn test_config_from_yaml_file_with_env_override() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_addr: \"127.0.0.1:9000\"").unwrap();
    writeln!(file, "queue_size: 16").unwrap();
    writeln!(file, "read_timeout_ms: 25").unwrap();

    unsafe {
        std::env::set_var(CONFIG_PATH_VAR, file.path());
        std::env::set_var("MINSERVE_QUEUE_SIZE", "32");
    }
    let cfg = Config::load().unwrap();
    clear_env();

    assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.queue_size, 32);
    assert_eq!(cfg.read_timeout_ms, 25);
    assert_eq!(cfg.workers, 0);
}

#[test]
fn test_config_missing_file_is_an_error() {
    let result = Config::from_file("/definitely/not/here.yaml");

    assert!(result.is_err());
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("workers: 3\n").unwrap();

    assert_eq!(cfg.workers, 3);
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.queue_size, 1024);
}

#[test]
fn test_config_to_server_config() {
    let cfg = Config::from_yaml_str("queue_size: 8\nworkers: 2\nread_timeout_ms: 5\n").unwrap();
    let server = cfg.server_config();

    assert_eq!(server.queue_size, 8);
    assert_eq!(server.worker_count, 2);
    assert_eq!(server.read_timeout, Duration::from_millis(5));
    assert!(server.error_handler.is_none());
}
