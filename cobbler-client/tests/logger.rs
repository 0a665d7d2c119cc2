// cobbler-client/tests/logger.rs
// 日志初始化 (全局订阅者, 单独的测试二进制)

use cobbler_client::logger::{LOG_FILE_PREFIX, init_logger_with_file};
use tempfile::TempDir;

#[test]
fn test_file_logging() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");

    init_logger_with_file("info", false, Some(&log_dir)).unwrap();
    tracing::info!(transaction_id = "TX-0001", "Payment recorded");

    // a global subscriber can only be installed once
    assert!(init_logger_with_file("info", true, None).is_err());

    let files: Vec<String> = std::fs::read_dir(&log_dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    let log_file = files
        .iter()
        .find(|name| name.starts_with(LOG_FILE_PREFIX))
        .expect("rolling log file");

    let contents = std::fs::read_to_string(log_dir.join(log_file)).unwrap();
    assert!(contents.contains("Payment recorded"));
    assert!(contents.contains("TX-0001"));
}
