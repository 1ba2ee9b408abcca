//! Integration tests for logging bootstrap

use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_logging_initializes_once() {
    // one global subscriber per process, so both calls live in one test
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).unwrap();
    tracing::debug!(target: "core_playback", "subscriber installed");

    assert!(matches!(init_logging(config), Err(Error::LoggingInit(_))));
}

#[test]
fn test_invalid_filter_is_a_config_error() {
    let config = LoggingConfig::default().with_filter("core_playback=loudest");

    match init_logging(config) {
        Err(Error::Config(message)) => assert!(message.contains("core_playback=loudest")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_download_paths_are_shortened() {
    assert_eq!(
        strip_path("file:///storage/emulated/0/Melo/Downloads/chaleya.mp3"),
        "chaleya.mp3"
    );
    assert_eq!(strip_path("C:\\Users\\asha\\Music\\kesariya.m4a"), "kesariya.m4a");
    assert_eq!(strip_path("/data/melo/offline/"), "offline");
    assert_eq!(strip_path("song.mp3"), "song.mp3");
    assert_eq!(strip_path(""), "");
}
