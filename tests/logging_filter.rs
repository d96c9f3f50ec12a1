// tests/logging_filter.rs

use tracing::level_filters::LevelFilter;

use backwatch::cli::LogLevel;
use backwatch::logging::build_filter;

#[test]
fn defaults_to_info() {
    assert_eq!(build_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
    assert_eq!(build_filter(None, Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
}

#[test]
fn cli_level_beats_environment() {
    let filter = build_filter(Some(LogLevel::Warn), Some("trace"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn environment_accepts_directives() {
    let filter = build_filter(None, Some("backwatch=debug,reqwest=warn"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn bad_environment_value_falls_back_to_info() {
    let filter = build_filter(None, Some("backwatch=loud"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
}
