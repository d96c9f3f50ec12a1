// tests/interval_parsing.rs

use backwatch::errors::BackwatchError;
use backwatch::schedule::Interval;

fn secs(s: &str) -> i64 {
    s.parse::<Interval>()
        .unwrap_or_else(|e| panic!("'{s}' should parse: {e}"))
        .as_delta()
        .num_seconds()
}

#[test]
fn single_units() {
    assert_eq!(secs("1y"), 365 * 86_400);
    assert_eq!(secs("1d"), 86_400);
    assert_eq!(secs("3h"), 3 * 3_600);
    assert_eq!(secs("15m"), 900);
    assert_eq!(secs("42s"), 42);
}

#[test]
fn combined_tokens_add_up_in_any_order() {
    assert_eq!(secs("1d 12h"), 86_400 + 12 * 3_600);
    assert_eq!(secs("30s 2m"), 150);
    assert_eq!(secs("  1h   1m  "), 3_660);
}

#[test]
fn zero_magnitude_is_allowed() {
    assert_eq!(secs("0s"), 0);
    assert_eq!(secs("0d 5s"), 5);
}

#[test]
fn rejects_unknown_unit() {
    match "5w".parse::<Interval>() {
        Err(BackwatchError::ConfigError(msg)) => assert!(msg.contains("unknown interval unit")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn rejects_malformed_tokens() {
    for bad in ["d", "1.5h", "-1d", "1 d", "h1", "1dd"] {
        assert!(
            matches!(bad.parse::<Interval>(), Err(BackwatchError::ConfigError(_))),
            "'{bad}' should be rejected"
        );
    }
}

#[test]
fn rejects_repeated_unit() {
    match "1d 2d".parse::<Interval>() {
        Err(BackwatchError::ConfigError(msg)) => assert!(msg.contains("more than once")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn rejects_empty_string() {
    assert!(matches!("".parse::<Interval>(), Err(BackwatchError::ConfigError(_))));
    assert!(matches!("   ".parse::<Interval>(), Err(BackwatchError::ConfigError(_))));
}

#[test]
fn rejects_overflowing_magnitude() {
    assert!(matches!(
        "99999999999999999999y".parse::<Interval>(),
        Err(BackwatchError::ConfigError(_))
    ));
    assert!(matches!(
        "9223372036854775807y".parse::<Interval>(),
        Err(BackwatchError::ConfigError(_))
    ));
}

#[test]
fn display_is_canonical() -> Result<(), BackwatchError> {
    assert_eq!("36h".parse::<Interval>()?.to_string(), "1d 12h");
    assert_eq!("90s".parse::<Interval>()?.to_string(), "1m 30s");
    assert_eq!("0s".parse::<Interval>()?.to_string(), "0s");
    assert_eq!(Interval::from_secs(86_400).to_string(), "1d");
    Ok(())
}

#[test]
fn converts_to_std_duration() -> Result<(), BackwatchError> {
    let interval: Interval = "2m".parse()?;
    assert_eq!(interval.to_std(), std::time::Duration::from_secs(120));
    Ok(())
}
