//! Configuration file loading tests.

use sahayak::{RateLimitTier, SahayakConfig};
use std::collections::HashMap;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn file_values_are_loaded() {
    let file = write_config(
        r#"
model = "gemini-2.5-flash"
temperature = 0.4
timeout_secs = 30
rate_limit_tier = "paid"
max_retries = 2
"#,
    );

    let config = SahayakConfig::from_sources(Some(file.path()), Some(HashMap::new())).unwrap();

    assert_eq!(config.model(), "gemini-2.5-flash");
    assert_eq!(*config.temperature(), Some(0.4));
    assert_eq!(*config.timeout_secs(), 30);
    assert_eq!(*config.rate_limit_tier(), RateLimitTier::Paid);
    assert_eq!(*config.max_retries(), Some(2));
    assert_eq!(config.rate_limits(), RateLimitTier::Paid.config());
}

#[test]
fn explicit_quotas_replace_the_tier_preset() {
    let file = write_config(
        r#"
rate_limit_tier = "free"

[rate_limit]
requests_per_minute = 60
max_concurrent = 4
"#,
    );

    let config = SahayakConfig::from_sources(Some(file.path()), Some(HashMap::new())).unwrap();
    let limits = config.rate_limits();

    assert_eq!(*limits.requests_per_minute(), Some(60));
    assert_eq!(*limits.max_concurrent(), Some(4));
    assert_eq!(*limits.requests_per_day(), None);
}

#[test]
fn environment_wins_over_file() {
    let file = write_config("model = \"from-file\"\n");
    let env = HashMap::from([("SAHAYAK_MODEL".to_string(), "from-env".to_string())]);

    let config = SahayakConfig::from_sources(Some(file.path()), Some(env)).unwrap();

    assert_eq!(config.model(), "from-env");
}

#[test]
fn invalid_values_are_rejected() {
    let temperature = write_config("temperature = 3.5\n");
    let err = SahayakConfig::from_sources(Some(temperature.path()), Some(HashMap::new()))
        .unwrap_err();
    assert!(err.message.contains("temperature"));

    let quota = write_config("[rate_limit]\nrequests_per_minute = 0\n");
    let err = SahayakConfig::from_sources(Some(quota.path()), Some(HashMap::new())).unwrap_err();
    assert!(err.message.contains("requests_per_minute"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("sahayak.toml");

    assert!(SahayakConfig::from_sources(Some(&missing), Some(HashMap::new())).is_err());
}

#[test]
fn unknown_api_key_variable_is_reported() {
    let file = write_config("api_key_env = \"SAHAYAK_TEST_KEY_THAT_IS_NEVER_SET\"\n");
    let config = SahayakConfig::from_sources(Some(file.path()), Some(HashMap::new())).unwrap();

    let err = config.api_key().unwrap_err();
    assert!(err.to_string().contains("SAHAYAK_TEST_KEY_THAT_IS_NEVER_SET"));
}
