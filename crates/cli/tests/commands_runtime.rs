use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use insight_cli::commands::{classify, config, doctor, products, recommend};
use serde_json::Value;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../core/tests/fixtures")
}

#[test]
fn classify_reports_segment_for_reference_customer() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = classify::run(325.0, 1, 765322.0);
        assert_eq!(result.exit_code, 0, "expected successful classification");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "classify");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["label"], "High-Value");
        assert_eq!(payload["data"]["cluster_index"], 1);
        assert_eq!(
            payload["message"],
            "This customer belongs to: High-Value Shopper (Cluster 1)"
        );
    });
}

#[test]
fn classify_rejects_negative_recency() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = classify::run(-3.0, 1, 10.0);
        assert_eq!(result.exit_code, 3, "expected invalid input code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
    });
}

#[test]
fn classify_rejects_negative_frequency_as_invalid_input() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = classify::run(10.0, -1, 5.0);
        assert_eq!(result.exit_code, 3, "expected invalid input code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "bad_request");
        assert_eq!(payload["message"], "frequency must be >= 1, got -1");
    });
}

#[test]
fn classify_reports_unavailable_model_without_artifacts() {
    let empty = TempDir::new().expect("tempdir");
    with_env(&[("INSIGHT_ARTIFACTS_DIR", empty.path().to_str().unwrap_or_default())], || {
        let result = classify::run(325.0, 1, 765322.0);
        assert_eq!(result.exit_code, 5, "expected model unavailable code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "service_unavailable");
    });
}

#[test]
fn recommend_resolves_loose_product_name() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = recommend::run("white metal lantern!", Some(2));
        assert_eq!(result.exit_code, 0, "expected recommendations");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["products"][0], "WHITE HANGING HEART T-LIGHT HOLDER");
        assert_eq!(payload["data"]["products"][1], "GLASS STAR FROSTED T-LIGHT HOLDER");
        assert_eq!(payload["data"]["products"].as_array().map(Vec::len), Some(2));
    });
}

#[test]
fn recommend_uses_configured_default_top_n() {
    let fixtures = fixtures_dir();
    with_env(
        &[
            ("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default()),
            ("INSIGHT_RECOMMEND_DEFAULT_TOP_N", "3"),
        ],
        || {
            let result = recommend::run("WHITE METAL LANTERN", None);
            let payload = parse_payload(&result.output);
            assert_eq!(payload["data"]["products"].as_array().map(Vec::len), Some(3));
        },
    );
}

#[test]
fn recommend_with_non_positive_top_n_is_empty() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = recommend::run("WHITE METAL LANTERN", Some(-2));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["products"], Value::Array(Vec::new()));
    });
}

#[test]
fn recommend_unknown_product_is_not_found() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = recommend::run("Purple Teapot", Some(5));
        assert_eq!(result.exit_code, 4, "expected not found code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn products_lists_catalog_names() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let result = products::run();
        let payload = parse_payload(&result.output);

        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["products"][0], "CREAM CUPID HEARTS COAT HANGER");
    });
}

#[test]
fn invalid_config_fails_through_application_error_layer() {
    with_env(&[("INSIGHT_LOGGING_LEVEL", "loud")], || {
        let result = products::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "internal");
        assert!(payload["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("configuration issue:")));
    });
}

#[test]
fn config_command_exits_non_zero_on_invalid_config() {
    with_env(&[("INSIGHT_LOGGING_LEVEL", "loud")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
    });
}

#[test]
fn config_command_attributes_env_sources() {
    with_env(&[("INSIGHT_RECOMMEND_DEFAULT_TOP_N", "7")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);
        let expected =
            "- recommend.default_top_n = 7 (source: env (INSIGHT_RECOMMEND_DEFAULT_TOP_N))";
        assert!(result.output.contains(expected), "missing line in {}", result.output);
    });
}

#[test]
fn env_is_restored_after_a_failing_test_body() {
    let outcome = std::panic::catch_unwind(|| {
        with_env(&[("INSIGHT_SERVER_PORT", "9999")], || panic!("test body failed"));
    });
    assert!(outcome.is_err());

    with_env(&[], || {
        assert!(env::var_os("INSIGHT_SERVER_PORT").is_none());
    });
}

#[test]
fn doctor_reports_each_feature() {
    let fixtures = fixtures_dir();
    with_env(&[("INSIGHT_ARTIFACTS_DIR", fixtures.to_str().unwrap_or_default())], || {
        let (passed, output) = doctor::run(true);
        assert!(passed, "all checks should pass against fixtures");

        let payload = parse_payload(&output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_fails_when_artifacts_are_missing() {
    let empty = TempDir::new().expect("tempdir");
    with_env(&[("INSIGHT_ARTIFACTS_DIR", empty.path().to_str().unwrap_or_default())], || {
        let (passed, output) = doctor::run(false);
        assert!(!passed);
        assert!(output.contains("- [fail] segmentation_artifacts"));
        assert!(output.contains("- [fail] recommendation_artifacts"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

struct RestoreEnv(Vec<(&'static str, Option<String>)>);

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        for (key, value) in &self.0 {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _lock =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(PoisonError::into_inner);

    let keys = [
        "INSIGHT_ARTIFACTS_DIR",
        "INSIGHT_ARTIFACTS_CLUSTER_MODEL",
        "INSIGHT_ARTIFACTS_SCALER",
        "INSIGHT_ARTIFACTS_SIMILARITY",
        "INSIGHT_ARTIFACTS_PRODUCT_NAMES",
        "INSIGHT_RECOMMEND_DEFAULT_TOP_N",
        "INSIGHT_RECOMMEND_MAX_TOP_N",
        "INSIGHT_SERVER_BIND_ADDRESS",
        "INSIGHT_SERVER_PORT",
        "INSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "INSIGHT_LOGGING_LEVEL",
        "INSIGHT_LOGGING_FORMAT",
        "INSIGHT_LOG_LEVEL",
        "INSIGHT_LOG_FORMAT",
    ];

    let _restore = RestoreEnv(keys.iter().map(|key| (*key, env::var(key).ok())).collect());

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();
}
