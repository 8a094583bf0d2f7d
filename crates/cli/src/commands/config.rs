use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use insight_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_config("config", error),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = [
        ("artifacts.dir", config.artifacts.dir.display().to_string(), "INSIGHT_ARTIFACTS_DIR"),
        (
            "artifacts.cluster_model",
            config.artifacts.cluster_model.display().to_string(),
            "INSIGHT_ARTIFACTS_CLUSTER_MODEL",
        ),
        (
            "artifacts.scaler",
            config.artifacts.scaler.display().to_string(),
            "INSIGHT_ARTIFACTS_SCALER",
        ),
        (
            "artifacts.similarity",
            config.artifacts.similarity.display().to_string(),
            "INSIGHT_ARTIFACTS_SIMILARITY",
        ),
        (
            "artifacts.product_names",
            config.artifacts.product_names.display().to_string(),
            "INSIGHT_ARTIFACTS_PRODUCT_NAMES",
        ),
        (
            "recommend.default_top_n",
            config.recommend.default_top_n.to_string(),
            "INSIGHT_RECOMMEND_DEFAULT_TOP_N",
        ),
        (
            "recommend.max_top_n",
            config.recommend.max_top_n.to_string(),
            "INSIGHT_RECOMMEND_MAX_TOP_N",
        ),
        ("server.bind_address", config.server.bind_address.clone(), "INSIGHT_SERVER_BIND_ADDRESS"),
        ("server.port", config.server.port.to_string(), "INSIGHT_SERVER_PORT"),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "INSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        ("logging.level", config.logging.level.clone(), "INSIGHT_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "INSIGHT_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        lines.push(render_line(key, &value, source(key, env_key)));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("insight.toml"), PathBuf::from("config/insight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
