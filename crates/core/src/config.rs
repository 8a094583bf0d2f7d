use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub recommend: RecommendConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub cluster_model: PathBuf,
    pub scaler: PathBuf,
    pub similarity: PathBuf,
    pub product_names: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendConfig {
    pub default_top_n: usize,
    pub max_top_n: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub artifacts_dir: Option<PathBuf>,
    pub default_top_n: Option<usize>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            cluster_model: PathBuf::from("kmeans_model.json"),
            scaler: PathBuf::from("scaler.json"),
            similarity: PathBuf::from("product_similarity.json"),
            product_names: PathBuf::from("product_names.json"),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { default_top_n: 5, max_top_n: 50 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("insight.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(artifacts) = patch.artifacts {
            if let Some(dir) = artifacts.dir {
                self.artifacts.dir = dir;
            }
            if let Some(cluster_model) = artifacts.cluster_model {
                self.artifacts.cluster_model = cluster_model;
            }
            if let Some(scaler) = artifacts.scaler {
                self.artifacts.scaler = scaler;
            }
            if let Some(similarity) = artifacts.similarity {
                self.artifacts.similarity = similarity;
            }
            if let Some(product_names) = artifacts.product_names {
                self.artifacts.product_names = product_names;
            }
        }

        if let Some(recommend) = patch.recommend {
            if let Some(default_top_n) = recommend.default_top_n {
                self.recommend.default_top_n = default_top_n;
            }
            if let Some(max_top_n) = recommend.max_top_n {
                self.recommend.max_top_n = max_top_n;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INSIGHT_ARTIFACTS_DIR") {
            self.artifacts.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("INSIGHT_ARTIFACTS_CLUSTER_MODEL") {
            self.artifacts.cluster_model = PathBuf::from(value);
        }
        if let Some(value) = read_env("INSIGHT_ARTIFACTS_SCALER") {
            self.artifacts.scaler = PathBuf::from(value);
        }
        if let Some(value) = read_env("INSIGHT_ARTIFACTS_SIMILARITY") {
            self.artifacts.similarity = PathBuf::from(value);
        }
        if let Some(value) = read_env("INSIGHT_ARTIFACTS_PRODUCT_NAMES") {
            self.artifacts.product_names = PathBuf::from(value);
        }

        if let Some(value) = read_env("INSIGHT_RECOMMEND_DEFAULT_TOP_N") {
            self.recommend.default_top_n = parse_usize("INSIGHT_RECOMMEND_DEFAULT_TOP_N", &value)?;
        }
        if let Some(value) = read_env("INSIGHT_RECOMMEND_MAX_TOP_N") {
            self.recommend.max_top_n = parse_usize("INSIGHT_RECOMMEND_MAX_TOP_N", &value)?;
        }

        if let Some(value) = read_env("INSIGHT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("INSIGHT_SERVER_PORT") {
            self.server.port = parse_u16("INSIGHT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("INSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("INSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("INSIGHT_LOGGING_LEVEL").or_else(|| read_env("INSIGHT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INSIGHT_LOGGING_FORMAT").or_else(|| read_env("INSIGHT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(artifacts_dir) = overrides.artifacts_dir {
            self.artifacts.dir = artifacts_dir;
        }
        if let Some(default_top_n) = overrides.default_top_n {
            self.recommend.default_top_n = default_top_n;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_artifacts(&self.artifacts)?;
        validate_recommend(&self.recommend)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("insight.toml"), PathBuf::from("config/insight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_artifacts(artifacts: &ArtifactsConfig) -> Result<(), ConfigError> {
    if artifacts.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("artifacts.dir must not be empty".to_string()));
    }

    let files = [
        ("artifacts.cluster_model", &artifacts.cluster_model),
        ("artifacts.scaler", &artifacts.scaler),
        ("artifacts.similarity", &artifacts.similarity),
        ("artifacts.product_names", &artifacts.product_names),
    ];
    for (key, path) in files {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }

    Ok(())
}

fn validate_recommend(recommend: &RecommendConfig) -> Result<(), ConfigError> {
    if recommend.max_top_n == 0 {
        return Err(ConfigError::Validation(
            "recommend.max_top_n must be greater than zero".to_string(),
        ));
    }

    if recommend.default_top_n > recommend.max_top_n {
        return Err(ConfigError::Validation(format!(
            "recommend.default_top_n ({}) must not exceed recommend.max_top_n ({})",
            recommend.default_top_n, recommend.max_top_n
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    artifacts: Option<ArtifactsPatch>,
    recommend: Option<RecommendPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtifactsPatch {
    dir: Option<PathBuf>,
    cluster_model: Option<PathBuf>,
    scaler: Option<PathBuf>,
    similarity: Option<PathBuf>,
    product_names: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendPatch {
    default_top_n: Option<usize>,
    max_top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
