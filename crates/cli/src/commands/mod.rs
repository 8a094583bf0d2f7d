pub mod classify;
pub mod config;
pub mod doctor;
pub mod products;
pub mod recommend;

use insight_core::config::{AppConfig, ConfigError, LoadOptions};
use insight_core::{ApplicationError, ArtifactPaths, ArtifactStore, DomainError, InsightService};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_domain(command: &str, error: DomainError) -> Self {
        let exit_code = match error {
            DomainError::InvalidInput(_) => 3,
            DomainError::NotFound(_) => 4,
            DomainError::ModelUnavailable { .. } => 5,
        };
        Self::from_application(command, ApplicationError::from(error), exit_code)
    }

    pub fn from_config(command: &str, error: ConfigError) -> Self {
        let error = ApplicationError::Configuration(format!("configuration issue: {error}"));
        Self::from_application(command, error, 2)
    }

    fn from_application(command: &str, error: ApplicationError, exit_code: u8) -> Self {
        let interface = error.into_interface(command);
        Self::failure(command, interface.error_class(), interface.message(), exit_code)
    }
}

pub(crate) fn load_service(command: &str) -> Result<InsightService, CommandResult> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| CommandResult::from_config(command, error))?;

    Ok(InsightService::new(
        ArtifactStore::new(ArtifactPaths::from_config(&config.artifacts)),
        config.recommend,
    ))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
