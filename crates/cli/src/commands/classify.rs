use insight_core::DomainError;
use serde_json::json;

use crate::commands::{load_service, CommandResult};

pub fn run(recency: f64, frequency: i64, monetary: f64) -> CommandResult {
    let service = match load_service("classify") {
        Ok(service) => service,
        Err(result) => return result,
    };

    let Ok(frequency) = u64::try_from(frequency) else {
        return CommandResult::from_domain(
            "classify",
            DomainError::InvalidInput(format!("frequency must be >= 1, got {frequency}")),
        );
    };

    match service.classify(recency, frequency, monetary) {
        Ok(assignment) => CommandResult::success(
            "classify",
            format!("This customer belongs to: {}", assignment.headline()),
            Some(json!({
                "label": assignment.label,
                "cluster_index": assignment.cluster_index,
            })),
        ),
        Err(error) => CommandResult::from_domain("classify", error),
    }
}
