use serde_json::json;

use crate::commands::{load_service, CommandResult};

/// `top_n` of `None` uses the configured default; zero or negative yields an empty list.
pub fn run(product: &str, top_n: Option<i64>) -> CommandResult {
    let service = match load_service("recommend") {
        Ok(service) => service,
        Err(result) => return result,
    };

    let top_n = match top_n {
        None => service.default_top_n(),
        Some(value) if value <= 0 => 0,
        Some(value) => match usize::try_from(value) {
            Ok(value) if value <= service.max_top_n() => value,
            _ => {
                return CommandResult::failure(
                    "recommend",
                    "bad_request",
                    format!("top_n must be at most {}", service.max_top_n()),
                    3,
                );
            }
        },
    };

    match service.recommend_detailed(product, top_n) {
        Ok(ranked) => {
            let names: Vec<&str> = ranked.iter().map(|item| item.display_name.as_str()).collect();
            let mut message = String::from("Recommended products:");
            for (position, name) in names.iter().enumerate() {
                message.push_str(&format!("\n  {}. {name}", position + 1));
            }
            CommandResult::success(
                "recommend",
                message,
                Some(json!({ "query": product.trim(), "products": names, "ranked": ranked })),
            )
        }
        Err(error) => CommandResult::from_domain("recommend", error),
    }
}
