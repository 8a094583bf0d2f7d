use serde_json::json;

use crate::commands::{load_service, CommandResult};

pub fn run() -> CommandResult {
    let service = match load_service("products") {
        Ok(service) => service,
        Err(result) => return result,
    };

    match service.product_names() {
        Ok(names) => CommandResult::success(
            "products",
            format!("{} products in catalog", names.len()),
            Some(json!({ "products": names })),
        ),
        Err(error) => CommandResult::from_domain("products", error),
    }
}
