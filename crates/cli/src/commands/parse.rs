use coffre_core::parse_event;

use crate::commands::CommandResult;

pub fn run(text: &str) -> CommandResult {
    let Some(event) = parse_event(text) else {
        return CommandResult::failure(
            "parse",
            "no_match",
            "text matches neither the inventory nor the sale log format",
            1,
        );
    };

    match serde_json::to_value(&event) {
        Ok(data) => CommandResult::success_with_data("parse", "event extracted", Some(data)),
        Err(error) => CommandResult::failure("parse", "serialization", error.to_string(), 1),
    }
}
