//! Instruction text and output schema for AI recipe extraction.

use serde_json::{Value, json};

use crate::extract::truncate_chars;

/// Name of the structured output format sent to the model.
pub const SCHEMA_NAME: &str = "recipe";

/// Most characters of page text sent to the model.
pub const MAX_INPUT_CHARS: usize = 60_000;

/// Meal types the model may choose from.
pub const MEAL_TYPES: &[&str] = &["Breakfast", "Lunch", "Dinner", "Snack", "Dessert", "Drink", "Side", "Appetizer"];

pub fn system_prompt() -> String {
    [
        "You extract a cooking recipe from messy webpage text.".to_string(),
        "Return a single JSON object that strictly matches the provided JSON schema.".to_string(),
        "Rules:".to_string(),
        "- Never invent ingredients. If an amount is unclear, keep the item name and set quantity, unit and notes to null."
            .to_string(),
        "- Steps must be in cooking order and numbered 1..N with no gaps.".to_string(),
        "- cuisine: a single best guess such as 'Korean', 'Italian' or 'Mexican'; null if unknown.".to_string(),
        format!("- mealType: one of ({}) or null.", MEAL_TYPES.join(", ")),
        "- tags: 3-8 short labels such as 'spicy', 'air fryer', 'vegetarian'.".to_string(),
        "- Keep instructions concise but complete.".to_string(),
    ]
    .join("\n")
}

/// The user turn: source URL line, then the page text capped at [`MAX_INPUT_CHARS`].
pub fn user_message(text: &str, source_url: Option<&str>) -> String {
    let source = match source_url {
        Some(url) => format!("Source URL: {url}"),
        None => "Source URL: (not provided)".to_string(),
    };
    format!("{source}\n\nPAGE TEXT:\n\n{}", truncate_chars(text, MAX_INPUT_CHARS))
}

fn nullable(schema: Value) -> Value {
    json!({ "anyOf": [schema, { "type": "null" }] })
}

/// Strict JSON schema for the recipe payload.
///
/// Strict mode requires every property to be listed in `required`; optional
/// fields are expressed as nullable instead of omittable.
pub fn recipe_schema() -> Value {
    let string = json!({ "type": "string" });
    let number = json!({ "type": "number" });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "servings", "ingredients", "steps", "notes", "cuisine", "mealType", "tags", "source"],
        "properties": {
            "title": string,
            "servings": nullable(string.clone()),
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["item", "quantity", "unit", "notes"],
                    "properties": {
                        "item": string,
                        "quantity": nullable(string.clone()),
                        "unit": nullable(string.clone()),
                        "notes": nullable(string.clone())
                    }
                }
            },
            "steps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["order", "instruction", "timeMinutes"],
                    "properties": {
                        "order": number,
                        "instruction": string,
                        "timeMinutes": nullable(number.clone())
                    }
                }
            },
            "notes": nullable(json!({ "type": "array", "items": string })),
            "cuisine": nullable(string.clone()),
            "mealType": nullable(string.clone()),
            "tags": { "type": "array", "items": string },
            "source": nullable(json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["url", "platform"],
                "properties": {
                    "url": nullable(string.clone()),
                    "platform": nullable(json!({ "type": "string", "enum": ["youtube", "instagram", "other"] }))
                }
            }))
        }
    })
}
