//! JSON-LD `Recipe` parsing.
//!
//! Every `<script type="application/ld+json">` block is parsed on its own;
//! invalid JSON skips that block. A block may be a single node, an array of
//! nodes, or an `@graph` wrapper. The first `Recipe` node with at least one
//! ingredient and one step wins.

use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

use ladle_core::{Ingredient, Recipe, RecipeSource, number_steps};

use super::text::collapse_whitespace;
use crate::platform::classify;

const MAX_TAGS: usize = 8;
const DEFAULT_TITLE: &str = "Recipe";

static TYPED_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type]").expect("invalid selector"));

/// Parse the first acceptable JSON-LD recipe in `html`.
///
/// `source_url` becomes the recipe's provenance. Returns `None` when no
/// block yields a recipe with both ingredients and steps.
pub fn parse_structured_recipe(html: &str, source_url: &str) -> Option<Recipe> {
    let doc = Html::parse_document(html);

    let blocks = doc
        .select(&TYPED_SCRIPT)
        .filter(|el| {
            el.value()
                .attr("type")
                .is_some_and(|t| t.trim().to_ascii_lowercase().starts_with("application/ld+json"))
        })
        .map(|el| el.text().collect::<String>());

    for (idx, raw) in blocks.enumerate() {
        let value: Value = match serde_json::from_str(&escape_control_chars(&raw)) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(block = idx, error = %e, "skipping invalid JSON-LD block");
                continue;
            }
        };

        let mut nodes = Vec::new();
        collect_nodes(&value, &mut nodes);

        if let Some(recipe) = nodes
            .into_iter()
            .filter(|node| is_recipe_node(node))
            .find_map(|node| recipe_from_node(node, source_url))
        {
            tracing::debug!(url = source_url, block = idx, "structured recipe found");
            return Some(recipe);
        }
    }

    None
}

/// Escape raw control characters that appear inside JSON strings.
///
/// Hand-written JSON-LD often contains literal newlines in string values,
/// which strict parsers reject.
fn escape_control_chars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in raw.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if c.is_control() && (c as u32) < 0x20 {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    other => out.push_str(&format!("\\u{:04x}", other as u32)),
                }
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

fn collect_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_nodes(item, out)),
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().for_each(|item| collect_nodes(item, out)),
            _ => out.push(value),
        },
        _ => {}
    }
}

fn is_recipe_type(t: &str) -> bool {
    t == "Recipe" || t.ends_with("/Recipe") || t.ends_with(":Recipe")
}

fn is_recipe_node(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => is_recipe_type(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(is_recipe_type),
        _ => false,
    }
}

/// A string, or the first string of an array.
fn first_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => collapse_whitespace(s),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => return items.iter().find_map(|item| first_text(Some(item))),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn recipe_from_node(node: &Value, source_url: &str) -> Option<Recipe> {
    let ingredients: Vec<Ingredient> = {
        let primary = string_list(node.get("recipeIngredient"));
        let raw = if primary.is_empty() { string_list(node.get("ingredients")) } else { primary };
        raw.iter()
            .map(|s| collapse_whitespace(s))
            .filter(|s| !s.is_empty())
            .map(Ingredient::named)
            .collect()
    };

    let mut instructions = Vec::new();
    if let Some(value) = node.get("recipeInstructions") {
        collect_instructions(value, &mut instructions);
    }
    let steps = number_steps(instructions.into_iter().map(|text| (text, None)));

    if ingredients.is_empty() || steps.is_empty() {
        return None;
    }

    let title = first_text(node.get("name")).unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Some(Recipe {
        title,
        servings: first_text(node.get("recipeYield")),
        ingredients,
        steps,
        notes: None,
        cuisine: first_text(node.get("recipeCuisine")),
        meal_type: first_text(node.get("recipeCategory")),
        tags: keywords(node.get("keywords")),
        source: RecipeSource { url: Some(source_url.to_string()), platform: classify(source_url) },
    })
}

/// Flatten plain strings, string arrays, `HowToStep` objects and
/// `HowToSection` item lists into instruction texts, in document order.
fn collect_instructions(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(s.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string)),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => collect_instructions(other, out),
                }
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push(text.clone());
            } else if let Some(list) = map.get("itemListElement") {
                collect_instructions(list, out);
            } else if let Some(Value::String(name)) = map.get("name") {
                out.push(name.clone());
            }
        }
        _ => {}
    }
}

fn keywords(value: Option<&Value>) -> Option<Vec<String>> {
    let raw: Vec<String> = match value {
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => return None,
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in raw.iter().map(|t| collapse_whitespace(t)).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    (!tags.is_empty()).then_some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::Platform;

    const URL: &str = "https://example.com/how-to/kimchi";

    fn page(json: &str) -> String {
        format!(r#"<html><head><script type="application/ld+json">{json}</script></head><body></body></html>"#)
    }

    #[test]
    fn test_parse_kimchi_scenario() {
        let html = page(
            r#"{"@type":"Recipe","name":"Kimchi","recipeIngredient":["cabbage","salt"],"recipeInstructions":["Salt cabbage","Ferment 3 days"]}"#,
        );
        let recipe = parse_structured_recipe(&html, URL).unwrap();
        assert_eq!(recipe.title, "Kimchi");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0], Ingredient::named("cabbage"));
        assert_eq!(recipe.steps.iter().map(|s| s.order).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(recipe.steps[1].instruction, "Ferment 3 days");
        assert_eq!(recipe.source.url.as_deref(), Some(URL));
        assert_eq!(recipe.source.platform, Platform::Other);
    }

    #[test]
    fn test_parse_graph_with_typed_array_and_howto_sections() {
        let html = page(
            r#"{"@context":"https://schema.org","@graph":[
                {"@type":"WebPage","name":"Page"},
                {"@type":["Recipe","NewsArticle"],"name":"Bibimbap",
                 "recipeYield":["4","4 servings"],"recipeCuisine":"Korean","recipeCategory":["Dinner"],
                 "keywords":"rice, korean, Rice, bowl",
                 "recipeIngredient":["rice","gochujang"],
                 "recipeInstructions":[
                    {"@type":"HowToSection","name":"Prep","itemListElement":[
                        {"@type":"HowToStep","text":"Cook the rice."},
                        {"@type":"HowToStep","text":"  Blanch   the spinach. "}]},
                    {"@type":"HowToStep","text":"Assemble the bowl."}]}
            ]}"#,
        );
        let recipe = parse_structured_recipe(&html, URL).unwrap();
        assert_eq!(recipe.title, "Bibimbap");
        assert_eq!(recipe.servings.as_deref(), Some("4"));
        assert_eq!(recipe.cuisine.as_deref(), Some("Korean"));
        assert_eq!(recipe.meal_type.as_deref(), Some("Dinner"));
        assert_eq!(recipe.tags, Some(vec!["rice".to_string(), "korean".to_string(), "bowl".to_string()]));
        let steps: Vec<_> = recipe.steps.iter().map(|s| (s.order, s.instruction.as_str())).collect();
        assert_eq!(steps, vec![(1, "Cook the rice."), (2, "Blanch the spinach."), (3, "Assemble the bowl.")]);
    }

    #[test]
    fn test_parse_rejects_empty_ingredients_or_steps() {
        let no_steps = page(r#"{"@type":"Recipe","name":"Half","recipeIngredient":["salt"]}"#);
        assert!(parse_structured_recipe(&no_steps, URL).is_none());

        let no_ingredients = page(r#"{"@type":"Recipe","name":"Half","recipeInstructions":"Mix."}"#);
        assert!(parse_structured_recipe(&no_ingredients, URL).is_none());
    }

    #[test]
    fn test_invalid_block_is_skipped_and_next_wins() {
        let html = format!(
            "{}{}",
            r#"<script type="application/ld+json">{ not json </script>"#,
            page(r#"[{"@type":"Recipe","recipeIngredient":["egg"],"recipeInstructions":"Boil the egg.\nPeel it."}]"#)
        );
        let recipe = parse_structured_recipe(&html, URL).unwrap();
        assert_eq!(recipe.title, DEFAULT_TITLE);
        assert_eq!(recipe.steps.len(), 2);
    }

    #[test]
    fn test_literal_newlines_in_strings_are_tolerated() {
        let html = page("{\"@type\":\"Recipe\",\"name\":\"Soup\",\"recipeIngredient\":[\"water\"],\"recipeInstructions\":[\"Heat\nthe water\"]}");
        let recipe = parse_structured_recipe(&html, URL).unwrap();
        assert_eq!(recipe.steps[0].instruction, "Heat the water");
    }

    #[test]
    fn test_no_jsonld_is_none() {
        assert!(parse_structured_recipe("<html><body><p>Kimchi</p></body></html>", URL).is_none());
        let other_type = page(r#"{"@type":"Article","recipeIngredient":["x"],"recipeInstructions":["y"]}"#);
        assert!(parse_structured_recipe(&other_type, URL).is_none());
    }

    #[test]
    fn test_escape_control_chars_only_inside_strings() {
        assert_eq!(escape_control_chars("{\n\"a\":\"b\tc\"\n}"), "{\n\"a\":\"b\\tc\"\n}");
    }
}
