//! Model output decoding and re-validation.
//!
//! The service enforces the schema, but the payload is still re-checked:
//! step order comes from the model and is not trusted, blanks are dropped,
//! and tags are capped.

use serde::Deserialize;
use std::cmp::Ordering;

use ladle_core::{Error, Ingredient, Platform, Recipe, RecipeSource, number_steps};

const MAX_TAGS: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelRecipe {
    #[serde(default)]
    title: String,
    servings: Option<String>,
    #[serde(default)]
    ingredients: Vec<ModelIngredient>,
    #[serde(default)]
    steps: Vec<ModelStep>,
    notes: Option<Vec<String>>,
    cuisine: Option<String>,
    meal_type: Option<String>,
    tags: Option<Vec<String>>,
    source: Option<ModelSource>,
}

#[derive(Debug, Deserialize)]
struct ModelIngredient {
    #[serde(default)]
    item: String,
    quantity: Option<String>,
    unit: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelStep {
    order: Option<f64>,
    #[serde(default)]
    instruction: String,
    time_minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelSource {
    url: Option<String>,
    platform: Option<Platform>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
}

fn dedup_tags(tags: Vec<String>) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.into_iter().filter_map(|t| clean(Some(t))) {
        if out.len() == MAX_TAGS {
            break;
        }
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(&tag)) {
            out.push(tag);
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Decode the model's JSON text into a normalized [`Recipe`].
pub(crate) fn parse_model_output(content: &str, source_url: Option<&str>) -> Result<Recipe, Error> {
    let model: ModelRecipe = serde_json::from_str(content)
        .map_err(|e| Error::ExtractionFailed(format!("unparsable model response: {e}")))?;
    into_recipe(model, source_url)
}

pub(crate) fn into_recipe(model: ModelRecipe, source_url: Option<&str>) -> Result<Recipe, Error> {
    let title = clean(Some(model.title))
        .ok_or_else(|| Error::ExtractionFailed("model returned a recipe without a title".to_string()))?;

    let ingredients = model
        .ingredients
        .into_iter()
        .filter_map(|i| {
            clean(Some(i.item)).map(|item| Ingredient {
                item,
                quantity: clean(i.quantity),
                unit: clean(i.unit),
                notes: clean(i.notes),
            })
        })
        .collect();

    let mut steps = model.steps;
    // Unnumbered steps keep their position after the numbered ones.
    steps.sort_by(|a, b| match (a.order, b.order) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    let steps = number_steps(
        steps
            .into_iter()
            .map(|s| (s.instruction, s.time_minutes.filter(|m| m.is_finite() && *m >= 0.0))),
    );

    let notes = model
        .notes
        .map(|n| n.into_iter().filter_map(|note| clean(Some(note))).collect::<Vec<_>>())
        .filter(|n| !n.is_empty());

    let source = match model.source {
        Some(s) => RecipeSource {
            url: clean(s.url).or_else(|| source_url.map(str::to_string)),
            platform: s.platform.unwrap_or_default(),
        },
        None => RecipeSource { url: source_url.map(str::to_string), platform: Platform::Other },
    };

    Ok(Recipe {
        title,
        servings: clean(model.servings),
        ingredients,
        steps,
        notes,
        cuisine: clean(model.cuisine),
        meal_type: clean(model.meal_type),
        tags: model.tags.and_then(dedup_tags),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let content = r#"{
            "title": "Garlic Noodles", "servings": "2",
            "ingredients": [{"item": "noodles", "quantity": "8", "unit": "oz", "notes": null},
                            {"item": "garlic", "quantity": null, "unit": null, "notes": "minced"}],
            "steps": [{"order": 1, "instruction": "Boil noodles.", "timeMinutes": 10},
                      {"order": 2, "instruction": "Toss with garlic butter.", "timeMinutes": null}],
            "notes": null, "cuisine": "American", "mealType": "Dinner",
            "tags": ["quick", "garlic", "noodles"],
            "source": {"url": "https://cooking.example/garlic-noodles", "platform": "other"}
        }"#;
        let recipe = parse_model_output(content, Some("https://ignored.example")).unwrap();
        assert_eq!(recipe.title, "Garlic Noodles");
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("oz"));
        assert_eq!(recipe.ingredients[1].quantity, None);
        assert_eq!(recipe.steps[0].time_minutes, Some(10.0));
        assert_eq!(recipe.meal_type.as_deref(), Some("Dinner"));
        assert_eq!(recipe.source.url.as_deref(), Some("https://cooking.example/garlic-noodles"));
        assert!(recipe.has_contiguous_steps());
    }

    #[test]
    fn test_missing_source_defaults_to_input_url_and_other() {
        let content = r#"{"title": "Soup", "ingredients": [], "steps": [], "source": null}"#;
        let recipe = parse_model_output(content, Some("https://www.youtube.com/watch?v=abc123")).unwrap();
        assert_eq!(recipe.source.url.as_deref(), Some("https://www.youtube.com/watch?v=abc123"));
        assert_eq!(recipe.source.platform, Platform::Other);
    }

    #[test]
    fn test_steps_reordered_and_renumbered() {
        let content = r#"{"title": "Toast", "ingredients": [{"item": "bread"}], "steps": [
            {"order": 3, "instruction": "Butter it."},
            {"order": 1, "instruction": "Slice bread."},
            {"order": 1, "instruction": "   "},
            {"order": 7, "instruction": "Eat."},
            {"instruction": "Clean up."}
        ]}"#;
        let recipe = parse_model_output(content, None).unwrap();
        let steps: Vec<_> = recipe.steps.iter().map(|s| (s.order, s.instruction.as_str())).collect();
        assert_eq!(steps, vec![(1, "Slice bread."), (2, "Butter it."), (3, "Eat."), (4, "Clean up.")]);
    }

    #[test]
    fn test_blank_ingredients_dropped_and_tags_capped() {
        let tags: Vec<String> = (0..12).map(|i| format!("tag{i}")).collect();
        let content = serde_json::json!({
            "title": "Salad",
            "ingredients": [{"item": " "}, {"item": "lettuce", "quantity": ""}],
            "steps": [],
            "tags": tags,
        })
        .to_string();
        let recipe = parse_model_output(&content, None).unwrap();
        assert_eq!(recipe.ingredients, vec![Ingredient::named("lettuce")]);
        assert_eq!(recipe.tags.unwrap().len(), MAX_TAGS);
        assert_eq!(recipe.source.url, None);
    }

    #[test]
    fn test_empty_title_or_garbage_fails() {
        assert!(matches!(parse_model_output(r#"{"title": "  "}"#, None), Err(Error::ExtractionFailed(_))));
        assert!(matches!(parse_model_output("I could not find a recipe.", None), Err(Error::ExtractionFailed(_))));
    }
}
