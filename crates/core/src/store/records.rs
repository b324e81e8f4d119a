//! Recipe record create/read operations.

use super::connection::RecipeDb;
use crate::Error;
use crate::types::{Recipe, SourceType};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Everything needed to persist one pipeline result.
#[derive(Debug, Clone)]
pub struct NewRecipeRecord {
    pub input_url: String,
    pub resolved_url: Option<String>,
    pub source_type: SourceType,
    pub recipe: Recipe,
    pub raw_text: String,
}

/// A stored extraction result.
///
/// `title`, `cuisine` and `meal_type` duplicate fields of `recipe` so they
/// can be indexed.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RecipeRecord {
    pub id: String,
    pub input_url: String,
    pub resolved_url: Option<String>,
    pub source_type: SourceType,
    pub title: String,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub recipe: Recipe,
    pub raw_text: String,
    pub created_at: String,
}

/// Index columns of a record, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub source_type: SourceType,
    pub created_at: String,
}

/// Row as stored, before the JSON payload and tag are decoded.
struct RecordRow {
    id: String,
    input_url: String,
    resolved_url: Option<String>,
    source_type: String,
    title: String,
    cuisine: Option<String>,
    meal_type: Option<String>,
    recipe_json: String,
    raw_text: String,
    created_at: String,
}

impl TryFrom<RecordRow> for RecipeRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self, Error> {
        let recipe: Recipe = serde_json::from_str(&row.recipe_json)
            .map_err(|e| Error::Serialization(format!("record {}: corrupt recipe payload: {e}", row.id)))?;
        let source_type = row
            .source_type
            .parse::<SourceType>()
            .map_err(|e| Error::Serialization(format!("record {}: {e}", row.id)))?;

        Ok(RecipeRecord {
            id: row.id,
            input_url: row.input_url,
            resolved_url: row.resolved_url,
            source_type,
            title: row.title,
            cuisine: row.cuisine,
            meal_type: row.meal_type,
            recipe,
            raw_text: row.raw_text,
            created_at: row.created_at,
        })
    }
}

impl RecipeDb {
    /// Insert a record and return its newly assigned id.
    pub async fn create(&self, record: NewRecipeRecord) -> Result<String, Error> {
        let recipe_json = serde_json::to_string(&record.recipe)
            .map_err(|e| Error::Serialization(format!("failed to encode recipe: {e}")))?;
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        let row_id = id.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO recipe_records (
                    id, input_url, resolved_url, source_type, title,
                    cuisine, meal_type, recipe_json, raw_text, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        &row_id,
                        &record.input_url,
                        &record.resolved_url,
                        record.source_type.as_str(),
                        &record.recipe.title,
                        &record.recipe.cuisine,
                        &record.recipe.meal_type,
                        &recipe_json,
                        &record.raw_text,
                        &created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(id = %id, "stored recipe record");
        Ok(id)
    }

    /// Get a record by id.
    ///
    /// Returns None if no record has that id.
    pub async fn get(&self, id: &str) -> Result<Option<RecipeRecord>, Error> {
        let id = id.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<RecordRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT
                    id, input_url, resolved_url, source_type, title,
                    cuisine, meal_type, recipe_json, raw_text, created_at
                FROM recipe_records WHERE id = ?1",
                )?;

                let result = stmt.query_row(params![id], |row| {
                    Ok(RecordRow {
                        id: row.get(0)?,
                        input_url: row.get(1)?,
                        resolved_url: row.get(2)?,
                        source_type: row.get(3)?,
                        title: row.get(4)?,
                        cuisine: row.get(5)?,
                        meal_type: row.get(6)?,
                        recipe_json: row.get(7)?,
                        raw_text: row.get(8)?,
                        created_at: row.get(9)?,
                    })
                });

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(RecipeRecord::try_from).transpose()
    }

    /// Newest-first summaries, at most `limit` of them.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<RecipeSummary>, Error> {
        let limit = limit as i64;
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String, Option<String>, Option<String>, String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, cuisine, meal_type, source_type, created_at
                FROM recipe_records ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(params![limit], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(id, title, cuisine, meal_type, source_type, created_at)| {
                let source_type = source_type
                    .parse::<SourceType>()
                    .map_err(|e| Error::Serialization(format!("record {id}: {e}")))?;
                Ok(RecipeSummary { id, title, cuisine, meal_type, source_type, created_at })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ingredient, Platform, RecipeSource, number_steps};

    fn make_record(title: &str, source_type: SourceType) -> NewRecipeRecord {
        NewRecipeRecord {
            input_url: "https://youtu.be/abc123".to_string(),
            resolved_url: Some("https://cooking.example/recipes/noodles".to_string()),
            source_type,
            recipe: Recipe {
                title: title.to_string(),
                servings: Some("2".to_string()),
                ingredients: vec![Ingredient::named("noodles"), Ingredient::named("garlic")],
                steps: number_steps(vec![("Boil noodles", Some(8.0)), ("Fry garlic", None)]),
                notes: None,
                cuisine: Some("Chinese".to_string()),
                meal_type: Some("Dinner".to_string()),
                tags: Some(vec!["quick".to_string()]),
                source: RecipeSource {
                    url: Some("https://cooking.example/recipes/noodles".to_string()),
                    platform: Platform::Other,
                },
            },
            raw_text: "Garlic noodles. Boil noodles, fry garlic.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = RecipeDb::open_in_memory().await.unwrap();
        let new = make_record("Garlic Noodles", SourceType::PageScrape);
        let id = db.create(new.clone()).await.unwrap();

        let record = db.get(&id).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.title, "Garlic Noodles");
        assert_eq!(record.cuisine.as_deref(), Some("Chinese"));
        assert_eq!(record.meal_type.as_deref(), Some("Dinner"));
        assert_eq!(record.source_type, SourceType::PageScrape);
        assert_eq!(record.resolved_url, new.resolved_url);
        assert_eq!(record.recipe, new.recipe);
        assert_eq!(record.raw_text, new.raw_text);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = RecipeDb::open_in_memory().await.unwrap();
        assert!(db.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let db = RecipeDb::open_in_memory().await.unwrap();
        let a = db.create(make_record("A", SourceType::PageTextAi)).await.unwrap();
        let b = db.create(make_record("A", SourceType::PageTextAi)).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first_and_limited() {
        let db = RecipeDb::open_in_memory().await.unwrap();
        db.create(make_record("First", SourceType::PageScrape)).await.unwrap();
        db.create(make_record("Second", SourceType::PageTextAi)).await.unwrap();
        db.create(make_record("Third", SourceType::PageTextAi)).await.unwrap();

        let recent = db.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Third");
        assert_eq!(recent[1].title, "Second");
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_store_error() {
        let db = RecipeDb::open_in_memory().await.unwrap();
        let id = db.create(make_record("Broken", SourceType::PageScrape)).await.unwrap();

        let target = id.clone();
        db.conn
            .call(move |conn| {
                conn.execute("UPDATE recipe_records SET recipe_json = '{not json' WHERE id = ?1", params![target])
            })
            .await
            .unwrap();

        let err = db.get(&id).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
