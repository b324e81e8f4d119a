//! SQLite-backed store for extracted recipe records.
//!
//! Records are written once, after the full pipeline succeeds, and read back
//! by opaque id. Access is async via tokio-rusqlite.

pub mod connection;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use connection::RecipeDb;
pub use records::{NewRecipeRecord, RecipeRecord, RecipeSummary};
