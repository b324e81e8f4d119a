//! Core types and shared functionality for ladle.
//!
//! This crate provides:
//! - Recipe and resolution record types
//! - Unified error types
//! - Layered configuration
//! - SQLite record store

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use store::{NewRecipeRecord, RecipeDb, RecipeRecord, RecipeSummary};
pub use types::{Ingredient, Platform, Recipe, RecipeSource, ResolveResult, SourceType, Step, number_steps};
