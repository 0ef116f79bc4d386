//! Serde data file structs for catalog definitions.
//!
//! These structs define the on-disk format for items, recipes and planner
//! settings. They are deserialized from RON, JSON or TOML data files and then
//! converted into core types by the loader.

use serde::Deserialize;

// ===========================================================================
// Items
// ===========================================================================

/// An item definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub resource: bool,
    #[serde(default)]
    pub description: Option<String>,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe input, either `(item, quantity)` or the full form. A missing or
/// null quantity means the input costs no material.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInputData {
    /// Short form: `(item_id, quantity)`.
    Short(u32, Option<u32>),
    Full {
        item: u32,
        #[serde(default)]
        quantity: Option<u32>,
    },
}

/// Output yield: a plain count or a `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutputQuantityData {
    Fixed(u32),
    Range(u32, u32),
}

/// A recipe output, either `(item, quantity)` or the full form. A missing
/// quantity yields 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeOutputData {
    /// Short form: `(item_id, quantity)`.
    Short(u32, OutputQuantityData),
    Full {
        item: u32,
        #[serde(default)]
        quantity: Option<OutputQuantityData>,
    },
}

/// A recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<RecipeInputData>,
    #[serde(default)]
    pub outputs: Vec<RecipeOutputData>,
    /// Crafting time in seconds.
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub tool: Option<String>,
}

// ===========================================================================
// Planner settings
// ===========================================================================

/// Optional `planner.{ron,json,toml}` file.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerData {
    #[serde(default = "default_true")]
    pub memoize: bool,
    #[serde(default)]
    pub max_passes: Option<u32>,
}

fn default_true() -> bool {
    true
}

// ===========================================================================
// Whole-catalog documents
// ===========================================================================

/// Items and recipes in a single document.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub recipes: Vec<RecipeData>,
}
