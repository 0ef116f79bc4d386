//! Resolution pipeline: reads data files, converts records and builds the
//! catalog.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the catalog loaders built on them.

use crafttree_core::catalog::*;
use crafttree_core::id::{ItemId, RecipeId};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{PlannerConfig, load_planner_config};
use crate::schema::*;

// ===========================================================================
// Errors
// ===========================================================================

/// Why a catalog directory or document could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// `items.*` or `recipes.*` is absent.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Same stem, two formats.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Two records of the same kind share an id.
    #[error("duplicate {kind} id {id} in {file}")]
    DuplicateId {
        file: PathBuf,
        kind: &'static str,
        id: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats and file discovery
// ===========================================================================

/// Supported data file formats, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// The format named by a file's extension.
    pub fn from_path(path: &Path) -> Result<Format, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Format::ALL
            .into_iter()
            .find(|format| Some(format.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }
}

/// The `{stem}.{ron,toml,json}` file in `dir`, if any. A stem present in
/// more than one format is ambiguous and rejected.
pub fn find_data_file(dir: &Path, stem: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|format| dir.join(format!("{stem}.{}", format.extension())))
        .filter(|path| path.is_file());

    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

fn required_data_file(dir: &Path, stem: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, stem)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: stem.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize text in a known format. `origin` names the source in errors.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read and parse a file in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Read a record list. RON and JSON files hold a bare array; TOML has no
/// top-level arrays, so the list sits under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron | Format::Json => parse_str(&content, format, path),
        Format::Toml => {
            let table: toml::Value = parse_str(&content, format, path)?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: format!("missing key '{toml_key}' in TOML file"),
                })?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })
        }
    }
}

// ===========================================================================
// Record conversion
// ===========================================================================

fn convert_item(data: ItemData) -> Item {
    Item {
        id: ItemId(data.id),
        name: data.name,
        tier: data.tier,
        tag: data.tag,
        resource: data.resource,
        description: data.description,
    }
}

fn convert_output_quantity(data: Option<OutputQuantityData>) -> OutputQuantity {
    match data {
        Some(OutputQuantityData::Fixed(n)) => OutputQuantity::Fixed(n),
        Some(OutputQuantityData::Range(min, max)) => OutputQuantity::Range { min, max },
        None => OutputQuantity::default(),
    }
}

fn convert_recipe(data: RecipeData) -> Recipe {
    let inputs = data
        .inputs
        .into_iter()
        .map(|input| match input {
            RecipeInputData::Short(item, quantity) | RecipeInputData::Full { item, quantity } => {
                RecipeInput {
                    item: ItemId(item),
                    quantity,
                }
            }
        })
        .collect();

    let outputs = data
        .outputs
        .into_iter()
        .map(|output| match output {
            RecipeOutputData::Short(item, quantity) => RecipeOutput {
                item: ItemId(item),
                quantity: convert_output_quantity(Some(quantity)),
            },
            RecipeOutputData::Full { item, quantity } => RecipeOutput {
                item: ItemId(item),
                quantity: convert_output_quantity(quantity),
            },
        })
        .collect();

    Recipe {
        id: RecipeId(data.id),
        name: data.name,
        inputs,
        outputs,
        attributes: RecipeAttributes {
            time: data.time,
            profession: data.profession,
            level: data.level,
            tool: data.tool,
        },
    }
}

/// Register parsed records on a builder. Duplicate ids are rejected; item
/// references that match no item are logged and kept, since expansion treats
/// them as base materials.
pub fn build_catalog(
    items: Vec<ItemData>,
    recipes: Vec<RecipeData>,
    items_file: &Path,
    recipes_file: &Path,
) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    let mut item_ids = HashSet::with_capacity(items.len());
    for item in items {
        if !item_ids.insert(item.id) {
            return Err(DataLoadError::DuplicateId {
                file: items_file.to_path_buf(),
                kind: "item",
                id: item.id,
            });
        }
        builder.register_item(convert_item(item));
    }

    let mut recipe_ids = HashSet::with_capacity(recipes.len());
    for recipe in recipes {
        if !recipe_ids.insert(recipe.id) {
            return Err(DataLoadError::DuplicateId {
                file: recipes_file.to_path_buf(),
                kind: "recipe",
                id: recipe.id,
            });
        }
        let recipe = convert_recipe(recipe);
        let referenced = recipe
            .inputs
            .iter()
            .map(|i| i.item)
            .chain(recipe.outputs.iter().map(|o| o.item));
        for item in referenced {
            if !item_ids.contains(&item.0) {
                tracing::warn!(recipe = %recipe.id, %item, "recipe references unknown item");
            }
        }
        builder.register_recipe(recipe);
    }

    Ok(builder.build())
}

// ===========================================================================
// Loading entry points
// ===========================================================================

/// A catalog together with the planner settings found next to it.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub config: PlannerConfig,
}

/// Parse a single document holding both `items` and `recipes` arrays.
pub fn parse_catalog(content: &str, format: Format) -> Result<Catalog, DataLoadError> {
    let origin = Path::new("<catalog>");
    let data: CatalogData = parse_str(content, format, origin)?;
    build_catalog(data.items, data.recipes, origin, origin)
}

/// Load `items.*` and `recipes.*` from a directory.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let items_file = required_data_file(dir, "items")?;
    let recipes_file = required_data_file(dir, "recipes")?;

    let items: Vec<ItemData> = deserialize_list(&items_file, "items")?;
    let recipes: Vec<RecipeData> = deserialize_list(&recipes_file, "recipes")?;
    tracing::debug!(
        dir = %dir.display(),
        items = items.len(),
        recipes = recipes.len(),
        "catalog files parsed"
    );

    build_catalog(items, recipes, &items_file, &recipes_file)
}

/// Load the catalog and the optional `planner.*` settings from a directory.
pub fn load_planner_data(dir: &Path) -> Result<LoadedCatalog, DataLoadError> {
    let catalog = load_catalog(dir)?;
    let config = load_planner_config(dir)?;
    Ok(LoadedCatalog { catalog, config })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_dir::CatalogDir;

    const SAWMILL_ITEMS: &str = r#"[
        (id: 1, name: "Rough Log", resource: true),
        (id: 2, name: "Rough Plank", tier: 1),
    ]"#;

    const SAWMILL_RECIPES: &str = r#"[
        (id: 10, name: "Saw", inputs: [(1, Some(1))], outputs: [(2, 2)]),
    ]"#;

    fn sawmill(name: &str) -> CatalogDir {
        let dir = CatalogDir::new(name);
        dir.write("items.ron", SAWMILL_ITEMS);
        dir.write("recipes.ron", SAWMILL_RECIPES);
        dir
    }

    // -----------------------------------------------------------------------
    // Formats and discovery
    // -----------------------------------------------------------------------

    #[test]
    fn format_follows_extension() {
        for format in Format::ALL {
            let file = format!("recipes.{}", format.extension());
            assert_eq!(Format::from_path(Path::new(&file)).unwrap(), format);
        }
        for file in ["recipes.yaml", "recipes", "recipes.RON"] {
            assert!(matches!(
                Format::from_path(Path::new(file)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn planner_file_is_optional_but_unambiguous() {
        let dir = sawmill("discovery");
        assert_eq!(find_data_file(dir.path(), "planner").unwrap(), None);

        let toml = dir.write("planner.toml", "memoize = false");
        assert_eq!(find_data_file(dir.path(), "planner").unwrap(), Some(toml));

        dir.write("planner.json", r#"{"memoize": true}"#);
        let err = find_data_file(dir.path(), "planner").unwrap_err();
        assert!(matches!(err, DataLoadError::ConflictingFormats { .. }));
        let msg = err.to_string();
        assert!(msg.contains("planner.toml") && msg.contains("planner.json"));
    }

    #[test]
    fn directory_is_not_a_data_file() {
        let dir = CatalogDir::new("dir-named-like-file");
        std::fs::create_dir_all(dir.path().join("items.ron")).unwrap();
        assert_eq!(find_data_file(dir.path(), "items").unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    #[test]
    fn toml_item_list_sits_under_its_key() {
        let dir = CatalogDir::new("toml-items");
        let path = dir.write(
            "items.toml",
            r#"
[[items]]
id = 1
name = "Rough Log"
resource = true

[[items]]
id = 2
name = "Rough Plank"
tier = 1
"#,
        );
        let items: Vec<ItemData> = deserialize_list(&path, "items").unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].resource);
        assert_eq!(items[1].tier, 1);

        let wrong_key = dir.write("recipes.toml", "[[items]]\nid = 3\nname = \"x\"\n");
        let err = deserialize_list::<RecipeData>(&wrong_key, "recipes").unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { ref detail, .. } if detail.contains("recipes")));
    }

    #[test]
    fn malformed_recipes_name_the_file() {
        let dir = CatalogDir::new("bad-recipes");
        dir.write("items.ron", SAWMILL_ITEMS);
        dir.write("recipes.ron", "[(id: 10, name: \"Saw\", inputs: [(1, Some(1))]");
        let err = load_catalog(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { ref file, .. } if file.ends_with("recipes.ron")));
        assert!(err.to_string().contains("recipes.ron"));
    }

    // -----------------------------------------------------------------------
    // Catalog loading
    // -----------------------------------------------------------------------

    #[test]
    fn sawmill_loads_from_ron() {
        let dir = sawmill("ron");
        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.item_count(), 2);
        assert_eq!(catalog.recipe_count(), 1);
        assert!(catalog.is_base_material(ItemId(1)));
        let saw = catalog.recipe_for_output(ItemId(2)).unwrap();
        assert_eq!(saw.output_quantity_for(ItemId(2)), Some(2));
    }

    #[test]
    fn items_and_recipes_may_use_different_formats() {
        let dir = CatalogDir::new("mixed");
        dir.write("items.ron", SAWMILL_ITEMS);
        dir.write(
            "recipes.json",
            r#"[{"id": 10, "name": "Saw", "inputs": [{"item": 1, "quantity": 1}], "outputs": [{"item": 2, "quantity": [2, 4]}]}]"#,
        );

        let catalog = load_catalog(dir.path()).unwrap();
        let saw = catalog.recipe(RecipeId(10)).unwrap();
        assert_eq!(
            saw.outputs[0].quantity,
            OutputQuantity::Range { min: 2, max: 4 }
        );
    }

    #[test]
    fn missing_recipes_file_is_reported() {
        let dir = CatalogDir::new("no-recipes");
        dir.write("items.ron", SAWMILL_ITEMS);

        let err = load_catalog(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingRequired { ref file, .. } if file == "recipes"
        ));
        assert!(err.to_string().contains("recipes"));
    }

    #[test]
    fn unreadable_items_path_is_an_io_error() {
        let dir = CatalogDir::new("items-is-dir");
        dir.write("recipes.ron", SAWMILL_RECIPES);
        std::fs::create_dir_all(dir.path().join("items.ron")).unwrap();
        // A directory is not picked up as a data file.
        assert!(matches!(
            load_catalog(dir.path()),
            Err(DataLoadError::MissingRequired { .. })
        ));

        let err = deserialize_file::<Vec<ItemData>>(&dir.path().join("items.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    #[test]
    fn duplicate_item_id_rejected() {
        let result = parse_catalog(
            r#"{"items": [{"id": 1, "name": "a"}, {"id": 1, "name": "b"}]}"#,
            Format::Json,
        );
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateId { kind: "item", id: 1, .. })
        ));
    }

    #[test]
    fn duplicate_recipe_id_rejected() {
        let err = parse_catalog(
            r#"{"recipes": [{"id": 4, "outputs": [[1, 1]]}, {"id": 4, "outputs": [[2, 1]]}]}"#,
            Format::Json,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::DuplicateId { kind: "recipe", id: 4, .. }
        ));
        assert!(err.to_string().contains("duplicate recipe id 4"));
    }

    #[test]
    fn dangling_references_are_kept() {
        let catalog = parse_catalog(
            r#"{
                "items": [{"id": 1, "name": "Widget"}],
                "recipes": [{"id": 1, "inputs": [[99, 2]], "outputs": [[1, 1]]}]
            }"#,
            Format::Json,
        )
        .unwrap();
        let recipe = catalog.recipe_for_output(ItemId(1)).unwrap();
        assert_eq!(recipe.inputs[0].item, ItemId(99));
        assert!(catalog.is_base_material(ItemId(99)));
    }

    #[test]
    fn parse_catalog_toml_document() {
        let catalog = parse_catalog(
            r#"
[[items]]
id = 1
name = "Fiber"
resource = true

[[items]]
id = 2
name = "Rope"

[[recipes]]
id = 1
name = "Twist"
profession = "Tailoring"
inputs = [{ item = 1, quantity = 3 }]
outputs = [{ item = 2 }]
"#,
            Format::Toml,
        )
        .unwrap();
        let twist = catalog.recipe(RecipeId(1)).unwrap();
        assert_eq!(twist.output_quantity_for(ItemId(2)), Some(1));
        assert_eq!(twist.attributes.profession.as_deref(), Some("Tailoring"));
    }

    #[test]
    fn null_input_quantity_is_free() {
        let catalog = parse_catalog(
            r#"{"recipes": [{"id": 1, "inputs": [{"item": 5, "quantity": null}, [6, 2]], "outputs": [[7, 1]]}]}"#,
            Format::Json,
        )
        .unwrap();
        let recipe = catalog.recipe(RecipeId(1)).unwrap();
        let inputs: Vec<_> = recipe.material_inputs().collect();
        assert_eq!(inputs, vec![(ItemId(6), 2)]);
    }

    #[test]
    fn planner_data_defaults_without_settings_file() {
        let dir = sawmill("planner-default");
        let loaded = load_planner_data(dir.path()).unwrap();
        assert_eq!(loaded.catalog.item_count(), 2);
        assert_eq!(loaded.config, PlannerConfig::default());
    }
}
