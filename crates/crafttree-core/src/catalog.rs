use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An item in the compendium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// 0 means tierless.
    #[serde(default)]
    pub tier: u32,
    /// Category or skill tag, e.g. "Forestry".
    #[serde(default)]
    pub tag: String,
    /// Resources are never crafted, even if some recipe happens to output them.
    #[serde(default)]
    pub resource: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tier: 0,
            tag: String::new(),
            resource: false,
            description: None,
        }
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the item as a raw resource.
    pub fn resource(mut self) -> Self {
        self.resource = true;
        self
    }
}

/// One input requirement of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub item: ItemId,
    /// Quantity consumed per execution. `None` means the input carries no
    /// material cost (e.g. a tool that is only referenced).
    pub quantity: Option<u32>,
}

/// How many units a single execution yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputQuantity {
    Fixed(u32),
    Range { min: u32, max: u32 },
}

impl OutputQuantity {
    /// The quantity planning arithmetic works with: the fixed value or the
    /// lower bound of a range, with 0 treated as 1.
    pub fn planning_quantity(&self) -> u32 {
        let raw = match *self {
            OutputQuantity::Fixed(n) => n,
            OutputQuantity::Range { min, .. } => min,
        };
        raw.max(1)
    }
}

impl Default for OutputQuantity {
    fn default() -> Self {
        OutputQuantity::Fixed(1)
    }
}

/// One output entry of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOutput {
    pub item: ItemId,
    #[serde(default)]
    pub quantity: OutputQuantity,
}

/// Descriptive recipe data. Carried through to callers, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeAttributes {
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

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub inputs: Vec<RecipeInput>,
    pub outputs: Vec<RecipeOutput>,
    #[serde(default)]
    pub attributes: RecipeAttributes,
}

impl Recipe {
    pub fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attributes: RecipeAttributes::default(),
        }
    }

    /// Add an input consumed `quantity` times per execution.
    pub fn input(mut self, item: ItemId, quantity: u32) -> Self {
        self.inputs.push(RecipeInput {
            item,
            quantity: Some(quantity),
        });
        self
    }

    /// Add an input with no material cost.
    pub fn free_input(mut self, item: ItemId) -> Self {
        self.inputs.push(RecipeInput {
            item,
            quantity: None,
        });
        self
    }

    pub fn output(mut self, item: ItemId, quantity: u32) -> Self {
        self.outputs.push(RecipeOutput {
            item,
            quantity: OutputQuantity::Fixed(quantity),
        });
        self
    }

    pub fn output_range(mut self, item: ItemId, min: u32, max: u32) -> Self {
        self.outputs.push(RecipeOutput {
            item,
            quantity: OutputQuantity::Range { min, max },
        });
        self
    }

    pub fn with_attributes(mut self, attributes: RecipeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns true if any output entry yields `item`.
    pub fn produces(&self, item: ItemId) -> bool {
        self.outputs.iter().any(|o| o.item == item)
    }

    /// Units of `item` one execution yields, from the first matching output
    /// entry. `None` if the recipe does not produce `item`.
    pub fn output_quantity_for(&self, item: ItemId) -> Option<u32> {
        self.outputs
            .iter()
            .find(|o| o.item == item)
            .map(|o| o.quantity.planning_quantity())
    }

    /// Inputs that actually cost material: present and positive quantities.
    pub fn material_inputs(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.inputs.iter().filter_map(|input| match input.quantity {
            Some(q) if q > 0 => Some((input.item, q)),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects items and recipes, then freezes them into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<Item>,
    recipes: Vec<Recipe>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. Returns its id.
    pub fn register_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Register a recipe. Registration order decides which recipe becomes the
    /// primary producer of an item.
    pub fn register_recipe(&mut self, recipe: Recipe) -> RecipeId {
        let id = recipe.id;
        self.recipes.push(recipe);
        id
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Freeze into an immutable index. Never fails: duplicate ids keep the
    /// first registration, and dangling item references are left for the
    /// expansion fallback to absorb.
    pub fn build(self) -> Catalog {
        let mut items = Vec::with_capacity(self.items.len());
        let mut item_index = HashMap::with_capacity(self.items.len());
        let mut name_index = HashMap::with_capacity(self.items.len());

        for item in self.items {
            if item_index.contains_key(&item.id) {
                tracing::warn!(item = %item.id, name = %item.name, "duplicate item id ignored");
                continue;
            }
            item_index.insert(item.id, items.len());
            name_index.entry(item.name.clone()).or_insert(item.id);
            items.push(item);
        }

        let mut recipes = Vec::with_capacity(self.recipes.len());
        let mut recipe_index = HashMap::with_capacity(self.recipes.len());
        let mut producers: HashMap<ItemId, Vec<usize>> = HashMap::new();
        let mut consumers: HashMap<ItemId, Vec<usize>> = HashMap::new();

        for recipe in self.recipes {
            if recipe_index.contains_key(&recipe.id) {
                tracing::warn!(recipe = %recipe.id, name = %recipe.name, "duplicate recipe id ignored");
                continue;
            }
            let slot = recipes.len();
            recipe_index.insert(recipe.id, slot);

            for output in &recipe.outputs {
                let list = producers.entry(output.item).or_default();
                if list.last() != Some(&slot) {
                    list.push(slot);
                }
            }
            for input in &recipe.inputs {
                let list = consumers.entry(input.item).or_default();
                if list.last() != Some(&slot) {
                    list.push(slot);
                }
            }
            recipes.push(recipe);
        }

        tracing::debug!(
            items = items.len(),
            recipes = recipes.len(),
            produced = producers.len(),
            "catalog built"
        );

        Catalog {
            items,
            item_index,
            name_index,
            recipes,
            recipe_index,
            producers,
            consumers,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable item/recipe index. Frozen after [`CatalogBuilder::build`] and
/// safe to share between threads.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<Item>,
    item_index: HashMap<ItemId, usize>,
    name_index: HashMap<String, ItemId>,
    recipes: Vec<Recipe>,
    recipe_index: HashMap<RecipeId, usize>,
    /// Recipe slots outputting each item, in registration order. The first
    /// entry is the primary producer.
    producers: HashMap<ItemId, Vec<usize>>,
    consumers: HashMap<ItemId, Vec<usize>>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.item_index.get(&id).map(|&slot| &self.items[slot])
    }

    /// Lookup by display name. When names collide the first item wins.
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.name_index.get(name).and_then(|&id| self.item(id))
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipe_index.get(&id).map(|&slot| &self.recipes[slot])
    }

    /// The primary recipe producing `item`: the first registered recipe that
    /// lists it as an output.
    pub fn recipe_for_output(&self, item: ItemId) -> Option<&Recipe> {
        self.producers
            .get(&item)
            .and_then(|slots| slots.first())
            .map(|&slot| &self.recipes[slot])
    }

    /// True if `item` has no primary recipe or is flagged as a resource.
    /// Unknown ids are base materials.
    pub fn is_base_material(&self, item: ItemId) -> bool {
        if self.item(item).is_some_and(|i| i.resource) {
            return true;
        }
        self.recipe_for_output(item).is_none()
    }

    /// Every recipe that outputs `item`, primary first.
    pub fn producers_of(&self, item: ItemId) -> impl Iterator<Item = &Recipe> + '_ {
        self.slots(&self.producers, item)
    }

    /// Every recipe that lists `item` as an input.
    pub fn consumers_of(&self, item: ItemId) -> impl Iterator<Item = &Recipe> + '_ {
        self.slots(&self.consumers, item)
    }

    fn slots<'a>(
        &'a self,
        map: &'a HashMap<ItemId, Vec<usize>>,
        item: ItemId,
    ) -> impl Iterator<Item = &'a Recipe> + 'a {
        map.get(&item)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&slot| &self.recipes[slot])
    }

    /// Items in registration order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Recipes in registration order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        let log = b.register_item(Item::new(ItemId(1), "Rough Log").resource());
        let plank = b.register_item(Item::new(ItemId(2), "Rough Plank").with_tier(1));
        b.register_recipe(
            Recipe::new(RecipeId(10), "Saw Planks")
                .input(log, 1)
                .output(plank, 2),
        );
        b
    }

    #[test]
    fn register_and_build() {
        let catalog = setup_builder().build();
        assert_eq!(catalog.item_count(), 2);
        assert_eq!(catalog.recipe_count(), 1);
    }

    #[test]
    fn lookup_by_id_and_name() {
        let catalog = setup_builder().build();
        assert_eq!(catalog.item(ItemId(2)).unwrap().name, "Rough Plank");
        assert_eq!(catalog.item_by_name("Rough Log").unwrap().id, ItemId(1));
        assert!(catalog.item(ItemId(999)).is_none());
        assert!(catalog.item_by_name("nonexistent").is_none());
        assert!(catalog.recipe(RecipeId(999)).is_none());
    }

    #[test]
    fn recipe_for_output_finds_producer() {
        let catalog = setup_builder().build();
        let recipe = catalog.recipe_for_output(ItemId(2)).unwrap();
        assert_eq!(recipe.id, RecipeId(10));
        assert!(catalog.recipe_for_output(ItemId(1)).is_none());
    }

    #[test]
    fn base_material_rules() {
        let catalog = setup_builder().build();
        assert!(catalog.is_base_material(ItemId(1)));
        assert!(!catalog.is_base_material(ItemId(2)));
        // Unknown ids are base.
        assert!(catalog.is_base_material(ItemId(999)));
    }

    #[test]
    fn resource_flag_overrides_recipe() {
        let mut b = setup_builder();
        // A recipe that happens to output the resource.
        b.register_recipe(
            Recipe::new(RecipeId(11), "Compress Log")
                .input(ItemId(2), 4)
                .output(ItemId(1), 1),
        );
        let catalog = b.build();
        assert!(catalog.recipe_for_output(ItemId(1)).is_some());
        assert!(catalog.is_base_material(ItemId(1)));
    }

    #[test]
    fn first_registered_recipe_is_primary() {
        let mut b = setup_builder();
        b.register_recipe(
            Recipe::new(RecipeId(12), "Saw Planks Badly")
                .input(ItemId(1), 3)
                .output(ItemId(2), 1),
        );
        let catalog = b.build();
        assert_eq!(catalog.recipe_for_output(ItemId(2)).unwrap().id, RecipeId(10));
        let producers: Vec<RecipeId> = catalog.producers_of(ItemId(2)).map(|r| r.id).collect();
        assert_eq!(producers, vec![RecipeId(10), RecipeId(12)]);
    }

    #[test]
    fn consumers_of_lists_recipes_using_item() {
        let catalog = setup_builder().build();
        let used_in: Vec<RecipeId> = catalog.consumers_of(ItemId(1)).map(|r| r.id).collect();
        assert_eq!(used_in, vec![RecipeId(10)]);
        assert_eq!(catalog.consumers_of(ItemId(2)).count(), 0);
    }

    #[test]
    fn duplicate_item_id_keeps_first() {
        let mut b = setup_builder();
        b.register_item(Item::new(ItemId(1), "Impostor"));
        let catalog = b.build();
        assert_eq!(catalog.item_count(), 2);
        assert_eq!(catalog.item(ItemId(1)).unwrap().name, "Rough Log");
    }

    #[test]
    fn duplicate_recipe_id_keeps_first() {
        let mut b = setup_builder();
        b.register_recipe(Recipe::new(RecipeId(10), "Shadow").output(ItemId(1), 1));
        let catalog = b.build();
        assert_eq!(catalog.recipe_count(), 1);
        assert_eq!(catalog.recipe(RecipeId(10)).unwrap().name, "Saw Planks");
        assert!(catalog.recipe_for_output(ItemId(1)).is_none());
    }

    #[test]
    fn recipe_referencing_unknown_item_still_indexes() {
        let mut b = CatalogBuilder::new();
        b.register_recipe(
            Recipe::new(RecipeId(1), "Mystery")
                .input(ItemId(500), 1)
                .output(ItemId(501), 1),
        );
        let catalog = b.build();
        assert!(catalog.item(ItemId(501)).is_none());
        assert!(!catalog.is_base_material(ItemId(501)));
        assert!(catalog.is_base_material(ItemId(500)));
    }

    #[test]
    fn empty_catalog_builds() {
        let catalog = CatalogBuilder::new().build();
        assert_eq!(catalog.item_count(), 0);
        assert_eq!(catalog.recipe_count(), 0);
        assert!(catalog.is_base_material(ItemId(0)));
    }

    #[test]
    fn planning_quantity_defaults_and_ranges() {
        assert_eq!(OutputQuantity::Fixed(3).planning_quantity(), 3);
        assert_eq!(OutputQuantity::Fixed(0).planning_quantity(), 1);
        assert_eq!(OutputQuantity::Range { min: 2, max: 5 }.planning_quantity(), 2);
        assert_eq!(OutputQuantity::Range { min: 0, max: 5 }.planning_quantity(), 1);
        assert_eq!(OutputQuantity::default().planning_quantity(), 1);
    }

    #[test]
    fn output_quantity_uses_first_matching_entry() {
        let recipe = Recipe::new(RecipeId(1), "Twice")
            .output(ItemId(5), 4)
            .output(ItemId(5), 9)
            .output_range(ItemId(6), 2, 3);
        assert_eq!(recipe.output_quantity_for(ItemId(5)), Some(4));
        assert_eq!(recipe.output_quantity_for(ItemId(6)), Some(2));
        assert_eq!(recipe.output_quantity_for(ItemId(7)), None);
        assert!(recipe.produces(ItemId(6)));
    }

    #[test]
    fn material_inputs_skip_free_and_zero() {
        let recipe = Recipe::new(RecipeId(1), "Mixed")
            .input(ItemId(1), 2)
            .free_input(ItemId(2))
            .input(ItemId(3), 0);
        let inputs: Vec<_> = recipe.material_inputs().collect();
        assert_eq!(inputs, vec![(ItemId(1), 2)]);
    }

    #[test]
    fn catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
