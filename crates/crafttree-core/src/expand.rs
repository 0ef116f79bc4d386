//! Dependency expansion: resolve a crafted item and quantity into the base
//! materials it ultimately costs.
//!
//! Expansion walks the primary recipe of each intermediate item, rounding
//! every recipe up to whole executions, and sums the base materials of all
//! branches into one [`Expansion`]. Items with no primary recipe, resources,
//! unknown ids and items already on the current recursion path are all
//! treated as base materials, so expansion never fails.
//!
//! ```
//! use crafttree_core::catalog::{CatalogBuilder, Item, Recipe};
//! use crafttree_core::expand::expand;
//! use crafttree_core::id::{ItemId, RecipeId};
//!
//! let mut b = CatalogBuilder::new();
//! b.register_item(Item::new(ItemId(1), "Log").resource());
//! b.register_item(Item::new(ItemId(2), "Plank"));
//! b.register_recipe(Recipe::new(RecipeId(1), "Saw").input(ItemId(1), 1).output(ItemId(2), 3));
//! let catalog = b.build();
//!
//! let result = expand(&catalog, ItemId(2), 4);
//! assert_eq!(result.quantity_of(ItemId(1)), 2);
//! assert_eq!(result.steps, 2);
//! ```

use crate::catalog::Catalog;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Base-material totals and the number of recipe executions behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub totals: BTreeMap<ItemId, u64>,
    pub steps: u64,
}

impl Expansion {
    /// A single base material with no crafting behind it.
    pub fn base(item: ItemId, quantity: u64) -> Self {
        let mut totals = BTreeMap::new();
        totals.insert(item, quantity);
        Self { totals, steps: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty() && self.steps == 0
    }

    /// Required quantity of `item`, 0 if it is not a base material of this
    /// expansion.
    pub fn quantity_of(&self, item: ItemId) -> u64 {
        self.totals.get(&item).copied().unwrap_or(0)
    }

    /// Sum another expansion into this one.
    pub fn merge(&mut self, other: &Expansion) {
        for (&item, &quantity) in &other.totals {
            let slot = self.totals.entry(item).or_insert(0);
            *slot = slot.saturating_add(quantity);
        }
        self.steps = self.steps.saturating_add(other.steps);
    }
}

/// Whole recipe executions needed to obtain `quantity` units from a recipe
/// yielding `per_execution` units. A yield of 0 counts as 1.
pub fn executions_for(quantity: u64, per_execution: u32) -> u64 {
    quantity.div_ceil(u64::from(per_execution.max(1)))
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// A store for previously computed expansions keyed by `(item, quantity)`.
///
/// Methods take `&self` so a cache can be shared across threads; entries are
/// advisory and an implementation may drop them at any time.
pub trait ExpansionCache {
    fn get(&self, item: ItemId, quantity: u64) -> Option<Expansion>;
    fn insert(&self, item: ItemId, quantity: u64, expansion: Expansion);
}

/// Disables memoization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ExpansionCache for NoCache {
    fn get(&self, _item: ItemId, _quantity: u64) -> Option<Expansion> {
        None
    }

    fn insert(&self, _item: ItemId, _quantity: u64, _expansion: Expansion) {}
}

/// In-memory memo table guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct MemoCache {
    entries: RwLock<HashMap<(ItemId, u64), Expansion>>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl ExpansionCache for MemoCache {
    fn get(&self, item: ItemId, quantity: u64) -> Option<Expansion> {
        self.entries.read().ok()?.get(&(item, quantity)).cloned()
    }

    fn insert(&self, item: ItemId, quantity: u64, expansion: Expansion) {
        // A poisoned lock only costs us the memo entry.
        if let Ok(mut entries) = self.entries.write() {
            entries.insert((item, quantity), expansion);
        }
    }
}

impl<C: ExpansionCache + ?Sized> ExpansionCache for Box<C> {
    fn get(&self, item: ItemId, quantity: u64) -> Option<Expansion> {
        (**self).get(item, quantity)
    }

    fn insert(&self, item: ItemId, quantity: u64, expansion: Expansion) {
        (**self).insert(item, quantity, expansion)
    }
}

impl<C: ExpansionCache + ?Sized> ExpansionCache for &C {
    fn get(&self, item: ItemId, quantity: u64) -> Option<Expansion> {
        (**self).get(item, quantity)
    }

    fn insert(&self, item: ItemId, quantity: u64, expansion: Expansion) {
        (**self).insert(item, quantity, expansion)
    }
}

// ---------------------------------------------------------------------------
// Expander
// ---------------------------------------------------------------------------

/// Expansion of one subtree, plus whether a cycle was cut inside it.
#[derive(Debug, Default)]
struct Partial {
    expansion: Expansion,
    cut_cycle: bool,
}

/// Expands items against one catalog, optionally memoizing sub-results.
///
/// The cache lives exactly as long as the expander, which borrows a single
/// immutable catalog, so a memoized entry can never outlive the data it was
/// computed from.
#[derive(Debug)]
pub struct Expander<'a, C = NoCache> {
    catalog: &'a Catalog,
    cache: C,
}

impl<'a> Expander<'a, NoCache> {
    /// An expander without memoization.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            cache: NoCache,
        }
    }
}

impl<'a, C: ExpansionCache> Expander<'a, C> {
    pub fn with_cache(catalog: &'a Catalog, cache: C) -> Self {
        Self { catalog, cache }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolve `quantity` units of `item` into base-material totals.
    pub fn expand(&self, item: ItemId, quantity: u64) -> Expansion {
        let mut path = HashSet::new();
        self.expand_inner(item, quantity, &mut path).expansion
    }

    fn expand_inner(&self, item: ItemId, quantity: u64, path: &mut HashSet<ItemId>) -> Partial {
        if quantity == 0 {
            return Partial::default();
        }

        if path.contains(&item) {
            tracing::debug!(%item, quantity, "recipe cycle cut, treating as base material");
            return Partial {
                expansion: Expansion::base(item, quantity),
                cut_cycle: true,
            };
        }

        let recipe = match self.catalog.recipe_for_output(item) {
            Some(recipe) if !self.catalog.is_base_material(item) => recipe,
            _ => {
                return Partial {
                    expansion: Expansion::base(item, quantity),
                    cut_cycle: false,
                };
            }
        };

        if let Some(hit) = self.cache.get(item, quantity) {
            return Partial {
                expansion: hit,
                cut_cycle: false,
            };
        }

        let per_execution = recipe.output_quantity_for(item).unwrap_or(1);
        let executions = executions_for(quantity, per_execution);

        let mut partial = Partial {
            expansion: Expansion {
                totals: BTreeMap::new(),
                steps: executions,
            },
            cut_cycle: false,
        };

        path.insert(item);
        for (input, per) in recipe.material_inputs() {
            let needed = executions.saturating_mul(u64::from(per));
            let child = self.expand_inner(input, needed, path);
            partial.expansion.merge(&child.expansion);
            partial.cut_cycle |= child.cut_cycle;
        }
        path.remove(&item);

        // A subtree that cut a cycle depends on its ancestors; only
        // path-independent results are memoized.
        if !partial.cut_cycle {
            self.cache.insert(item, quantity, partial.expansion.clone());
        }
        partial
    }

    /// Expand several targets and sum the results, e.g. every item of a
    /// construction project.
    #[cfg(not(feature = "parallel"))]
    pub fn expand_all(&self, targets: &[(ItemId, u64)]) -> Expansion {
        let mut total = Expansion::default();
        for &(item, quantity) in targets {
            total.merge(&self.expand(item, quantity));
        }
        total
    }

    /// Expand several targets on the rayon pool and sum the results. Summation
    /// is order-independent, so this matches the sequential result exactly.
    #[cfg(feature = "parallel")]
    pub fn expand_all(&self, targets: &[(ItemId, u64)]) -> Expansion
    where
        C: Sync,
    {
        use rayon::prelude::*;

        targets
            .par_iter()
            .map(|&(item, quantity)| self.expand(item, quantity))
            .reduce(Expansion::default, |mut acc, next| {
                acc.merge(&next);
                acc
            })
    }
}

/// Expand without memoization.
pub fn expand(catalog: &Catalog, item: ItemId, quantity: u64) -> Expansion {
    Expander::new(catalog).expand(item, quantity)
}
