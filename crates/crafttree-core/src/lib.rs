//! Crafttree Core -- crafting dependency resolution for item compendiums.
//!
//! Given a read-only catalog of items and recipes, this crate answers "what
//! does it take to craft N of this?" in two consistent ways:
//!
//! - a flat shopping list of base materials ([`expand`]), and
//! - quantities on an interactive crafting tree ([`tree`], [`propagate`]).
//!
//! # Pipeline
//!
//! 1. **Catalog** -- register items and recipes on a
//!    [`catalog::CatalogBuilder`], then freeze it into an immutable
//!    [`catalog::Catalog`]. The first recipe registered for an item is its
//!    primary recipe.
//! 2. **Expansion** -- [`expand::Expander`] recursively walks primary recipes,
//!    rounds each up to whole executions, and sums base materials across
//!    branches. Cycles are cut where an item reappears on its own path.
//! 3. **Propagation** -- [`tree::CraftTree`] holds the nodes and material
//!    edges the user edits; [`propagate::propagate_quantities`] re-derives
//!    every node's quantity from the target with the same arithmetic.
//!
//! ```
//! use crafttree_core::catalog::{CatalogBuilder, Item, Recipe};
//! use crafttree_core::expand::{Expander, MemoCache};
//! use crafttree_core::id::{ItemId, RecipeId};
//! use crafttree_core::tree::CraftTree;
//!
//! let (fiber, rope) = (ItemId(1), ItemId(2));
//! let mut builder = CatalogBuilder::new();
//! builder.register_item(Item::new(fiber, "Fiber").resource());
//! builder.register_item(Item::new(rope, "Rope"));
//! builder.register_recipe(Recipe::new(RecipeId(1), "Twist").input(fiber, 3).output(rope, 1));
//! let catalog = builder.build();
//!
//! let list = Expander::with_cache(&catalog, MemoCache::new()).expand(rope, 10);
//! assert_eq!(list.quantity_of(fiber), 30);
//!
//! let tree = CraftTree::from_catalog(&catalog, rope, 10);
//! assert_eq!(tree.total_executions(), list.steps);
//! ```
//!
//! Nothing in this crate fails: unknown items, missing recipes and cycles are
//! all treated as base materials.

pub mod catalog;
pub mod expand;
pub mod id;
pub mod propagate;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
