//! Shared test fixtures for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::*;
use crate::id::*;

// ===========================================================================
// The A/B/C/D scenario
// ===========================================================================
//
// A <- [2 x B, 1 x C]            (1 per execution)
// B <- [1 x D]                   (2 per execution)
// C, D have no recipe.

pub fn item_a() -> ItemId {
    ItemId(1)
}
pub fn item_b() -> ItemId {
    ItemId(2)
}
pub fn item_c() -> ItemId {
    ItemId(3)
}
pub fn item_d() -> ItemId {
    ItemId(4)
}

pub fn scenario_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_item(Item::new(item_a(), "A"));
    b.register_item(Item::new(item_b(), "B"));
    b.register_item(Item::new(item_c(), "C"));
    b.register_item(Item::new(item_d(), "D"));
    b.register_recipe(
        Recipe::new(RecipeId(1), "make A")
            .input(item_b(), 2)
            .input(item_c(), 1)
            .output(item_a(), 1),
    );
    b.register_recipe(
        Recipe::new(RecipeId(2), "make B")
            .input(item_d(), 1)
            .output(item_b(), 2),
    );
    b.build()
}

// ===========================================================================
// A small settlement-building catalog
// ===========================================================================

// Resources
pub fn rough_log() -> ItemId {
    ItemId(10)
}
pub fn plant_fiber() -> ItemId {
    ItemId(11)
}
pub fn rough_stone() -> ItemId {
    ItemId(12)
}

// Tools (referenced with no material cost)
pub fn hammer() -> ItemId {
    ItemId(13)
}

// Tier 1
pub fn rough_plank() -> ItemId {
    ItemId(20)
}
pub fn rough_rope() -> ItemId {
    ItemId(21)
}
pub fn rough_brick() -> ItemId {
    ItemId(22)
}

// Tier 2
pub fn timber_frame() -> ItemId {
    ItemId(30)
}
pub fn cottage() -> ItemId {
    ItemId(31)
}

/// Three raw resources, three tier-1 refinements (one with a ranged yield,
/// one with a 2-per-craft yield), a frame and a cottage that both consume
/// rope, and a hammer referenced as a free input.
pub fn settlement_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_item(Item::new(rough_log(), "Rough Log").with_tag("Forestry").resource());
    b.register_item(
        Item::new(plant_fiber(), "Plant Fiber")
            .with_tag("Foraging")
            .resource(),
    );
    b.register_item(Item::new(rough_stone(), "Rough Stone").with_tag("Mining").resource());
    b.register_item(Item::new(hammer(), "Hammer").with_tier(1).with_tag("Smithing"));
    b.register_item(Item::new(rough_plank(), "Rough Plank").with_tier(1).with_tag("Carpentry"));
    b.register_item(Item::new(rough_rope(), "Rough Rope").with_tier(1).with_tag("Tailoring"));
    b.register_item(Item::new(rough_brick(), "Rough Brick").with_tier(1).with_tag("Masonry"));
    b.register_item(Item::new(timber_frame(), "Timber Frame").with_tier(2).with_tag("Carpentry"));
    b.register_item(Item::new(cottage(), "Cottage").with_tier(2).with_tag("Construction"));

    b.register_recipe(
        Recipe::new(RecipeId(100), "Saw Rough Planks")
            .input(rough_log(), 1)
            .free_input(hammer())
            .output(rough_plank(), 2),
    );
    b.register_recipe(
        Recipe::new(RecipeId(101), "Twist Rough Rope")
            .input(plant_fiber(), 3)
            .output(rough_rope(), 1),
    );
    b.register_recipe(
        Recipe::new(RecipeId(102), "Fire Rough Bricks")
            .input(rough_stone(), 2)
            .output_range(rough_brick(), 2, 4),
    );
    b.register_recipe(
        Recipe::new(RecipeId(103), "Build Timber Frame")
            .input(rough_plank(), 4)
            .input(rough_rope(), 2)
            .output(timber_frame(), 1),
    );
    b.register_recipe(
        Recipe::new(RecipeId(104), "Build Cottage")
            .input(timber_frame(), 2)
            .input(rough_brick(), 10)
            .input(rough_rope(), 1)
            .free_input(hammer())
            .output(cottage(), 1),
    );
    b.build()
}

// ===========================================================================
// Cyclic catalog
// ===========================================================================

pub fn item_x() -> ItemId {
    ItemId(50)
}
pub fn item_y() -> ItemId {
    ItemId(51)
}
pub fn item_z() -> ItemId {
    ItemId(52)
}

/// X <- [1 x Y, 1 x Z], Y <- [1 x X]. Z is base.
pub fn cyclic_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_item(Item::new(item_x(), "X"));
    b.register_item(Item::new(item_y(), "Y"));
    b.register_item(Item::new(item_z(), "Z"));
    b.register_recipe(
        Recipe::new(RecipeId(50), "make X")
            .input(item_y(), 1)
            .input(item_z(), 1)
            .output(item_x(), 1),
    );
    b.register_recipe(
        Recipe::new(RecipeId(51), "make Y")
            .input(item_x(), 1)
            .output(item_y(), 1),
    );
    b.build()
}

// ===========================================================================
// Generated chains
// ===========================================================================

/// A linear chain of `depth` crafted items over one resource. Every level
/// consumes `fan` units of the level below and yields 1. Item `ItemId(0)` is
/// the resource, `ItemId(depth)` is the top.
pub fn chain_catalog(depth: u32, fan: u32) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_item(Item::new(ItemId(0), "ore").resource());
    for level in 1..=depth {
        b.register_item(Item::new(ItemId(level), format!("part_{level}")).with_tier(level));
        b.register_recipe(
            Recipe::new(RecipeId(level), format!("craft_{level}"))
                .input(ItemId(level - 1), fan)
                .output(ItemId(level), 1),
        );
    }
    b.build()
}
