//! Crafting tree example: materialize a tree, then edit it and re-propagate.
//!
//! Builds a catalog in code, expands an Iron Gate into a tree, prints the
//! per-node quantities, swaps in an alternative smelting recipe, and finally
//! marks a crafted item as bought so it is treated as a resource.
//!
//! Run with: `cargo run -p crafttree-examples --example crafting_tree`

use crafttree_core::catalog::*;
use crafttree_core::id::{ItemId, RecipeId};
use crafttree_core::propagate::PropagateConfig;
use crafttree_core::tree::CraftTree;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ORE: ItemId = ItemId(1);
const COAL: ItemId = ItemId(2);
const INGOT: ItemId = ItemId(10);
const BAR: ItemId = ItemId(11);
const HINGE: ItemId = ItemId(12);
const GATE: ItemId = ItemId(20);

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut builder = Catalog::builder();
    builder.register_item(Item::new(ORE, "Iron Ore").with_tag("Mining").resource());
    builder.register_item(Item::new(COAL, "Coal").with_tag("Mining").resource());
    builder.register_item(Item::new(INGOT, "Iron Ingot").with_tier(1).with_tag("Smelting"));
    builder.register_item(Item::new(BAR, "Iron Bar").with_tier(1).with_tag("Smithing"));
    builder.register_item(Item::new(HINGE, "Hinge").with_tier(1).with_tag("Smithing"));
    builder.register_item(Item::new(GATE, "Iron Gate").with_tier(2).with_tag("Smithing"));

    builder.register_recipe(
        Recipe::new(RecipeId(1), "Smelt Iron")
            .input(ORE, 2)
            .input(COAL, 1)
            .output(INGOT, 1),
    );
    // Registered second, so only reachable via `producers_of`.
    builder.register_recipe(
        Recipe::new(RecipeId(2), "Blast Smelt Iron")
            .input(ORE, 3)
            .input(COAL, 2)
            .output(INGOT, 2),
    );
    builder.register_recipe(
        Recipe::new(RecipeId(3), "Draw Bars")
            .input(INGOT, 1)
            .output(BAR, 2),
    );
    builder.register_recipe(
        Recipe::new(RecipeId(4), "Forge Hinges")
            .input(INGOT, 1)
            .output_range(HINGE, 2, 3),
    );
    builder.register_recipe(
        Recipe::new(RecipeId(5), "Assemble Gate")
            .input(BAR, 6)
            .input(HINGE, 2)
            .output(GATE, 1),
    );
    let catalog = builder.build();

    let mut tree = CraftTree::from_catalog(&catalog, GATE, 2);
    print_tree("Two gates", &catalog, &tree);

    if let Some(ingot) = tree.find_by_item(INGOT) {
        let alternative = catalog.producers_of(INGOT).nth(1).cloned();
        tree.set_recipe(ingot, alternative);
        tree.propagate(GATE, 2, &PropagateConfig::default());
        print_tree("With blast smelting", &catalog, &tree);
    }

    if let Some(bar) = tree.find_by_item(BAR) {
        tree.set_resource(bar, true);
        tree.propagate(GATE, 2, &PropagateConfig::default());
        print_tree("Buying bars instead", &catalog, &tree);
    }
}

fn print_tree(title: &str, catalog: &Catalog, tree: &CraftTree) {
    println!("=== {title} ===");
    for (id, node) in tree.nodes() {
        let name = catalog
            .item(node.item)
            .map(|i| i.name.as_str())
            .unwrap_or("?");
        let quantity = node
            .quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".to_string());
        let executions = node
            .executions
            .map(|e| format!(" ({e} crafts)"))
            .unwrap_or_default();
        let materials = tree.materials_of(id).count();
        println!("  {name:<12} {quantity:>4}{executions}  [{materials} materials]");
    }
    println!("  total crafts: {}\n", tree.total_executions());
}
