//! Shopping list example: load a catalog and expand a construction project
//! into base materials.
//!
//! With no argument the bundled `data/homestead.toml` document is used. Pass a
//! directory holding `items.*`, `recipes.*` and an optional `planner.*` to plan
//! against your own data; one unit of a highest-tier item is planned.
//!
//! Run with: `RUST_LOG=debug cargo run -p crafttree-examples --example shopping_list`

use crafttree_core::catalog::Catalog;
use crafttree_core::id::ItemId;
use crafttree_data::{DataLoadError, Format, PlannerConfig, load_planner_data, parse_catalog};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<(), DataLoadError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (catalog, config, project) = match std::env::args().nth(1) {
        Some(dir) => {
            let loaded = load_planner_data(Path::new(&dir))?;
            let top = loaded
                .catalog
                .items()
                .iter()
                .max_by_key(|item| item.tier)
                .map(|item| vec![(item.id, 1)])
                .unwrap_or_default();
            (loaded.catalog, loaded.config, top)
        }
        None => {
            let text = include_str!("../data/homestead.toml");
            let catalog = parse_catalog(text, Format::Toml)?;
            // Two workbenches and a well.
            let project = vec![(ItemId(20), 2), (ItemId(21), 1)];
            (catalog, PlannerConfig::default(), project)
        }
    };

    tracing::info!(
        items = catalog.item_count(),
        recipes = catalog.recipe_count(),
        "catalog ready"
    );

    println!("Project:");
    for &(item, quantity) in &project {
        println!("  {quantity} x {}", name_of(&catalog, item));
    }

    let expander = config.expander(&catalog);
    let list = expander.expand_all(&project);

    println!("\nBase materials:");
    for (&item, &quantity) in &list.totals {
        println!("  {quantity:>5} x {}", name_of(&catalog, item));
    }
    println!("\nCrafting steps: {}", list.steps);

    Ok(())
}

fn name_of(catalog: &Catalog, item: ItemId) -> String {
    catalog
        .item(item)
        .map(|i| i.name.clone())
        .unwrap_or_else(|| item.to_string())
}
