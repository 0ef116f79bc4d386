pub mod config;
pub mod loader;
pub mod schema;

#[cfg(test)]
mod test_dir;

pub use config::{PlannerConfig, load_planner_config};
pub use loader::{
    DataLoadError, Format, LoadedCatalog, load_catalog, load_planner_data, parse_catalog,
};
