//! Planner settings with defaults applied.
//!
//! Produced from the optional `planner.{ron,json,toml}` file next to the
//! catalog. A missing file yields [`PlannerConfig::default`].

use crafttree_core::catalog::Catalog;
use crafttree_core::expand::{Expander, ExpansionCache, MemoCache, NoCache};
use crafttree_core::propagate::PropagateConfig;
use std::path::Path;

use crate::loader::{DataLoadError, deserialize_file, find_data_file};
use crate::schema::PlannerData;

/// Cache handle chosen at runtime.
pub type DynCache = Box<dyn ExpansionCache + Send + Sync>;

/// Resolved planner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Memoize sub-expansions for the lifetime of an expander.
    pub memoize: bool,
    pub propagate: PropagateConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            propagate: PropagateConfig::default(),
        }
    }
}

impl From<PlannerData> for PlannerConfig {
    fn from(data: PlannerData) -> Self {
        let mut propagate = PropagateConfig::default();
        if let Some(max_passes) = data.max_passes {
            propagate.max_passes = max_passes;
        }
        Self {
            memoize: data.memoize,
            propagate,
        }
    }
}

impl PlannerConfig {
    /// An expander over `catalog` with the configured cache policy.
    pub fn expander<'a>(&self, catalog: &'a Catalog) -> Expander<'a, DynCache> {
        let cache: DynCache = if self.memoize {
            Box::new(MemoCache::new())
        } else {
            Box::new(NoCache)
        };
        Expander::with_cache(catalog, cache)
    }
}

/// Read `planner.*` from `dir`, falling back to defaults when absent.
pub fn load_planner_config(dir: &Path) -> Result<PlannerConfig, DataLoadError> {
    match find_data_file(dir, "planner")? {
        Some(path) => {
            let data: PlannerData = deserialize_file(&path)?;
            let config = PlannerConfig::from(data);
            tracing::debug!(path = %path.display(), ?config, "planner settings loaded");
            Ok(config)
        }
        None => Ok(PlannerConfig::default()),
    }
}
