//! Plan catalog configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where the plan catalog comes from.
///
/// Without a path the built-in catalog is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlansConfig {
    /// YAML file listing the plans on sale
    pub catalog_path: Option<PathBuf>,
}

impl PlansConfig {
    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog_path.as_deref()
    }
}
