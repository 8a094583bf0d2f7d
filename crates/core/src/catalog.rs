use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::artifacts::ArtifactLoadFailure;
use crate::domain::product::{CatalogEntry, ProductId};

/// Product id to display name table.
///
/// Iteration order is ascending product id, which makes "first match" lookups
/// deterministic for a given snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    names: BTreeMap<ProductId, String>,
}

impl ProductCatalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let names =
            entries.into_iter().map(|entry| (entry.product_id, entry.display_name)).collect();
        Self { names }
    }

    pub(crate) fn from_json(path: &Path, raw: &str) -> Result<Self, ArtifactLoadFailure> {
        let names: BTreeMap<ProductId, String> =
            serde_json::from_str(raw).map_err(|error| ArtifactLoadFailure::parse(path, error))?;
        Ok(Self { names })
    }

    pub fn display_name(&self, product_id: &ProductId) -> Option<&str> {
        self.names.get(product_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &str)> {
        self.names.iter().map(|(id, name)| (id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Distinct display names, sorted.
    pub fn unique_names(&self) -> Vec<String> {
        self.names.values().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }
}
