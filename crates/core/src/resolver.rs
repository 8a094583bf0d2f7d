//! Free-form product name resolution.

use std::collections::HashMap;

use crate::catalog::ProductCatalog;
use crate::domain::product::ProductId;

/// Trims, lower-cases and drops every character that is not alphanumeric or `_`.
///
/// `"Red Mug!"` and `"red-mug"` both become `"redmug"`.
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Normalized display name to product id, built once per catalog load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameIndex {
    by_name: HashMap<String, ProductId>,
}

impl NameIndex {
    pub fn build(catalog: &ProductCatalog) -> Self {
        let mut by_name = HashMap::with_capacity(catalog.len());
        for (product_id, display_name) in catalog.iter() {
            let key = normalize(display_name);
            if key.is_empty() {
                continue;
            }
            // first entry in catalog order wins on collisions
            by_name.entry(key).or_insert_with(|| product_id.clone());
        }
        Self { by_name }
    }

    pub fn resolve(&self, query: &str) -> Option<&ProductId> {
        let key = normalize(query);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
