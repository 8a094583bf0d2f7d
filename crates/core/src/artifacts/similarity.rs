//! Precomputed product-by-product similarity table.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ArtifactLoadFailure;
use crate::domain::product::ProductId;

#[derive(Debug, Deserialize)]
struct SimilarityFile {
    product_ids: Vec<ProductId>,
    scores: Vec<Vec<f64>>,
}

/// Square similarity table indexed by product id on both axes.
///
/// `scores[i][j]` is the similarity of product `i` to product `j`. Neighbors of
/// a product are read down its column, in the order of `product_ids`; ranking
/// relies on that order to break exact ties.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMatrix {
    product_ids: Vec<ProductId>,
    positions: HashMap<ProductId, usize>,
    scores: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn new(product_ids: Vec<ProductId>, scores: Vec<Vec<f64>>) -> Result<Self, String> {
        let size = product_ids.len();
        if scores.len() != size {
            return Err(format!("expected {size} rows, found {}", scores.len()));
        }
        if let Some(row) = scores.iter().position(|row| row.len() != size) {
            return Err(format!("row {row} has {} columns, expected {size}", scores[row].len()));
        }
        if scores.iter().flatten().any(|value| value.is_nan()) {
            return Err("similarity scores must not contain NaN".to_owned());
        }

        let mut positions = HashMap::with_capacity(size);
        for (index, product_id) in product_ids.iter().enumerate() {
            if positions.insert(product_id.clone(), index).is_some() {
                return Err(format!("duplicate product id `{product_id}` in similarity index"));
            }
        }

        Ok(Self { product_ids, positions, scores })
    }

    pub(crate) fn from_json(path: &Path, raw: &str) -> Result<Self, ArtifactLoadFailure> {
        let file: SimilarityFile =
            serde_json::from_str(raw).map_err(|error| ArtifactLoadFailure::parse(path, error))?;
        Self::new(file.product_ids, file.scores)
            .map_err(|message| ArtifactLoadFailure::invalid(path, message))
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    /// Similarity of every product to `product_id`, in index order.
    pub fn column(
        &self,
        product_id: &ProductId,
    ) -> Option<impl Iterator<Item = (&ProductId, f64)> + '_> {
        let position = *self.positions.get(product_id)?;
        Some(self.product_ids.iter().zip(self.scores.iter().map(move |row| row[position])))
    }
}
