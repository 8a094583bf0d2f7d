//! Similar-product ranking over the precomputed similarity matrix.

use serde::Serialize;

use crate::artifacts::SimilarityMatrix;
use crate::catalog::ProductCatalog;
use crate::domain::product::ProductId;
use crate::errors::DomainError;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedProduct {
    pub product_id: ProductId,
    pub display_name: String,
    pub score: f64,
}

/// Up to `top_n` products most similar to `product_id`, best first.
///
/// Scores are read down the product's column of the matrix. The queried
/// product is filtered out by id, so a matrix whose diagonal is not the
/// column maximum still never recommends a product to itself. Exact score
/// ties keep matrix order.
pub fn ranked_neighbors(
    product_id: &ProductId,
    similarity: &SimilarityMatrix,
    catalog: &ProductCatalog,
    top_n: usize,
) -> Result<Vec<RankedProduct>, DomainError> {
    let column = similarity
        .column(product_id)
        .ok_or_else(|| DomainError::NotFound(product_id.to_string()))?;

    if top_n == 0 {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<(&ProductId, f64)> =
        column.filter(|(candidate, _)| *candidate != product_id).collect();
    candidates.sort_by(|left, right| right.1.total_cmp(&left.1));

    Ok(candidates
        .into_iter()
        .take(top_n)
        .map(|(candidate, score)| RankedProduct {
            product_id: candidate.clone(),
            display_name: catalog
                .display_name(candidate)
                .map(str::to_owned)
                .unwrap_or_else(|| candidate.to_string()),
            score,
        })
        .collect())
}

pub fn rank_similar(
    product_id: &ProductId,
    similarity: &SimilarityMatrix,
    catalog: &ProductCatalog,
    top_n: usize,
) -> Result<Vec<String>, DomainError> {
    Ok(ranked_neighbors(product_id, similarity, catalog, top_n)?
        .into_iter()
        .map(|ranked| ranked.display_name)
        .collect())
}
