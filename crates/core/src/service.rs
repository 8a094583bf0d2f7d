//! Entry points consumed by the CLI and HTTP surfaces.

use tracing::debug;

use crate::artifacts::{ArtifactLoadFailure, ArtifactStore, Feature, FeatureStatus};
use crate::config::RecommendConfig;
use crate::domain::customer::RfmInput;
use crate::errors::DomainError;
use crate::recommend::{ranked_neighbors, RankedProduct};
use crate::segment::{classify, SegmentAssignment};

#[derive(Debug)]
pub struct InsightService {
    store: ArtifactStore,
    recommend: RecommendConfig,
}

impl InsightService {
    pub fn new(store: ArtifactStore, recommend: RecommendConfig) -> Self {
        Self { store, recommend }
    }

    pub fn default_top_n(&self) -> usize {
        self.recommend.default_top_n
    }

    pub fn max_top_n(&self) -> usize {
        self.recommend.max_top_n
    }

    pub fn classify(
        &self,
        recency: f64,
        frequency: u64,
        monetary: f64,
    ) -> Result<SegmentAssignment, DomainError> {
        let input = RfmInput::new(recency, frequency, monetary)?;
        let artifacts = self.store.segmentation().map_err(unavailable(Feature::Segmentation))?;

        let assignment = classify(&input, &artifacts.model, &artifacts.scaler);
        debug!(
            event_name = "segment.classified",
            cluster_index = assignment.cluster_index,
            label = %assignment.label,
            "customer segment assigned"
        );
        Ok(assignment)
    }

    /// Display names of the products most similar to `query`.
    pub fn recommend(&self, query: &str, top_n: usize) -> Result<Vec<String>, DomainError> {
        Ok(self
            .recommend_detailed(query, top_n)?
            .into_iter()
            .map(|ranked| ranked.display_name)
            .collect())
    }

    pub fn recommend_detailed(
        &self,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<RankedProduct>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name must not be blank".to_owned()));
        }

        let artifacts =
            self.store.recommendation().map_err(unavailable(Feature::Recommendation))?;
        let product_id = artifacts
            .names
            .resolve(query)
            .ok_or_else(|| DomainError::NotFound(query.trim().to_owned()))?;

        let ranked =
            ranked_neighbors(product_id, &artifacts.similarity, &artifacts.catalog, top_n)?;
        debug!(
            event_name = "recommend.ranked",
            product_id = %product_id,
            returned = ranked.len(),
            "similar products ranked"
        );
        Ok(ranked)
    }

    /// Sorted, distinct display names for a product picker.
    pub fn product_names(&self) -> Result<Vec<String>, DomainError> {
        let artifacts =
            self.store.recommendation().map_err(unavailable(Feature::Recommendation))?;
        Ok(artifacts.catalog.unique_names())
    }

    pub fn availability(&self) -> Vec<FeatureStatus> {
        self.store.status()
    }
}

fn unavailable(feature: Feature) -> impl Fn(ArtifactLoadFailure) -> DomainError {
    move |error| DomainError::ModelUnavailable { feature, reason: error.to_string() }
}

#[cfg(test)]
mod tests {
    use super::InsightService;
    use crate::artifacts::{
        ArtifactLoadFailure, ArtifactStore, Feature, KMeansModel, RecommendationArtifacts,
        SegmentationArtifacts, SimilarityMatrix, StandardScaler,
    };
    use crate::catalog::ProductCatalog;
    use crate::config::RecommendConfig;
    use crate::domain::product::{CatalogEntry, ProductId};
    use crate::errors::DomainError;

    fn segmentation() -> SegmentationArtifacts {
        SegmentationArtifacts {
            model: KMeansModel::new(vec![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]]).expect("valid model"),
            scaler: StandardScaler::new([0.0; 3], [1.0; 3]).expect("valid scaler"),
        }
    }

    fn recommendation() -> RecommendationArtifacts {
        let ids = ["A", "B", "C"].iter().map(|id| ProductId::from(*id)).collect();
        let similarity = SimilarityMatrix::new(
            ids,
            vec![vec![1.0, 0.9, 0.2], vec![0.9, 1.0, 0.3], vec![0.2, 0.3, 1.0]],
        )
        .expect("valid matrix");
        let catalog = ProductCatalog::new(
            [("A", "Red Mug"), ("B", "Blue Mug"), ("C", "Red Plate")].iter().map(|(id, name)| {
                CatalogEntry { product_id: ProductId::from(*id), display_name: (*name).to_owned() }
            }),
        );
        RecommendationArtifacts::new(similarity, catalog)
    }

    fn missing(path: &str) -> ArtifactLoadFailure {
        ArtifactLoadFailure::Read { path: path.into(), message: "No such file".to_owned() }
    }

    fn service(
        segmentation: Result<SegmentationArtifacts, ArtifactLoadFailure>,
        recommendation: Result<RecommendationArtifacts, ArtifactLoadFailure>,
    ) -> InsightService {
        InsightService::new(
            ArtifactStore::preloaded(segmentation, recommendation),
            RecommendConfig::default(),
        )
    }

    #[test]
    fn recommends_by_free_form_name() {
        let service = service(Ok(segmentation()), Ok(recommendation()));

        assert_eq!(
            service.recommend("Red Mug", 2).expect("known product"),
            vec!["Blue Mug".to_owned(), "Red Plate".to_owned()]
        );
        assert_eq!(
            service.recommend("red-mug!!", 2).expect("known product"),
            service.recommend("Red Mug", 2).expect("known product")
        );
    }

    #[test]
    fn unknown_name_is_not_found_and_blank_name_is_invalid() {
        let service = service(Ok(segmentation()), Ok(recommendation()));

        assert_eq!(
            service.recommend("Green Lamp", 5),
            Err(DomainError::NotFound("Green Lamp".to_owned()))
        );
        assert!(matches!(service.recommend("   ", 5), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn classify_validates_before_touching_artifacts() {
        let service = service(Err(missing("kmeans_model.json")), Ok(recommendation()));

        assert!(matches!(service.classify(-1.0, 1, 0.0), Err(DomainError::InvalidInput(_))));
        assert!(matches!(
            service.classify(1.0, 1, 0.0),
            Err(DomainError::ModelUnavailable { feature: Feature::Segmentation, .. })
        ));
    }

    #[test]
    fn degraded_segmentation_keeps_recommendation_usable() {
        let service = service(Err(missing("scaler.json")), Ok(recommendation()));

        assert!(service.recommend("Blue Mug", 1).is_ok());
        assert_eq!(
            service.product_names().expect("catalog loaded"),
            vec!["Blue Mug".to_owned(), "Red Mug".to_owned(), "Red Plate".to_owned()]
        );

        let status = service.availability();
        assert_eq!(status.iter().filter(|status| status.ready).count(), 1);
    }

    #[test]
    fn degraded_recommendation_keeps_classification_usable() {
        let service = service(Ok(segmentation()), Err(missing("product_similarity.json")));

        let assignment = service.classify(0.0, 1, 0.0).expect("boundary input classifies");
        assert_eq!(assignment.cluster_index, 0);
        assert!(matches!(
            service.recommend("Red Mug", 5),
            Err(DomainError::ModelUnavailable { feature: Feature::Recommendation, .. })
        ));
    }
}
