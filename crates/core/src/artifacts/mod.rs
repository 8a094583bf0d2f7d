//! Read-only artifacts produced offline and consumed at inference time.
//!
//! Artifacts are grouped by the feature that needs them. Each group loads at
//! most once per [`ArtifactStore`], on first access; the outcome, including a
//! failure, is cached so a broken file does not cost I/O on every request.
//! A failed group only degrades its own feature.

mod model;
mod scaler;
mod similarity;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::ProductCatalog;
use crate::config::ArtifactsConfig;
use crate::resolver::NameIndex;

pub use model::KMeansModel;
pub use scaler::StandardScaler;
pub use similarity::SimilarityMatrix;

/// Number of behavioral features fed to the scaler and cluster model.
pub const FEATURE_DIM: usize = 3;

pub trait FeatureTransform {
    fn transform(&self, features: [f64; FEATURE_DIM]) -> [f64; FEATURE_DIM];
}

pub trait ClusterPredictor {
    fn predict(&self, features: &[f64; FEATURE_DIM]) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Segmentation,
    Recommendation,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segmentation => f.write_str("segmentation"),
            Self::Recommendation => f.write_str("recommendation"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArtifactLoadFailure {
    #[error("could not read artifact `{path}`: {message}")]
    Read { path: PathBuf, message: String },
    #[error("could not parse artifact `{path}`: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("artifact `{path}` is invalid: {message}")]
    Invalid { path: PathBuf, message: String },
}

impl ArtifactLoadFailure {
    pub(crate) fn parse(path: &Path, error: serde_json::Error) -> Self {
        Self::Parse { path: path.to_path_buf(), message: error.to_string() }
    }

    pub(crate) fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self::Invalid { path: path.to_path_buf(), message: message.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub cluster_model: PathBuf,
    pub scaler: PathBuf,
    pub similarity: PathBuf,
    pub product_names: PathBuf,
}

impl ArtifactPaths {
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        let resolve = |file: &Path| {
            if file.is_absolute() {
                file.to_path_buf()
            } else {
                config.dir.join(file)
            }
        };

        Self {
            cluster_model: resolve(&config.cluster_model),
            scaler: resolve(&config.scaler),
            similarity: resolve(&config.similarity),
            product_names: resolve(&config.product_names),
        }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let config = ArtifactsConfig { dir: dir.as_ref().to_path_buf(), ..Default::default() };
        Self::from_config(&config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationArtifacts {
    pub model: KMeansModel,
    pub scaler: StandardScaler,
}

impl SegmentationArtifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadFailure> {
        let model = read_json::<KMeansModel>(&paths.cluster_model)?.checked(&paths.cluster_model)?;
        let scaler = read_json::<StandardScaler>(&paths.scaler)?.checked(&paths.scaler)?;
        Ok(Self { model, scaler })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationArtifacts {
    pub similarity: SimilarityMatrix,
    pub catalog: ProductCatalog,
    pub names: NameIndex,
}

impl RecommendationArtifacts {
    pub fn new(similarity: SimilarityMatrix, catalog: ProductCatalog) -> Self {
        let names = NameIndex::build(&catalog);
        Self { similarity, catalog, names }
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadFailure> {
        let raw = read_raw(&paths.similarity)?;
        let similarity = SimilarityMatrix::from_json(&paths.similarity, &raw)?;
        let raw = read_raw(&paths.product_names)?;
        let catalog = ProductCatalog::from_json(&paths.product_names, &raw)?;
        Ok(Self::new(similarity, catalog))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub feature: Feature,
    pub ready: bool,
    pub detail: String,
}

/// Owns every artifact for the lifetime of the process.
#[derive(Debug)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
    segmentation: OnceLock<Result<SegmentationArtifacts, ArtifactLoadFailure>>,
    recommendation: OnceLock<Result<RecommendationArtifacts, ArtifactLoadFailure>>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths, segmentation: OnceLock::new(), recommendation: OnceLock::new() }
    }

    /// Store whose artifacts are already in memory.
    pub fn preloaded(
        segmentation: Result<SegmentationArtifacts, ArtifactLoadFailure>,
        recommendation: Result<RecommendationArtifacts, ArtifactLoadFailure>,
    ) -> Self {
        let store = Self::new(ArtifactPaths::in_dir("."));
        let _ = store.segmentation.set(segmentation);
        let _ = store.recommendation.set(recommendation);
        store
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn segmentation(&self) -> Result<&SegmentationArtifacts, ArtifactLoadFailure> {
        self.segmentation
            .get_or_init(|| {
                log_outcome(Feature::Segmentation, SegmentationArtifacts::load(&self.paths))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn recommendation(&self) -> Result<&RecommendationArtifacts, ArtifactLoadFailure> {
        self.recommendation
            .get_or_init(|| {
                log_outcome(Feature::Recommendation, RecommendationArtifacts::load(&self.paths))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Drops cached artifacts (and cached failures) so the next access reads the files again.
    pub fn reload(&mut self) {
        self.segmentation = OnceLock::new();
        self.recommendation = OnceLock::new();
        info!(
            event_name = "artifacts.reload",
            correlation_id = "reload",
            "artifact cache cleared"
        );
    }

    pub fn status(&self) -> Vec<FeatureStatus> {
        let segmentation = match self.segmentation() {
            Ok(artifacts) => FeatureStatus {
                feature: Feature::Segmentation,
                ready: true,
                detail: format!("{} clusters loaded", artifacts.model.n_clusters()),
            },
            Err(error) => FeatureStatus {
                feature: Feature::Segmentation,
                ready: false,
                detail: error.to_string(),
            },
        };
        let recommendation = match self.recommendation() {
            Ok(artifacts) => FeatureStatus {
                feature: Feature::Recommendation,
                ready: true,
                detail: format!(
                    "{} products in similarity index, {} catalog names",
                    artifacts.similarity.len(),
                    artifacts.catalog.len()
                ),
            },
            Err(error) => FeatureStatus {
                feature: Feature::Recommendation,
                ready: false,
                detail: error.to_string(),
            },
        };

        vec![segmentation, recommendation]
    }
}

fn log_outcome<T>(
    feature: Feature,
    outcome: Result<T, ArtifactLoadFailure>,
) -> Result<T, ArtifactLoadFailure> {
    match &outcome {
        Ok(_) => info!(
            event_name = "artifacts.loaded",
            correlation_id = "artifacts",
            feature = %feature,
            "artifacts loaded"
        ),
        Err(error) => warn!(
            event_name = "artifacts.load_failed",
            correlation_id = "artifacts",
            feature = %feature,
            error = %error,
            "artifacts unavailable, feature degraded"
        ),
    }
    outcome
}

fn read_raw(path: &Path) -> Result<String, ArtifactLoadFailure> {
    fs::read_to_string(path).map_err(|error| ArtifactLoadFailure::Read {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadFailure> {
    let raw = read_raw(path)?;
    serde_json::from_str(&raw).map_err(|error| ArtifactLoadFailure::parse(path, error))
}
