pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;
pub mod resolver;
pub mod segment;
pub mod service;

pub use artifacts::{
    ArtifactLoadFailure, ArtifactPaths, ArtifactStore, Feature, FeatureStatus, KMeansModel,
    SimilarityMatrix, StandardScaler,
};
pub use catalog::ProductCatalog;
pub use domain::customer::RfmInput;
pub use domain::product::{CatalogEntry, ProductId};
pub use domain::segment::Segment;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{rank_similar, RankedProduct, DEFAULT_TOP_N};
pub use resolver::{normalize, NameIndex};
pub use segment::{classify, SegmentAssignment};
pub use service::InsightService;
