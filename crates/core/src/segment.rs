//! Customer segment assignment from RFM metrics.

use serde::Serialize;

use crate::artifacts::{ClusterPredictor, FeatureTransform};
use crate::domain::customer::RfmInput;
use crate::domain::segment::Segment;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SegmentAssignment {
    pub segment: Segment,
    pub label: String,
    pub cluster_index: usize,
}

impl SegmentAssignment {
    pub fn headline(&self) -> String {
        format!("{} Shopper (Cluster {})", self.label, self.cluster_index)
    }
}

/// log1p, then the frozen scaler, then the cluster model, then the label map.
pub fn classify<M, S>(input: &RfmInput, model: &M, scaler: &S) -> SegmentAssignment
where
    M: ClusterPredictor + ?Sized,
    S: FeatureTransform + ?Sized,
{
    let scaled = scaler.transform(input.log_features());
    let cluster_index = model.predict(&scaled);
    let segment = Segment::from_cluster(cluster_index);

    SegmentAssignment { label: segment.label(), segment, cluster_index }
}
