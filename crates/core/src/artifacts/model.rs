//! Nearest-centroid cluster model fitted offline (k-means).

use serde::{Deserialize, Serialize};

use super::{ArtifactLoadFailure, ClusterPredictor, FEATURE_DIM};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeansModel {
    #[serde(default)]
    pub version: Option<String>,
    pub centroids: Vec<[f64; FEATURE_DIM]>,
}

impl KMeansModel {
    pub fn new(centroids: Vec<[f64; FEATURE_DIM]>) -> Result<Self, String> {
        let model = Self { version: None, centroids };
        model.validate()?;
        Ok(model)
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.centroids.is_empty() {
            return Err("cluster model has no centroids".to_owned());
        }
        if let Some(index) =
            self.centroids.iter().position(|centroid| centroid.iter().any(|v| !v.is_finite()))
        {
            return Err(format!("centroid {index} contains a non-finite coordinate"));
        }
        Ok(())
    }

    pub(crate) fn checked(self, path: &std::path::Path) -> Result<Self, ArtifactLoadFailure> {
        self.validate().map_err(|message| ArtifactLoadFailure::invalid(path, message))?;
        Ok(self)
    }
}

impl ClusterPredictor for KMeansModel {
    /// Index of the closest centroid by squared Euclidean distance; ties go to the lower index.
    fn predict(&self, features: &[f64; FEATURE_DIM]) -> usize {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;

        for (index, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 =
                centroid.iter().zip(features.iter()).map(|(c, x)| (c - x) * (c - x)).sum();
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }

        best_index
    }
}

#[cfg(test)]
mod tests {
    use super::KMeansModel;
    use crate::artifacts::ClusterPredictor;

    #[test]
    fn predicts_nearest_centroid() {
        let model = KMeansModel::new(vec![[0.0, 0.0, 0.0], [5.0, 5.0, 5.0], [-3.0, 0.0, 1.0]])
            .expect("valid model");

        assert_eq!(model.predict(&[0.2, -0.1, 0.3]), 0);
        assert_eq!(model.predict(&[4.0, 6.0, 5.5]), 1);
        assert_eq!(model.predict(&[-2.5, 0.5, 1.0]), 2);
    }

    #[test]
    fn equidistant_point_goes_to_lowest_index() {
        let model =
            KMeansModel::new(vec![[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]]).expect("valid model");
        assert_eq!(model.predict(&[0.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn rejects_empty_or_non_finite_centroids() {
        assert!(KMeansModel::new(Vec::new()).is_err());
        assert!(KMeansModel::new(vec![[0.0, f64::NAN, 0.0]]).is_err());
    }
}
