//! Frozen standard scaler: `(x - mean) / scale` per feature.

use serde::{Deserialize, Serialize};

use super::{ArtifactLoadFailure, FeatureTransform, FEATURE_DIM};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_DIM],
    pub scale: [f64; FEATURE_DIM],
}

impl StandardScaler {
    pub fn new(mean: [f64; FEATURE_DIM], scale: [f64; FEATURE_DIM]) -> Result<Self, String> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.mean.iter().chain(self.scale.iter()).any(|value| !value.is_finite()) {
            return Err("scaler mean and scale must be finite".to_owned());
        }
        if self.scale.iter().any(|value| *value < 0.0) {
            return Err("scaler scale must be non-negative".to_owned());
        }
        Ok(())
    }

    pub(crate) fn checked(self, path: &std::path::Path) -> Result<Self, ArtifactLoadFailure> {
        self.validate().map_err(|message| ArtifactLoadFailure::invalid(path, message))?;
        Ok(self)
    }
}

impl FeatureTransform for StandardScaler {
    fn transform(&self, features: [f64; FEATURE_DIM]) -> [f64; FEATURE_DIM] {
        let mut scaled = [0.0; FEATURE_DIM];
        for (index, value) in features.iter().enumerate() {
            // constant feature at fit time
            let scale = if self.scale[index] == 0.0 { 1.0 } else { self.scale[index] };
            scaled[index] = (value - self.mean[index]) / scale;
        }
        scaled
    }
}
