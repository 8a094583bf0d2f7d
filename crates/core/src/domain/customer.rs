use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Raw recency/frequency/monetary summary of one customer's purchase history.
///
/// Constructed per classification request through [`RfmInput::new`], which
/// rejects out-of-domain values instead of clamping them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfmInput {
    /// Days since the last purchase.
    pub recency: f64,
    /// Number of purchases.
    pub frequency: u64,
    /// Total spend in currency units.
    pub monetary: f64,
}

impl RfmInput {
    pub fn new(recency: f64, frequency: u64, monetary: f64) -> Result<Self, DomainError> {
        if !recency.is_finite() || recency < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "recency must be a finite value >= 0, got {recency}"
            )));
        }
        if frequency < 1 {
            return Err(DomainError::InvalidInput(format!(
                "frequency must be >= 1, got {frequency}"
            )));
        }
        if !monetary.is_finite() || monetary < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "monetary must be a finite value >= 0, got {monetary}"
            )));
        }

        Ok(Self { recency, frequency, monetary })
    }

    /// `log(1 + x)` of each metric in the fixed order recency, frequency, monetary.
    pub fn log_features(&self) -> [f64; 3] {
        [self.recency.ln_1p(), (self.frequency as f64).ln_1p(), self.monetary.ln_1p()]
    }
}

#[cfg(test)]
mod tests {
    use super::RfmInput;
    use crate::errors::DomainError;

    #[test]
    fn zero_recency_and_monetary_are_valid() {
        let input = RfmInput::new(0.0, 1, 0.0).expect("boundary input should be accepted");
        let features = input.log_features();

        assert_eq!(features[0], 0.0);
        assert!((features[1] - 2f64.ln()).abs() < 1e-12);
        assert_eq!(features[2], 0.0);
    }

    #[test]
    fn negative_recency_is_rejected() {
        let error = RfmInput::new(-1.0, 3, 10.0).expect_err("negative recency must fail");
        assert!(matches!(
            error,
            DomainError::InvalidInput(ref message) if message.contains("recency")
        ));
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let error = RfmInput::new(10.0, 0, 10.0).expect_err("zero frequency must fail");
        assert!(matches!(
            error,
            DomainError::InvalidInput(ref message) if message.contains("frequency")
        ));
    }

    #[test]
    fn negative_or_nan_monetary_is_rejected() {
        assert!(RfmInput::new(10.0, 2, -0.01).is_err());
        assert!(RfmInput::new(10.0, 2, f64::NAN).is_err());
        assert!(RfmInput::new(f64::INFINITY, 2, 5.0).is_err());
    }
}
