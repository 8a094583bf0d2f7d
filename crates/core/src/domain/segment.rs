use std::fmt;

use serde::{Deserialize, Serialize};

/// Behavioral segment assigned to a cluster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Regular,
    HighValue,
    Occasional,
    AtRisk,
    /// Cluster index the label map does not know about.
    Unrecognized(usize),
}

impl Segment {
    pub fn from_cluster(cluster_index: usize) -> Self {
        match cluster_index {
            0 => Self::Regular,
            1 => Self::HighValue,
            2 => Self::Occasional,
            3 => Self::AtRisk,
            other => Self::Unrecognized(other),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Regular => "Regular".to_owned(),
            Self::HighValue => "High-Value".to_owned(),
            Self::Occasional => "Occasional".to_owned(),
            Self::AtRisk => "At-Risk".to_owned(),
            Self::Unrecognized(index) => format!("Cluster {index}"),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
