//! Chunk role labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional role of a chunk's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChunkRole {
    #[serde(rename = "概述", alias = "overview")]
    Overview,
    #[serde(rename = "临床表现", alias = "clinical-presentation")]
    ClinicalPresentation,
    #[serde(rename = "诊断", alias = "diagnosis")]
    Diagnosis,
    #[serde(rename = "治疗", alias = "treatment")]
    Treatment,
    #[serde(rename = "预后", alias = "prognosis")]
    Prognosis,
    #[serde(rename = "预防", alias = "prevention")]
    Prevention,
    #[serde(rename = "其他", alias = "other")]
    Other,
}

impl ChunkRole {
    /// Label written to the chunk record.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkRole::Overview => "概述",
            ChunkRole::ClinicalPresentation => "临床表现",
            ChunkRole::Diagnosis => "诊断",
            ChunkRole::Treatment => "治疗",
            ChunkRole::Prognosis => "预后",
            ChunkRole::Prevention => "预防",
            ChunkRole::Other => "其他",
        }
    }
}

impl fmt::Display for ChunkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matches_serde() {
        let json = serde_json::to_string(&ChunkRole::Diagnosis).unwrap();
        assert_eq!(json, format!("\"{}\"", ChunkRole::Diagnosis.as_str()));
    }

    #[test]
    fn test_english_alias() {
        let role: ChunkRole = serde_yaml::from_str("clinical-presentation").unwrap();
        assert_eq!(role, ChunkRole::ClinicalPresentation);
    }
}
