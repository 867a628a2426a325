use crate::types::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Structural profile of a parsed área. Ordered maps keep the JSON stable
/// across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AreaProfile {
    pub area: String,
    pub schema_version: String,
    /// SHA-256 of the markdown the tree was parsed from
    pub source_hash: String,
    pub total_objectives: usize,
    pub total_actions: usize,
    pub total_sections: usize,
    pub total_questions: usize,
    pub actions_per_objective: BTreeMap<u32, usize>,
    pub questions_per_section_type: BTreeMap<SectionType, usize>,
    pub descriptor_words: DescriptorStats,
}

/// Word counts over every maturity level descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorStats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl DescriptorStats {
    fn from_counts(counts: &[usize]) -> Self {
        if counts.is_empty() {
            return Self::default();
        }
        let total: usize = counts.iter().sum();
        Self {
            count: counts.len(),
            min: counts.iter().copied().min().unwrap_or_default(),
            max: counts.iter().copied().max().unwrap_or_default(),
            mean: total as f64 / counts.len() as f64,
        }
    }
}

impl AreaProfile {
    pub fn compute(parsed: &ParsedArea, source: &str) -> Self {
        let actions_per_objective = parsed
            .objectives
            .iter()
            .map(|o| (o.number, o.actions.len()))
            .collect();

        let mut questions_per_section_type: BTreeMap<SectionType, usize> =
            SectionType::ALL.into_iter().map(|t| (t, 0)).collect();
        let mut descriptor_words = Vec::new();

        for section in parsed.actions().flat_map(|a| a.sections.iter()) {
            *questions_per_section_type
                .entry(section.section_type)
                .or_default() += section.questions.len();

            for level in section.levels.iter().flatten() {
                descriptor_words.push(level.descriptor.split_whitespace().count());
            }
        }

        Self {
            area: parsed.area.clone(),
            schema_version: SCHEMA_VERSION.to_string(),
            source_hash: calculate_source_hash(source),
            total_objectives: parsed.objectives.len(),
            total_actions: parsed.action_count(),
            total_sections: parsed.total_sections,
            total_questions: questions_per_section_type.values().sum(),
            actions_per_objective,
            questions_per_section_type,
            descriptor_words: DescriptorStats::from_counts(&descriptor_words),
        }
    }
}

/// Fingerprint of a source document, hex encoded
pub fn calculate_source_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
