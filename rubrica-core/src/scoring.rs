// Assessment scoring
//
// Scores a school's self-assessment against a parsed rubric: every response
// places one action dimension at a maturity level, and scores roll up from
// dimensions to actions, objectives and the whole área.

use crate::error::{Result, RubricError};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One answered dimension, as stored in a responses JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionResponse {
    pub accion_id: String,
    pub dimension: SectionType,
    pub level: MaturityLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponses {
    pub area: String,
    #[serde(default)]
    pub responses: Vec<DimensionResponse>,
}

impl AssessmentResponses {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read responses file {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse responses file {path}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub dimension: SectionType,
    pub level: MaturityLevel,
    pub score: u8,
    /// Steps still missing to reach the target level, never negative
    pub gap: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionScore {
    pub accion_id: String,
    pub description: String,
    pub dimensions: Vec<DimensionScore>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveScore {
    pub number: u32,
    pub title: String,
    pub actions: Vec<ActionScore>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentScore {
    pub area: String,
    pub target: MaturityLevel,
    pub objectives: Vec<ObjectiveScore>,
    pub score: Option<f64>,
    pub answered: usize,
    pub expected: usize,
    /// answered / expected, in 0..=1
    pub completion: f64,
    pub total_gap: u32,
}

impl AssessmentScore {
    /// Dimensions below target, largest gap first, ties in document order
    pub fn gaps(&self) -> Vec<(&str, &DimensionScore)> {
        let mut gaps: Vec<_> = self
            .objectives
            .iter()
            .flat_map(|o| o.actions.iter())
            .flat_map(|a| a.dimensions.iter().map(move |d| (a.accion_id.as_str(), d)))
            .filter(|(_, d)| d.gap > 0)
            .collect();
        gaps.sort_by(|a, b| b.1.gap.cmp(&a.1.gap));
        gaps
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Score responses against a parsed área. All responses are checked before
/// anything is scored; the first invalid one is returned as an error.
pub fn score_assessment(
    parsed: &ParsedArea,
    responses: &AssessmentResponses,
    target: MaturityLevel,
) -> Result<AssessmentScore> {
    if responses.area != parsed.area {
        return Err(RubricError::ResponseAreaMismatch {
            expected: parsed.area.clone(),
            found: responses.area.clone(),
        });
    }

    let mut answers: HashMap<(&str, SectionType), MaturityLevel> = HashMap::new();
    for response in &responses.responses {
        let accion_id = response.accion_id.as_str();
        if parsed.find_action(accion_id).is_none() {
            return Err(RubricError::UnknownResponseTarget {
                accion_id: response.accion_id.clone(),
            });
        }
        if !response.dimension.is_dimension() {
            return Err(RubricError::NotADimension {
                accion_id: response.accion_id.clone(),
                section_type: response.dimension,
            });
        }
        if answers
            .insert((accion_id, response.dimension), response.level)
            .is_some()
        {
            return Err(RubricError::DuplicateResponse {
                accion_id: response.accion_id.clone(),
                section_type: response.dimension,
            });
        }
    }

    let objectives: Vec<ObjectiveScore> = parsed
        .objectives
        .iter()
        .map(|objective| {
            let actions: Vec<ActionScore> = objective
                .actions
                .iter()
                .map(|action| score_action(action, &answers, target))
                .collect();
            ObjectiveScore {
                number: objective.number,
                title: objective.title.clone(),
                score: mean(actions.iter().filter_map(|a| a.score)),
                actions,
            }
        })
        .collect();

    let expected = parsed.action_count() * SectionType::DIMENSIONS.len();
    let answered = answers.len();
    let total_gap = objectives
        .iter()
        .flat_map(|o| o.actions.iter())
        .flat_map(|a| a.dimensions.iter())
        .map(|d| d.gap as u32)
        .sum();

    log::info!(
        "Scored área '{}': {answered}/{expected} dimensions answered against '{target}'",
        parsed.area
    );

    Ok(AssessmentScore {
        area: parsed.area.clone(),
        target,
        score: mean(objectives.iter().filter_map(|o| o.score)),
        objectives,
        answered,
        expected,
        completion: if expected == 0 {
            0.0
        } else {
            answered as f64 / expected as f64
        },
        total_gap,
    })
}

fn score_action(
    action: &Action,
    answers: &HashMap<(&str, SectionType), MaturityLevel>,
    target: MaturityLevel,
) -> ActionScore {
    let dimensions: Vec<DimensionScore> = SectionType::DIMENSIONS
        .into_iter()
        .filter_map(|dimension| {
            let level = *answers.get(&(action.id.as_str(), dimension))?;
            Some(DimensionScore {
                dimension,
                level,
                score: level.score(),
                gap: target.score().saturating_sub(level.score()),
            })
        })
        .collect();

    ActionScore {
        accion_id: action.id.clone(),
        description: action.description.clone(),
        score: mean(dimensions.iter().map(|d| d.score as f64)),
        dimensions,
    }
}
