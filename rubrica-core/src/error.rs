use crate::rules::validation::ValidationIssue;
use crate::types::SectionType;
use thiserror::Error;

/// Errors raised while parsing, validating or scoring a rubric.
/// Parsing never returns a partial tree: the first violation aborts.
#[derive(Debug, Error)]
pub enum RubricError {
    #[error("Unknown área: '{area}' (known areas: {known})")]
    UnknownArea { area: String, known: String },

    #[error("line {line}: action heading appears before any objective")]
    ActionOutsideObjective { line: usize },

    #[error("line {line}: heading '{heading}' declares a number that cannot be read")]
    InvalidHeading { line: usize, heading: String },

    #[error("line {line}: '{section_type}' section heading appears outside of an action")]
    SectionOutsideAction {
        line: usize,
        section_type: SectionType,
    },

    #[error("action {action_id} (line {line}): {issue}")]
    InvalidAction {
        action_id: String,
        line: usize,
        issue: ValidationIssue,
    },

    #[error("document contains no objectives")]
    EmptyDocument,

    #[error("structural validation failed in {scope}: {issue}")]
    Validation {
        scope: String,
        issue: ValidationIssue,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("responses are for área '{found}' but the rubric is '{expected}'")]
    ResponseAreaMismatch { expected: String, found: String },

    #[error("response targets unknown action '{accion_id}'")]
    UnknownResponseTarget { accion_id: String },

    #[error("response for {accion_id} targets '{section_type}', which is not a dimension")]
    NotADimension {
        accion_id: String,
        section_type: SectionType,
    },

    #[error("duplicate response for {accion_id} / {section_type}")]
    DuplicateResponse {
        accion_id: String,
        section_type: SectionType,
    },
}

pub type Result<T> = std::result::Result<T, RubricError>;
