// Rubrica Core Library
//
// Parses área rubric documents (objectives → actions → sections) into a
// validated tree, and derives flat, profile and scoring views from it.

pub mod types;
pub mod error;
pub mod config;
pub mod parser;
pub mod rules;
pub mod outputs;
pub mod scoring;
pub mod processor;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::RubricError;
pub use config::ParsingConfig;
pub use parser::{parse_area_markdown, RubricParser};
pub use outputs::{get_flattened_sections, AreaProfile};
pub use scoring::{score_assessment, AssessmentResponses, AssessmentScore};
pub use processor::{ProcessedArea, RubricProcessor};
