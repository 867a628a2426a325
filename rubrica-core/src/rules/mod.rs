// Structural rules applied to parsed rubric trees.
// - validation.rs: per-action and whole-document invariants

pub mod validation;

pub use validation::{ValidationIssue, ValidationReport, ValidationRule};
