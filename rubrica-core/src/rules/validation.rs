use crate::config::ParsingConfig;
use crate::error::RubricError;
use crate::types::*;
use std::collections::HashSet;
use thiserror::Error;

// ValidationRule - structural invariants of a rubric tree.
// Used when each action is closed during parsing and as the final audit.
pub struct ValidationRule {
    allow_empty_objectives: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("has {found} sections, expected 4 (accion, cobertura, frecuencia, profundidad)")]
    SectionCount { found: usize },

    #[error("repeats the '{section_type}' section")]
    DuplicateSection { section_type: SectionType },

    #[error("first section is '{first}', expected the accion section")]
    SectionOrder { first: SectionType },

    #[error("accion section carries maturity levels")]
    LevelsOnAccion,

    #[error("'{section_type}' section has levels [{found}], expected exactly incipiente, en_desarrollo, avanzado, consolidado")]
    LevelSet {
        section_type: SectionType,
        found: String,
    },

    #[error("'{section_type}' section has an empty '{level}' descriptor")]
    EmptyDescriptor {
        section_type: SectionType,
        level: MaturityLevel,
    },

    #[error("'{section_type}' section has no questions")]
    EmptyQuestions { section_type: SectionType },

    #[error("objective at position {position} is numbered {found}, expected {expected}")]
    ObjectiveNumbering {
        position: usize,
        expected: u32,
        found: u32,
    },

    #[error("{action_id} is numbered {found} within its objective, expected {expected}")]
    ActionNumbering {
        action_id: String,
        expected: u32,
        found: u32,
    },

    #[error("{action_id} claims objective {found} but sits under objective {objective_number}")]
    ActionObjectiveMismatch {
        action_id: String,
        objective_number: u32,
        found: u32,
    },

    #[error("action id '{action_id}' does not match its numbers, expected '{expected}'")]
    ActionIdMismatch { action_id: String, expected: String },

    #[error("objective {number} ('{title}') has no actions")]
    EmptyObjective { number: u32, title: String },

    #[error("totalSections is {stored} but the tree holds {counted} sections")]
    TotalSections { stored: usize, counted: usize },
}

/// Issues found by a full audit, each tagged with where it was found
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<(String, ValidationIssue)>,
    pub total_actions: usize,
    pub total_sections: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// First issue as an error; parsing never proceeds past a violation
    pub fn into_result(self) -> Result<(), RubricError> {
        match self.issues.into_iter().next() {
            Some((scope, issue)) => Err(RubricError::Validation { scope, issue }),
            None => Ok(()),
        }
    }

    pub fn log_summary(&self) {
        if self.is_valid() {
            log::debug!(
                "Validation passed: {} actions, {} sections",
                self.total_actions,
                self.total_sections
            );
            return;
        }
        log::warn!("Validation found {} issue(s)", self.issues.len());
        for (scope, issue) in &self.issues {
            log::warn!("  {scope}: {issue}");
        }
    }
}

impl ValidationRule {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            allow_empty_objectives: config.allow_empty_objectives,
        }
    }

    /// Per-action invariants: four distinct sections with accion first,
    /// questions everywhere, levels only (and exactly) on dimensions.
    pub fn check_action(&self, action: &Action) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if action.sections.len() != SECTIONS_PER_ACTION {
            issues.push(ValidationIssue::SectionCount {
                found: action.sections.len(),
            });
        }

        let mut seen = HashSet::new();
        for section in &action.sections {
            if !seen.insert(section.section_type) {
                issues.push(ValidationIssue::DuplicateSection {
                    section_type: section.section_type,
                });
            }
        }

        if let Some(first) = action.sections.first() {
            if first.section_type != SectionType::Accion {
                issues.push(ValidationIssue::SectionOrder {
                    first: first.section_type,
                });
            }
        }

        for section in &action.sections {
            self.check_section(section, &mut issues);
        }

        issues
    }

    fn check_section(&self, section: &Section, issues: &mut Vec<ValidationIssue>) {
        let section_type = section.section_type;

        if !section.section_type.is_dimension() {
            if section.levels.is_some() {
                issues.push(ValidationIssue::LevelsOnAccion);
            }
        } else {
            let levels = section.levels.as_deref().unwrap_or_default();
            let values: HashSet<MaturityLevel> = levels.iter().map(|l| l.value).collect();
            let complete = levels.len() == MaturityLevel::ALL.len()
                && MaturityLevel::ALL.iter().all(|level| values.contains(level));

            if !complete {
                let found = levels
                    .iter()
                    .map(|l| l.value.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                issues.push(ValidationIssue::LevelSet {
                    section_type,
                    found,
                });
            }

            for level in levels {
                if level.descriptor.trim().is_empty() {
                    issues.push(ValidationIssue::EmptyDescriptor {
                        section_type,
                        level: level.value,
                    });
                }
            }
        }

        if section.questions.is_empty() {
            issues.push(ValidationIssue::EmptyQuestions { section_type });
        }
    }

    /// Audit a whole tree: numbering, ids, per-action shape and totals
    pub fn validate(&self, parsed: &ParsedArea) -> ValidationReport {
        let mut issues = Vec::new();

        for (position, objective) in parsed.objectives.iter().enumerate() {
            let expected = position as u32 + 1;
            if objective.number != expected {
                issues.push((
                    format!("objective {}", objective.number),
                    ValidationIssue::ObjectiveNumbering {
                        position,
                        expected,
                        found: objective.number,
                    },
                ));
            }

            if objective.actions.is_empty() && !self.allow_empty_objectives {
                issues.push((
                    format!("objective {}", objective.number),
                    ValidationIssue::EmptyObjective {
                        number: objective.number,
                        title: objective.title.clone(),
                    },
                ));
            }

            for (index, action) in objective.actions.iter().enumerate() {
                self.check_action_placement(objective, index, action, &mut issues);
                for issue in self.check_action(action) {
                    issues.push((action.id.clone(), issue));
                }
            }
        }

        let counted = parsed.section_count();
        if parsed.total_sections != counted {
            issues.push((
                format!("área {}", parsed.area),
                ValidationIssue::TotalSections {
                    stored: parsed.total_sections,
                    counted,
                },
            ));
        }

        ValidationReport {
            issues,
            total_actions: parsed.action_count(),
            total_sections: counted,
        }
    }

    fn check_action_placement(
        &self,
        objective: &Objective,
        index: usize,
        action: &Action,
        issues: &mut Vec<(String, ValidationIssue)>,
    ) {
        let scope = action.id.clone();

        if action.objective_number != objective.number {
            issues.push((
                scope.clone(),
                ValidationIssue::ActionObjectiveMismatch {
                    action_id: action.id.clone(),
                    objective_number: objective.number,
                    found: action.objective_number,
                },
            ));
        }

        let expected = index as u32 + 1;
        if action.accion_number != expected {
            issues.push((
                scope.clone(),
                ValidationIssue::ActionNumbering {
                    action_id: action.id.clone(),
                    expected,
                    found: action.accion_number,
                },
            ));
        }

        let expected_id = action_id(action.objective_number, action.accion_number);
        if action.id != expected_id {
            issues.push((
                scope,
                ValidationIssue::ActionIdMismatch {
                    action_id: action.id.clone(),
                    expected: expected_id,
                },
            ));
        }
    }
}
