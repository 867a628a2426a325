use crate::types::*;

/// Linearize the tree depth-first in stored order, one record per section.
/// `sectionIndex` is a running counter over the whole área, so the result
/// always has `total_sections` entries indexed `0..total_sections`.
pub fn get_flattened_sections(parsed: &ParsedArea) -> Vec<FlattenedSection> {
    let mut flattened = Vec::with_capacity(parsed.total_sections);

    for objective in &parsed.objectives {
        for action in &objective.actions {
            for section in &action.sections {
                flattened.push(FlattenedSection {
                    section_index: flattened.len(),
                    accion_id: action.id.clone(),
                    objetivo_number: objective.number,
                    accion_number: action.accion_number,
                    objetivo_title: objective.title.clone(),
                    accion_description: action.description.clone(),
                    section: section.clone(),
                });
            }
        }
    }

    flattened
}

impl ParsedArea {
    pub fn flattened_sections(&self) -> Vec<FlattenedSection> {
        get_flattened_sections(self)
    }
}
