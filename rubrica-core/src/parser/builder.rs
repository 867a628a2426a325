use crate::error::{Result, RubricError};
use crate::rules::validation::ValidationRule;
use crate::types::*;

/// Maturity level being accumulated inside a section
#[derive(Debug, Clone)]
pub(crate) struct LevelDraft {
    pub value: MaturityLevel,
    pub descriptor: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct SectionDraft {
    pub section_type: SectionType,
    pub questions: Vec<String>,
    pub levels: Vec<LevelDraft>,
    /// Set by an unrecognised heading after the levels; nothing more is
    /// appended to the last descriptor until another marker arrives.
    pub closed: bool,
}

impl SectionDraft {
    pub fn new(section_type: SectionType) -> Self {
        Self {
            section_type,
            questions: Vec::new(),
            levels: Vec::new(),
            closed: false,
        }
    }

    /// Once a level marker has been seen, every following line belongs to
    /// the most recent level until the next marker, heading or section
    /// boundary.
    fn open_level(&mut self) -> Option<&mut LevelDraft> {
        if self.closed {
            return None;
        }
        self.levels.last_mut()
    }

    fn build(self) -> Section {
        // The accion section only gets `Some` levels when the document put
        // markers there, which validation then rejects.
        let levels = if self.section_type.is_dimension() || !self.levels.is_empty() {
            Some(
                self.levels
                    .into_iter()
                    .map(|level| Level {
                        value: level.value,
                        descriptor: level.descriptor.join(" "),
                    })
                    .collect(),
            )
        } else {
            None
        };

        Section {
            section_type: self.section_type,
            questions: self.questions,
            levels,
        }
    }
}

/// An action between its heading and the next action/objective heading
#[derive(Debug, Clone)]
pub(crate) struct ActionDraft {
    pub objective_number: u32,
    pub accion_number: u32,
    pub line: usize,
    pub heading: String,
    pub description: Vec<String>,
    pub sections: Vec<SectionDraft>,
}

impl ActionDraft {
    pub fn new(objective_number: u32, accion_number: u32, line: usize, heading: String) -> Self {
        Self {
            objective_number,
            accion_number,
            line,
            heading,
            description: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn id(&self) -> String {
        action_id(self.objective_number, self.accion_number)
    }

    fn current_section(&mut self) -> Option<&mut SectionDraft> {
        self.sections.last_mut()
    }

    pub fn open_section(&mut self, section_type: SectionType) {
        self.sections.push(SectionDraft::new(section_type));
    }

    /// Start a maturity level in the current section. Markers in the accion
    /// section are kept so validation can reject them.
    pub fn add_level(&mut self, value: MaturityLevel, text: String) {
        let descriptor = if text.is_empty() { Vec::new() } else { vec![text] };
        let section = self.current_or_implicit_section();
        section.closed = false;
        section.levels.push(LevelDraft { value, descriptor });
    }

    pub fn add_question(&mut self, text: String) {
        let id = self.id();
        let section = self.current_or_implicit_section();
        if section.closed {
            log::debug!("{id}: ignoring question after {} levels: {text}", section.section_type);
            return;
        }
        match section.open_level() {
            Some(level) => level.descriptor.push(text),
            None => section.questions.push(text),
        }
    }

    /// An unrecognised heading ends the open level descriptor
    pub fn close_level(&mut self) {
        if let Some(section) = self.current_section() {
            if !section.levels.is_empty() {
                section.closed = true;
            }
        }
    }

    /// Prose extends the description before the first section, the open
    /// level descriptor inside a section, and is dropped otherwise.
    pub fn add_text(&mut self, text: String) {
        if self.sections.is_empty() {
            self.description.push(text);
            return;
        }
        let id = self.id();
        if let Some(section) = self.current_section() {
            match section.open_level() {
                Some(level) => level.descriptor.push(text),
                None => log::debug!("{id}: ignoring prose in {} section: {text}", section.section_type),
            }
        }
    }

    /// Current section, opening an implicit accion section when content
    /// arrives before any section heading.
    fn current_or_implicit_section(&mut self) -> &mut SectionDraft {
        if self.sections.is_empty() {
            log::debug!(
                "{}: content before any section heading opens the accion section",
                self.id()
            );
            self.sections.push(SectionDraft::new(SectionType::Accion));
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Convert into a typed [`Action`] and enforce the per-action invariants
    pub fn close(self, rules: &ValidationRule) -> Result<Action> {
        let id = self.id();
        let line = self.line;
        let description = if self.description.is_empty() {
            self.heading
        } else {
            self.description.join(" ")
        };

        let sections = self.sections.into_iter().map(SectionDraft::build).collect();
        let action = Action::new(self.objective_number, self.accion_number, description, sections);

        if let Some(issue) = rules.check_action(&action).into_iter().next() {
            return Err(RubricError::InvalidAction {
                action_id: id,
                line,
                issue,
            });
        }

        log::debug!(
            "Closed {} with {} sections ({} questions)",
            action.id,
            action.sections.len(),
            action.sections.iter().map(|s| s.questions.len()).sum::<usize>()
        );
        Ok(action)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectiveDraft {
    pub number: u32,
    /// Number as written in the heading, used to recognise a resumed objective
    pub declared: u32,
    pub title: String,
    pub line: usize,
    pub actions: Vec<Action>,
}

impl ObjectiveDraft {
    pub fn build(self) -> Objective {
        Objective {
            number: self.number,
            title: self.title,
            actions: self.actions,
        }
    }
}
