// Rubric parser
//
// Walks the document line by line, feeding classified lines into a small
// state machine that accumulates objective and action drafts. Each action is
// validated as soon as its block closes, and the finished tree is audited
// once more before it is handed out.

pub(crate) mod builder;
pub mod classify;

use crate::config::ParsingConfig;
use crate::error::{Result, RubricError};
use crate::rules::validation::ValidationRule;
use crate::types::{Objective, ParsedArea};
use builder::{ActionDraft, ObjectiveDraft};
use classify::{LineClassifier, LineKind};

pub struct RubricParser {
    config: ParsingConfig,
    classifier: LineClassifier,
    rules: ValidationRule,
}

impl RubricParser {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            classifier: LineClassifier::new(config)?,
            rules: ValidationRule::new(config),
        })
    }

    /// Parse one área document into a validated tree.
    /// Returns the first structural violation instead of a partial result.
    pub fn parse(&self, content: &str, area: &str) -> Result<ParsedArea> {
        let area = self.config.resolve_area(area)?;
        let content = content.trim_start_matches('\u{feff}');

        let state = content
            .lines()
            .enumerate()
            .try_fold(ParseState::default(), |state, (index, raw)| {
                state.step(index + 1, self.classifier.classify(raw), &self.rules)
            })?;
        let objectives = state.finish(&self.rules)?;

        let parsed = ParsedArea::new(area.id.clone(), objectives);
        let report = self.rules.validate(&parsed);
        report.log_summary();
        report.into_result()?;

        log::info!(
            "Parsed área '{}': {} objectives, {} actions, {} sections",
            parsed.area,
            parsed.objectives.len(),
            parsed.action_count(),
            parsed.total_sections
        );
        Ok(parsed)
    }
}

/// Parse with the built-in vocabulary and área registry.
pub fn parse_area_markdown(content: &str, area: &str) -> Result<ParsedArea> {
    RubricParser::new(&ParsingConfig::default())?.parse(content, area)
}

#[derive(Debug, Default)]
struct ParseState {
    objectives: Vec<ObjectiveDraft>,
    current_objective: Option<usize>,
    current_action: Option<ActionDraft>,
}

impl ParseState {
    fn step(mut self, line: usize, kind: LineKind, rules: &ValidationRule) -> Result<Self> {
        match kind {
            LineKind::Objective { declared, title } => {
                self.close_action(rules)?;
                self.open_objective(line, declared, title);
            }
            LineKind::Action {
                declared,
                description,
                heading,
            } => {
                self.close_action(rules)?;
                self.open_action(line, declared, description, heading)?;
            }
            LineKind::SectionHeading(section_type) => match self.current_action.as_mut() {
                Some(action) => action.open_section(section_type),
                None if self.current_objective.is_some() => {
                    return Err(RubricError::SectionOutsideAction { line, section_type });
                }
                None => log::debug!("line {line}: ignoring '{section_type}' heading before the first objective"),
            },
            LineKind::LevelMarker { level, text } => {
                if let Some(action) = self.current_action.as_mut() {
                    action.add_level(level, text);
                }
            }
            LineKind::Question(text) => {
                if let Some(action) = self.current_action.as_mut() {
                    action.add_question(text);
                }
            }
            LineKind::Text(text) => {
                if let Some(action) = self.current_action.as_mut() {
                    action.add_text(text);
                }
            }
            LineKind::Heading(_) => {
                if let Some(action) = self.current_action.as_mut() {
                    action.close_level();
                }
            }
            LineKind::MalformedHeading(heading) => {
                return Err(RubricError::InvalidHeading { line, heading });
            }
            LineKind::Blank => {}
        }
        Ok(self)
    }

    fn open_objective(&mut self, line: usize, declared: u32, title: String) {
        if let Some(index) = self
            .objectives
            .iter()
            .position(|o| o.declared == declared && o.title == title)
        {
            log::debug!(
                "line {line}: resuming objective {} first seen at line {}",
                self.objectives[index].number,
                self.objectives[index].line
            );
            self.current_objective = Some(index);
            return;
        }

        let number = self.objectives.len() as u32 + 1;
        if declared != number {
            log::debug!("line {line}: objective declared as {declared}, numbered {number}");
        }
        self.objectives.push(ObjectiveDraft {
            number,
            declared,
            title,
            line,
            actions: Vec::new(),
        });
        self.current_objective = Some(self.objectives.len() - 1);
    }

    fn open_action(
        &mut self,
        line: usize,
        declared: u32,
        description: String,
        heading: String,
    ) -> Result<()> {
        let index = self
            .current_objective
            .ok_or(RubricError::ActionOutsideObjective { line })?;
        let objective = &self.objectives[index];

        let accion_number = objective.actions.len() as u32 + 1;
        if declared != accion_number {
            log::debug!(
                "line {line}: action declared as {declared}, numbered {accion_number} in objective {}",
                objective.number
            );
        }

        let mut draft = ActionDraft::new(objective.number, accion_number, line, heading);
        if !description.is_empty() {
            draft.description.push(description);
        }
        self.current_action = Some(draft);
        Ok(())
    }

    fn close_action(&mut self, rules: &ValidationRule) -> Result<()> {
        if let Some(draft) = self.current_action.take() {
            let index = (draft.objective_number - 1) as usize;
            let action = draft.close(rules)?;
            self.objectives[index].actions.push(action);
        }
        Ok(())
    }

    fn finish(mut self, rules: &ValidationRule) -> Result<Vec<Objective>> {
        self.close_action(rules)?;
        if self.objectives.is_empty() {
            return Err(RubricError::EmptyDocument);
        }
        Ok(self.objectives.into_iter().map(ObjectiveDraft::build).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::validation::ValidationIssue;
    use crate::types::{MaturityLevel, SectionType};
    use pretty_assertions::assert_eq;

    const ONE_ACTION: &str = "\
## OBJETIVO 1: Conocer a cada estudiante

### ACCIÓN 1: Entrevistas individuales
Se realiza una entrevista inicial con cada estudiante.

**PREGUNTAS ABIERTAS**
- ¿Qué información se recoge en la entrevista?

#### Cobertura
- ¿A cuántos estudiantes se entrevista?
- Incipiente: Menos del 25% de los estudiantes.
- En desarrollo: Entre el 25% y el 50%.
- Avanzado: Entre el 50% y el 90%.
- Consolidado: Todos los estudiantes.

#### Frecuencia
- ¿Cada cuánto se repite?
- Incipiente: Una vez.
- En desarrollo: Una vez al año.
- Avanzado: Cada trimestre.
- Consolidado: De forma continua.

#### Profundidad
- ¿Cómo se usa la información?
- Incipiente: No se registra.
- En desarrollo: Se registra.
- Avanzado: Se comparte con el equipo
\tdocente del curso.
- Consolidado: Orienta la planificación.
";

    fn parse(content: &str) -> Result<ParsedArea> {
        parse_area_markdown(content, "personalizacion")
    }

    #[test]
    fn test_single_action_tree() {
        let parsed = parse(ONE_ACTION).unwrap();
        assert_eq!(parsed.area, "personalizacion");
        assert_eq!(parsed.total_sections, 4);

        let action = &parsed.objectives[0].actions[0];
        assert_eq!(action.id, "objetivo1_accion1");
        assert_eq!(
            action.description,
            "Entrevistas individuales Se realiza una entrevista inicial con cada estudiante."
        );

        let accion = action.section(SectionType::Accion).unwrap();
        assert_eq!(accion.questions, vec!["¿Qué información se recoge en la entrevista?"]);
        assert!(accion.levels.is_none());

        let profundidad = action.section(SectionType::Profundidad).unwrap();
        assert_eq!(
            profundidad.level(MaturityLevel::Avanzado).unwrap().descriptor,
            "Se comparte con el equipo docente del curso."
        );
    }

    #[test]
    fn test_malformed_fragment_fails_instead_of_partial_tree() {
        let content = "\
OBJETIVO 1: Conocer a cada estudiante
ACCIÓN 1: Entrevistas
PREGUNTAS ABIERTAS
¿Qué se pregunta?
";
        let err = parse(content).unwrap_err();
        match err {
            RubricError::InvalidAction { action_id, issue, .. } => {
                assert_eq!(action_id, "objetivo1_accion1");
                assert_eq!(issue, ValidationIssue::SectionCount { found: 1 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_area_fails_before_reading() {
        let err = parse_area_markdown(ONE_ACTION, "invalid-area").unwrap_err();
        assert!(matches!(err, RubricError::UnknownArea { .. }));
    }

    #[test]
    fn test_tabs_and_spaces_parse_identically() {
        let spaces = ONE_ACTION.replace('\t', "    ");
        assert_eq!(parse(ONE_ACTION).unwrap(), parse(&spaces).unwrap());
    }

    #[test]
    fn test_empty_objective_is_rejected_by_default() {
        let content = format!("{ONE_ACTION}\n## OBJETIVO 2: Sin acciones todavía\n");
        let err = parse(&content).unwrap_err();
        assert!(matches!(
            err,
            RubricError::Validation {
                issue: ValidationIssue::EmptyObjective { number: 2, .. },
                ..
            }
        ));

        let config = ParsingConfig {
            allow_empty_objectives: true,
            ..ParsingConfig::default()
        };
        let parsed = RubricParser::new(&config)
            .unwrap()
            .parse(&content, "personalizacion")
            .unwrap();
        assert_eq!(parsed.objectives.len(), 2);
        assert!(parsed.objectives[1].actions.is_empty());
    }

    #[test]
    fn test_repeated_objective_title_resumes_it() {
        let second = ONE_ACTION.replace("ACCIÓN 1: Entrevistas individuales", "ACCIÓN 2: Tutorías");
        let content = format!("{ONE_ACTION}\n{second}");
        let parsed = parse(&content).unwrap();

        assert_eq!(parsed.objectives.len(), 1);
        let ids: Vec<_> = parsed.actions().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["objetivo1_accion1", "objetivo1_accion2"]);
        assert_eq!(parsed.total_sections, 8);
    }

    #[test]
    fn test_same_title_under_different_numbers_stays_separate() {
        let first = ONE_ACTION.replace("Conocer a cada estudiante", "Familias");
        let second = first.replace("OBJETIVO 1", "OBJETIVO 2");
        let parsed = parse(&format!("{first}\n{second}")).unwrap();

        assert_eq!(parsed.objectives.len(), 2);
        assert_eq!(parsed.objectives[1].title, "Familias");
        let ids: Vec<_> = parsed.actions().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["objetivo1_accion1", "objetivo2_accion1"]);
    }

    #[test]
    fn test_overflowing_objective_number_is_an_error() {
        let content = format!("{ONE_ACTION}\n## OBJETIVO 99999999999: Dos\n### ACCIÓN 1: Otra\n");
        let err = parse(&content).unwrap_err();
        let expected_line = ONE_ACTION.lines().count() + 2;
        match err {
            RubricError::InvalidHeading { line, heading } => {
                assert_eq!(line, expected_line);
                assert_eq!(heading, "OBJETIVO 99999999999: Dos");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_heading_ends_level_descriptor() {
        let content = format!("{ONE_ACTION}\n### Notas del equipo\nRevisar en junio.\n");
        let parsed = parse(&content).unwrap();
        let profundidad = parsed.objectives[0].actions[0]
            .section(SectionType::Profundidad)
            .unwrap();
        assert_eq!(
            profundidad.level(MaturityLevel::Consolidado).unwrap().descriptor,
            "Orienta la planificación."
        );
        assert_eq!(parsed, parse(ONE_ACTION).unwrap());
    }

    #[test]
    fn test_level_marker_without_descriptor_is_rejected() {
        let content = ONE_ACTION.replace("- Avanzado: Entre el 50% y el 90%.", "- Avanzado:");
        let err = parse(&content).unwrap_err();
        assert!(matches!(
            err,
            RubricError::InvalidAction {
                issue: ValidationIssue::EmptyDescriptor {
                    section_type: SectionType::Cobertura,
                    level: MaturityLevel::Avanzado
                },
                ..
            }
        ));
    }

    #[test]
    fn test_action_before_objective() {
        let err = parse("Preámbulo\nACCIÓN 1: Suelta\n").unwrap_err();
        assert!(matches!(err, RubricError::ActionOutsideObjective { line: 2 }));
    }

    #[test]
    fn test_section_between_objective_and_action() {
        let err = parse("OBJETIVO 1: Algo\n#### Cobertura\n").unwrap_err();
        assert!(matches!(
            err,
            RubricError::SectionOutsideAction {
                line: 2,
                section_type: SectionType::Cobertura
            }
        ));
    }

    #[test]
    fn test_document_without_objectives() {
        let err = parse("# Área de personalización\n\nSolo texto introductorio.\n").unwrap_err();
        assert!(matches!(err, RubricError::EmptyDocument));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let first = serde_json::to_string(&parse(ONE_ACTION).unwrap()).unwrap();
        let second = serde_json::to_string(&parse(ONE_ACTION).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
