use crate::config::ParsingConfig;
use crate::error::{Result, RubricError};
use crate::types::{MaturityLevel, SectionType};
use regex::Regex;

/// What a single source line means to the rubric builder.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    Objective { declared: u32, title: String },
    /// `description` is the heading text after the number, possibly empty
    Action {
        declared: u32,
        description: String,
        heading: String,
    },
    SectionHeading(SectionType),
    LevelMarker { level: MaturityLevel, text: String },
    Question(String),
    Text(String),
    /// A markdown heading that matched nothing we know about
    Heading(String),
    /// An objective or action heading whose number does not fit in a `u32`
    MalformedHeading(String),
}

/// A line with markup and indentation stripped, plus the markup facts
/// classification still needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLine {
    pub text: String,
    pub is_heading: bool,
    pub is_bold: bool,
}

/// Strip indentation (tabs or spaces), heading hashes, `**`/`__` emphasis and
/// list bullets, and collapse inner whitespace.
pub fn normalize_line(raw: &str) -> NormalizedLine {
    let trimmed = raw.trim();

    let (body, is_heading) = match trimmed.strip_prefix('#') {
        Some(_) => (trimmed.trim_start_matches('#').trim(), true),
        None => (trimmed, false),
    };

    let is_bold = body.len() > 4
        && (body.starts_with("**") || body.starts_with("__"))
        && (body.ends_with("**")
            || body.ends_with("**:")
            || body.ends_with("__")
            || body.ends_with("__:"));

    let plain = body.replace("**", "").replace("__", "");
    let plain = strip_bullet(plain.trim());
    let text = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    NormalizedLine {
        text,
        is_heading,
        is_bold,
    }
}

fn strip_bullet(text: &str) -> &str {
    for bullet in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = text.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }

    // Ordered list items: "1. text", "12) text"
    let digits = text.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &text[digits..];
        for marker in [". ", ") "] {
            if let Some(after) = rest.strip_prefix(marker) {
                return after.trim_start();
            }
        }
    }
    text
}

fn is_thematic_break(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && (compact.chars().all(|c| c == '-')
            || compact.chars().all(|c| c == '*')
            || compact.chars().all(|c| c == '_'))
}

/// Keyword-to-tag boundary: turns raw lines into [`LineKind`]s using the
/// patterns and vocabulary from [`ParsingConfig`].
#[derive(Debug, Clone)]
pub struct LineClassifier {
    objective: Regex,
    action: Regex,
    level_markers: Vec<(MaturityLevel, Regex)>,
    section_keywords: Vec<(SectionType, Vec<String>)>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| RubricError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl LineClassifier {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let objective = compile(&config.headings.objective)?;
        let action = compile(&config.headings.action)?;

        let mut level_markers = Vec::new();
        for level in MaturityLevel::ALL {
            let labels = config.level_markers.for_level(level);
            if labels.is_empty() {
                continue;
            }
            let alternatives = labels
                .iter()
                .map(|label| regex::escape(label.trim()).replace(' ', r"[\s_]+"))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)^(?:{alternatives})\s*[:\-–—]\s*(.*)$");
            level_markers.push((level, compile(&pattern)?));
        }

        let section_keywords = SectionType::ALL
            .into_iter()
            .map(|section_type| {
                let keywords = config
                    .section_keywords
                    .for_type(section_type)
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (section_type, keywords)
            })
            .collect();

        Ok(Self {
            objective,
            action,
            level_markers,
            section_keywords,
        })
    }

    pub fn classify(&self, raw: &str) -> LineKind {
        if raw.trim().is_empty() || is_thematic_break(raw) {
            return LineKind::Blank;
        }

        let line = normalize_line(raw);
        if line.text.is_empty() {
            return LineKind::Blank;
        }

        if let Some((declared, tail)) = capture_heading(&self.objective, &line.text) {
            let Some(declared) = declared else {
                return LineKind::MalformedHeading(line.text);
            };
            let title = if tail.is_empty() { line.text } else { tail };
            return LineKind::Objective { declared, title };
        }
        if let Some((declared, description)) = capture_heading(&self.action, &line.text) {
            let Some(declared) = declared else {
                return LineKind::MalformedHeading(line.text);
            };
            return LineKind::Action {
                declared,
                description,
                heading: line.text,
            };
        }
        if let Some(section_type) = self.section_heading(&line) {
            return LineKind::SectionHeading(section_type);
        }
        if let Some((level, text)) = self.level_marker(&line.text) {
            return LineKind::LevelMarker { level, text };
        }
        if line.is_heading {
            return LineKind::Heading(line.text);
        }
        if line.text.ends_with('?') {
            return LineKind::Question(line.text);
        }
        LineKind::Text(line.text)
    }

    fn section_heading(&self, line: &NormalizedLine) -> Option<SectionType> {
        let candidate = line.text.trim_end_matches(':').trim().to_lowercase();
        let marked = line.is_heading || line.is_bold;

        self.section_keywords.iter().find_map(|(section_type, keywords)| {
            let hit = keywords.iter().any(|keyword| {
                candidate == *keyword || (marked && starts_with_word(&candidate, keyword))
            });
            hit.then_some(*section_type)
        })
    }

    fn level_marker(&self, text: &str) -> Option<(MaturityLevel, String)> {
        self.level_markers.iter().find_map(|(level, regex)| {
            regex.captures(text).map(|caps| {
                let rest = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                (*level, rest.to_string())
            })
        })
    }
}

/// `keyword` followed by end of text or a non-alphanumeric character
fn starts_with_word(candidate: &str, keyword: &str) -> bool {
    match candidate.strip_prefix(keyword) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}

/// Declared number and the (possibly empty) text after it. The number is
/// `None` when the pattern matched but the digits overflow.
fn capture_heading(regex: &Regex, text: &str) -> Option<(Option<u32>, String)> {
    let caps = regex.captures(text)?;
    let declared = caps.get(1)?.as_str().parse().ok();
    let tail = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Some((declared, tail.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classifier() -> LineClassifier {
        LineClassifier::new(&ParsingConfig::default()).unwrap()
    }

    #[rstest]
    #[case("## OBJETIVO 1: Conocer a cada estudiante", 1, "Conocer a cada estudiante")]
    #[case("OBJETIVO 3 - Familias comprometidas", 3, "Familias comprometidas")]
    #[case("**Objetivo 2.** Planificar juntos", 2, "Planificar juntos")]
    #[case("# OBJETIVO 4", 4, "OBJETIVO 4")]
    fn test_objective_headings(#[case] raw: &str, #[case] declared: u32, #[case] title: &str) {
        assert_eq!(
            classifier().classify(raw),
            LineKind::Objective {
                declared,
                title: title.to_string()
            }
        );
    }

    #[rstest]
    #[case("### ACCIÓN 1: Entrevistas individuales", 1, "Entrevistas individuales")]
    #[case("Acción 12: Tutorías entre pares", 12, "Tutorías entre pares")]
    #[case("\t**ACCION 2:** Portafolios", 2, "Portafolios")]
    #[case("### ACCIÓN 5", 5, "")]
    fn test_action_headings(#[case] raw: &str, #[case] declared: u32, #[case] description: &str) {
        match classifier().classify(raw) {
            LineKind::Action {
                declared: found,
                description: text,
                heading,
            } => {
                assert_eq!(found, declared);
                assert_eq!(text, description);
                assert!(heading.to_lowercase().starts_with("acci"));
            }
            other => panic!("expected action heading, got {other:?}"),
        }
    }

    #[rstest]
    #[case("#### COBERTURA", SectionType::Cobertura)]
    #[case("**Frecuencia**", SectionType::Frecuencia)]
    #[case("Profundidad:", SectionType::Profundidad)]
    #[case("**PREGUNTAS ABIERTAS**", SectionType::Accion)]
    #[case("### Acción", SectionType::Accion)]
    #[case("#### Cobertura (alcance)", SectionType::Cobertura)]
    #[case("__Frecuencia (periodicidad)__:", SectionType::Frecuencia)]
    fn test_section_headings(#[case] raw: &str, #[case] expected: SectionType) {
        assert_eq!(classifier().classify(raw), LineKind::SectionHeading(expected));
    }

    #[test]
    fn test_underscore_bold_with_colon() {
        assert!(normalize_line("__Profundidad__:").is_bold);
        assert!(normalize_line("**Profundidad**:").is_bold);
        assert!(!normalize_line("Profundidad de la reflexión").is_bold);
    }

    #[rstest]
    #[case("## OBJETIVO 99999999999: Dos")]
    #[case("### ACCIÓN 4294967296: Tutorías")]
    fn test_overflowing_heading_number(#[case] raw: &str) {
        match classifier().classify(raw) {
            LineKind::MalformedHeading(text) => assert!(raw.ends_with(&text)),
            other => panic!("expected malformed heading, got {other:?}"),
        }
    }

    #[test]
    fn test_prose_mentioning_dimension_is_not_a_heading() {
        let kind = classifier().classify("Cobertura amplia en todos los cursos del centro.");
        assert_eq!(
            kind,
            LineKind::Text("Cobertura amplia en todos los cursos del centro.".to_string())
        );
        // accent-sensitive keyword: "accion" alone is not the accion keyword
        assert_eq!(classifier().classify("### Accion"), LineKind::Heading("Accion".to_string()));
    }

    #[rstest]
    #[case("- **Incipiente:** Menos del 25%", MaturityLevel::Incipiente, "Menos del 25%")]
    #[case("\t\tEn Desarrollo: Entre el 25% y el 50%", MaturityLevel::EnDesarrollo, "Entre el 25% y el 50%")]
    #[case("en_desarrollo - parcial", MaturityLevel::EnDesarrollo, "parcial")]
    #[case("    AVANZADO:", MaturityLevel::Avanzado, "")]
    #[case("* Consolidado – Todo el centro", MaturityLevel::Consolidado, "Todo el centro")]
    fn test_level_markers(#[case] raw: &str, #[case] level: MaturityLevel, #[case] text: &str) {
        assert_eq!(
            classifier().classify(raw),
            LineKind::LevelMarker {
                level,
                text: text.to_string()
            }
        );
    }

    #[test]
    fn test_questions_text_and_blanks() {
        let c = classifier();
        assert_eq!(
            c.classify("  1. ¿Con qué frecuencia se revisan los planes?  "),
            LineKind::Question("¿Con qué frecuencia se revisan los planes?".to_string())
        );
        assert_eq!(c.classify("\t \t"), LineKind::Blank);
        assert_eq!(c.classify("---"), LineKind::Blank);
        assert_eq!(
            c.classify("Texto   con\tespacios"),
            LineKind::Text("Texto con espacios".to_string())
        );
        assert_eq!(c.classify("## Introducción"), LineKind::Heading("Introducción".to_string()));
    }

    #[test]
    fn test_tabs_and_spaces_normalize_identically() {
        let tabs = normalize_line("\t\t- **Avanzado:**\tLa mayoría\tde docentes");
        let spaces = normalize_line("        - **Avanzado:** La mayoría  de docentes");
        assert_eq!(tabs, spaces);
    }

    #[test]
    fn test_invalid_configured_pattern_is_reported() {
        let mut config = ParsingConfig::default();
        config.headings.objective = "(unclosed".to_string();
        let err = LineClassifier::new(&config).unwrap_err();
        assert!(matches!(err, RubricError::InvalidPattern { .. }));
    }
}
