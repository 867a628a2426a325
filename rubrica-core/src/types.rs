use serde::{Deserialize, Serialize};
use std::fmt;

/// The schema version stamped on serialized outputs.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Number of sections every action must decompose into.
pub const SECTIONS_PER_ACTION: usize = 4;

// ===== SECTION AND LEVEL TAGS =====

/// Closed set of section kinds. Keyword matching happens once, in the line
/// classifier; everything downstream works with this tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Accion,
    Cobertura,
    Frecuencia,
    Profundidad,
}

impl SectionType {
    pub const ALL: [SectionType; 4] = [
        SectionType::Accion,
        SectionType::Cobertura,
        SectionType::Frecuencia,
        SectionType::Profundidad,
    ];

    pub const DIMENSIONS: [SectionType; 3] = [
        SectionType::Cobertura,
        SectionType::Frecuencia,
        SectionType::Profundidad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Accion => "accion",
            SectionType::Cobertura => "cobertura",
            SectionType::Frecuencia => "frecuencia",
            SectionType::Profundidad => "profundidad",
        }
    }

    /// Dimension sections carry maturity levels, the accion section never does
    pub fn is_dimension(&self) -> bool {
        !matches!(self, SectionType::Accion)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four fixed maturity stages, lowest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Incipiente,
    EnDesarrollo,
    Avanzado,
    Consolidado,
}

impl MaturityLevel {
    pub const ALL: [MaturityLevel; 4] = [
        MaturityLevel::Incipiente,
        MaturityLevel::EnDesarrollo,
        MaturityLevel::Avanzado,
        MaturityLevel::Consolidado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Incipiente => "incipiente",
            MaturityLevel::EnDesarrollo => "en_desarrollo",
            MaturityLevel::Avanzado => "avanzado",
            MaturityLevel::Consolidado => "consolidado",
        }
    }

    /// Numeric weight used by scoring (incipiente = 1 … consolidado = 4)
    pub fn score(&self) -> u8 {
        match self {
            MaturityLevel::Incipiente => 1,
            MaturityLevel::EnDesarrollo => 2,
            MaturityLevel::Avanzado => 3,
            MaturityLevel::Consolidado => 4,
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaturityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        MaturityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| format!("unknown maturity level '{s}'"))
    }
}

// ===== RUBRIC TREE =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub value: MaturityLevel,
    pub descriptor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub questions: Vec<String>,
    /// `None` for the accion section, the four maturity levels otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<Level>>,
}

impl Section {
    pub fn level(&self, value: MaturityLevel) -> Option<&Level> {
        self.levels
            .as_ref()
            .and_then(|levels| levels.iter().find(|l| l.value == value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub objective_number: u32,
    pub accion_number: u32,
    pub description: String,
    pub sections: Vec<Section>,
}

impl Action {
    pub fn new(
        objective_number: u32,
        accion_number: u32,
        description: String,
        sections: Vec<Section>,
    ) -> Self {
        Self {
            id: action_id(objective_number, accion_number),
            objective_number,
            accion_number,
            description,
            sections,
        }
    }

    pub fn section(&self, section_type: SectionType) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_type == section_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub number: u32,
    pub title: String,
    pub actions: Vec<Action>,
}

/// Root output of a parse. `total_sections` is derived from the tree when
/// built through [`ParsedArea::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArea {
    pub area: String,
    pub objectives: Vec<Objective>,
    pub total_sections: usize,
}

impl ParsedArea {
    pub fn new(area: impl Into<String>, objectives: Vec<Objective>) -> Self {
        let total_sections = count_sections(&objectives);
        Self {
            area: area.into(),
            objectives,
            total_sections,
        }
    }

    /// Recount sections from the tree (independent of `total_sections`)
    pub fn section_count(&self) -> usize {
        count_sections(&self.objectives)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.objectives.iter().flat_map(|o| o.actions.iter())
    }

    pub fn action_count(&self) -> usize {
        self.actions().count()
    }

    pub fn find_action(&self, id: &str) -> Option<&Action> {
        self.actions().find(|a| a.id == id)
    }
}

fn count_sections(objectives: &[Objective]) -> usize {
    objectives
        .iter()
        .flat_map(|o| o.actions.iter())
        .map(|a| a.sections.len())
        .sum()
}

/// One section of the tree in linear order, with back-references to its
/// owning objective and action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedSection {
    pub section_index: usize,
    pub accion_id: String,
    pub objetivo_number: u32,
    pub accion_number: u32,
    pub objetivo_title: String,
    pub accion_description: String,
    pub section: Section,
}

// ===== ACTION IDS =====

pub fn action_id(objective_number: u32, accion_number: u32) -> String {
    format!("objetivo{objective_number}_accion{accion_number}")
}

/// Inverse of [`action_id`]: `objetivo3_accion2` → `(3, 2)`
pub fn parse_action_id(id: &str) -> Option<(u32, u32)> {
    let rest = id.strip_prefix("objetivo")?;
    let (objective, accion) = rest.split_once("_accion")?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(objective) || !all_digits(accion) {
        return None;
    }
    Some((objective.parse().ok()?, accion.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_id_roundtrip() {
        let id = action_id(4, 12);
        assert_eq!(id, "objetivo4_accion12");
        assert_eq!(parse_action_id(&id), Some((4, 12)));
    }

    #[test]
    fn test_parse_action_id_rejects_malformed() {
        assert_eq!(parse_action_id("objetivo_accion1"), None);
        assert_eq!(parse_action_id("objetivo1accion1"), None);
        assert_eq!(parse_action_id("objetivo1_accion1x"), None);
        assert_eq!(parse_action_id("accion1_objetivo1"), None);
    }

    #[test]
    fn test_maturity_level_serializes_snake_case() {
        let json = serde_json::to_string(&MaturityLevel::EnDesarrollo).unwrap();
        assert_eq!(json, "\"en_desarrollo\"");
        assert_eq!("En Desarrollo".parse::<MaturityLevel>(), Ok(MaturityLevel::EnDesarrollo));
        assert!("experto".parse::<MaturityLevel>().is_err());
    }

    #[test]
    fn test_accion_section_omits_levels_in_json() {
        let section = Section {
            section_type: SectionType::Accion,
            questions: vec!["¿Cómo se organiza?".to_string()],
            levels: None,
        };
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["type"], "accion");
        assert!(value.get("levels").is_none());
    }

    #[test]
    fn test_total_sections_computed_from_tree() {
        let section = Section {
            section_type: SectionType::Accion,
            questions: vec!["¿Q?".to_string()],
            levels: None,
        };
        let action = Action::new(1, 1, "Desc".to_string(), vec![section.clone(), section]);
        let parsed = ParsedArea::new(
            "personalizacion",
            vec![Objective {
                number: 1,
                title: "Obj".to_string(),
                actions: vec![action],
            }],
        );
        assert_eq!(parsed.total_sections, 2);
        assert_eq!(parsed.section_count(), 2);
        assert_eq!(parsed.action_count(), 1);
        assert!(parsed.find_action("objetivo1_accion1").is_some());
    }
}
