use crate::error::RubricError;
use crate::types::{MaturityLevel, SectionType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

// Default value functions for serde
fn default_areas() -> Vec<AreaConfig> {
    [
        ("personalizacion", "Personalización"),
        ("aprendizaje", "Aprendizaje"),
        ("evaluacion", "Evaluación"),
        ("proposito", "Propósito"),
        ("familias", "Familias"),
        ("trabajo_docente", "Trabajo Docente"),
        ("liderazgo", "Liderazgo"),
    ]
    .into_iter()
    .map(|(id, name)| AreaConfig {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn default_objective_pattern() -> String {
    // "OBJETIVO 2: Title", "Objetivo 2 - Title", bare "OBJETIVO 2"
    r"(?i)^objetivo\s+(\d+)\s*(?:[:.\-–—]\s*(.*))?$".to_string()
}

fn default_action_pattern() -> String {
    r"(?i)^acci[óo]n\s+(\d+)\s*(?:[:.\-–—]\s*(.*))?$".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Areas a document may be parsed as
    #[serde(default = "default_areas")]
    pub areas: Vec<AreaConfig>,
    /// Regexes recognising objective and action headings
    #[serde(default)]
    pub headings: HeadingPatterns,
    /// Sub-heading keywords mapped to section types
    #[serde(default)]
    pub section_keywords: SectionKeywords,
    /// Labels introducing each maturity level descriptor
    #[serde(default)]
    pub level_markers: LevelMarkers,
    /// Accept objectives without actions instead of failing
    #[serde(default)]
    pub allow_empty_objectives: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaConfig {
    pub id: String,
    pub name: String,
}

/// Both patterns must capture the declared number in group 1 and the
/// optional heading text in group 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingPatterns {
    #[serde(default = "default_objective_pattern")]
    pub objective: String,
    #[serde(default = "default_action_pattern")]
    pub action: String,
}

impl Default for HeadingPatterns {
    fn default() -> Self {
        Self {
            objective: default_objective_pattern(),
            action: default_action_pattern(),
        }
    }
}

/// Keywords are compared lowercase against the sub-heading text.
/// No accent or misspelling tolerance beyond what is listed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionKeywords {
    pub accion: Vec<String>,
    pub cobertura: Vec<String>,
    pub frecuencia: Vec<String>,
    pub profundidad: Vec<String>,
}

impl Default for SectionKeywords {
    fn default() -> Self {
        Self {
            accion: strings(&["acción", "preguntas abiertas"]),
            cobertura: strings(&["cobertura"]),
            frecuencia: strings(&["frecuencia"]),
            profundidad: strings(&["profundidad"]),
        }
    }
}

impl SectionKeywords {
    pub fn for_type(&self, section_type: SectionType) -> &[String] {
        match section_type {
            SectionType::Accion => &self.accion,
            SectionType::Cobertura => &self.cobertura,
            SectionType::Frecuencia => &self.frecuencia,
            SectionType::Profundidad => &self.profundidad,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelMarkers {
    pub incipiente: Vec<String>,
    pub en_desarrollo: Vec<String>,
    pub avanzado: Vec<String>,
    pub consolidado: Vec<String>,
}

impl Default for LevelMarkers {
    fn default() -> Self {
        Self {
            incipiente: strings(&["incipiente"]),
            en_desarrollo: strings(&["en desarrollo"]),
            avanzado: strings(&["avanzado"]),
            consolidado: strings(&["consolidado"]),
        }
    }
}

impl LevelMarkers {
    pub fn for_level(&self, level: MaturityLevel) -> &[String] {
        match level {
            MaturityLevel::Incipiente => &self.incipiente,
            MaturityLevel::EnDesarrollo => &self.en_desarrollo,
            MaturityLevel::Avanzado => &self.avanzado,
            MaturityLevel::Consolidado => &self.consolidado,
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            areas: default_areas(),
            headings: HeadingPatterns::default(),
            section_keywords: SectionKeywords::default(),
            level_markers: LevelMarkers::default(),
            allow_empty_objectives: false,
        }
    }
}

impl ParsingConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: ParsingConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {p} ({e:#}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Resolve an area identifier, failing fast on anything unregistered
    pub fn resolve_area(&self, area: &str) -> std::result::Result<&AreaConfig, RubricError> {
        let wanted = area.trim();
        self.areas
            .iter()
            .find(|a| a.id == wanted)
            .ok_or_else(|| RubricError::UnknownArea {
                area: area.to_string(),
                known: self.area_ids().join(", "),
            })
    }

    pub fn area_ids(&self) -> Vec<&str> {
        self.areas.iter().map(|a| a.id.as_str()).collect()
    }
}
