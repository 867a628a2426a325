use crate::processor::ProcessedArea;
use crate::types::*;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Flat output: the section list tagged with its format and schema version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatDocument {
    pub format: String,
    pub schema_version: String,
    pub area: String,
    pub sections: Vec<FlattenedSection>,
}

impl ProcessedArea {
    pub fn to_flat_format(&self) -> FlatDocument {
        FlatDocument {
            format: "flat".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            area: self.parsed.area.clone(),
            sections: self.flattened.clone(),
        }
    }

    /// JSON for one output format: `tree` (default), `flat` or `profile`
    pub fn to_json(&self, format: &str) -> Result<String> {
        let json = match format {
            "flat" => serde_json::to_string_pretty(&self.to_flat_format())?,
            "profile" => serde_json::to_string_pretty(&self.profile)?,
            "tree" => serde_json::to_string_pretty(&self.parsed)?,
            other => {
                log::warn!("Unknown output format '{other}', writing tree");
                serde_json::to_string_pretty(&self.parsed)?
            }
        };
        Ok(json)
    }

    pub fn save_with_format(&self, path: &str, format: &str) -> Result<()> {
        let json = self.to_json(format)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {path}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::RubricProcessor;
    use crate::config::ParsingConfig;

    const SOURCE: &str = "\
OBJETIVO 1: Comunicación con las familias
ACCIÓN 1: Reuniones trimestrales
PREGUNTAS ABIERTAS
¿Qué temas se tratan?
COBERTURA
¿Cuántas familias asisten?
Incipiente: Muy pocas.
En desarrollo: Algunas.
Avanzado: La mayoría.
Consolidado: Todas.
FRECUENCIA
¿Con qué regularidad?
Incipiente: Nunca.
En desarrollo: Una vez.
Avanzado: Cada trimestre.
Consolidado: Cada mes.
PROFUNDIDAD
¿Qué se acuerda?
Incipiente: Nada.
En desarrollo: Temas sueltos.
Avanzado: Compromisos.
Consolidado: Planes conjuntos con seguimiento.
";

    fn processed() -> ProcessedArea {
        RubricProcessor::new(&ParsingConfig::default())
            .unwrap()
            .process_str(SOURCE, "familias")
            .unwrap()
    }

    #[test]
    fn test_flat_format_is_tagged() {
        let value: serde_json::Value =
            serde_json::from_str(&processed().to_json("flat").unwrap()).unwrap();
        assert_eq!(value["format"], "flat");
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["sections"].as_array().unwrap().len(), 4);
        assert_eq!(value["sections"][1]["section"]["type"], "cobertura");
    }

    #[test]
    fn test_tree_roundtrips_and_unknown_format_falls_back() {
        let processed = processed();
        let tree = processed.to_json("tree").unwrap();
        let back: ParsedArea = serde_json::from_str(&tree).unwrap();
        assert_eq!(back, processed.parsed);
        assert_eq!(processed.to_json("graphml").unwrap(), tree);
    }

    #[test]
    fn test_save_profile_to_disk() {
        let path = std::env::temp_dir().join(format!("rubrica-profile-{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        processed().save_with_format(&path, "profile").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let profile: crate::outputs::AreaProfile = serde_json::from_str(&written).unwrap();
        assert_eq!(profile.area, "familias");
        assert_eq!(profile.total_sections, 4);
    }
}
