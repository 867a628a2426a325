// All parsing functionality is in rubrica-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod report;

// Re-export core types for convenience
pub use rubrica_core::*;

use std::path::Path;

/// Área id implied by a document path: its file stem
pub fn area_from_path(input: &str) -> Option<String> {
    Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Output path used when `--output` is not given
pub fn default_output_path(input: &str, format: &str) -> String {
    let stem = area_from_path(input).unwrap_or_else(|| "output".to_string());
    match format {
        "flat" | "profile" => format!("{stem}_{format}.json"),
        _ => format!("{stem}_rubrica.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_from_path() {
        assert_eq!(area_from_path("docs/aprendizaje.md").as_deref(), Some("aprendizaje"));
        assert_eq!(area_from_path("familias").as_deref(), Some("familias"));
        assert_eq!(area_from_path(""), None);
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path("x/liderazgo.md", "tree"), "liderazgo_rubrica.json");
        assert_eq!(default_output_path("x/liderazgo.md", "flat"), "liderazgo_flat.json");
        assert_eq!(default_output_path("x/liderazgo.md", "nonsense"), "liderazgo_rubrica.json");
    }
}
