//! Built-in model catalog
//!
//! The known-good model ids ship inside the binary via builtin_models.toml.
//! The catalog gates interactive model switches; the config file and CLI
//! flags may still name anything for custom endpoints.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelCatalog {
    pub text: Vec<String>,
    pub vision: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    models: ModelCatalog,
}

impl ModelCatalog {
    pub fn has_text_model(&self, id: &str) -> bool {
        self.text.iter().any(|m| m.eq_ignore_ascii_case(id))
    }

    pub fn has_vision_model(&self, id: &str) -> bool {
        self.vision.iter().any(|m| m.eq_ignore_ascii_case(id))
    }
}

/// Load the catalog embedded at build time.
pub fn load_model_catalog() -> ModelCatalog {
    const CATALOG_CONTENT: &str = include_str!("../builtin_models.toml");

    let parsed: CatalogFile =
        toml::from_str(CATALOG_CONTENT).expect("Failed to parse builtin_models.toml");
    parsed.models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_the_default_models() {
        let catalog = load_model_catalog();
        assert!(catalog.has_text_model("llama-3.3-70b-versatile"));
        assert!(catalog.has_vision_model("gemini-2.0-flash-lite"));
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let catalog = load_model_catalog();
        assert!(catalog.has_text_model("LLAMA-3.3-70B-VERSATILE"));
        assert!(!catalog.has_text_model("gpt-nonexistent"));
    }

    #[test]
    fn catalog_entries_are_well_formed() {
        let catalog = load_model_catalog();
        assert!(!catalog.text.is_empty());
        assert!(!catalog.vision.is_empty());
        for id in catalog.text.iter().chain(catalog.vision.iter()) {
            assert!(!id.is_empty());
            assert!(!id.contains(char::is_whitespace));
        }
    }
}
