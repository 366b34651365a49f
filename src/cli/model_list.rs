//! Model listing
//!
//! The catalog is built into the binary; listing it needs no credentials
//! and no network.

use std::error::Error;

use crate::core::catalog::{load_model_catalog, ModelCatalog};
use crate::core::config::{Config, ModelConfiguration};

pub fn render_model_catalog(catalog: &ModelCatalog) -> String {
    let mut out = String::from("Text models:\n");
    for model in &catalog.text {
        out.push_str(&format!("  • {model}\n"));
    }
    out.push_str("Vision models:\n");
    for model in &catalog.vision {
        out.push_str(&format!("  • {model}\n"));
    }
    out
}

pub fn list_models() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let model_config = ModelConfiguration::from_config(&config);
    let catalog = load_model_catalog();

    println!("🤖 Available Models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("🎯 Default text model: {}", model_config.text_model);
    println!("🎯 Default vision model: {}", model_config.vision_model);
    println!();
    print!("{}", render_model_catalog(&catalog));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_lists_both_model_families() {
        let catalog = load_model_catalog();
        let rendered = render_model_catalog(&catalog);
        assert!(rendered.contains("Text models:"));
        assert!(rendered.contains("Vision models:"));
        assert!(rendered.contains("llama-3.3-70b-versatile"));
        assert!(rendered.contains("gemini-2.0-flash-lite"));
    }
}
