use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a capable multilingual assistant. \
Detect the language of each message and answer in that language. \
When the conversation context includes the current local time, use it for \
time and date questions instead of guessing. Prefer clear, structured answers.";

/// User-editable configuration file. Every key is optional; built-in
/// defaults apply for anything left unset.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    pub text_model: Option<String>,
    pub vision_model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Number of user/assistant exchanges retained for context
    pub history_window: Option<usize>,
    pub system_prompt: Option<String>,
}

impl Config {
    pub fn history_window(&self) -> usize {
        self.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW)
    }
}

/// The model binding a conversation runs against. Replaced wholesale on a
/// model switch, never mutated field-by-field, so an in-flight exchange
/// always observes one consistent snapshot.
#[derive(Debug, Clone)]
pub struct ModelConfiguration {
    pub text_model: String,
    pub vision_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
}

impl ModelConfiguration {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text_model: config
                .text_model
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: config
                .vision_model
                .clone()
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    /// Fresh configuration with the model ids replaced and everything else
    /// carried over.
    pub fn with_models(&self, text_model: &str, vision_model: &str) -> Self {
        Self {
            text_model: text_model.to_string(),
            vision_model: vision_model.to_string(),
            ..self.clone()
        }
    }

    /// Apply command-line overrides on top of the file-backed values.
    pub fn with_overrides(
        mut self,
        text_model: Option<String>,
        vision_model: Option<String>,
    ) -> Self {
        if let Some(model) = text_model.filter(|m| !m.is_empty()) {
            self.text_model = model;
        }
        if let Some(model) = vision_model.filter(|m| !m.is_empty()) {
            self.vision_model = model;
        }
        self
    }
}

/// Get a user-friendly display string for a path, shortening the home
/// directory to `~` on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_keys() {
        let model_config = ModelConfiguration::from_config(&Config::default());
        assert_eq!(model_config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(model_config.vision_model, DEFAULT_VISION_MODEL);
        assert_eq!(model_config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(Config::default().history_window(), DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = Config {
            text_model: Some("llama3-70b-8192".to_string()),
            temperature: Some(0.2),
            ..Default::default()
        };
        let model_config = ModelConfiguration::from_config(&config);
        assert_eq!(model_config.text_model, "llama3-70b-8192");
        assert_eq!(model_config.temperature, 0.2);
        assert_eq!(model_config.vision_model, DEFAULT_VISION_MODEL);
    }

    #[test]
    fn with_models_replaces_only_the_model_ids() {
        let base = ModelConfiguration::from_config(&Config::default());
        let switched = base.with_models("llama-3.1-70b-versatile", "gemini-2.0-flash-lite");
        assert_eq!(switched.text_model, "llama-3.1-70b-versatile");
        assert_eq!(switched.max_tokens, base.max_tokens);
        assert_eq!(switched.system_prompt, base.system_prompt);
    }

    #[test]
    fn cli_overrides_win_when_present() {
        let base = ModelConfiguration::from_config(&Config::default());
        let overridden = base
            .clone()
            .with_overrides(Some("llama3-70b-8192".to_string()), None);
        assert_eq!(overridden.text_model, "llama3-70b-8192");
        assert_eq!(overridden.vision_model, base.vision_model);

        let untouched = base.clone().with_overrides(Some(String::new()), None);
        assert_eq!(untouched.text_model, base.text_model);
    }
}
