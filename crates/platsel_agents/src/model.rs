//! Model settings attached to every agent.

use serde::{Deserialize, Serialize};

/// Model used when neither the config file nor the environment names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Sampling settings handed to the model runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.2,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"model": "small", "temperature": 0.0}"#).unwrap();
        assert_eq!(config.model, "small");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.top_p, 0.95);
    }
}
