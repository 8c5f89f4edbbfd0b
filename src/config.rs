//! Engine configuration.

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::TranslationError;
use crate::types::LanguageId;

/// Which interpolation strategy runs for a translate call.
///
/// Mutable at runtime via the engine; a change affects subsequent calls
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMethod {
    /// Single-pass segment/value reconstruction (the primary strategy).
    StrategyA,
    /// Independent replacement passes (the fallback strategy).
    StrategyB,
    /// Try strategy A; on a malformed template log and fall back to
    /// strategy B.
    #[default]
    Auto,
}

/// Configuration for [`crate::I18nEngine`].
///
/// Deserializable from the camelCase wire form, e.g.
/// `{"defaultLanguage": "en", "languageSupports": ["en", "vi"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// The initially active language.
    pub default_language: LanguageId,

    /// Secondary language consulted when a key is absent in the active
    /// language's map. `None` disables fallback resolution.
    pub fallback_language: Option<LanguageId>,

    /// Base resource location; resources live at
    /// `<assets_path>/<lang>.json`.
    pub assets_path: String,

    /// Allow-list of languages; a language change outside this set fails
    /// with [`TranslationError::UnsupportedLanguage`].
    pub language_supports: Vec<LanguageId>,

    /// Initial interpolation strategy policy.
    pub interpolation_method: InterpolationMethod,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            fallback_language: Some("en".to_string()),
            assets_path: "./assets/i18n".to_string(),
            language_supports: vec!["en".to_string()],
            interpolation_method: InterpolationMethod::Auto,
        }
    }
}

impl EngineConfig {
    /// Checks that the configuration is internally consistent.
    ///
    /// # Errors
    /// [`TranslationError::Config`] when the allow-list is empty, or when
    /// the default or fallback language is outside the allow-list.
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.language_supports.is_empty() {
            return Err(TranslationError::Config(
                "languageSupports must not be empty".to_string(),
            ));
        }
        if !self.is_supported(&self.default_language) {
            return Err(TranslationError::Config(format!(
                "defaultLanguage \"{}\" is not in languageSupports",
                self.default_language
            )));
        }
        if let Some(fallback) = &self.fallback_language {
            if !self.is_supported(fallback) {
                return Err(TranslationError::Config(format!(
                    "fallbackLanguage \"{fallback}\" is not in languageSupports"
                )));
            }
        }
        Ok(())
    }

    /// Whether `lang` is in the allow-list.
    #[must_use]
    pub fn is_supported(&self, lang: &str) -> bool {
        self.language_supports.iter().any(|supported| supported == lang)
    }
}
