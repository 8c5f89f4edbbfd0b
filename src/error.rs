//! Error taxonomy for engine operations.

use thiserror::Error;

use crate::types::LanguageId;

/// Errors surfaced by engine operations.
///
/// Cloneable so that every caller sharing a single in-flight load observes
/// the same settled error. Missing individual keys are not errors: lookups
/// degrade to returning the raw key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The requested language is not in the configured allow-list.
    #[error("language \"{lang}\" is not supported (supported: {})", .supported.join(", "))]
    UnsupportedLanguage {
        /// The rejected language.
        lang: LanguageId,
        /// The configured allow-list.
        supported: Vec<LanguageId>,
    },

    /// The resource could not be fetched: missing file or non-2xx response.
    ///
    /// Never cached; the next load attempt for the same language starts
    /// fresh.
    #[error("translation resource for \"{lang}\" unavailable at {location}: {reason}")]
    ResourceUnavailable {
        /// The language whose resource was requested.
        lang: LanguageId,
        /// The attempted file path or URL.
        location: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The resource was fetched but is not a valid JSON document.
    #[error("failed to parse translation resource for \"{lang}\" at {location}: {reason}")]
    Parse {
        /// The language whose resource was fetched.
        lang: LanguageId,
        /// The file path or URL that was fetched.
        location: String,
        /// Parser failure description.
        reason: String,
    },

    /// Invalid engine configuration, or an operation on a destroyed engine.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
