//! Core types used throughout the engine.

use std::collections::HashMap;
use std::sync::Arc;

/// Identifier for a language/locale variant (e.g. "en", "vi").
///
/// Compared by exact string match; no case or region-subtag normalization
/// is performed.
pub type LanguageId = String;

/// Resolved key → string data for one language.
///
/// Keys are flat and dot-separated (e.g. "auth.login"). Nested resource
/// documents are flattened into this form when loaded, so flat and
/// dot-path addressing behave identically.
pub type TranslationMap = HashMap<String, String>;

/// Event published to subscribers whenever the active language finishes
/// changing.
#[derive(Debug, Clone)]
pub struct LanguageChangeEvent {
    /// The now-active language.
    pub lang: LanguageId,
    /// Translation data of the now-active language.
    pub data: Arc<TranslationMap>,
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// No language change has been requested yet.
    Uninitialized,
    /// A language change is in progress.
    Loading(LanguageId),
    /// The language loaded successfully and is active.
    Ready(LanguageId),
    /// The most recent language change failed. The previously active
    /// language, if any, is still in effect.
    Error(LanguageId),
}

impl EngineState {
    /// Returns `true` while a language change is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// The language this state refers to, if any.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        match self {
            Self::Uninitialized => None,
            Self::Loading(lang) | Self::Ready(lang) | Self::Error(lang) => Some(lang.as_str()),
        }
    }
}
