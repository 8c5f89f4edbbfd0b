//! Process-wide translation storage and resource flattening.

use std::collections::HashMap;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use serde_json::Value;

use crate::types::{
    LanguageId,
    TranslationMap,
};

/// Map from language to its loaded translation data.
///
/// The source of truth once a language has loaded. Owned exclusively by
/// the engine: entries are created when a load finishes, replaced
/// wholesale on reload (never merged), and removed only by [`clear`].
/// Reads are synchronous and never suspend.
///
/// [`clear`]: TranslationStore::clear
#[derive(Debug, Default)]
pub struct TranslationStore {
    maps: RwLock<HashMap<LanguageId, Arc<TranslationMap>>>,
}

impl TranslationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded data for `lang`, if present.
    #[must_use]
    pub fn get(&self, lang: &str) -> Option<Arc<TranslationMap>> {
        self.read().get(lang).cloned()
    }

    /// Whether `lang` has finished loading.
    #[must_use]
    pub fn contains(&self, lang: &str) -> bool {
        self.read().contains_key(lang)
    }

    /// Stores `data` for `lang`, replacing any previous entry.
    pub fn insert(&self, lang: LanguageId, data: Arc<TranslationMap>) {
        self.write().insert(lang, data);
    }

    /// Languages that have finished loading, sorted.
    #[must_use]
    pub fn loaded_languages(&self) -> Vec<LanguageId> {
        let mut langs: Vec<_> = self.read().keys().cloned().collect();
        langs.sort_unstable();
        langs
    }

    /// Removes every stored language.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<LanguageId, Arc<TranslationMap>>> {
        self.maps.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<LanguageId, Arc<TranslationMap>>> {
        self.maps.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Flattens a resource document into dot-separated keys.
///
/// Flat documents of string values pass through unchanged; nested objects
/// contribute their dot-joined paths. Leaves that are not strings are
/// skipped, so lookups treat them as absent.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use i18n_engine::store::flatten_document;
///
/// let document = json!({
///     "auth": {
///         "login": "Sign in",
///         "logout": "Sign out"
///     }
/// });
///
/// let map = flatten_document(&document);
/// assert_eq!(map.get("auth.login"), Some(&"Sign in".to_string()));
/// ```
#[must_use]
pub fn flatten_document(document: &Value) -> TranslationMap {
    let mut result = TranslationMap::new();
    flatten_value(document, None, &mut result);
    result
}

fn flatten_value(value: &Value, prefix: Option<&str>, result: &mut TranslationMap) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let full_key = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
                flatten_value(value, Some(&full_key), result);
            }
        }
        Value::String(text) => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), text.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                tracing::trace!(key, "Skipping non-string leaf in resource document");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_nested_document() {
        let document = json!({
            "auth": {
                "login": "Sign in",
                "errors": { "expired": "Session expired" }
            },
            "welcome": "Welcome"
        });

        let map = flatten_document(&document);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("auth.login"), Some(&"Sign in".to_string()));
        assert_eq!(map.get("auth.errors.expired"), Some(&"Session expired".to_string()));
        assert_eq!(map.get("welcome"), Some(&"Welcome".to_string()));
    }

    #[test]
    fn test_flatten_flat_document_passes_through() {
        let document = json!({ "auth.login": "Sign in" });

        let map = flatten_document(&document);

        assert_eq!(map.get("auth.login"), Some(&"Sign in".to_string()));
    }

    #[test]
    fn test_flatten_skips_non_string_leaves() {
        let document = json!({ "count": 3, "flag": true, "name": "ok" });

        let map = flatten_document(&document);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("name"), Some(&"ok".to_string()));
    }

    #[test]
    fn test_flatten_empty_document() {
        assert!(flatten_document(&json!({})).is_empty());
    }

    #[test]
    fn test_store_insert_get_and_replace() {
        let store = TranslationStore::new();
        let first = Arc::new(TranslationMap::from([("k".to_string(), "v1".to_string())]));
        let second = Arc::new(TranslationMap::from([("k".to_string(), "v2".to_string())]));

        store.insert("en".to_string(), first);
        assert_eq!(store.get("en").unwrap().get("k"), Some(&"v1".to_string()));

        store.insert("en".to_string(), second);
        assert_eq!(store.get("en").unwrap().get("k"), Some(&"v2".to_string()));
    }

    #[test]
    fn test_store_loaded_languages_sorted() {
        let store = TranslationStore::new();
        store.insert("vi".to_string(), Arc::new(TranslationMap::new()));
        store.insert("en".to_string(), Arc::new(TranslationMap::new()));

        assert_eq!(store.loaded_languages(), vec!["en".to_string(), "vi".to_string()]);
    }

    #[test]
    fn test_store_clear_removes_everything() {
        let store = TranslationStore::new();
        store.insert("en".to_string(), Arc::new(TranslationMap::new()));

        store.clear();

        assert!(!store.contains("en"));
        assert!(store.loaded_languages().is_empty());
    }
}
