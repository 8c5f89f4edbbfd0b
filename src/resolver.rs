//! Key resolution with fallback-language retry.

use crate::store::TranslationStore;

/// Resolves `key` against `lang`, retrying against `fallback` when it is
/// configured, loaded, and differs from `lang`.
///
/// Resolution never triggers a load: a language that is not yet in the
/// store simply misses. The caller decides what a miss degrades to (the
/// facade returns the raw key).
#[must_use]
pub fn resolve(
    store: &TranslationStore,
    lang: &str,
    fallback: Option<&str>,
    key: &str,
) -> Option<String> {
    if let Some(text) = lookup(store, lang, key) {
        return Some(text);
    }

    match fallback {
        Some(fallback) if fallback != lang => {
            let text = lookup(store, fallback, key);
            if text.is_some() {
                tracing::debug!(key, lang, fallback, "Key resolved via fallback language");
            }
            text
        }
        _ => None,
    }
}

/// Looks `key` up in one language's loaded map.
fn lookup(store: &TranslationStore, lang: &str, key: &str) -> Option<String> {
    store.get(lang).and_then(|map| map.get(key).cloned())
}
