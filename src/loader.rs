//! Resource loading transports.
//!
//! A loader fetches the raw JSON resource document for one language from
//! `<base>/<lang>.json` and parses it. Loaders perform exactly one I/O
//! operation per call; caching and load deduplication are the engine's
//! responsibility.

use std::path::PathBuf;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TranslationError;

/// Fetches the raw resource document for one language.
pub trait ResourceLoader: Send + Sync {
    /// Fetch and parse the resource document for `lang`.
    ///
    /// # Errors
    /// - [`TranslationError::ResourceUnavailable`] when the resource
    ///   cannot be reached (missing file, non-2xx response).
    /// - [`TranslationError::Parse`] when the content is not valid JSON.
    fn load<'a>(&'a self, lang: &'a str) -> BoxFuture<'a, Result<Value, TranslationError>>;
}

/// Loads `<assets_path>/<lang>.json` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLoader {
    /// Base directory containing the per-language resource files.
    assets_path: PathBuf,
}

impl FsLoader {
    /// Creates a loader rooted at `assets_path`.
    #[must_use]
    pub fn new(assets_path: impl Into<PathBuf>) -> Self {
        Self { assets_path: assets_path.into() }
    }
}

impl ResourceLoader for FsLoader {
    fn load<'a>(&'a self, lang: &'a str) -> BoxFuture<'a, Result<Value, TranslationError>> {
        let path = self.assets_path.join(format!("{lang}.json"));
        async move {
            let location = path.display().to_string();
            tracing::debug!(lang, location = %location, "Reading translation resource");

            let content = tokio::fs::read_to_string(&path).await.map_err(|err| {
                TranslationError::ResourceUnavailable {
                    lang: lang.to_string(),
                    location: location.clone(),
                    reason: err.to_string(),
                }
            })?;

            parse_document(lang, &location, &content)
        }
        .boxed()
    }
}

/// Loads `<base_url>/<lang>.json` over HTTP.
///
/// Any non-2xx response is a [`TranslationError::ResourceUnavailable`].
#[derive(Debug, Clone)]
pub struct HttpLoader {
    /// Base URL under which the per-language resource files are served.
    base_url: String,
    client: reqwest::Client,
}

impl HttpLoader {
    /// Creates a loader fetching from `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl ResourceLoader for HttpLoader {
    fn load<'a>(&'a self, lang: &'a str) -> BoxFuture<'a, Result<Value, TranslationError>> {
        let url = format!("{}/{lang}.json", self.base_url);
        async move {
            tracing::debug!(lang, url = %url, "Fetching translation resource");

            let unavailable = |reason: String| TranslationError::ResourceUnavailable {
                lang: lang.to_string(),
                location: url.clone(),
                reason,
            };

            let response =
                self.client.get(&url).send().await.map_err(|err| unavailable(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(unavailable(format!("HTTP status {status}")));
            }

            let body = response.text().await.map_err(|err| unavailable(err.to_string()))?;
            parse_document(lang, &url, &body)
        }
        .boxed()
    }
}

/// Parses fetched resource content as a JSON document.
fn parse_document(lang: &str, location: &str, content: &str) -> Result<Value, TranslationError> {
    serde_json::from_str(content).map_err(|err| TranslationError::Parse {
        lang: lang.to_string(),
        location: location.to_string(),
        reason: err.to_string(),
    })
}
