//! End-to-end tests for the localization engine.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use futures::FutureExt;
use futures::future::BoxFuture;
use i18n_engine::{
    EngineConfig,
    EngineState,
    I18nEngine,
    Params,
    ResourceLoader,
    TranslationError,
};
use pretty_assertions::assert_eq;
use serde_json::{
    Value,
    json,
};
use tempfile::TempDir;
use tokio::sync::Notify;

fn config(default: &str, fallback: Option<&str>, supports: &[&str]) -> EngineConfig {
    EngineConfig {
        default_language: default.to_string(),
        fallback_language: fallback.map(ToString::to_string),
        language_supports: supports.iter().map(ToString::to_string).collect(),
        ..EngineConfig::default()
    }
}

/// Serves in-memory documents, counting loader invocations per call and
/// optionally holding each load until released.
struct CountingLoader {
    documents: HashMap<String, Value>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl CountingLoader {
    fn new(entries: &[(&str, Value)]) -> Arc<Self> {
        Arc::new(Self {
            documents: entries.iter().map(|(l, d)| ((*l).to_string(), d.clone())).collect(),
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    fn gated(entries: &[(&str, Value)], gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            documents: entries.iter().map(|(l, d)| ((*l).to_string(), d.clone())).collect(),
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceLoader for CountingLoader {
    fn load<'a>(&'a self, lang: &'a str) -> BoxFuture<'a, Result<Value, TranslationError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.documents.get(lang).cloned().ok_or_else(|| {
                TranslationError::ResourceUnavailable {
                    lang: lang.to_string(),
                    location: format!("memory://{lang}.json"),
                    reason: "not found".to_string(),
                }
            })
        }
        .boxed()
    }
}

/// Fails a configured number of times before serving the document.
struct FlakyLoader {
    document: Value,
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyLoader {
    fn new(document: Value, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            document,
            failures_left: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        })
    }
}

impl ResourceLoader for FlakyLoader {
    fn load<'a>(&'a self, lang: &'a str) -> BoxFuture<'a, Result<Value, TranslationError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok() {
                return Err(TranslationError::ResourceUnavailable {
                    lang: lang.to_string(),
                    location: format!("memory://{lang}.json"),
                    reason: "transient failure".to_string(),
                });
            }
            Ok(self.document.clone())
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_single_flight_collapses_concurrent_loads() {
    let gate = Arc::new(Notify::new());
    let loader = CountingLoader::gated(&[("vi", json!({"hello": "xin chào"}))], Arc::clone(&gate));
    let engine =
        I18nEngine::with_loader(config("en", None, &["en", "vi"]), loader.clone())
            .unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.load_language("vi").await })
        })
        .collect();

    // let every task reach the pending table before releasing the load
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    gate.notify_waiters();

    let mut maps = Vec::new();
    for task in tasks {
        maps.push(task.await.unwrap().unwrap());
    }

    assert_eq!(loader.calls(), 1);
    for map in &maps {
        assert!(Arc::ptr_eq(map, maps.first().unwrap()));
    }
}

#[tokio::test]
async fn test_subsequent_load_uses_cache_without_io() {
    let loader = CountingLoader::new(&[("vi", json!({"k": "v"}))]);
    let engine =
        I18nEngine::with_loader(config("en", None, &["en", "vi"]), loader.clone())
            .unwrap();

    engine.load_language("vi").await.unwrap();
    engine.load_language("vi").await.unwrap();
    engine.set_language("vi").await.unwrap();

    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_failed_load_is_not_cached() {
    let loader = FlakyLoader::new(json!({"k": "v"}), 1);
    let engine = I18nEngine::with_loader(config("en", None, &["en"]), loader.clone())
        .unwrap();

    let first = engine.set_language("en").await;
    assert!(matches!(first, Err(TranslationError::ResourceUnavailable { .. })));
    assert_eq!(engine.state(), EngineState::Error("en".to_string()));

    let second = engine.set_language("en").await.unwrap();
    assert_eq!(second.get("k"), Some(&"v".to_string()));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.state(), EngineState::Ready("en".to_string()));
}

#[tokio::test]
async fn test_fallback_resolution() {
    let loader = CountingLoader::new(&[("en", json!({"k": "hello"})), ("vi", json!({}))]);
    let engine = I18nEngine::with_loader(
        config("vi", Some("en"), &["en", "vi"]),
        loader.clone(),
    )
    .unwrap();
    engine.load_language("en").await.unwrap();
    engine.set_language("vi").await.unwrap();

    assert_eq!(engine.get("k", None), "hello");
}

#[tokio::test]
async fn test_key_miss_without_fallback_returns_literal_key() {
    let loader = CountingLoader::new(&[("en", json!({"k": "v"}))]);
    let engine = I18nEngine::with_loader(config("en", None, &["en"]), loader.clone())
        .unwrap();
    engine.set_language("en").await.unwrap();

    assert_eq!(engine.get("no.such.key", None), "no.such.key");
}

#[tokio::test]
async fn test_end_to_end_scenario_with_fs_loader() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("en.json"),
        r#"{"welcome": "Welcome", "greeting": "Hello ${name}"}"#,
    )
    .unwrap();
    fs::write(dir.path().join("vi.json"), "{}").unwrap();

    let engine = I18nEngine::new(EngineConfig {
        assets_path: dir.path().display().to_string(),
        ..config("en", Some("en"), &["en", "vi"])
    })
    .unwrap();

    engine.set_language("en").await.unwrap();
    let params = Params::named([("name", "John")]);
    assert_eq!(engine.get("welcome", None), "Welcome");
    assert_eq!(engine.get("greeting", Some(&params)), "Hello John");

    // vi loads successfully but is empty; keys fall back to en
    engine.set_language("vi").await.unwrap();
    assert_eq!(engine.current_language(), "vi");
    assert_eq!(engine.get("greeting", Some(&params)), "Hello John");
}

#[tokio::test]
async fn test_change_notification_carries_new_language_data() {
    let loader = CountingLoader::new(&[("vi", json!({"hello": "xin chào"}))]);
    let engine =
        I18nEngine::with_loader(config("en", None, &["en", "vi"]), loader.clone())
            .unwrap();
    let mut subscription = engine.subscribe();
    assert!(subscription.borrow().is_none());

    engine.set_language("vi").await.unwrap();

    subscription.changed().await.unwrap();
    let event = subscription.borrow_and_update().clone().unwrap();
    assert_eq!(event.lang, "vi");
    assert_eq!(event.data.get("hello"), Some(&"xin chào".to_string()));
}

#[tokio::test]
async fn test_late_subscriber_replays_most_recent_event() {
    let loader = CountingLoader::new(&[("vi", json!({"k": "v"}))]);
    let engine =
        I18nEngine::with_loader(config("en", None, &["en", "vi"]), loader.clone())
            .unwrap();
    engine.set_language("vi").await.unwrap();

    let subscription = engine.subscribe();

    let event = subscription.borrow().clone().unwrap();
    assert_eq!(event.lang, "vi");
}

#[tokio::test]
async fn test_no_emission_on_failed_change() {
    let loader = CountingLoader::new(&[("en", json!({"k": "v"}))]);
    let engine =
        I18nEngine::with_loader(config("en", None, &["en", "vi"]), loader.clone())
            .unwrap();
    let subscription = engine.subscribe();

    let _ = engine.set_language("vi").await;

    assert!(subscription.borrow().is_none());
}

#[tokio::test]
async fn test_stream_yields_initial_value_then_one_per_change() {
    let loader = CountingLoader::new(&[
        ("en", json!({"greeting": "Hello ${name}"})),
        ("vi", json!({"greeting": "Chào ${name}"})),
    ]);
    let engine = I18nEngine::with_loader(
        config("en", Some("en"), &["en", "vi"]),
        loader.clone(),
    )
    .unwrap();
    engine.init().await.unwrap();

    let mut stream = engine.stream("greeting", Some(Params::named([("name", "Ann")])));
    assert_eq!(stream.next().await.unwrap(), "Hello Ann");

    engine.set_language("vi").await.unwrap();
    assert_eq!(stream.next().await.unwrap(), "Chào Ann");

    engine.destroy();
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn test_destroy_discards_in_flight_load_results() {
    let gate = Arc::new(Notify::new());
    let loader = CountingLoader::gated(&[("en", json!({"k": "v"}))], Arc::clone(&gate));
    let engine = I18nEngine::with_loader(config("en", None, &["en"]), loader.clone())
        .unwrap();

    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_language("en").await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    engine.destroy();
    gate.notify_waiters();

    // the waiter still observes the settled outcome, but the store keeps
    // no trace of it
    let result = task.await.unwrap().unwrap();
    assert_eq!(result.get("k"), Some(&"v".to_string()));
    assert!(engine.loaded_languages().is_empty());
    assert!(!engine.is_loading());
}

#[tokio::test]
async fn test_destroy_stops_emissions() {
    let loader = CountingLoader::new(&[("en", json!({"k": "v"}))]);
    let engine = I18nEngine::with_loader(config("en", None, &["en"]), loader.clone())
        .unwrap();
    let mut subscription = engine.subscribe();

    engine.destroy();

    assert!(subscription.changed().await.is_err());
    assert!(matches!(engine.set_language("en").await, Err(TranslationError::Config(_))));
}

#[tokio::test]
async fn test_is_loading_is_advisory_and_settles() {
    let gate = Arc::new(Notify::new());
    let loader = CountingLoader::gated(&[("en", json!({}))], Arc::clone(&gate));
    let engine = I18nEngine::with_loader(config("en", None, &["en"]), loader.clone())
        .unwrap();
    assert!(!engine.is_loading());

    let task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.load_language("en").await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(engine.is_loading());

    gate.notify_waiters();
    task.await.unwrap().unwrap();
    assert!(!engine.is_loading());
}
