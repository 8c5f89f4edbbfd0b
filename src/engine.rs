//! The localization engine facade.
//!
//! Composes the resource loader, single-flight load cache, translation
//! store, key resolver, interpolation engine, and language-change
//! notifier behind one handle. Cloning the handle shares the underlying
//! engine.

use std::collections::HashMap;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
    RwLock,
};

use futures::FutureExt;
use futures::future::{
    BoxFuture,
    Shared,
};
use tokio::sync::watch;

use crate::config::{
    EngineConfig,
    InterpolationMethod,
};
use crate::error::TranslationError;
use crate::interpolate::{
    self,
    Context,
    Params,
};
use crate::loader::{
    FsLoader,
    ResourceLoader,
};
use crate::notifier::LanguageChangeNotifier;
use crate::resolver;
use crate::store::{
    self,
    TranslationStore,
};
use crate::types::{
    EngineState,
    LanguageChangeEvent,
    LanguageId,
    TranslationMap,
};

/// Outcome observed by every caller awaiting the same in-flight load.
type LoadOutcome = Result<Arc<TranslationMap>, TranslationError>;

/// Handle to an in-flight load; clones share one underlying future.
type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

/// The localization engine.
///
/// Resolves translation keys to interpolated strings for the active
/// language, loading per-language resources on demand, collapsing
/// concurrent loads for the same language into one request, falling back
/// to a secondary language on key misses, and notifying subscribers when
/// the active language changes.
///
/// `get` and its variants are synchronous and never trigger a load; a
/// language must have been loaded via [`set_language`] or
/// [`load_language`] before its keys resolve.
///
/// [`set_language`]: I18nEngine::set_language
/// [`load_language`]: I18nEngine::load_language
#[derive(Clone)]
pub struct I18nEngine {
    inner: Arc<EngineInner>,
}

/// Shared state behind the engine handle.
struct EngineInner {
    /// Immutable configuration; the interpolation method has its own
    /// runtime-mutable slot.
    config: EngineConfig,
    /// Strategy policy for subsequent translate calls.
    method: RwLock<InterpolationMethod>,
    /// Injected resource transport.
    loader: Arc<dyn ResourceLoader>,
    /// Loaded translation data per language.
    store: TranslationStore,
    /// At most one in-flight load per language.
    pending: Mutex<HashMap<LanguageId, SharedLoad>>,
    /// The language every translate call reads.
    active: RwLock<LanguageId>,
    /// Facade lifecycle state.
    state: RwLock<EngineState>,
    /// Language-change event fan-out.
    notifier: LanguageChangeNotifier,
    /// Set by [`I18nEngine::destroy`]; settling loads check it before
    /// writing to the store.
    disposed: AtomicBool,
}

impl I18nEngine {
    /// Creates an engine reading resources from the configured
    /// `assets_path` on the local filesystem.
    ///
    /// # Errors
    /// [`TranslationError::Config`] when the configuration is invalid
    /// (empty allow-list, default or fallback language outside it).
    pub fn new(config: EngineConfig) -> Result<Self, TranslationError> {
        let loader = Arc::new(FsLoader::new(config.assets_path.clone()));
        Self::with_loader(config, loader)
    }

    /// Creates an engine with an injected resource transport, e.g.
    /// [`crate::loader::HttpLoader`] for browser-served assets.
    ///
    /// # Errors
    /// [`TranslationError::Config`] when the configuration is invalid.
    pub fn with_loader(
        config: EngineConfig,
        loader: Arc<dyn ResourceLoader>,
    ) -> Result<Self, TranslationError> {
        config.validate()?;
        let inner = EngineInner {
            method: RwLock::new(config.interpolation_method),
            active: RwLock::new(config.default_language.clone()),
            config,
            loader,
            store: TranslationStore::new(),
            pending: Mutex::new(HashMap::new()),
            state: RwLock::new(EngineState::Uninitialized),
            notifier: LanguageChangeNotifier::new(),
            disposed: AtomicBool::new(false),
        };
        Ok(Self { inner: Arc::new(inner) })
    }

    /// Loads and activates the configured default language.
    ///
    /// # Errors
    /// Propagates [`set_language`](Self::set_language) errors.
    pub async fn init(&self) -> Result<Arc<TranslationMap>, TranslationError> {
        let default = self.inner.config.default_language.clone();
        self.set_language(&default).await
    }

    /// Changes the active language, loading it first when necessary.
    ///
    /// On success the active language is updated and one
    /// [`LanguageChangeEvent`] is emitted. On failure the active language
    /// is left unchanged, so translate calls keep resolving against the
    /// previously active language; the failure is not cached and the next
    /// call retries the load.
    ///
    /// # Errors
    /// - [`TranslationError::UnsupportedLanguage`] when `lang` is outside
    ///   the configured allow-list.
    /// - [`TranslationError::ResourceUnavailable`] /
    ///   [`TranslationError::Parse`] when the load fails.
    /// - [`TranslationError::Config`] on a destroyed engine.
    pub async fn set_language(&self, lang: &str) -> Result<Arc<TranslationMap>, TranslationError> {
        self.ensure_not_destroyed()?;
        if !self.inner.config.is_supported(lang) {
            return Err(TranslationError::UnsupportedLanguage {
                lang: lang.to_string(),
                supported: self.inner.config.language_supports.clone(),
            });
        }

        self.set_state(EngineState::Loading(lang.to_string()));
        match self.request_load(lang).await {
            Ok(data) => {
                *write(&self.inner.active) = lang.to_string();
                self.set_state(EngineState::Ready(lang.to_string()));
                if !self.inner.disposed.load(Ordering::SeqCst) {
                    self.inner.notifier.emit(LanguageChangeEvent {
                        lang: lang.to_string(),
                        data: Arc::clone(&data),
                    });
                }
                tracing::info!(lang, "Active language changed");
                Ok(data)
            }
            Err(err) => {
                self.set_state(EngineState::Error(lang.to_string()));
                tracing::warn!(lang, %err, "Language change failed, active language unchanged");
                Err(err)
            }
        }
    }

    /// Loads a language into the store without activating it.
    ///
    /// Returns immediately when the language is already loaded; joins the
    /// in-flight load when one exists.
    ///
    /// # Errors
    /// Load transport and parse errors; [`TranslationError::Config`] on a
    /// destroyed engine.
    pub async fn load_language(&self, lang: &str) -> Result<Arc<TranslationMap>, TranslationError> {
        self.ensure_not_destroyed()?;
        self.request_load(lang).await
    }

    /// Resolves `key` for the active language and substitutes `params`.
    ///
    /// Synchronous and best-effort: a key absent in both the active and
    /// fallback languages degrades to the raw key, never an empty string.
    #[must_use]
    pub fn get(&self, key: &str, params: Option<&Params>) -> String {
        self.get_in_context(key, params, &Context::new())
    }

    /// Like [`get`](Self::get), additionally handing `context` to
    /// computed placeholder values at substitution time.
    #[must_use]
    pub fn get_in_context(&self, key: &str, params: Option<&Params>, context: &Context) -> String {
        let active = self.current_language();
        let fallback = self.inner.config.fallback_language.as_deref();
        let Some(template) = resolver::resolve(&self.inner.store, &active, fallback, key) else {
            tracing::warn!(key, lang = %active, "Translation key not found, returning key");
            return key.to_string();
        };

        let Some(params) = params else {
            return template;
        };
        match interpolate::interpolate(&template, params, context, self.interpolation_method()) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(key, %err, "Interpolation failed, returning template untouched");
                template
            }
        }
    }

    /// A lazy sequence of resolved strings for `key`: one value
    /// immediately, then one per language change.
    #[must_use]
    pub fn stream(&self, key: impl Into<String>, params: Option<Params>) -> TranslationStream {
        self.stream_in_context(key, params, Context::new())
    }

    /// Like [`stream`](Self::stream), with an ambient context for
    /// computed placeholder values.
    #[must_use]
    pub fn stream_in_context(
        &self,
        key: impl Into<String>,
        params: Option<Params>,
        context: Context,
    ) -> TranslationStream {
        let mut receiver = self.subscribe();
        receiver.mark_unchanged();
        TranslationStream {
            engine: self.clone(),
            receiver,
            key: key.into(),
            params,
            context,
            primed: false,
        }
    }

    /// Whether `key` resolves in `lang` (default: the active language).
    ///
    /// Consults only that language's loaded map; the fallback language is
    /// not considered.
    #[must_use]
    pub fn has_translation(&self, key: &str, lang: Option<&str>) -> bool {
        let lang = lang.map_or_else(|| self.current_language(), ToString::to_string);
        resolver::resolve(&self.inner.store, &lang, None, key).is_some()
    }

    /// Languages that have finished loading, sorted.
    #[must_use]
    pub fn loaded_languages(&self) -> Vec<LanguageId> {
        self.inner.store.loaded_languages()
    }

    /// Removes every loaded language from the store.
    ///
    /// Subsequent translate calls miss until languages are loaded again;
    /// the active language is unchanged.
    pub fn clear_cache(&self) {
        tracing::debug!("Clearing translation store");
        self.inner.store.clear();
    }

    /// The currently active language.
    #[must_use]
    pub fn current_language(&self) -> LanguageId {
        read(&self.inner.active).clone()
    }

    /// The facade lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        read(&self.inner.state).clone()
    }

    /// Advisory flag: `true` while at least one load is in flight. Not a
    /// correctness gate.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.lock_pending().is_empty()
    }

    /// The strategy policy used by subsequent translate calls.
    #[must_use]
    pub fn interpolation_method(&self) -> InterpolationMethod {
        *read(&self.inner.method)
    }

    /// Switches the strategy policy at runtime.
    pub fn set_interpolation_method(&self, method: InterpolationMethod) {
        tracing::debug!(?method, "Switching interpolation method");
        *write(&self.inner.method) = method;
    }

    /// Subscribes to language-change events.
    ///
    /// The subscription's current value replays the most recent event
    /// (`None` until the first successful language change).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<LanguageChangeEvent>> {
        self.inner.notifier.subscribe()
    }

    /// Shuts the engine down: no further events are emitted, outstanding
    /// subscriptions terminate, and in-flight loads settle without
    /// writing to the store. Idempotent.
    pub fn destroy(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("Destroying engine");
        self.inner.notifier.close();
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Returns the cached map, joins the in-flight load, or starts a new
    /// one (the single-flight guarantee).
    async fn request_load(&self, lang: &str) -> LoadOutcome {
        if let Some(data) = self.inner.store.get(lang) {
            return Ok(data);
        }

        let load = {
            let mut pending = self.lock_pending();
            if let Some(existing) = pending.get(lang) {
                tracing::debug!(lang, "Joining in-flight load");
                existing.clone()
            } else {
                let load = run_load(Arc::clone(&self.inner), lang.to_string()).boxed().shared();
                pending.insert(lang.to_string(), load.clone());
                load
            }
        };

        load.await
    }

    fn set_state(&self, state: EngineState) {
        *write(&self.inner.state) = state;
    }

    fn ensure_not_destroyed(&self) -> Result<(), TranslationError> {
        if self.is_destroyed() {
            return Err(TranslationError::Config("engine has been destroyed".to_string()));
        }
        Ok(())
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<LanguageId, SharedLoad>> {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for I18nEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nEngine")
            .field("active", &self.current_language())
            .field("state", &self.state())
            .field("loaded", &self.loaded_languages())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

/// The single execution of a load shared by all waiters.
///
/// Settlement order matters: on success the store is written before the
/// pending entry is removed, so a concurrent caller always hits either
/// the store or the pending table. Failures only remove the pending
/// entry, which is what keeps them uncached.
async fn run_load(inner: Arc<EngineInner>, lang: LanguageId) -> LoadOutcome {
    tracing::debug!(lang = %lang, "Starting translation load");
    match inner.loader.load(&lang).await {
        Ok(document) => {
            let data = Arc::new(store::flatten_document(&document));
            if inner.disposed.load(Ordering::SeqCst) {
                tracing::debug!(lang = %lang, "Discarding load result, engine destroyed");
            } else {
                inner.store.insert(lang.clone(), Arc::clone(&data));
            }
            remove_pending(&inner, &lang);
            Ok(data)
        }
        Err(err) => {
            remove_pending(&inner, &lang);
            tracing::warn!(lang = %lang, %err, "Translation load failed");
            Err(err)
        }
    }
}

fn remove_pending(inner: &EngineInner, lang: &str) {
    inner.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(lang);
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Lazy, restartable sequence of resolved strings for one key.
///
/// Yields one value immediately (computed against current engine state),
/// then one value per language-change event. Ends when the engine is
/// destroyed; cancelled by dropping.
#[derive(Debug)]
pub struct TranslationStream {
    engine: I18nEngine,
    receiver: watch::Receiver<Option<LanguageChangeEvent>>,
    key: String,
    params: Option<Params>,
    context: Context,
    primed: bool,
}

impl TranslationStream {
    /// The next resolved value, or `None` once the engine is destroyed.
    pub async fn next(&mut self) -> Option<String> {
        if self.primed {
            self.receiver.changed().await.ok()?;
        }
        self.primed = true;
        Some(self.engine.get_in_context(&self.key, self.params.as_ref(), &self.context))
    }
}
