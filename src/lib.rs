//! i18n-engine
//!
//! An asynchronous localization engine: resolves translation keys to
//! interpolated strings for the active language, loading and caching
//! per-language JSON resource packs on demand, collapsing concurrent
//! loads for the same language into one request, falling back to a
//! secondary language on key misses, and notifying subscribers when the
//! active language changes.

pub mod config;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod loader;
pub mod notifier;
pub mod resolver;
pub mod store;
pub mod types;

pub use config::{
    EngineConfig,
    InterpolationMethod,
};
pub use engine::{
    I18nEngine,
    TranslationStream,
};
pub use error::TranslationError;
pub use interpolate::{
    Context,
    InterpolateError,
    ParamValue,
    Params,
    Value,
};
pub use loader::{
    FsLoader,
    HttpLoader,
    ResourceLoader,
};
pub use types::{
    EngineState,
    LanguageChangeEvent,
    LanguageId,
    TranslationMap,
};
