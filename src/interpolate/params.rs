//! Parameter shapes accepted by the interpolation engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Ambient data handed to computed values at substitution time.
pub type Context = HashMap<String, ParamValue>;

/// A raw substitution value: string, number, or null.
///
/// Values stringify canonically: integers without grouping separators, no
/// locale-aware formatting. `Null` is treated as absent, so the
/// placeholder it would fill is restored verbatim instead of rendering an
/// empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A string value, substituted as-is.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// An absent value; its placeholder is left verbatim.
    Null,
}

impl ParamValue {
    /// Canonical string form, or `None` when the value is absent.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Str(text) => Some(text.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Null => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A placeholder value: a literal, or a computation invoked with the
/// ambient [`Context`] when substitution happens.
///
/// Computed values are the only place execution semantics enter the
/// engine; everything else is pure text substitution.
#[derive(Clone)]
pub enum Value {
    /// A plain value.
    Literal(ParamValue),
    /// Evaluated against the ambient context at substitution time.
    Computed(Arc<dyn Fn(&Context) -> ParamValue + Send + Sync>),
}

impl Value {
    /// Evaluates to a raw value, invoking computed callables with
    /// `context`.
    #[must_use]
    pub fn evaluate(&self, context: &Context) -> ParamValue {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Computed(compute) => compute(context),
        }
    }

    /// Shorthand for a computed value.
    #[must_use]
    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&Context) -> ParamValue + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(compute))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<ParamValue> for Value {
    fn from(value: ParamValue) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Literal(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Literal(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Literal(value.into())
    }
}

/// Interpolation parameters: an ordered sequence (positional) or a
/// name → value mapping (named). Never both for the same call; the
/// strategies dispatch on this tag.
#[derive(Debug, Clone)]
pub enum Params {
    /// Values addressed by `{{0}}`, `{{1}}`, …
    Positional(Vec<Value>),
    /// Values addressed by `${name}` or `{{name}}`.
    Named(HashMap<String, Value>),
}

impl Params {
    /// Builds positional parameters from anything convertible to values.
    #[must_use]
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Builds named parameters from `(name, value)` pairs.
    #[must_use]
    pub fn named<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Named(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
