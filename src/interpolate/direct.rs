//! Strategy B: independent replacement passes.
//!
//! Same grammars and unresolved-placeholder policy as the segmented
//! strategy, implemented as regex replacement passes: one positional
//! pass, or a `${name}` pass followed by a `{{name}}` pass. Infallible,
//! which is what makes it the fallback for the `auto` policy.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};

use super::params::{
    Context,
    Params,
    Value,
};

// patterns are literals
#[allow(clippy::unwrap_used)]
static POSITIONAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(\d+)\}\}").unwrap());
#[allow(clippy::unwrap_used)]
static NAMED_DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").unwrap());
#[allow(clippy::unwrap_used)]
static NAMED_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());

/// Interpolates `params` into `template` by replacement passes.
pub(super) fn interpolate(template: &str, params: &Params, context: &Context) -> String {
    match params {
        Params::Positional(values) => replace_positional(template, values, context),
        Params::Named(values) => {
            let after_dollar = replace_named(&NAMED_DOLLAR, template, values, context);
            replace_named(&NAMED_BRACE, &after_dollar, values, context)
        }
    }
}

fn replace_positional(template: &str, values: &[Value], context: &Context) -> String {
    POSITIONAL
        .replace_all(template, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|index| index.as_str().parse::<usize>().ok())
                .and_then(|index| values.get(index))
                .and_then(|value| value.evaluate(context).render())
                .unwrap_or_else(|| whole_match(caps))
        })
        .into_owned()
}

fn replace_named(
    pattern: &Regex,
    template: &str,
    values: &HashMap<String, Value>,
    context: &Context,
) -> String {
    pattern
        .replace_all(template, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| values.get(name.as_str()))
                .and_then(|value| value.evaluate(context).render())
                .unwrap_or_else(|| whole_match(caps))
        })
        .into_owned()
}

/// The full placeholder text, restored when its value is absent.
fn whole_match(caps: &Captures<'_>) -> String {
    caps.get(0).map_or_else(String::new, |m| m.as_str().to_string())
}
