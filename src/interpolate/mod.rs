//! Template interpolation.
//!
//! Two placeholder grammars are supported, selected by the parameters'
//! shape: positional `{{0}}`, `{{1}}`, … against an ordered sequence, and
//! named `${name}` / `{{name}}` against a mapping. Placeholders that do
//! not match the parameters' shape are left verbatim, and a placeholder
//! whose value is absent is restored as its original text, never an
//! empty string, so re-interpolating the output with the same
//! parameters changes nothing.
//!
//! Two interchangeable strategies must agree for well-formed input:
//! [`segmented`] (strategy A) reconstructs the template from literal
//! segments and resolved values in one pass, and [`direct`] (strategy B)
//! runs independent replacement passes. The
//! [`InterpolationMethod::Auto`] policy tries strategy A and falls back
//! to strategy B when the template is malformed.

mod direct;
mod params;
mod segmented;

pub use params::{
    Context,
    ParamValue,
    Params,
    Value,
};

use thiserror::Error;

use crate::config::InterpolationMethod;

/// Interpolation failure.
///
/// Only strategy A is fallible, and only for malformed templates;
/// unresolved placeholders never error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolateError {
    /// A placeholder opener with no matching terminator.
    #[error("unterminated placeholder starting at byte {offset}")]
    UnterminatedPlaceholder {
        /// Byte offset of the opener in the template.
        offset: usize,
    },
}

/// Substitutes `params` into `template` under the given strategy policy.
///
/// Computed values are invoked with `context` at substitution time.
///
/// # Errors
/// [`InterpolateError`] under [`InterpolationMethod::StrategyA`] when the
/// template is malformed. `StrategyB` and `Auto` never fail.
pub fn interpolate(
    template: &str,
    params: &Params,
    context: &Context,
    method: InterpolationMethod,
) -> Result<String, InterpolateError> {
    match method {
        InterpolationMethod::StrategyA => segmented::interpolate(template, params, context),
        InterpolationMethod::StrategyB => Ok(direct::interpolate(template, params, context)),
        InterpolationMethod::Auto => {
            segmented::interpolate(template, params, context).or_else(|err| {
                tracing::warn!(
                    %err,
                    template,
                    "Segmented interpolation failed, falling back to direct substitution"
                );
                Ok(direct::interpolate(template, params, context))
            })
        }
    }
}
