//! Strategy A: single-pass segment/value reconstruction.
//!
//! Scans the template left to right, collecting the literal segments
//! between placeholders and one resolved value per occurrence, then
//! reassembles `segment + value + segment + …`. The only fallible path:
//! an opened placeholder with no terminator is a malformed template.

use super::InterpolateError;
use super::params::{
    Context,
    Params,
};

/// A placeholder occurrence with the byte range of its original text.
struct Occurrence {
    start: usize,
    end: usize,
    target: Target,
}

/// What a placeholder refers to.
enum Target {
    /// `{{<integer>}}` against positional parameters.
    Index(usize),
    /// `${<identifier>}` or `{{<identifier>}}` against named parameters.
    Name(String),
}

/// Interpolates `params` into `template`.
///
/// Placeholders whose value is absent are restored verbatim, so the
/// output is idempotent under re-interpolation with the same parameters.
pub(super) fn interpolate(
    template: &str,
    params: &Params,
    context: &Context,
) -> Result<String, InterpolateError> {
    let occurrences = match params {
        Params::Positional(_) => scan_positional(template)?,
        Params::Named(_) => scan_named(template)?,
    };

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for occurrence in &occurrences {
        out.push_str(slice(template, cursor, occurrence.start));
        match resolve(&occurrence.target, params, context) {
            Some(text) => out.push_str(&text),
            None => out.push_str(slice(template, occurrence.start, occurrence.end)),
        }
        cursor = occurrence.end;
    }
    out.push_str(slice(template, cursor, template.len()));

    Ok(out)
}

/// Finds `{{<integer>}}` occurrences. Text that merely looks like an
/// opener is left for the literal segments.
fn scan_positional(template: &str) -> Result<Vec<Occurrence>, InterpolateError> {
    let mut occurrences = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = find(template, cursor, "{{") {
        let inner_start = offset + 2;
        let Some(close) = find(template, inner_start, "}}") else {
            return Err(InterpolateError::UnterminatedPlaceholder { offset });
        };
        let inner = slice(template, inner_start, close);
        match parse_index(inner) {
            Some(index) => {
                occurrences.push(Occurrence { start: offset, end: close + 2, target: Target::Index(index) });
                cursor = close + 2;
            }
            // not a positional placeholder; re-scan from the next byte so
            // an overlapping opener is still found
            None => cursor = offset + 1,
        }
    }

    Ok(occurrences)
}

/// Finds `${<identifier>}` and `{{<identifier>}}` occurrences in order of
/// appearance.
fn scan_named(template: &str) -> Result<Vec<Occurrence>, InterpolateError> {
    let mut occurrences = Vec::new();
    let mut cursor = 0;

    loop {
        let dollar = find(template, cursor, "${");
        let brace = find(template, cursor, "{{");
        let (offset, terminator) = match (dollar, brace) {
            (None, None) => break,
            (Some(d), None) => (d, "}"),
            (None, Some(b)) => (b, "}}"),
            (Some(d), Some(b)) => {
                if d < b {
                    (d, "}")
                } else {
                    (b, "}}")
                }
            }
        };

        let inner_start = offset + 2;
        let Some(close) = find(template, inner_start, terminator) else {
            return Err(InterpolateError::UnterminatedPlaceholder { offset });
        };
        let inner = slice(template, inner_start, close);
        if is_identifier(inner) {
            let end = close + terminator.len();
            occurrences.push(Occurrence { start: offset, end, target: Target::Name(inner.to_string()) });
            cursor = end;
        } else {
            cursor = offset + 1;
        }
    }

    Ok(occurrences)
}

fn resolve(target: &Target, params: &Params, context: &Context) -> Option<String> {
    match (target, params) {
        (Target::Index(index), Params::Positional(values)) => {
            values.get(*index).and_then(|value| value.evaluate(context).render())
        }
        (Target::Name(name), Params::Named(values)) => {
            values.get(name).and_then(|value| value.evaluate(context).render())
        }
        // a scan never yields a target of the other shape
        _ => None,
    }
}

/// A digit run that fits `usize`; anything else is not a positional
/// placeholder.
fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn find(text: &str, from: usize, needle: &str) -> Option<usize> {
    text.get(from..).and_then(|rest| rest.find(needle).map(|i| from + i))
}

fn slice(text: &str, start: usize, end: usize) -> &str {
    text.get(start..end).unwrap_or("")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::params::Value;
    use super::*;

    fn run(template: &str, params: &Params) -> Result<String, InterpolateError> {
        interpolate(template, params, &Context::new())
    }

    #[test]
    fn test_interleaves_segments_and_values() {
        let params = Params::positional(["a", "b"]);

        let result = run("<{{0}}-{{1}}>", &params).unwrap();

        assert_eq!(result, "<a-b>");
    }

    #[test]
    fn test_duplicate_occurrences_resolve_independently() {
        let params = Params::named([("x", "v")]);

        let result = run("${x}${x}{{x}}", &params).unwrap();

        assert_eq!(result, "vvv");
    }

    #[test]
    fn test_unterminated_positional_opener_errors() {
        let params = Params::positional([Value::from("a")]);

        let result = run("hi {{0", &params);

        assert_eq!(result, Err(InterpolateError::UnterminatedPlaceholder { offset: 3 }));
    }

    #[test]
    fn test_unterminated_named_opener_errors() {
        let params = Params::named([("x", "v")]);

        let result = run("hi ${x", &params);

        assert_eq!(result, Err(InterpolateError::UnterminatedPlaceholder { offset: 3 }));
    }

    #[test]
    fn test_overlapping_opener_is_still_found() {
        let params = Params::positional(["v"]);

        let result = run("{{{0}}}", &params).unwrap();

        assert_eq!(result, "{v}");
    }

    #[test]
    fn test_non_placeholder_braces_left_verbatim() {
        let params = Params::positional(["v"]);

        let result = run("{{name}} {{0}}", &params).unwrap();

        assert_eq!(result, "{{name}} v");
    }
}
