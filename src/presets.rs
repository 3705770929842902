//! Ready-made restrictions
//!
//! Every factory returns a fresh `Restriction`, so changing the message of one
//! never affects another. Messages name the JSON type or bound being checked.
//!
//! Numbers in messages print the way a JavaScript template would print them
//! (`41`, `0.5`, `-3`), and so do values passed to `eq`/`neq`.

use regex::Regex;
use serde_json::Value;

use crate::restriction::{Conditional, DefinitionError, DefinitionResult, Restriction};

/// Names accepted by `lookup`
pub const NAMES: &[&str] = &[
    "string", "number", "boolean", "null", "integer", "object", "array", "eq", "neq", "gt",
    "lt", "gte", "lte", "range", "positive", "negative", "matches",
];

pub fn string() -> Restriction {
    Restriction::predicate("Must be a 'string'", Value::is_string)
}

pub fn number() -> Restriction {
    Restriction::predicate("Must be a 'number'", Value::is_number)
}

pub fn boolean() -> Restriction {
    Restriction::predicate("Must be a 'boolean'", Value::is_boolean)
}

pub fn null() -> Restriction {
    Restriction::predicate("Must be null", Value::is_null)
}

/// Numbers with no fractional part
pub fn integer() -> Restriction {
    Restriction::predicate("Must be an integer", |v| {
        v.as_f64().map_or(false, |n| n.is_finite() && n.fract() == 0.0)
    })
}

/// Objects and arrays
pub fn object() -> Restriction {
    Restriction::predicate("Must be an instance of Object", |v| {
        v.is_object() || v.is_array()
    })
}

pub fn array() -> Restriction {
    Restriction::predicate("Must be an instance of Array", Value::is_array)
}

/// Equal to `target`; numbers compare by value regardless of representation
pub fn eq(target: Value) -> Restriction {
    let message = format!("Must be strictly equal to {}", js_display(&target));
    Restriction::predicate(message, move |v| strictly_equal(v, &target))
}

pub fn neq(target: Value) -> Restriction {
    let message = format!("Must not be strictly equal to {}", js_display(&target));
    Restriction::predicate(message, move |v| !strictly_equal(v, &target))
}

pub fn gt(bound: f64) -> Restriction {
    compare(format!("greater than {}", js_number(bound)), move |n| n > bound)
}

pub fn lt(bound: f64) -> Restriction {
    compare(format!("less than {}", js_number(bound)), move |n| n < bound)
}

pub fn gte(bound: f64) -> Restriction {
    compare(format!("greater than or equal to {}", js_number(bound)), move |n| n >= bound)
}

pub fn lte(bound: f64) -> Restriction {
    compare(format!("less than or equal to {}", js_number(bound)), move |n| n <= bound)
}

fn compare<F>(relation: String, f: F) -> Restriction
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    Restriction::predicate(format!("Must be a 'number' {}", relation), move |v| {
        v.as_f64().map_or(false, &f)
    })
}

/// Between `lower` and `upper`.
///
/// Built from the two bound restrictions, so a failure's stack names the bound
/// that was crossed beneath the range message.
pub fn range(lower: f64, upper: f64, lower_inclusive: bool, upper_inclusive: bool) -> Restriction {
    let message = format!(
        "Must be a 'number' within the range {}{}, {}{}",
        if lower_inclusive { "[" } else { "(" },
        js_number(lower),
        js_number(upper),
        if upper_inclusive { "]" } else { ")" },
    );
    let low = if lower_inclusive { gte(lower) } else { gt(lower) };
    let high = if upper_inclusive { lte(upper) } else { lt(upper) };
    Restriction::all(message, vec![low.into(), high.into()])
}

/// Zero or greater
pub fn positive() -> Restriction {
    gte(0.0).msg("Must be a positive 'number'")
}

/// Less than zero
pub fn negative() -> Restriction {
    lt(0.0).msg("Must be a negative 'number'")
}

/// Strings containing a match for `pattern`.
///
/// # Errors
///
/// `InvalidPattern` if `pattern` is not a valid regular expression.
pub fn matches(pattern: &str) -> DefinitionResult<Restriction> {
    let re = Regex::new(pattern).map_err(|e| DefinitionError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    string().and([
        format!("Must be a 'string' matching '{}'", pattern).into(),
        string_matching(re).into(),
    ])
}

/// Strings containing a match for an already compiled expression.
///
/// Same shape as `matches`: one predicate under the composite message.
pub fn matches_regex(re: Regex) -> Restriction {
    let message = format!("Must be a 'string' matching /{}/", re.as_str());
    Restriction::all(message, vec![string_matching(re)])
}

/// Fails for non-strings as well as strings without a match
fn string_matching(re: Regex) -> Conditional {
    Conditional::predicate(move |v| v.as_str().map_or(false, |s| re.is_match(s)))
}

/// Resolve a preset by name with JSON parameters.
///
/// `range` takes two bounds and up to two inclusivity flags (defaulting to a
/// half-open `[lower, upper)` range).
///
/// # Errors
///
/// - `UnknownPreset` for names not in `NAMES`
/// - `PresetArity` for the wrong number of parameters
/// - `InvalidPresetParam` for parameters of the wrong type
/// - `InvalidPattern` for a bad `matches` pattern
pub fn lookup(name: &str, params: &[Value]) -> DefinitionResult<Restriction> {
    let arity = |expected: &'static str, ok: bool| {
        if ok {
            Ok(())
        } else {
            Err(DefinitionError::PresetArity {
                name: name.to_string(),
                expected,
                actual: params.len(),
            })
        }
    };
    let number_at = |i: usize| {
        params[i].as_f64().ok_or_else(|| DefinitionError::InvalidPresetParam {
            name: name.to_string(),
            reason: format!("parameter #{} must be a number", i + 1),
        })
    };
    let bool_at = |i: usize, default: bool| match params.get(i) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(DefinitionError::InvalidPresetParam {
            name: name.to_string(),
            reason: format!("parameter #{} must be a boolean", i + 1),
        }),
    };

    let restriction = match name {
        "string" | "number" | "boolean" | "null" | "integer" | "object" | "array"
        | "positive" | "negative" => {
            arity("0", params.is_empty())?;
            match name {
                "string" => string(),
                "number" => number(),
                "boolean" => boolean(),
                "null" => null(),
                "integer" => integer(),
                "object" => object(),
                "array" => array(),
                "positive" => positive(),
                _ => negative(),
            }
        }
        "eq" | "neq" => {
            arity("1", params.len() == 1)?;
            if name == "eq" {
                eq(params[0].clone())
            } else {
                neq(params[0].clone())
            }
        }
        "gt" | "lt" | "gte" | "lte" => {
            arity("1", params.len() == 1)?;
            let bound = number_at(0)?;
            match name {
                "gt" => gt(bound),
                "lt" => lt(bound),
                "gte" => gte(bound),
                _ => lte(bound),
            }
        }
        "range" => {
            arity("2 to 4", (2..=4).contains(&params.len()))?;
            range(number_at(0)?, number_at(1)?, bool_at(2, true)?, bool_at(3, false)?)
        }
        "matches" => {
            arity("1", params.len() == 1)?;
            let pattern = params[0].as_str().ok_or_else(|| DefinitionError::InvalidPresetParam {
                name: name.to_string(),
                reason: "parameter #1 must be a string".into(),
            })?;
            matches(pattern)?
        }
        _ => {
            return Err(DefinitionError::UnknownPreset {
                name: name.to_string(),
            })
        }
    };

    tracing::debug!(preset = name, params = params.len(), "preset resolved");
    Ok(restriction)
}

fn strictly_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Format a number the way JavaScript's `String(n)` does.
///
/// Magnitudes at or above 1e21, or below 1e-6, use exponent form (`1e+21`,
/// `1.5e-7`).
pub(crate) fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".into()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exponent = format!("{:e}", n);
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exponent,
        }
    } else {
        format!("{}", n)
    }
}

/// Format a value the way string concatenation would in JavaScript
fn js_display(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(js_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| if v.is_null() { String::new() } else { js_display(v) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}
