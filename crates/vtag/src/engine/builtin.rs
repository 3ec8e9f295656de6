//! Tags available on every engine.

use super::{FieldLevel, Param};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;
use validator::{ValidateEmail, ValidateUrl};

static ALPHA_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHANUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn alpha_regex() -> &'static Regex {
    ALPHA_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z]+$").unwrap())
}

fn alphanumeric_regex() -> &'static Regex {
    ALPHANUMERIC_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap())
}

fn numeric_regex() -> &'static Regex {
    NUMERIC_REGEX.get_or_init(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap())
}

pub(super) type BuiltinFn = fn(&FieldLevel<'_>) -> bool;

/// Name, parameter kind and check of every built-in tag.
pub(super) const BUILTINS: &[(&str, Param, BuiltinFn)] = &[
    ("required", Param::None, required),
    ("min", Param::Numeric, min),
    ("max", Param::Numeric, max),
    ("len", Param::Numeric, len),
    ("gt", Param::Numeric, gt),
    ("gte", Param::Numeric, gte),
    ("lt", Param::Numeric, lt),
    ("lte", Param::Numeric, lte),
    ("eq", Param::Any, eq),
    ("ne", Param::Any, ne),
    ("oneof", Param::Required, oneof),
    ("email", Param::None, email),
    ("url", Param::None, url),
    ("alpha", Param::None, alpha),
    ("alphanum", Param::None, alphanum),
    ("numeric", Param::None, numeric),
    ("eqfield", Param::Any, eqfield),
    ("nefield", Param::Any, nefield),
    ("gtfield", Param::Any, gtfield),
    ("gtefield", Param::Any, gtefield),
    ("ltfield", Param::Any, ltfield),
    ("ltefield", Param::Any, ltefield),
];

/// Whether a value is its type's zero value.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Character count for strings, element count for collections, the value for numbers.
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        Value::Array(a) => Some(a.len() as f64),
        Value::Object(o) => Some(o.len() as f64),
        Value::Null | Value::Bool(_) => None,
    }
}

fn measure_against(fl: &FieldLevel<'_>, pass: fn(Ordering) -> bool) -> bool {
    let (Some(actual), Ok(bound)) = (measure(fl.value()), fl.param().trim().parse::<f64>()) else {
        return false;
    };
    actual.partial_cmp(&bound).is_some_and(pass)
}

fn required(fl: &FieldLevel<'_>) -> bool {
    !is_empty(fl.value())
}

fn min(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_ge)
}

fn max(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_le)
}

fn len(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_eq)
}

fn gt(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_gt)
}

fn gte(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_ge)
}

fn lt(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_lt)
}

fn lte(fl: &FieldLevel<'_>) -> bool {
    measure_against(fl, Ordering::is_le)
}

fn eq(fl: &FieldLevel<'_>) -> bool {
    let param = fl.param();
    match fl.value() {
        Value::String(s) => s == param,
        Value::Number(n) => match (n.as_f64(), param.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        Value::Bool(b) => param.trim().parse::<bool>() == Ok(*b),
        Value::Array(_) | Value::Object(_) => measure_against(fl, Ordering::is_eq),
        Value::Null => param.is_empty(),
    }
}

fn ne(fl: &FieldLevel<'_>) -> bool {
    !eq(fl)
}

fn oneof(fl: &FieldLevel<'_>) -> bool {
    let value = fl.as_string();
    fl.param().split_whitespace().any(|option| option == value)
}

fn email(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        Value::String(s) => s.validate_email(),
        _ => false,
    }
}

fn url(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        Value::String(s) => s.validate_url(),
        _ => false,
    }
}

fn alpha(fl: &FieldLevel<'_>) -> bool {
    alpha_regex().is_match(&fl.as_string())
}

fn alphanum(fl: &FieldLevel<'_>) -> bool {
    alphanumeric_regex().is_match(&fl.as_string())
}

fn numeric(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        Value::Number(_) => true,
        Value::String(s) => numeric_regex().is_match(s),
        _ => false,
    }
}

/// Numbers compare by value, anything else by [`measure`].
fn compare_with_target(fl: &FieldLevel<'_>, pass: fn(Ordering) -> bool) -> bool {
    let Some(target) = fl.comparison_target() else {
        return false;
    };

    let ordering = match (fl.value(), target) {
        (Value::Number(a), Value::Number(b)) => a.as_f64().zip(b.as_f64()),
        (a, b) => measure(a).zip(measure(b)),
    }
    .and_then(|(a, b)| a.partial_cmp(&b));

    ordering.is_some_and(pass)
}

fn eqfield(fl: &FieldLevel<'_>) -> bool {
    let Some(target) = fl.comparison_target() else {
        return false;
    };
    match (fl.value(), target) {
        (Value::Number(a), Value::Number(b)) => a.as_f64().is_some() && a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    }
}

fn nefield(fl: &FieldLevel<'_>) -> bool {
    fl.comparison_target().is_some() && !eqfield(fl)
}

fn gtfield(fl: &FieldLevel<'_>) -> bool {
    compare_with_target(fl, Ordering::is_gt)
}

fn gtefield(fl: &FieldLevel<'_>) -> bool {
    compare_with_target(fl, Ordering::is_ge)
}

fn ltfield(fl: &FieldLevel<'_>) -> bool {
    compare_with_target(fl, Ordering::is_lt)
}

fn ltefield(fl: &FieldLevel<'_>) -> bool {
    compare_with_target(fl, Ordering::is_le)
}
