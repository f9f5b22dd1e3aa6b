//! Cache Key Module
//!
//! Derives canonical cache keys from a category name and named parameters.
//!
//! Keys have the form `category` (no parameters) or
//! `category:"name"=value&"name"=value`, with parameters sorted by name and
//! both names and values written as JSON literals. Quoting every piece keeps
//! `42` and `"42"` apart and stops separator characters inside a value from
//! forging a different parameter set.

use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

/// Named request parameters that identify one cached resource.
pub type Params = Map<String, Value>;

/// Separates the category from the encoded parameters.
pub const KEY_SEPARATOR: char = ':';

// == Encode ==
/// Encodes a category and its parameters into a cache key.
///
/// The result does not depend on parameter insertion order. Empty parameters
/// yield the bare category name.
///
/// # Errors
/// - `InvalidCategory` if the category is empty or contains [`KEY_SEPARATOR`]
/// - `UnsupportedParam` if any value is an array or an object
pub fn encode(category: &str, params: &Params) -> Result<String> {
    encode_pairs(category, params.iter().map(|(name, value)| (name.as_str(), value)))
}

/// Encodes parameters supplied in caller order, e.g. from a query string.
///
/// # Errors
/// As [`encode`], plus `InvalidRequest` if a parameter name repeats.
pub fn encode_pairs<'a, I>(category: &str, params: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    validate_category(category)?;

    let mut pairs: Vec<(&str, &Value)> = params.into_iter().collect();
    if pairs.is_empty() {
        return Ok(category.to_string());
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    if let Some(window) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(CacheError::InvalidRequest(format!(
            "duplicate parameter '{}'",
            window[0].0
        )));
    }

    let mut key = String::with_capacity(category.len() + pairs.len() * 16);
    key.push_str(category);
    key.push(KEY_SEPARATOR);

    for (i, (name, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            key.push('&');
        }
        key.push_str(&serde_json::to_string(name)?);
        key.push('=');
        key.push_str(&encode_value(name, value)?);
    }

    Ok(key)
}

// == Category Of ==
/// Returns the category portion of an encoded key.
pub fn category_of(key: &str) -> &str {
    match key.split_once(KEY_SEPARATOR) {
        Some((category, _)) => category,
        None => key,
    }
}

fn validate_category(category: &str) -> Result<()> {
    if category.is_empty() || category.contains(KEY_SEPARATOR) {
        return Err(CacheError::InvalidCategory(category.to_string()));
    }
    Ok(())
}

fn encode_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Ok(serde_json::to_string(value)?)
        }
        Value::Array(_) => Err(CacheError::UnsupportedParam {
            name: name.to_string(),
            kind: "array",
        }),
        Value::Object(_) => Err(CacheError::UnsupportedParam {
            name: name.to_string(),
            kind: "object",
        }),
    }
}
