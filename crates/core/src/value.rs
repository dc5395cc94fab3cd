//! Value conversion for Open Graph properties.
//!
//! Raw `content` attributes are coerced by field name: URL fields are
//! resolved against the document base, dimensions become integers, and
//! everything else is trimmed text.

use serde::Serialize;
use url::Url;

use crate::path::PropertyPath;

/// Field names whose values are URL references.
const URL_FIELDS: &[&str] = &["url", "secure_url", "image", "video", "audio"];

/// Field names whose values are integer dimensions.
const INTEGER_FIELDS: &[&str] = &["width", "height"];

/// A converted property value.
///
/// Serializes as a JSON string, a JSON number, or `null` for a dimension
/// that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    NotANumber,
}

impl PropertyValue {
    /// The canonical empty value. The accumulator treats it as absent.
    pub fn empty() -> Self {
        PropertyValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PropertyValue::Text(text) if text.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::NotANumber => f.write_str("NaN"),
        }
    }
}

/// Converts a raw attribute value for the field named by `path`.
///
/// An absent or blank value converts to [`PropertyValue::empty`].
pub fn convert(path: &PropertyPath<'_>, raw: Option<&str>, base_url: &str) -> PropertyValue {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return PropertyValue::empty();
    }

    let field = path.field().unwrap_or_default();

    if URL_FIELDS.contains(&field) {
        return PropertyValue::Text(resolve_url(base_url, value).unwrap_or_else(|| value.to_string()));
    }

    if INTEGER_FIELDS.contains(&field) {
        return parse_leading_integer(value).map_or(PropertyValue::NotANumber, PropertyValue::Integer);
    }

    PropertyValue::Text(value.to_string())
}

/// Resolves `reference` against `base`.
///
/// When `base` itself is not an absolute URL only an absolute `reference`
/// can be resolved.
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    let resolved = match Url::parse(base) {
        Ok(base) => base.join(reference),
        Err(_) => Url::parse(reference),
    };
    resolved.ok().map(String::from)
}

/// Reads an optional sign followed by leading decimal digits, ignoring
/// anything after them (`"300px"` is 300). A digit run past the `i64` range
/// saturates at the nearest bound.
fn parse_leading_integer(value: &str) -> Option<i64> {
    let unsigned = value.trim_start_matches(['+', '-']);
    let sign_len = value.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }

    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let saturated = if value.starts_with('-') { i64::MIN } else { i64::MAX };
    Some(value[..sign_len + digits].parse().unwrap_or(saturated))
}
