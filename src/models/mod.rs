//! Typed document model shared by the VAST and VMAP formats.

pub mod vast;
pub mod vmap;

use crate::tree::Node;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// An enumeration that XML documents spell out by name
pub trait Symbol: Sized + Copy + PartialEq + 'static {
    /// Every variant, in declaration order
    const ALL: &'static [Self];

    /// The token used in documents and in serialized output
    fn name(self) -> &'static str;

    /// Exact, case-sensitive lookup
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.name() == name)
    }

    /// Names of all variants, for diagnostics
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|value| value.name()).collect()
    }
}

/// A coerced value: either the typed result or the raw input that could not
/// be coerced. Mapping never fails on bad tokens or numbers; the validator
/// rejects `Invalid` values with their path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parsed<T> {
    Valid(T),
    Invalid(String),
}

impl<T> Parsed<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Parsed::Valid(value) => Some(value),
            Parsed::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Parsed::Valid(_))
    }
}

impl<T: Symbol> Parsed<T> {
    /// Look an enumeration token up by name
    pub fn symbol(raw: &str) -> Self {
        T::from_name(raw).map_or_else(|| Parsed::Invalid(raw.to_string()), Parsed::Valid)
    }
}

impl Parsed<i64> {
    /// Base-10 integer from the leading digits of `raw` (`"640px"` is 640)
    pub fn leading_integer(raw: &str) -> Self {
        leading_integer(raw).map_or_else(|| Parsed::Invalid(raw.to_string()), Parsed::Valid)
    }

    /// The whole of `raw` must be an integral number
    pub fn exact_integer(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                Parsed::Valid(value as i64)
            }
            _ => Parsed::Invalid(raw.to_string()),
        }
    }
}

impl Parsed<f64> {
    /// Decimal number from the leading numeric prefix of `raw`
    pub fn leading_number(raw: &str) -> Self {
        leading_number(raw).map_or_else(|| Parsed::Invalid(raw.to_string()), Parsed::Valid)
    }
}

impl Parsed<bool> {
    /// Strict tri-state flag: `"true"`, `"false"` or invalid
    pub fn flag(raw: &str) -> Self {
        match raw {
            "true" => Parsed::Valid(true),
            "false" => Parsed::Valid(false),
            other => Parsed::Invalid(other.to_string()),
        }
    }
}

/// Permissive flag: only the literal `"false"` is false, anything else
/// (including garbage) is true.
pub fn lenient_flag(raw: &str) -> bool {
    raw != "false"
}

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("Invalid number regex")
});

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let found = LEADING_NUMBER.find(trimmed)?;
    found.as_str().parse::<f64>().ok()
}

/// A payload that is either plain text or an opaque document fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Fragment(Node),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Fragment(_) => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&Node> {
        match self {
            Content::Fragment(node) => Some(node),
            Content::Text(_) => None,
        }
    }
}
