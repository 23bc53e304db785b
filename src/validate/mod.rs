//! Rule engine shared by the VAST and VMAP validators.
//!
//! A [`Checker`] walks a mapped document while tracking the path of the value
//! being checked, and collects every [`Violation`] instead of stopping at the
//! first one.

pub mod vast;
pub mod vmap;

use crate::error::{ValidationError, Violation};
use crate::models::{Parsed, Symbol};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `hh:mm:ss[.mmm]`
pub(crate) static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[1-9]\d+|0[0-9]):[0-5]\d:[0-5]\d(?:\.\d\d\d)?$").expect("Invalid time regex")
});

/// `hh:mm:ss[.mmm]` or a percentage between 0 and 100
pub(crate) static TIME_OR_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:(?:[1-9]\d+|0[0-9]):[0-5]\d:[0-5]\d(?:\.\d\d\d)?)|(?:[1-9][0-9]?|100|0)(?:\.\d+)?%)$",
    )
    .expect("Invalid time or percent regex")
});

/// Ordinal break position, `#1`, `#2`...
pub(crate) static POSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\d+$").expect("Invalid position regex"));

static HTTP_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.*").expect("Invalid uri regex"));

#[derive(Debug, Clone, Copy)]
enum Segment {
    Field(&'static str),
    Index(usize),
}

/// Path-aware violation collector
#[derive(Debug, Default)]
pub(crate) struct Checker {
    path: Vec<Segment>,
    violations: Vec<Violation>,
}

impl Checker {
    pub fn new() -> Self {
        Checker::default()
    }

    /// Run `check` with `name` appended to the current path
    pub fn field<R>(&mut self, name: &'static str, check: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(Segment::Field(name));
        let result = check(self);
        self.path.pop();
        result
    }

    /// Run `check` on every item of the list found under `name`
    pub fn items<T>(&mut self, name: &'static str, items: &[T], mut check: impl FnMut(&mut Self, &T)) {
        self.field(name, |checker| {
            for (index, item) in items.iter().enumerate() {
                checker.path.push(Segment::Index(index));
                check(checker, item);
                checker.path.pop();
            }
        });
    }

    /// Record a violation at the current path
    pub fn fail(&mut self, message: impl Into<String>) {
        let violation = Violation {
            path: self.path(),
            message: message.into(),
        };
        self.violations.push(violation);
    }

    pub fn fail_at(&mut self, name: &'static str, message: impl Into<String>) {
        self.field(name, |checker| checker.fail(message));
    }

    /// Fail when `value` is absent; passes it through otherwise
    pub fn required<'a, T: ?Sized>(&mut self, name: &'static str, value: Option<&'a T>) -> Option<&'a T> {
        if value.is_none() {
            self.fail_at(name, "is required");
        }
        value
    }

    /// Fail when `value` is present
    pub fn forbidden<T: ?Sized>(&mut self, name: &'static str, value: Option<&T>, reason: &str) {
        if value.is_some() {
            self.fail_at(name, format!("is not allowed {reason}"));
        }
    }

    /// Present strings must not be empty
    pub fn non_empty(&mut self, name: &'static str, value: Option<&str>) {
        if value.is_some_and(str::is_empty) {
            self.fail_at(name, "is not allowed to be empty");
        }
    }

    pub fn pattern(&mut self, name: &'static str, value: Option<&str>, regex: &Regex, format: &str) {
        if let Some(value) = value.filter(|value| !regex.is_match(value)) {
            self.fail_at(name, format!("\"{value}\" does not match the {format} format"));
        }
    }

    /// Loose uri check: anything starting with `http://` or `https://`
    pub fn http_uri(&mut self, name: &'static str, value: Option<&str>) {
        self.pattern(name, value, &HTTP_URI, "http(s) uri");
    }

    /// Strict absolute http(s) url
    pub fn url(&mut self, name: &'static str, value: Option<&str>) {
        let Some(value) = value else { return };
        let valid = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            self.fail_at(name, format!("\"{value}\" must be a valid http(s) url"));
        }
    }

    pub fn symbol<T: Symbol>(&mut self, name: &'static str, value: &Parsed<T>) -> Option<T> {
        self.field(name, |checker| checker.symbol_here(value))
    }

    /// Like [`Checker::symbol`], for a value sitting at the current path
    pub fn symbol_here<T: Symbol>(&mut self, value: &Parsed<T>) -> Option<T> {
        match value {
            Parsed::Valid(value) => Some(*value),
            Parsed::Invalid(raw) => {
                self.fail(format!("\"{raw}\" must be one of [{}]", T::names().join(", ")));
                None
            }
        }
    }

    pub fn integer(&mut self, name: &'static str, value: &Parsed<i64>) -> Option<i64> {
        match value {
            Parsed::Valid(value) => Some(*value),
            Parsed::Invalid(raw) => {
                self.fail_at(name, format!("\"{raw}\" must be an integer"));
                None
            }
        }
    }

    /// Integer strictly greater than zero
    pub fn positive(&mut self, name: &'static str, value: &Parsed<i64>) {
        if let Some(value) = self.integer(name, value).filter(|value| *value <= 0) {
            self.fail_at(name, format!("{value} must be a positive number"));
        }
    }

    pub fn flag(&mut self, name: &'static str, value: &Parsed<bool>) -> Option<bool> {
        match value {
            Parsed::Valid(value) => Some(*value),
            Parsed::Invalid(raw) => {
                self.fail_at(name, format!("\"{raw}\" must be a boolean"));
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.path {
            match segment {
                Segment::Field(name) if path.is_empty() => path.push_str(name),
                Segment::Field(name) => {
                    path.push('.');
                    path.push_str(name);
                }
                Segment::Index(index) => path.push_str(&format!("[{index}]")),
            }
        }
        path
    }
}
