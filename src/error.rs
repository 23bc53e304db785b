use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a document could not be turned into a typed tree
#[derive(Error, Debug)]
pub enum ParseFailure {
    #[error("Invalid XML document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid XML document: content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Invalid XML document: element <{0}> is never closed")]
    Unclosed(String),

    #[error("{0}")]
    Structure(String),

    #[error("Embedded VAST document could not be parsed")]
    EmbeddedVast(#[source] Box<ParseFailure>),
}

impl ParseFailure {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        ParseFailure::Structure(message.into())
    }
}

/// Malformed XML or a structural violation found while mapping
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ParsingError {
    message: String,
    #[source]
    cause: ParseFailure,
}

impl ParsingError {
    pub fn new(cause: ParseFailure) -> Self {
        Self::with_message("Document could not be parsed", cause)
    }

    pub fn with_message(message: impl Into<String>, cause: ParseFailure) -> Self {
        ParsingError {
            message: message.into(),
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying failure
    pub fn cause(&self) -> &ParseFailure {
        &self.cause
    }
}

impl From<ParseFailure> for ParsingError {
    fn from(cause: ParseFailure) -> Self {
        ParsingError::new(cause)
    }
}

/// A single rule violation, located by its path in the document tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The mapped document breaks one or more field or cross-field rules
#[derive(Error, Debug)]
#[error("{message} ({} violation(s))", .details.len())]
pub struct ValidationError {
    message: String,
    details: Vec<Violation>,
}

impl ValidationError {
    pub fn new(details: Vec<Violation>) -> Self {
        Self::with_message("Document does not validate schema", details)
    }

    pub fn with_message(message: impl Into<String>, details: Vec<Violation>) -> Self {
        ValidationError {
            message: message.into(),
            details,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every violation found, in traversal order
    pub fn details(&self) -> &[Violation] {
        &self.details
    }
}

/// Caller misuse of a document handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Cannot parse an empty document")]
    EmptyDocument,

    #[error("Document is not parsed yet")]
    NotParsed,
}

/// Errors that can occur when parsing VAST or VMAP documents
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid usage: {0}")]
    Usage(#[from] UsageError),
}

impl Error {
    pub fn is_parsing(&self) -> bool {
        matches!(self, Error::Parsing(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
