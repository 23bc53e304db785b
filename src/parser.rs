//! Document handles.
//!
//! A [`Parser`] owns one input document (raw XML or an already built
//! attributed tree) and moves through `unparsed → parsed → validated`. The
//! format is chosen by the [`Schema`] type parameter.

use crate::error::{ParseFailure, ParsingError, Result, UsageError, ValidationError};
use crate::mapper;
use crate::models::vast::VastDocument;
use crate::models::vmap::VmapDocument;
use crate::tree::{parse_xml, Node};
use crate::validate;
use log::debug;
use serde::Serialize;
use std::fmt::Debug;
use std::mem;

/// A document format: how to map a tree onto its model and how to validate it
pub trait Schema {
    type Document: Serialize + Clone + Debug + Send + 'static;

    /// Short format name, for diagnostics
    const NAME: &'static str;

    fn map(tree: &Node) -> std::result::Result<Self::Document, ParseFailure>;

    fn validate(doc: &mut Self::Document) -> std::result::Result<(), ValidationError>;
}

/// VAST 2.x / 3.x
#[derive(Debug)]
pub struct Vast;

impl Schema for Vast {
    type Document = VastDocument;
    const NAME: &'static str = "VAST";

    fn map(tree: &Node) -> std::result::Result<VastDocument, ParseFailure> {
        mapper::vast::map(tree)
    }

    fn validate(doc: &mut VastDocument) -> std::result::Result<(), ValidationError> {
        validate::vast::validate(doc)
    }
}

/// VMAP 1.x
#[derive(Debug)]
pub struct Vmap;

impl Schema for Vmap {
    type Document = VmapDocument;
    const NAME: &'static str = "VMAP";

    fn map(tree: &Node) -> std::result::Result<VmapDocument, ParseFailure> {
        mapper::vmap::map(tree)
    }

    fn validate(doc: &mut VmapDocument) -> std::result::Result<(), ValidationError> {
        validate::vmap::validate(doc)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Return the mapped document without running the validator
    pub skip_validation: bool,
}

#[derive(Debug)]
enum Input {
    Xml(String),
    Tree(Node),
}

#[derive(Debug)]
enum State<D> {
    Unparsed,
    Parsed(D),
    Validated(D),
}

/// Handle over a single VAST or VMAP document
#[derive(Debug)]
pub struct Parser<S: Schema> {
    input: Input,
    state: State<S::Document>,
}

pub type VastParser = Parser<Vast>;
pub type VmapParser = Parser<Vmap>;

impl<S: Schema> Parser<S> {
    /// Create a handle over raw XML
    pub fn new(xml: impl Into<String>) -> Result<Self> {
        let xml = xml.into();
        if xml.trim().is_empty() {
            return Err(UsageError::EmptyDocument.into());
        }
        Ok(Self::with_input(Input::Xml(xml)))
    }

    /// Create a handle over an attributed tree whose children are the
    /// document's root elements
    pub fn from_tree(tree: Node) -> Result<Self> {
        if tree == Node::default() {
            return Err(UsageError::EmptyDocument.into());
        }
        Ok(Self::with_input(Input::Tree(tree)))
    }

    fn with_input(input: Input) -> Self {
        Parser {
            input,
            state: State::Unparsed,
        }
    }

    /// Map the document, then validate it unless `options` says otherwise.
    ///
    /// Mapping happens once: later calls reuse the mapped document.
    pub fn parse(&mut self, options: ParseOptions) -> Result<&S::Document> {
        if let State::Unparsed = self.state {
            let document = self.map_input().map_err(ParsingError::from)?;
            debug!("{} document mapped", S::NAME);
            self.state = State::Parsed(document);
        }
        if !options.skip_validation {
            self.validate()?;
        }
        self.document()
    }

    fn map_input(&self) -> std::result::Result<S::Document, ParseFailure> {
        match &self.input {
            Input::Xml(xml) => S::map(&parse_xml(xml)?),
            Input::Tree(tree) => S::map(tree),
        }
    }

    /// Validate the parsed document. A document that already passed is not
    /// checked again.
    pub fn validate(&mut self) -> Result<()> {
        let document = match &mut self.state {
            State::Unparsed => return Err(UsageError::NotParsed.into()),
            State::Validated(_) => return Ok(()),
            State::Parsed(document) => document,
        };
        S::validate(document)?;
        if let State::Parsed(document) = mem::replace(&mut self.state, State::Unparsed) {
            self.state = State::Validated(document);
        }
        Ok(())
    }

    /// The mapped document, validated or not
    pub fn document(&self) -> Result<&S::Document> {
        match &self.state {
            State::Unparsed => Err(UsageError::NotParsed.into()),
            State::Parsed(document) | State::Validated(document) => Ok(document),
        }
    }

    pub fn into_document(self) -> Result<S::Document> {
        match self.state {
            State::Unparsed => Err(UsageError::NotParsed.into()),
            State::Parsed(document) | State::Validated(document) => Ok(document),
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self.state, State::Unparsed)
    }

    /// Whether the document has passed validation
    pub fn is_valid(&self) -> bool {
        matches!(self.state, State::Validated(_))
    }
}

/// Parse (and, unless told otherwise, validate) a document in one call
pub fn parse_document<S: Schema>(xml: impl Into<String>, options: ParseOptions) -> Result<S::Document> {
    let mut parser = Parser::<S>::new(xml)?;
    parser.parse(options)?;
    parser.into_document()
}

/// Parse and validate a VAST XML string
pub fn parse_vast(xml: &str) -> Result<VastDocument> {
    parse_document::<Vast>(xml, ParseOptions::default())
}

/// Parse and validate a VMAP XML string
pub fn parse_vmap(xml: &str) -> Result<VmapDocument> {
    parse_document::<Vmap>(xml, ParseOptions::default())
}
