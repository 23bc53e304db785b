//! Attributed tree: the generic shape every XML document is read into before
//! it is mapped onto the VAST or VMAP model.
//!
//! Each element becomes a [`Node`] holding its attributes, its (trimmed) text
//! content and its child elements grouped by qualified tag name. A child tag
//! always maps to a list, even when it occurs once, and namespace prefixes
//! stay part of the key (`vmap:AdBreak` and `AdBreak` are distinct).
//! Attributes and tags keep the order in which they first appear.
//!
//! Nodes also serve as the opaque "unvalidated document fragment" carried by
//! extensions and custom ad data. Serialized, a node looks like
//! `{"attr": "value", "$t": "text", "Child": [{...}]}`.

use crate::error::ParseFailure;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::from_utf8;

/// Key used for text content when a node is serialized
pub const TEXT_KEY: &str = "$t";

/// An element of the attributed tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<(String, Vec<Node>)>,
}

impl Node {
    pub fn new() -> Self {
        Node::default()
    }

    /// Builder: set an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name.into(), value.into());
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child element under `tag`
    pub fn with_child(mut self, tag: impl Into<String>, child: Node) -> Self {
        self.push_child(tag, child);
        self
    }

    pub fn push_child(&mut self, tag: impl Into<String>, child: Node) {
        let tag = tag.into();
        match self.children.iter_mut().find(|(name, _)| *name == tag) {
            Some((_, nodes)) => nodes.push(child),
            None => self.children.push((tag, vec![child])),
        }
    }

    fn set_attr(&mut self, name: String, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All children with the given tag, in document order
    pub fn children(&self, tag: &str) -> &[Node] {
        self.children
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, nodes)| nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Child tags in order of first occurrence
    pub fn child_tags(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn has_child(&self, tag: &str) -> bool {
        !self.children(tag).is_empty()
    }

    pub fn first(&self, tag: &str) -> Option<&Node> {
        self.children(tag).first()
    }

    /// Text of the first child with the given tag
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.first(tag).and_then(Node::text)
    }

    /// At most one child with the given tag; more is a structural error
    pub(crate) fn single(&self, tag: &str, message: &str) -> Result<Option<&Node>, ParseFailure> {
        match self.children(tag) {
            [] => Ok(None),
            [node] => Ok(Some(node)),
            _ => Err(ParseFailure::structure(message)),
        }
    }

    /// Whether the node carries anything besides its text and the listed
    /// attributes, i.e. whether it must be kept as a fragment rather than
    /// collapsed to its text.
    pub fn has_markup(&self, ignored_attributes: &[&str]) -> bool {
        !self.children.is_empty()
            || self
                .attributes
                .iter()
                .any(|(name, _)| !ignored_attributes.contains(&name.as_str()))
    }

    fn append_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Serialize the child elements (not this node's own attributes or text)
    /// back to XML markup.
    pub fn children_to_xml(&self) -> Result<String, ParseFailure> {
        let mut writer = Writer::new(Vec::new());
        for (tag, nodes) in &self.children {
            for node in nodes {
                write_element(&mut writer, tag, node)?;
            }
        }
        let bytes = writer.into_inner();
        Ok(from_utf8(&bytes)?.to_string())
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, tag: &str, node: &Node) -> Result<(), ParseFailure> {
    let mut start = BytesStart::new(tag);
    for (name, value) in &node.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    if node.text.is_none() && node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for (child_tag, children) in &node.children {
        for child in children {
            write_element(writer, child_tag, child)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.attributes.len() + self.children.len() + usize::from(self.text.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        if let Some(text) = &self.text {
            map.serialize_entry(TEXT_KEY, text)?;
        }
        for (tag, nodes) in &self.children {
            map.serialize_entry(tag, nodes)?;
        }
        map.end()
    }
}

/// Parse an XML string into an attributed tree.
///
/// The returned node is a document pseudo-root: it has no attributes and its
/// children are the document's root element(s).
pub fn parse_xml(xml: &str) -> Result<Node, ParseFailure> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    // (qualified name, node under construction); index 0 is the pseudo-root
    let mut stack: Vec<(String, Node)> = vec![(String::new(), Node::new())];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let (name, node) = open_element(e)?;
                stack.push((name, node));
            }
            Event::Empty(ref e) => {
                let (name, node) = open_element(e)?;
                current(&mut stack).push_child(name, node);
            }
            Event::End(_) => {
                // quick-xml checks that end names match their start tag
                if stack.len() > 1 {
                    if let Some((name, node)) = stack.pop() {
                        current(&mut stack).push_child(name, node);
                    }
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                current(&mut stack).append_text(&text);
            }
            Event::CData(e) => {
                let text = from_utf8(&e)?;
                current(&mut stack).append_text(text);
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if stack.len() > 1 {
        let name = stack.pop().map(|(name, _)| name).unwrap_or_default();
        return Err(ParseFailure::Unclosed(name));
    }
    Ok(stack.pop().map(|(_, root)| root).unwrap_or_default())
}

fn current(stack: &mut [(String, Node)]) -> &mut Node {
    // the pseudo-root is never popped, so the stack is never empty
    let last = stack.len() - 1;
    &mut stack[last].1
}

fn open_element(start: &BytesStart) -> Result<(String, Node), ParseFailure> {
    let name = from_utf8(start.name().as_ref())?.to_string();
    let mut node = Node::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        node.set_attr(key, value);
    }
    Ok((name, node))
}
