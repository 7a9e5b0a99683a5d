//! Owned, mutable XML element tree for OOXML parts.
//!
//! Built on `quick-xml` events. Anything that is not an element (text,
//! comments, CDATA, declarations, processing instructions) is kept as the raw
//! event it was read as, and text stays in its escaped form, so a tree that is
//! never edited serializes back to the bytes it was parsed from.

use crate::error::CodecError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashSet;

/// Deepest element nesting `XmlTree::parse` accepts. Editing, serializing and
/// dropping a tree recurse once per level.
pub const MAX_DEPTH: usize = 1024;

pub enum Node {
    Element(Element),
    /// Non-element content, verbatim
    Other(Event<'static>),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Other(_) => None,
        }
    }

    /// True when this node is an element with the qualified name `name`.
    pub fn is_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.is_named(name))
    }
}

pub struct Element {
    start: BytesStart<'static>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// A new, childless element. It is written as `<name/>` until it gains children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: BytesStart::new(name.into()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Qualified name as written, e.g. `w:hyperlink`.
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    /// Unescaped value of the attribute with qualified name `key`.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .find(|attr| attr.key.as_ref() == key.as_bytes())
            .and_then(|attr| attr.unescape_value().ok())
            .map(|value| value.into_owned())
    }

    /// `(qualified name, unescaped value)` for every well-formed attribute.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .filter_map(|attr| {
                let key = String::from_utf8(attr.key.as_ref().to_vec()).ok()?;
                let value = attr.unescape_value().ok()?.into_owned();
                Some((key, value))
            })
            .collect()
    }

    /// Child elements, skipping text and other non-element nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// The first child element called `name`, inserted as the first child when absent.
    pub fn child_or_insert_first(&mut self, name: &str) -> Option<&mut Element> {
        if !self.children.iter().any(|node| node.is_named(name)) {
            self.children.insert(0, Node::Element(Element::new(name)));
        }
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.is_named(name) => Some(el),
            _ => None,
        })
    }

    /// Unescaped text of every text node below this element, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(el) => collect_text(&el.children, out),
            Node::Other(Event::Text(text)) => {
                if let Ok(unescaped) = text.unescape() {
                    out.push_str(&unescaped);
                }
            }
            Node::Other(Event::CData(data)) => out.push_str(&String::from_utf8_lossy(data)),
            Node::Other(_) => {}
        }
    }
}

/// One parsed XML part: the prolog, the root element and any trailing misc nodes.
pub struct XmlTree {
    part: String,
    pub nodes: Vec<Node>,
}

impl XmlTree {
    /// Parse the part called `part` (the name only labels errors).
    ///
    /// Elements nested more than [`MAX_DEPTH`] levels deep are rejected.
    pub fn parse(part: &str, xml: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| CodecError::Xml {
                    part: part.to_string(),
                    source,
                })?;

            let node = match event {
                Event::Start(start) => {
                    if open.len() >= MAX_DEPTH {
                        return Err(unbalanced(part, "nesting too deep"));
                    }
                    open.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    buf.clear();
                    continue;
                }
                Event::End(_) => match open.pop() {
                    Some(el) => Node::Element(el),
                    None => return Err(unbalanced(part, "closing tag without an opening tag")),
                },
                Event::Empty(start) => Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };

            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
            buf.clear();
        }

        if let Some(el) = open.last() {
            let name = String::from_utf8_lossy(el.name()).into_owned();
            return Err(unbalanced(part, &format!("<{name}> is never closed")));
        }
        if !nodes.iter().any(|node| node.as_element().is_some()) {
            return Err(unbalanced(part, "no root element"));
        }

        Ok(Self {
            part: part.to_string(),
            nodes,
        })
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Other(_) => None,
        })
    }

    /// The prefix the root element binds to `namespace`, if any.
    pub fn prefix_for(&self, namespace: &str) -> Option<String> {
        self.root()?
            .attributes()
            .into_iter()
            .find_map(|(key, value)| {
                let prefix = key.strip_prefix("xmlns:")?;
                (value == namespace).then(|| prefix.to_string())
            })
    }

    /// Every attribute value anywhere in the tree.
    pub fn attribute_values(&self) -> HashSet<String> {
        let mut values = HashSet::new();
        let mut stack: Vec<&Element> = self.nodes.iter().filter_map(Node::as_element).collect();
        while let Some(el) = stack.pop() {
            values.extend(el.attributes().into_iter().map(|(_, value)| value));
            stack.extend(el.elements());
        }
        values
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node).map_err(|e| CodecError::Unbalanced {
                part: self.part.clone(),
                detail: format!("cannot serialize: {e}"),
            })?;
        }
        Ok(writer.into_inner())
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::io::Result<()> {
    match node {
        Node::Element(el) if el.self_closing && el.children.is_empty() => {
            writer.write_event(Event::Empty(el.start.borrow()))
        }
        Node::Element(el) => {
            writer.write_event(Event::Start(el.start.borrow()))?;
            for child in &el.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(el.start.to_end()))
        }
        Node::Other(event) => writer.write_event(event.borrow()),
    }
}

fn unbalanced(part: &str, detail: &str) -> CodecError {
    CodecError::Unbalanced {
        part: part.to_string(),
        detail: detail.to_string(),
    }
}
