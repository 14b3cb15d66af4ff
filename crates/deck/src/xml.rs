//! A small writable XML tree with byte-faithful round-tripping.
//!
//! Slide parts are parsed into this tree, edited at the text-run level and
//! serialized back. Fidelity rules:
//!
//! - Start tags keep the raw slice between `<` and `>`, so attribute order,
//!   spacing and quoting survive verbatim.
//! - Text nodes keep the raw escaped form they were read with. A node that
//!   is never rewritten serializes to the exact input bytes.
//! - Rewritten text is escaped with [`partial_escape`] (`&`, `<`, `>`).

use std::io;

use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{
    BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event,
};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Parse(#[from] quick_xml::Error),
    #[error("XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unbalanced element tree")]
    Unbalanced,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One node of a parsed XML part. Non-element payloads are stored raw,
/// exactly as they appeared between their delimiters.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data in raw escaped form.
    Text(String),
    CData(String),
    Comment(String),
    /// Content of the `<?xml ...?>` declaration, without the delimiters.
    Decl(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An element and its children.
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// Raw start-tag content: qualified name followed by attributes.
    raw_start: String,
    name_len: usize,
    /// Parsed from a self-closing tag and still childless.
    empty: bool,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            raw_start: name.to_string(),
            name_len: name.len(),
            empty: false,
            children: Vec::new(),
        }
    }

    /// Qualified element name, e.g. `a:t`.
    pub fn name(&self) -> &str {
        &self.raw_start[..self.name_len]
    }

    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.elements().any(|el| el.name() == name)
    }

    /// Collects descendant elements named `name`, in document order.
    /// Matching elements are not searched for nested matches.
    pub fn descendants_named<'t>(&'t self, name: &str, out: &mut Vec<&'t XmlElement>) {
        for node in &self.children {
            if let XmlNode::Element(el) = node {
                if el.name() == name {
                    out.push(el);
                } else {
                    el.descendants_named(name, out);
                }
            }
        }
    }

    /// Mutable variant of [`descendants_named`](Self::descendants_named).
    pub fn descendants_named_mut<'t>(
        &'t mut self,
        name: &str,
        out: &mut Vec<&'t mut XmlElement>,
    ) {
        for node in &mut self.children {
            if let XmlNode::Element(el) = node {
                if el.name() == name {
                    out.push(el);
                } else {
                    el.descendants_named_mut(name, out);
                }
            }
        }
    }

    /// Concatenated character data of direct children, unescaped.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(raw) => match unescape(raw) {
                    Ok(cow) => out.push_str(&cow),
                    // Unknown entity: keep the raw form rather than drop it.
                    Err(_) => out.push_str(raw),
                },
                XmlNode::CData(raw) => out.push_str(raw),
                _ => {}
            }
        }
        out
    }

    /// Replaces all children with a single text node holding `text`.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![XmlNode::Text(partial_escape(text).into_owned())];
        self.empty = false;
    }
}

/// A parsed XML part: the prolog, the root element and any trailing nodes.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut nodes: Vec<XmlNode> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let mut el = element_from_start(&e)?;
                    el.empty = true;
                    push_node(&mut stack, &mut nodes, XmlNode::Element(el));
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or(XmlError::Unbalanced)?;
                    push_node(&mut stack, &mut nodes, XmlNode::Element(el));
                }
                Event::Text(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::Text(raw));
                }
                Event::GeneralRef(e) => {
                    // Fold entity references back into the surrounding text.
                    let name = std::str::from_utf8(&e)?;
                    push_node(&mut stack, &mut nodes, XmlNode::Text(format!("&{name};")));
                }
                Event::CData(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::CData(raw));
                }
                Event::Comment(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::Comment(raw));
                }
                Event::Decl(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::Decl(raw));
                }
                Event::PI(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::ProcessingInstruction(raw));
                }
                Event::DocType(e) => {
                    let raw = std::str::from_utf8(&e)?.to_string();
                    push_node(&mut stack, &mut nodes, XmlNode::DocType(raw));
                }
                Event::Eof => break,
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(XmlError::Unbalanced);
        }
        Ok(Self { nodes })
    }

    pub fn nodes_mut(&mut self) -> &mut [XmlNode] {
        &mut self.nodes
    }

    /// The document element, if one was parsed.
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn push_node(stack: &mut Vec<XmlElement>, top: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let raw_start = std::str::from_utf8(e)?.to_string();
    let name_len = e.name().as_ref().len();
    Ok(XmlElement {
        raw_start,
        name_len,
        empty: false,
        children: Vec::new(),
    })
}

fn write_node<W: io::Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), XmlError> {
    match node {
        XmlNode::Element(el) => {
            let start = BytesStart::from_content(el.raw_start.as_str(), el.name_len);
            if el.children.is_empty() && el.empty {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for child in &el.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(el.name())))?;
            }
        }
        XmlNode::Text(raw) => {
            writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?;
        }
        XmlNode::CData(raw) => {
            writer.write_event(Event::CData(BytesCData::new(raw.as_str())))?;
        }
        XmlNode::Comment(raw) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?;
        }
        XmlNode::Decl(raw) => {
            let content = BytesStart::from_content(raw.as_str(), "xml".len());
            writer.write_event(Event::Decl(BytesDecl::from_start(content)))?;
        }
        XmlNode::ProcessingInstruction(raw) => {
            writer.write_event(Event::PI(BytesPI::new(raw.as_str())))?;
        }
        XmlNode::DocType(raw) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))?;
        }
    }
    Ok(())
}
