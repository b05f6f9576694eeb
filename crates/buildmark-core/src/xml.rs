//! Owned XML tree with a consuming builder API.
//!
//! Markup generators build an [`Element`] value bottom-up and hand the
//! finished tree to [`Document`] for serialization. There is no shared
//! writer state: every sub-generator returns the node it produced.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{RenderError, Result};

/// Whitespace used when serializing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlStyle {
    /// One level of indentation.
    pub indent: String,
    /// Written after every line, including the last.
    pub line_separator: String,
}

impl XmlStyle {
    pub fn new(indent: impl Into<String>, line_separator: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            line_separator: line_separator.into(),
        }
    }
}

impl Default for XmlStyle {
    fn default() -> Self {
        Self::new("  ", "\n")
    }
}

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped on write.
    Text(String),
    /// Character data written inside a CDATA section.
    CData(String),
    Comment(String),
    /// A pre-formed markup fragment written verbatim.
    Raw(String),
}

impl Node {
    fn is_inline(&self) -> bool {
        matches!(self, Node::Text(_) | Node::CData(_))
    }
}

/// An XML element and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>value</name>`
    pub fn leaf(name: impl Into<String>, value: impl ToString) -> Self {
        Self::new(name).text(value.to_string())
    }

    /// `<name>true</name>` or `<name>false</name>`
    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        Self::leaf(name, value)
    }

    /// `<name class="...">`, the form most plugin descriptors take.
    pub fn class(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::new(name).attr("class", class)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    /// Append `element` only when present.
    pub fn child_opt(self, element: Option<Element>) -> Self {
        match element {
            Some(element) => self.child(element),
            None => self,
        }
    }

    pub fn children(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(elements.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
        self
    }

    pub fn cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::CData(text.into()));
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Comment(text.into()));
        self
    }

    /// Splice a markup fragment verbatim.
    ///
    /// The fragment must be well-formed: every start tag closed, no stray
    /// end tags. Blank fragments are ignored.
    pub fn raw(mut self, fragment: impl Into<String>) -> Result<Self> {
        let fragment = fragment.into();
        if fragment.trim().is_empty() {
            return Ok(self);
        }
        check_fragment(&fragment)?;
        self.children.push(Node::Raw(fragment));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn write(&self, out: &mut String, depth: usize, style: &XmlStyle) {
        let pad = style.indent.repeat(depth);
        out.push_str(&pad);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            out.push_str(&style.line_separator);
            return;
        }

        out.push('>');
        if self.children.iter().all(Node::is_inline) {
            for node in &self.children {
                write_inline(out, node);
            }
        } else {
            out.push_str(&style.line_separator);
            let child_pad = style.indent.repeat(depth + 1);
            for node in &self.children {
                match node {
                    Node::Element(element) => element.write(out, depth + 1, style),
                    Node::Raw(fragment) => {
                        out.push_str(&child_pad);
                        out.push_str(fragment.trim());
                        out.push_str(&style.line_separator);
                    }
                    Node::Comment(text) => {
                        out.push_str(&child_pad);
                        write_comment(out, text);
                        out.push_str(&style.line_separator);
                    }
                    inline => {
                        out.push_str(&child_pad);
                        write_inline(out, inline);
                        out.push_str(&style.line_separator);
                    }
                }
            }
            out.push_str(&pad);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
        out.push_str(&style.line_separator);
    }
}

fn write_inline(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(text) => write_cdata(out, text),
        _ => {}
    }
}

fn write_cdata(out: &mut String, text: &str) {
    // `]]>` cannot appear inside a section; close and reopen around it.
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn write_comment(out: &mut String, text: &str) {
    out.push_str("<!-- ");
    out.push_str(&sanitize_comment(text));
    out.push_str(" -->");
}

fn sanitize_comment(text: &str) -> String {
    let mut text = text.to_string();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}

/// Verify that `fragment` is balanced, well-formed markup.
fn check_fragment(fragment: &str) -> Result<()> {
    let mut reader = Reader::from_str(fragment);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(end)) => {
                if depth == 0 {
                    return Err(RenderError::MalformedMarkup(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    )));
                }
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(RenderError::MalformedMarkup(e.to_string())),
        }
    }

    if depth != 0 {
        return Err(RenderError::MalformedMarkup(format!(
            "{depth} element(s) left open"
        )));
    }
    Ok(())
}

/// A complete XML document: declaration, comment banner and root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub banner: Vec<String>,
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            banner: Vec::new(),
            root,
        }
    }

    pub fn with_banner(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.banner.extend(lines);
        self
    }

    pub fn to_xml(&self, style: &XmlStyle) -> String {
        let sep = &style.line_separator;
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push_str(sep);

        if !self.banner.is_empty() {
            out.push_str("<!--");
            out.push_str(sep);
            for line in &self.banner {
                out.push_str(&style.indent);
                out.push_str(&sanitize_comment(line));
                out.push_str(sep);
            }
            out.push_str("-->");
            out.push_str(sep);
        }

        self.root.write(&mut out, 0, style);
        out
    }
}
