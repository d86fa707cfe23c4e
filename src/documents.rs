//! Editor documents
//!
//! Documents being edited are usually incomplete: unclosed elements, a
//! half-typed start tag at the caret, stray end tags. [`Document::parse`]
//! never fails on such input. It keeps every element it has seen together
//! with its byte offsets, so completion can find the element around a caret
//! and the children already written before it.

use crate::namespaces::{NamespaceContext, QName};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Element of an editor document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentElement {
    /// Resolved element name
    pub name: QName,
    /// Attributes as written, namespace declarations included
    pub attributes: Vec<(String, String)>,
    /// Offset of the `<` opening the start tag
    pub start: usize,
    /// Offset just after the start tag
    pub start_tag_end: usize,
    /// Offset where the content ends: the end tag, or where the element was
    /// implicitly terminated
    pub content_end: usize,
    /// Offset just after the element
    pub end: usize,
    /// Whether the element has a matching end tag or is an empty-element tag
    pub closed: bool,
    /// Written as `<name/>`
    pub self_closing: bool,
    /// Child elements in document order
    pub children: Vec<DocumentElement>,
}

impl DocumentElement {
    fn open(name: QName, attributes: Vec<(String, String)>, start: usize, start_tag_end: usize) -> Self {
        Self {
            name,
            attributes,
            start,
            start_tag_end,
            content_end: start_tag_end,
            end: start_tag_end,
            closed: false,
            self_closing: false,
            children: Vec::new(),
        }
    }

    /// Local name of the element
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Attribute value by name as written
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check if a caret offset lies inside the content of this element
    pub fn contains_content(&self, offset: usize) -> bool {
        !self.self_closing && self.start_tag_end <= offset && offset <= self.content_end
    }

    /// Names of the children completed before `offset`, in document order.
    ///
    /// Stops at the first child that ends after the offset; unclosed children
    /// are skipped.
    pub fn closed_children_before(&self, offset: usize) -> Vec<QName> {
        self.children
            .iter()
            .take_while(|child| child.end <= offset)
            .filter(|child| child.closed)
            .map(|child| child.name.clone())
            .collect()
    }
}

/// Tolerantly parsed editor document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Root element, None if the text has no element yet
    pub root: Option<DocumentElement>,
}

struct OpenElement {
    element: DocumentElement,
    raw_name: String,
    namespaces: NamespaceContext,
}

impl Document {
    /// Parse possibly incomplete XML text.
    ///
    /// Parsing stops at the first syntax error; elements still open at that
    /// point extend to the end of the text.
    pub fn parse(text: &str) -> Self {
        let mut reader = Reader::from_reader(text.as_bytes());
        reader.trim_text(false);
        reader.check_end_names(false);

        let mut doc = Document::default();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let before = reader.buffer_position();
            let event = reader.read_event_into(&mut buf);
            let after = reader.buffer_position();
            // A tag still being typed at the end of the text is not an element yet
            let unterminated = matches!(event, Ok(Event::Start(_) | Event::Empty(_)))
                && text.as_bytes().get(after.wrapping_sub(1)) != Some(&b'>');
            if unterminated {
                trace!(offset = before, "ignoring unterminated start tag");
                break;
            }
            match event {
                Ok(Event::Start(e)) => {
                    let parent = stack.last().map(|open| &open.namespaces);
                    let (element, raw_name, namespaces) = open_element(&e, parent, before, after);
                    stack.push(OpenElement {
                        element,
                        raw_name,
                        namespaces,
                    });
                }
                Ok(Event::Empty(e)) => {
                    let parent = stack.last().map(|open| &open.namespaces);
                    let (mut element, _, _) = open_element(&e, parent, before, after);
                    element.closed = true;
                    element.self_closing = true;
                    attach(&mut doc, &mut stack, element);
                }
                Ok(Event::End(e)) => {
                    let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let Some(depth) = stack.iter().rposition(|open| open.raw_name == raw_name)
                    else {
                        trace!(name = %raw_name, offset = before, "ignoring unmatched end tag");
                        buf.clear();
                        continue;
                    };
                    // Elements opened after the matching one end where it ends
                    while stack.len() > depth + 1 {
                        close_implicitly(&mut doc, &mut stack, before);
                    }
                    if let Some(open) = stack.pop() {
                        let mut element = open.element;
                        element.content_end = before;
                        element.end = after;
                        element.closed = true;
                        attach(&mut doc, &mut stack, element);
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    trace!(offset = before, error = %err, "document parse stopped");
                    break;
                }
                // text, comments, processing instructions, doctype
                Ok(_) => {}
            }
            buf.clear();
        }

        while !stack.is_empty() {
            close_implicitly(&mut doc, &mut stack, text.len());
        }
        doc
    }

    /// Root element
    pub fn root(&self) -> Option<&DocumentElement> {
        self.root.as_ref()
    }

    /// Elements whose content contains `offset`, outermost first
    pub fn path_at(&self, offset: usize) -> Vec<&DocumentElement> {
        let mut path = Vec::new();
        let mut current = self.root.as_ref().filter(|root| root.contains_content(offset));
        while let Some(element) = current {
            path.push(element);
            current = element
                .children
                .iter()
                .find(|child| child.contains_content(offset));
        }
        path
    }

    /// Deepest element whose content contains `offset`
    pub fn find_element_at(&self, offset: usize) -> Option<&DocumentElement> {
        self.path_at(offset).pop()
    }

    /// Schema documents named by `xsi:schemaLocation` and
    /// `xsi:noNamespaceSchemaLocation` on the root element
    pub fn schema_location_hints(&self) -> Vec<String> {
        let Some(root) = &self.root else {
            return Vec::new();
        };
        let mut namespaces = NamespaceContext::new();
        for (key, value) in &root.attributes {
            namespaces.declare(key, value);
        }

        let mut hints = Vec::new();
        for (key, value) in &root.attributes {
            let Some((prefix, local)) = key.split_once(':') else {
                continue;
            };
            if namespaces.get_namespace(prefix) != Some(XSI_NAMESPACE) {
                continue;
            }
            match local {
                // Pairs of namespace and location
                "schemaLocation" => hints.extend(
                    value
                        .split_whitespace()
                        .skip(1)
                        .step_by(2)
                        .map(String::from),
                ),
                "noNamespaceSchemaLocation" => hints.push(value.trim().to_string()),
                _ => {}
            }
        }
        hints
    }
}

fn open_element(
    start: &BytesStart,
    parent: Option<&NamespaceContext>,
    offset: usize,
    start_tag_end: usize,
) -> (DocumentElement, String, NamespaceContext) {
    let raw_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut namespaces = parent.cloned().unwrap_or_default();
    let mut attributes = Vec::new();

    for attr in start.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        namespaces.declare(&key, &value);
        attributes.push((key, value));
    }

    let name = namespaces.resolve(&raw_name).unwrap_or_else(|_| {
        let local = raw_name.rsplit(':').next().unwrap_or(&raw_name);
        QName::local(local)
    });
    let element = DocumentElement::open(name, attributes, offset, start_tag_end);
    (element, raw_name, namespaces)
}

fn attach(doc: &mut Document, stack: &mut [OpenElement], element: DocumentElement) {
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None => {
            if doc.root.is_none() {
                doc.root = Some(element);
            }
        }
    }
}

fn close_implicitly(doc: &mut Document, stack: &mut Vec<OpenElement>, offset: usize) {
    if let Some(open) = stack.pop() {
        let mut element = open.element;
        element.content_end = offset;
        element.end = offset;
        attach(doc, stack, element);
    }
}
