use core::fmt;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::Debug;
use std::io::{self, BufRead, Read};
use std::mem;

use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use crate::parser::util::decode_entities;

#[cfg(test)]
mod tests;

/// Iteration over the XML elements may return an error (malformed content etc)
pub(crate) type XmlResult<T> = std::result::Result<T, XmlError>;

/// The namespace bound to the reserved "xml" prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Attributes whose values are URIs, resolved against the active xml:base
/// https://tools.ietf.org/html/rfc4287
const URI_ATTRIBUTES: [&str; 4] = ["href", "scheme", "src", "uri"];

/// Code points legal in an XML document
/// https://www.w3.org/TR/xml/#charsets
fn is_legal_xml_char(c: char) -> bool {
    matches!(c,
        '\u{09}' | '\u{0A}' | '\u{0D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

// Expected length of a UTF-8 sequence given its lead byte, or 0 if the byte
// cannot start a sequence
fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// A reader that removes characters illegal in XML from the underlying stream
///
/// Feeds found in the wild contain control characters and other code points the
/// XML specification forbids, which would otherwise terminate parsing. Illegal
/// characters are dropped silently. Byte sequences that are not valid UTF-8
/// pass through untouched since the tokenizer's encoding layer owns those.
pub(crate) struct XmlSanitizer<R: Read> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    carry: [u8; 4],
    carry_len: usize,
    eof: bool,
}

impl<R: Read> XmlSanitizer<R> {
    pub(crate) fn new(inner: R) -> XmlSanitizer<R> {
        XmlSanitizer {
            inner,
            buf: Vec::new(),
            pos: 0,
            carry: [0; 4],
            carry_len: 0,
            eof: false,
        }
    }

    // Reads the next chunk from the underlying stream and copies the legal
    // characters into the output buffer
    fn refill(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.pos = 0;

        let mut raw = Vec::with_capacity(8192 + 4);
        raw.extend_from_slice(&self.carry[..self.carry_len]);
        self.carry_len = 0;

        let mut chunk = [0u8; 8192];
        let count = self.inner.read(&mut chunk)?;
        if count == 0 {
            self.eof = true;
        }
        raw.extend_from_slice(&chunk[..count]);

        let mut i = 0;
        while i < raw.len() {
            let len = utf8_sequence_len(raw[i]);

            // Not a UTF-8 lead byte
            if len == 0 {
                self.buf.push(raw[i]);
                i += 1;
                continue;
            }

            // A sequence split across chunks carries over to the next read
            if i + len > raw.len() {
                if self.eof {
                    self.buf.extend_from_slice(&raw[i..]);
                } else {
                    let rest = raw.len() - i;
                    self.carry[..rest].copy_from_slice(&raw[i..]);
                    self.carry_len = rest;
                }
                break;
            }

            match std::str::from_utf8(&raw[i..i + len]) {
                Ok(s) => {
                    if s.chars().next().map(is_legal_xml_char).unwrap_or(false) {
                        self.buf.extend_from_slice(s.as_bytes());
                    }
                    i += len;
                }
                Err(_) => {
                    self.buf.push(raw[i]);
                    i += 1;
                }
            }
        }

        Ok(())
    }
}

impl<R: Read> Read for XmlSanitizer<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.buf.len() {
            if self.eof && self.carry_len == 0 {
                return Ok(0);
            }
            self.refill()?;
        }

        let count = (self.buf.len() - self.pos).min(out.len());
        out[..count].copy_from_slice(&self.buf[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }
}

/// Produces elements from the provided source
pub(crate) struct ElementSource<R: BufRead> {
    // Needs to be a RefCell since we can't borrow mutably multiple times (e.g. when calls to Element::children() are nested)
    state: RefCell<SourceState<R>>,
}

impl<R: BufRead> ElementSource<R> {
    /// Parses the XML stream and emits elements
    ///
    /// # Arguments
    ///
    /// * `xml_data` - the data you wish to parse
    /// * `strict` - when false (the norm for feeds) mismatched end-tags and
    ///   dangling ampersands are tolerated
    pub(crate) fn new(xml_data: R, strict: bool) -> ElementSource<R> {
        // Create the XML parser
        let mut reader = Reader::from_reader(xml_data);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_markup_names_in_closing_tags = true;
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.check_end_names = strict;
        config.allow_dangling_amp = !strict;

        let state = RefCell::new(SourceState::new(reader));
        ElementSource { state }
    }

    /// Returns the first element in the source, or `None` if the document has no root
    pub(crate) fn root(&self) -> XmlResult<Option<Element<R>>> {
        self.next_element_at_depth(1)
    }

    // Return the raw XML of all children at or below the nominated depth
    fn children_as_string(&self, depth: u32, buffer: &mut String) -> XmlResult<()> {
        // Read nodes at the current depth or greater
        let mut state = self.state.borrow_mut();
        let mut current_depth = depth;

        loop {
            // We need to throw an error if we cannot consume all the children (e.g. malformed XML)
            let peeked = state.peek();
            if peeked.is_err() {
                state.next()?;
                unreachable!("next() returned a value where peek() saw an error");
            }

            // Fetch the next event
            if let Ok(Some(event)) = peeked {
                match event {
                    XmlEvent::Start { qualified, attributes, .. } => {
                        // Note that we have descended into an element
                        current_depth += 1;

                        append_element_start(buffer, qualified, attributes);
                    }

                    XmlEvent::Text(text) => append_element_text(buffer, text),

                    XmlEvent::CData(text) => {
                        buffer.push_str("<![CDATA[");
                        buffer.push_str(text);
                        buffer.push_str("]]>");
                    }

                    XmlEvent::End { qualified } => {
                        // Break out of the iteration if we would move above our iteration depth
                        current_depth -= 1;
                        if current_depth < depth {
                            break;
                        }

                        append_element_end(buffer, qualified);
                    }
                }

                // Consume this node
                state.next()?;
            } else {
                // No more nodes ... we hit the end of the document
                break;
            }
        }

        Ok(())
    }

    // Returns the next element at the nominated depth
    fn next_element_at_depth(&self, iter_depth: u32) -> XmlResult<Option<Element<R>>> {
        // Read nodes until we arrive at the correct depth
        let mut state = self.state.borrow_mut();
        while let Some(event) = state.next()? {
            match event {
                // The start of an element may be interesting to the iterator
                XmlEvent::Start { name, prefix, namespace, attributes, .. } => {
                    // Starting an element increases our depth
                    state.current_depth += 1;

                    // If we are at the correct depth we found a node of interest
                    if state.current_depth == iter_depth {
                        let element = Element {
                            name,
                            prefix,
                            namespace,
                            attributes,
                            source: self,
                            depth: state.current_depth,
                        };
                        return Ok(Some(element));
                    }
                }

                // The end of an element moves back up the hierarchy
                XmlEvent::End { .. } => state.current_depth -= 1,

                // Not interested in text when looking for elements
                _ => {}
            }

            // If we have hit the end of children at this level we terminate
            if state.current_depth < iter_depth - 1 {
                return Ok(None);
            }
        }

        // Hit the end of the document
        if state.current_depth > 0 {
            Err(XmlError::UnexpectedEof { depth: state.current_depth })
        } else {
            Ok(None)
        }
    }

    // Extracts the character data at the current point, if any, accumulating
    // consecutive text and CDATA nodes
    fn text_node(&self) -> XmlResult<Option<String>> {
        let mut state = self.state.borrow_mut();
        let mut text = String::new();
        let mut found = false;

        loop {
            match state.peek() {
                Ok(Some(XmlEvent::Text(_))) => {
                    if let Some(XmlEvent::Text(chunk)) = state.next()? {
                        text.push_str(&decode_entities(&chunk));
                        found = true;
                    }
                }
                Ok(Some(XmlEvent::CData(_))) => {
                    if let Some(XmlEvent::CData(chunk)) = state.next()? {
                        text.push_str(&chunk);
                        found = true;
                    }
                }
                _ => break,
            }
        }

        Ok(if found { Some(text) } else { None })
    }
}

// Wraps the XML source and current depth of iteration
struct SourceState<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    next: XmlResult<Option<XmlEvent>>,
    current_depth: u32,
    namespaces: NamespaceScope,
    bases: Vec<Option<Url>>,
}

impl<R: BufRead> SourceState<R> {
    // Wrap the reader in additional state (buffers, tree depth etc)
    fn new(reader: Reader<R>) -> SourceState<R> {
        let mut state = SourceState {
            reader,
            buf: Vec::with_capacity(512),
            next: Ok(None),
            current_depth: 0,
            namespaces: NamespaceScope::new(),
            bases: Vec::new(),
        };
        state.next = state.fetch_next();
        state
    }

    // Decodes bytes with the document's detected character encoding
    fn decode(&self, bytes: &[u8]) -> XmlResult<String> {
        match self.reader.decoder().decode(bytes) {
            Ok(decoded) => Ok(decoded.into_owned()),
            Err(e) => Err(XmlError::Decode(e.to_string())),
        }
    }

    // Returns the next event
    //
    // The tokenizer's events borrow the shared buffer, so each arm copies the
    // raw bytes out before this state is touched again.
    fn fetch_next(&mut self) -> XmlResult<Option<XmlEvent>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                // Start of an element
                Ok(Event::Start(ref event)) => {
                    let name_raw = event.name().as_ref().to_vec();
                    let attrs_raw: Vec<(Vec<u8>, Vec<u8>)> = event
                        .attributes()
                        .with_checks(false)
                        .flatten()
                        .map(|attribute| (attribute.key.as_ref().to_vec(), attribute.value.into_owned()))
                        .collect();

                    let qualified = self.decode(&name_raw)?;

                    // Attribute values have entities expanded up front
                    let mut attributes = Vec::with_capacity(attrs_raw.len());
                    for (key, value) in &attrs_raw {
                        let name = self.decode(key)?;
                        let value = decode_entities(&self.decode(value)?);
                        attributes.push(NameValue { name, value });
                    }

                    // Namespace declarations on this element shadow inherited ones
                    self.namespaces.push(&attributes);

                    let (prefix, name) = split_qualified(&qualified);
                    let namespace = self.namespaces.uri_for_prefix(prefix);
                    let (prefix, name) = (prefix.to_string(), name.to_string());

                    // An xml:base on this element applies to the element itself
                    self.push_base(&attributes);
                    self.resolve_uri_attributes(&mut attributes);

                    return Ok(Some(XmlEvent::Start { name, prefix, namespace, qualified, attributes }));
                }

                // End of an element
                Ok(Event::End(ref event)) => {
                    let name_raw = event.name().as_ref().to_vec();
                    let qualified = self.decode(&name_raw)?;
                    self.namespaces.pop();
                    self.bases.pop();
                    return Ok(Some(XmlEvent::End { qualified }));
                }

                // Text (raw, with any entity references intact)
                Ok(Event::Text(ref event)) => {
                    let raw = event.to_vec();
                    let text = self.decode(&raw)?;
                    if !text.is_empty() {
                        return Ok(Some(XmlEvent::Text(text)));
                    }
                }

                // An entity or character reference within text
                Ok(Event::GeneralRef(ref event)) => {
                    let raw = event.to_vec();
                    let name = self.decode(&raw)?;
                    return Ok(Some(XmlEvent::Text(format!("&{};", name))));
                }

                // CData passes through verbatim
                Ok(Event::CData(ref event)) => {
                    let raw = event.to_vec();
                    let text = self.decode(&raw)?;
                    return Ok(Some(XmlEvent::CData(text)));
                }

                // The end of the document
                Ok(Event::Eof) => return Ok(None),

                // Ignore everything else (comments, processing instructions, declarations)
                Ok(_) => {}

                Err(e) => return Err(XmlError::Parser(e)),
            }
        }
    }

    // Returns the next interesting event or None if no more events are found
    fn next(&mut self) -> XmlResult<Option<XmlEvent>> {
        let next = mem::replace(&mut self.next, Ok(None));
        self.next = self.fetch_next();
        next
    }

    // Peeks the next event (does not advance)
    // Callers should call next() to consume the event to move on
    fn peek(&mut self) -> &XmlResult<Option<XmlEvent>> {
        &self.next
    }

    // Pushes the base URI in effect for the element carrying these attributes
    fn push_base(&mut self, attributes: &[NameValue]) {
        let inherited = self.bases.last().cloned().flatten();

        let declared = attributes
            .iter()
            .find(|attr| attr.name == "xml:base")
            .and_then(|attr| match &inherited {
                Some(inherited) => inherited.join(&attr.value).ok(),
                None => Url::parse(&attr.value).ok(),
            });

        self.bases.push(declared.or(inherited));
    }

    // Resolves URI-bearing attributes against the active base
    fn resolve_uri_attributes(&self, attributes: &mut [NameValue]) {
        let base = match self.bases.last() {
            Some(Some(base)) => base,
            _ => return,
        };

        for attribute in attributes.iter_mut() {
            let (_, local) = split_qualified(&attribute.name);
            if URI_ATTRIBUTES.iter().any(|uri_attr| local.eq_ignore_ascii_case(uri_attr)) {
                if let Ok(resolved) = base.join(&attribute.value) {
                    attribute.value = resolved.to_string();
                }
            }
        }
    }
}

// Tracks xmlns declarations as a stack of per-element frames
struct NamespaceScope {
    // Each frame holds the (prefix, uri) pairs declared on one element
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    fn new() -> NamespaceScope {
        NamespaceScope { frames: Vec::new() }
    }

    // Collects xmlns/xmlns:prefix declarations from a start tag
    fn push(&mut self, attributes: &[NameValue]) {
        let mut frame = Vec::new();
        for attribute in attributes {
            if attribute.name == "xmlns" {
                frame.push((String::new(), attribute.value.clone()));
            } else if let Some(prefix) = attribute.name.strip_prefix("xmlns:") {
                frame.push((prefix.to_string(), attribute.value.clone()));
            }
        }
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    // Resolves a prefix to its namespace URI, innermost declaration first
    //
    // An undeclared prefix resolves to itself, matching the lenient decoders
    // that real-world feed parsers sit on.
    fn uri_for_prefix(&self, prefix: &str) -> String {
        if prefix == "xml" {
            return XML_NAMESPACE.to_string();
        }

        for frame in self.frames.iter().rev() {
            if let Some((_, uri)) = frame.iter().rev().find(|(declared, _)| declared == prefix) {
                return uri.clone();
            }
        }

        prefix.to_string()
    }
}

// Splits a qualified name into (prefix, local) parts
fn split_qualified(qualified: &str) -> (&str, &str) {
    match qualified.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qualified),
    }
}

/// An element (specifically, XML element start tag)
pub(crate) struct Element<'a, R: BufRead> {
    /// Local name of the element (case preserved from the document)
    pub name: String,

    /// The namespace prefix as written in the document, or empty
    pub prefix: String,

    /// The resolved namespace URI for this element, or empty if it has none
    pub namespace: String,

    /// A list of attributes associated with the element
    pub attributes: Vec<NameValue>,

    // Depth of this element
    depth: u32,

    // The underlying source of XML events
    source: &'a ElementSource<R>,
}

impl<'a, R: BufRead> Element<'a, R> {
    /// Returns the value for an attribute if it exists (the local part of the name is matched case-insensitively)
    pub(crate) fn attr_value(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|attr| {
                let (_, local) = split_qualified(&attr.name);
                local.eq_ignore_ascii_case(name)
            })
            .map(|attr| attr.value.clone())
    }

    /// Compares the element's local name, ignoring ASCII case
    pub(crate) fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The element's local name folded to lower case, for dispatch tables
    pub(crate) fn name_folded(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// If the cursor sits on XML characters they are returned as a `String`, otherwise `None`
    ///
    /// Entities are expanded where known; CDATA content is returned verbatim.
    pub(crate) fn child_as_text(&self) -> XmlResult<Option<String>> {
        self.source.text_node()
    }

    /// Returns an iterator over children of this element (i.e. descends a level in the hierarchy)
    pub(crate) fn children(&self) -> ElementIter<'a, R> {
        ElementIter { source: self.source, depth: self.depth + 1 }
    }

    /// Concatenates the children of this node into a string
    ///
    /// Entity references and CDATA sections are preserved as written.
    ///
    /// NOTE: the input stream is parsed then re-serialised so the output will not be identical to the input
    pub(crate) fn children_as_string(&self) -> XmlResult<String> {
        let mut buffer = String::new();
        self.source.children_as_string(self.depth + 1, &mut buffer)?;
        Ok(buffer)
    }
}

impl<'a, R: BufRead> Debug for Element<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qualified = if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.prefix, self.name)
        };
        let mut buffer = String::new();
        append_element_start(&mut buffer, &qualified, &self.attributes);
        writeln!(f, "{}", buffer)
    }
}

/// Iterator over elements at a specific depth in the hierarchy
pub(crate) struct ElementIter<'a, R: BufRead> {
    source: &'a ElementSource<R>,
    depth: u32,
}

impl<'a, R: BufRead> Iterator for ElementIter<'a, R> {
    type Item = XmlResult<Element<'a, R>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_element_at_depth(self.depth).transpose()
    }
}

/// Combination of a name and value (e.g. attribute name + value)
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NameValue {
    pub name: String,
    pub value: String,
}

/// Errors for the underlying parser
#[derive(Debug)]
pub enum XmlError {
    /// The tokenizer rejected the document
    Parser(quick_xml::Error),
    /// Bytes could not be decoded with the document's character encoding
    Decode(String),
    /// The document ended while elements were still open
    UnexpectedEof { depth: u32 },
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::Parser(e) => write!(f, "parser error: {}", e),
            XmlError::Decode(e) => write!(f, "decoding error: {}", e),
            XmlError::UnexpectedEof { depth } => write!(f, "document terminated at depth {}", depth),
        }
    }
}

impl Error for XmlError {}

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        XmlError::Parser(e)
    }
}

// Abstraction over the underlying XML reader event model
enum XmlEvent {
    // An XML start tag with its resolved namespace
    Start {
        name: String,
        prefix: String,
        namespace: String,
        qualified: String,
        attributes: Vec<NameValue>,
    },
    // An XML end tag
    End {
        qualified: String,
    },
    // Raw text (entity references intact)
    Text(String),
    // A CDATA section
    CData(String),
}

// Appends an element-end to the buffer
fn append_element_end(buffer: &mut String, qualified: &str) {
    buffer.push_str("</");
    buffer.push_str(qualified);
    buffer.push('>');
}

// Appends an element-start to the buffer
fn append_element_start(buffer: &mut String, qualified: &str, attributes: &[NameValue]) {
    buffer.push('<');
    buffer.push_str(qualified);
    for attr in attributes {
        buffer.push(' ');
        buffer.push_str(attr.name.as_str());
        buffer.push_str("=\"");
        buffer.push_str(&escape_attribute(&attr.value));
        buffer.push('"');
    }
    buffer.push('>');
}

// Appends a text element
fn append_element_text(buffer: &mut String, text: &str) {
    buffer.push_str(text);
}

// Escapes an attribute value for re-serialisation
fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('"', "&quot;")
}
