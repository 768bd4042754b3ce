use core::fmt;
use std::error::Error;
use std::io::{BufRead, BufReader, Read};

use chrono::{DateTime, Utc};

use crate::model;
use crate::translator::{
    AtomTranslator, DefaultAtomTranslator, DefaultJsonTranslator, DefaultRssTranslator, JsonTranslator, RssTranslator,
};
use crate::xml::{ElementSource, XmlSanitizer};

pub use crate::xml::XmlError;

pub mod atom;
pub mod json;
pub mod rss;

pub(crate) mod dates;
pub(crate) mod ext;
pub(crate) mod util;


pub type ParseFeedResult<T> = std::result::Result<T, ParseFeedError>;

/// An error returned when parsing a feed from a source fails
#[derive(Debug)]
pub enum ParseFeedError {
    ParseError(ParseErrorKind),
    /// The underlying reader failed
    IoError(std::io::Error),
    /// Underlying issue with JSON (poorly formatted etc)
    JsonSerde(serde_json::error::Error),
    /// Underlying issue with XML (poorly formatted etc)
    XmlReader(XmlError),
}

impl fmt::Display for ParseFeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFeedError::ParseError(kind) => write!(f, "parse error: {}", kind),
            ParseFeedError::IoError(e) => write!(f, "IO error: {}", e),
            ParseFeedError::JsonSerde(e) => write!(f, "JSON error: {}", e),
            ParseFeedError::XmlReader(e) => write!(f, "XML error: {}", e),
        }
    }
}

impl Error for ParseFeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseFeedError::ParseError(_) => None,
            ParseFeedError::IoError(e) => Some(e),
            ParseFeedError::JsonSerde(e) => Some(e),
            ParseFeedError::XmlReader(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ParseFeedError {
    fn from(err: std::io::Error) -> Self {
        ParseFeedError::IoError(err)
    }
}

impl From<serde_json::error::Error> for ParseFeedError {
    fn from(err: serde_json::error::Error) -> Self {
        ParseFeedError::JsonSerde(err)
    }
}

impl From<XmlError> for ParseFeedError {
    fn from(err: XmlError) -> Self {
        ParseFeedError::XmlReader(err)
    }
}

/// Underlying cause of the parse failure
#[derive(Debug)]
pub enum ParseErrorKind {
    /// Could not find a recognised feed root in the source (e.g. neither XML nor JSON, or an XML document with an unrelated root element)
    NoFeedRoot,
    /// Required content within the source was not found (e.g. the "channel" element in an RSS document) and the caller asked for strict parsing
    MissingContent(&'static str),
    /// A date field could not be interpreted and the caller asked for strict parsing
    InvalidDate(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::NoFeedRoot => write!(f, "no feed root found"),
            ParseErrorKind::MissingContent(element) => write!(f, "required content missing: {}", element),
            ParseErrorKind::InvalidDate(date) => write!(f, "unparseable date: {}", date),
        }
    }
}

/// One of the feed formats this crate can detect
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedType {
    Atom,
    Rss,
    Json,
    Unknown,
}

/// Options controlling how a feed is parsed
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Keep the format-specific feed on the unified feed
    pub keep_original_feed: bool,
    /// Interpret date strings (disable to skip the cost when only the raw strings are wanted)
    pub parse_dates: bool,
    /// When non-zero, the item list is truncated after this many items
    pub max_items: usize,
    pub strictness: StrictnessOptions,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            keep_original_feed: false,
            parse_dates: true,
            max_items: 0,
            strictness: StrictnessOptions::default(),
        }
    }
}

/// Opt-in strict behaviour; everything defaults to lenient, which is what the
/// web actually requires
#[derive(Clone, Debug)]
pub struct StrictnessOptions {
    /// When false, any date field that cannot be interpreted fails the parse
    pub allow_invalid_dates: bool,
    /// When false, a missing feed root, RSS document without a channel, Atom
    /// feed without entries or JSON Feed without version/items fails the parse
    pub allow_missing_required: bool,
    /// When false, the XML tokenizer runs in strict mode and unknown entities
    /// become errors
    pub allow_unescaped_markup: bool,
}

impl Default for StrictnessOptions {
    fn default() -> StrictnessOptions {
        StrictnessOptions {
            allow_invalid_dates: true,
            allow_missing_required: true,
            allow_unescaped_markup: true,
        }
    }
}

/// A universal feed parser: detects the feed type, parses it with the
/// format-specific parser and translates the result into the unified model
///
/// The translators are replaceable for callers that need different mapping
/// rules.
pub struct Parser {
    pub atom_translator: Box<dyn AtomTranslator>,
    pub rss_translator: Box<dyn RssTranslator>,
    pub json_translator: Box<dyn JsonTranslator>,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            atom_translator: Box::new(DefaultAtomTranslator),
            rss_translator: Box::new(DefaultRssTranslator),
            json_translator: Box::new(DefaultJsonTranslator),
        }
    }

    /// Parses an RSS, Atom or JSON feed into the unified model
    ///
    /// # Arguments
    ///
    /// * `source` - A source of content such as a string, file etc.
    /// * `options` - Parse behaviour, `ParseOptions::default()` for the lenient defaults
    pub fn parse<R: Read>(&self, mut source: R, options: &ParseOptions) -> ParseFeedResult<model::Feed> {
        // Buffer the entire input so the detector can inspect it and the
        // format parser can then re-read it without data loss
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer)?;

        self.parse_buffer(&buffer, options)
    }

    /// Parses a feed from a string
    pub fn parse_string(&self, source: &str, options: &ParseOptions) -> ParseFeedResult<model::Feed> {
        self.parse_buffer(source.as_bytes(), options)
    }

    fn parse_buffer(&self, buffer: &[u8], options: &ParseOptions) -> ParseFeedResult<model::Feed> {
        match detect(buffer) {
            FeedType::Atom => {
                let parsed = atom::parse_slice(buffer, options)?;
                let mut feed = self.atom_translator.translate(&parsed, options);
                if options.keep_original_feed {
                    feed.original_feed = Some(model::OriginalFeed::Atom(Box::new(parsed)));
                }
                Ok(feed)
            }

            FeedType::Rss => {
                let parsed = rss::parse_slice(buffer, options)?;
                let mut feed = self.rss_translator.translate(&parsed, options);
                if options.keep_original_feed {
                    feed.original_feed = Some(model::OriginalFeed::Rss(Box::new(parsed)));
                }
                Ok(feed)
            }

            FeedType::Json => {
                let parsed = json::parse_slice(skip_bom_and_whitespace(buffer), options)?;
                let mut feed = self.json_translator.translate(&parsed, options);
                if options.keep_original_feed {
                    feed.original_feed = Some(model::OriginalFeed::Json(Box::new(parsed)));
                }
                Ok(feed)
            }

            FeedType::Unknown => Err(ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot)),
        }
    }
}

/// Parses an RSS, Atom or JSON feed into the unified model with the default translators
///
/// # Examples
///
/// ```
/// use unifeed::parser::{self, ParseOptions};
///
/// let xml = r#"
/// <feed xmlns="http://www.w3.org/2005/Atom">
///    <title>sample feed</title>
///    <updated>2005-07-31T12:29:29Z</updated>
///    <id>feed1</id>
///    <entry>
///        <title>sample entry</title>
///        <id>entry1</id>
///    </entry>
/// </feed>
/// "#;
/// let feed = parser::parse(xml.as_bytes(), &ParseOptions::default()).unwrap();
/// assert_eq!(feed.feed_type, "atom");
/// ```
pub fn parse<R: Read>(source: R, options: &ParseOptions) -> ParseFeedResult<model::Feed> {
    Parser::new().parse(source, options)
}

/// Parses a feed from a string with the default translators
pub fn parse_string(source: &str, options: &ParseOptions) -> ParseFeedResult<model::Feed> {
    Parser::new().parse_string(source, options)
}

/// Determines the type of feed in the source without fully parsing it
pub fn detect_feed_type<R: Read>(mut source: R) -> ParseFeedResult<FeedType> {
    let mut buffer = Vec::new();
    source.read_to_end(&mut buffer)?;

    Ok(detect(&buffer))
}

// Feed-type detection over a fully buffered document: skip byte-order marks
// and whitespace, then dispatch on the first content byte
fn detect(buffer: &[u8]) -> FeedType {
    let content = skip_bom_and_whitespace(buffer);

    match content.first() {
        // A JSON Feed document must actually be valid JSON
        Some(b'{') => {
            if serde_json::from_slice::<serde::de::IgnoredAny>(content).is_ok() {
                FeedType::Json
            } else {
                FeedType::Unknown
            }
        }

        // For XML, run the parser just far enough to find the root element
        Some(b'<') => {
            let source = xml_source(buffer, false);
            match source.root() {
                Ok(Some(root)) => {
                    if root.is_named("rss") || root.is_named("rdf") {
                        FeedType::Rss
                    } else if root.is_named("feed") || root.is_named("entry") {
                        FeedType::Atom
                    } else {
                        FeedType::Unknown
                    }
                }
                _ => FeedType::Unknown,
            }
        }

        _ => FeedType::Unknown,
    }
}

// Skips leading byte-order marks, whitespace, and the NUL bytes wide
// encodings interleave with ASCII
fn skip_bom_and_whitespace(buffer: &[u8]) -> &[u8] {
    let mut content = buffer;

    for bom in [
        &[0xEF, 0xBB, 0xBF][..],
        &[0x00, 0x00, 0xFE, 0xFF][..],
        &[0xFF, 0xFE, 0x00, 0x00][..],
        &[0xFE, 0xFF][..],
        &[0xFF, 0xFE][..],
    ] {
        if content.starts_with(bom) {
            content = &content[bom.len()..];
            break;
        }
    }

    while let Some(byte) = content.first() {
        match byte {
            0x20 | 0x09 | 0x0A | 0x0D | 0x00 => content = &content[1..],
            _ => break,
        }
    }

    content
}

// True when the buffer starts with a UTF-16 or UTF-32 byte-order mark
fn has_wide_bom(buffer: &[u8]) -> bool {
    buffer.starts_with(&[0x00, 0x00, 0xFE, 0xFF])
        || buffer.starts_with(&[0xFF, 0xFE])
        || buffer.starts_with(&[0xFE, 0xFF])
}

// Builds an element source over a buffered document
//
// UTF-8 input is routed through the sanitizer; wide encodings bypass it (the
// sanitizer would strip the NUL units they are made of) and rely on the
// tokenizer's own transcoding.
pub(crate) fn xml_source(buffer: &[u8], strict: bool) -> ElementSource<Box<dyn BufRead + '_>> {
    let reader: Box<dyn BufRead + '_> = if has_wide_bom(buffer) {
        Box::new(buffer)
    } else {
        Box::new(BufReader::new(XmlSanitizer::new(buffer)))
    };

    ElementSource::new(reader, strict)
}

// Interprets a date string, honouring the date options: parsing can be
// disabled entirely, and strict mode turns unparseable dates into errors
pub(crate) fn parse_timestamp(text: &str, options: &ParseOptions) -> ParseFeedResult<Option<DateTime<Utc>>> {
    if !options.parse_dates {
        return Ok(None);
    }

    match dates::parse_date(text) {
        Some(parsed) => Ok(Some(parsed)),
        None if options.strictness.allow_invalid_dates => Ok(None),
        None => Err(ParseFeedError::ParseError(ParseErrorKind::InvalidDate(text.to_string()))),
    }
}
