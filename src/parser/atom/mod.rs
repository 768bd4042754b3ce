use std::io::{BufRead, Read};

use crate::model::atom::{Category, Content, Entry, Feed, Generator, Link, Person, Source};
use crate::parser::util::{if_some_then, parse_text, strip_cdata};
use crate::parser::{ext, parse_timestamp, xml_source, ParseErrorKind, ParseFeedError, ParseFeedResult, ParseOptions};
use crate::xml::Element;


const ATOM_03_NAMESPACE: &str = "http://purl.org/atom/ns#";
const ATOM_10_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Parses an Atom document (0.3 or 1.0) into the Atom model
pub fn parse<R: Read>(mut source: R, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut buffer = Vec::new();
    source.read_to_end(&mut buffer)?;

    parse_slice(&buffer, options)
}

pub(crate) fn parse_slice(buffer: &[u8], options: &ParseOptions) -> ParseFeedResult<Feed> {
    let source = xml_source(buffer, !options.strictness.allow_unescaped_markup);

    match source.root()? {
        Some(root) if root.is_named("feed") => parse_feed(root, options),

        // A standalone entry document is wrapped in an otherwise empty feed to
        // keep the API consistent
        Some(root) if root.is_named("entry") => {
            let mut feed = Feed {
                version: handle_version(&root),
                ..Default::default()
            };
            feed.entries.push(handle_entry(root, options)?);
            Ok(feed)
        }

        _ => Err(ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot)),
    }
}

// Handles the <feed> element
fn parse_feed<R: BufRead>(root: Element<R>, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut feed = Feed {
        version: handle_version(&root),
        language: root.attr_value("lang"),
        ..Default::default()
    };

    for child in root.children() {
        let child = child?;

        if ext::is_extension(&child) {
            ext::harvest(&mut feed.extensions, child)?;
            continue;
        }

        match child.name_folded().as_str() {
            "title" => feed.title = handle_atom_text(child)?,

            "id" => feed.id = parse_text(child)?,

            // "modified" is the Atom 0.3 spelling
            "updated" | "modified" => {
                if let Some(text) = parse_text(child)? {
                    feed.updated_parsed = parse_timestamp(&text, options)?;
                    feed.updated = Some(text);
                }
            }

            // "tagline" is the Atom 0.3 spelling
            "subtitle" | "tagline" => feed.subtitle = handle_atom_text(child)?,

            "link" => if_some_then(handle_link(child), |link| feed.links.push(link)),

            "generator" => feed.generator = handle_generator(child)?,

            "icon" => feed.icon = parse_text(child)?,

            "logo" => feed.logo = parse_text(child)?,

            // "copyright" is the Atom 0.3 spelling
            "rights" | "copyright" => feed.rights = handle_atom_text(child)?,

            "author" => feed.authors.push(handle_person(child)?),

            "contributor" => feed.contributors.push(handle_person(child)?),

            "category" => if_some_then(handle_category(child), |category| feed.categories.push(category)),

            "entry" => feed.entries.push(handle_entry(child, options)?),

            // Nothing required for unknown elements
            _ => {}
        }
    }

    if feed.entries.is_empty() && !options.strictness.allow_missing_required {
        return Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("entries")));
    }

    if options.max_items > 0 && feed.entries.len() > options.max_items {
        feed.entries.truncate(options.max_items);
    }

    Ok(feed)
}

// Determines the Atom version: the root's version attribute wins, then the
// namespace decides
fn handle_version<R: BufRead>(root: &Element<R>) -> Option<String> {
    if let Some(version) = root.attr_value("version") {
        return Some(version);
    }

    let namespace = root.attr_value("xmlns").unwrap_or_else(|| root.namespace.clone());
    match namespace.as_str() {
        ATOM_03_NAMESPACE => Some("0.3".to_string()),
        ATOM_10_NAMESPACE => Some("1.0".to_string()),
        _ => None,
    }
}

// Handles an <entry>
fn handle_entry<R: BufRead>(element: Element<R>, options: &ParseOptions) -> ParseFeedResult<Entry> {
    let mut entry = Entry::default();

    for child in element.children() {
        let child = child?;

        if ext::is_extension(&child) {
            ext::harvest(&mut entry.extensions, child)?;
            continue;
        }

        match child.name_folded().as_str() {
            "title" => entry.title = handle_atom_text(child)?,

            "id" => entry.id = parse_text(child)?,

            "updated" | "modified" => {
                if let Some(text) = parse_text(child)? {
                    entry.updated_parsed = parse_timestamp(&text, options)?;
                    entry.updated = Some(text);
                }
            }

            // "issued" is the Atom 0.3 spelling
            "published" | "issued" => {
                if let Some(text) = parse_text(child)? {
                    entry.published_parsed = parse_timestamp(&text, options)?;
                    entry.published = Some(text);
                }
            }

            "summary" => entry.summary = handle_atom_text(child)?,

            "author" => entry.authors.push(handle_person(child)?),

            "contributor" => entry.contributors.push(handle_person(child)?),

            "category" => if_some_then(handle_category(child), |category| entry.categories.push(category)),

            "link" => if_some_then(handle_link(child), |link| entry.links.push(link)),

            "rights" | "copyright" => entry.rights = handle_atom_text(child)?,

            "source" => entry.source = Some(handle_source(child, options)?),

            "content" => entry.content = handle_content(child)?,

            // Nothing required for unknown elements
            _ => {}
        }
    }

    Ok(entry)
}

// Handles a <source> within an entry: the metadata of the feed the entry was
// copied from, which is everything a feed has except its entries
fn handle_source<R: BufRead>(element: Element<R>, options: &ParseOptions) -> ParseFeedResult<Source> {
    let mut source = Source::default();

    for child in element.children() {
        let child = child?;

        if ext::is_extension(&child) {
            ext::harvest(&mut source.extensions, child)?;
            continue;
        }

        match child.name_folded().as_str() {
            "title" => source.title = handle_atom_text(child)?,

            "id" => source.id = parse_text(child)?,

            "updated" | "modified" => {
                if let Some(text) = parse_text(child)? {
                    source.updated_parsed = parse_timestamp(&text, options)?;
                    source.updated = Some(text);
                }
            }

            "subtitle" | "tagline" => source.subtitle = handle_atom_text(child)?,

            "link" => if_some_then(handle_link(child), |link| source.links.push(link)),

            "generator" => source.generator = handle_generator(child)?,

            "icon" => source.icon = parse_text(child)?,

            "logo" => source.logo = parse_text(child)?,

            "rights" | "copyright" => source.rights = handle_atom_text(child)?,

            "author" => source.authors.push(handle_person(child)?),

            "contributor" => source.contributors.push(handle_person(child)?),

            "category" => if_some_then(handle_category(child), |category| source.categories.push(category)),

            // Nothing required for unknown elements
            _ => {}
        }
    }

    Ok(source)
}

// Handles an Atom text construct (<title>, <subtitle>, <summary>, <rights>)
//
// The type attribute selects between text, html and xhtml bodies but all of
// them reduce to the same capture: raw inner markup, CDATA unwrapped, known
// entities expanded for escaped bodies.
fn handle_atom_text<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<String>> {
    parse_text(element)
}

// Handles <content>: inline content keeps its inner markup, out-of-line
// content carries a src attribute instead
fn handle_content<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Content>> {
    let content_type = element.attr_value("type");
    let src = element.attr_value("src");

    let inner = element.children_as_string()?;
    let trimmed = inner.trim();
    let value = if trimmed.is_empty() {
        None
    } else {
        match strip_cdata(trimmed) {
            Some(unwrapped) => Some(unwrapped),
            None if trimmed.starts_with('<') => Some(trimmed.to_string()),
            None => Some(crate::parser::util::decode_entities(trimmed).trim().to_string()),
        }
    };

    Ok(if content_type.is_some() || src.is_some() || value.is_some() {
        Some(Content { content_type, src, value })
    } else {
        None
    })
}

// Handles an <author> or <contributor>
fn handle_person<R: BufRead>(element: Element<R>) -> ParseFeedResult<Person> {
    let mut person = Person::default();

    for child in element.children() {
        let child = child?;
        match child.name_folded().as_str() {
            "name" => person.name = parse_text(child)?,
            "email" => person.email = parse_text(child)?,
            // "url" is the Atom 0.3 spelling
            "uri" | "url" => person.uri = parse_text(child)?,

            // Nothing required for unknown elements
            _ => {}
        }
    }

    Ok(person)
}

// Handles a <link>, which is attribute-only
fn handle_link<R: BufRead>(element: Element<R>) -> Option<Link> {
    let link = Link {
        href: element.attr_value("href"),
        rel: element.attr_value("rel"),
        link_type: element.attr_value("type"),
        hreflang: element.attr_value("hreflang"),
        title: element.attr_value("title"),
        length: element.attr_value("length"),
    };

    // A link without a target is not worth keeping
    if link.href.is_some() {
        Some(link)
    } else {
        None
    }
}

// Handles a <category>, which is attribute-only
fn handle_category<R: BufRead>(element: Element<R>) -> Option<Category> {
    let category = Category {
        term: element.attr_value("term"),
        scheme: element.attr_value("scheme"),
        label: element.attr_value("label"),
    };

    if category.term.is_some() || category.label.is_some() {
        Some(category)
    } else {
        None
    }
}

// Handles <generator>: attributes plus the text value ("url" is the Atom 0.3
// spelling of "uri")
fn handle_generator<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Generator>> {
    let uri = element.attr_value("uri").or_else(|| element.attr_value("url"));
    let version = element.attr_value("version");
    let value = parse_text(element)?;

    Ok(if value.is_some() || uri.is_some() {
        Some(Generator { value, uri, version })
    } else {
        None
    })
}
