use std::io::{BufRead, Read};

use crate::extension::get_extension_value;
use crate::model::rss::{Category, Cloud, Enclosure, Feed, Guid, Image, Item, Source, TextInput};
use crate::parser::util::{if_some_then, parse_text};
use crate::parser::{ext, parse_timestamp, xml_source, ParseErrorKind, ParseFeedError, ParseFeedResult, ParseOptions};
use crate::xml::Element;

#[cfg(test)]
mod tests;

/// Parses an RSS document (0.9x, 1.0 or 2.0) into the RSS model
pub fn parse<R: Read>(mut source: R, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut buffer = Vec::new();
    source.read_to_end(&mut buffer)?;

    parse_slice(&buffer, options)
}

pub(crate) fn parse_slice(buffer: &[u8], options: &ParseOptions) -> ParseFeedResult<Feed> {
    let source = xml_source(buffer, !options.strictness.allow_unescaped_markup);

    match source.root()? {
        Some(root) if root.is_named("rss") || root.is_named("rdf") => parse_feed(root, options),
        _ => Err(ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot)),
    }
}

// Handles the <rss> or <rdf:RDF> root element
//
// RSS 1.0 places items (and image/textInput) in the root rather than the
// channel, so those are collected here and merged: root items append after the
// channel's own, while a root image or text input applies only when the
// channel did not supply one.
fn parse_feed<R: BufRead>(root: Element<R>, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let version = handle_version(&root);

    let mut channel: Option<Feed> = None;
    let mut root_items = Vec::new();
    let mut root_image = None;
    let mut root_text_input = None;

    for child in root.children() {
        let child = child?;

        // Extensions in the feed root have nothing to attach to
        if ext::is_extension(&child) {
            continue;
        }

        match child.name_folded().as_str() {
            // The first channel wins; subsequent ones in an ill-formed
            // document are skipped whole
            "channel" => {
                if channel.is_none() {
                    channel = Some(handle_channel(child, options)?);
                }
            }

            "item" => root_items.push(handle_item(child, options)?),

            "image" => root_image = handle_image(child)?,

            "textinput" => root_text_input = handle_text_input(child)?,

            // Nothing required for unknown elements
            _ => {}
        }
    }

    let mut feed = match channel {
        Some(channel) => channel,
        None if options.strictness.allow_missing_required => Feed::default(),
        None => return Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("channel"))),
    };

    feed.items.append(&mut root_items);
    if feed.image.is_none() {
        feed.image = root_image;
    }
    if feed.text_input.is_none() {
        feed.text_input = root_text_input;
    }
    feed.version = version;

    if options.max_items > 0 && feed.items.len() > options.max_items {
        feed.items.truncate(options.max_items);
    }

    Ok(feed)
}

// Determines the RSS version from the root element
fn handle_version<R: BufRead>(root: &Element<R>) -> Option<String> {
    if root.is_named("rss") {
        // RSS 0.91/0.92/2.0 declare themselves; default to 2.0 when absent
        return Some(root.attr_value("version").unwrap_or_else(|| "2.0".to_string()));
    }

    // RDF roots are recognised by their default namespace
    match root.attr_value("xmlns").as_deref() {
        Some("http://channel.netscape.com/rdf/simple/0.9/") | Some("http://my.netscape.com/rdf/simple/0.9/") => {
            Some("0.9".to_string())
        }
        Some("http://purl.org/rss/1.0/") => Some("1.0".to_string()),
        _ => None,
    }
}

// Handles the <channel> element
fn handle_channel<R: BufRead>(channel: Element<R>, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut feed = Feed::default();

    for child in channel.children() {
        let child = child?;

        if ext::is_extension(&child) {
            ext::harvest(&mut feed.extensions, child)?;
            continue;
        }

        match child.name_folded().as_str() {
            "title" => feed.title = parse_text(child)?,

            "link" => feed.link = parse_text(child)?,

            "description" => feed.description = parse_text(child)?,

            "language" => feed.language = parse_text(child)?,

            "copyright" => feed.copyright = parse_text(child)?,

            "managingeditor" => feed.managing_editor = parse_text(child)?,

            "webmaster" => feed.web_master = parse_text(child)?,

            "pubdate" => {
                if let Some(text) = parse_text(child)? {
                    feed.pub_date_parsed = parse_timestamp(&text, options)?;
                    feed.pub_date = Some(text);
                }
            }

            "lastbuilddate" => {
                if let Some(text) = parse_text(child)? {
                    feed.last_build_date_parsed = parse_timestamp(&text, options)?;
                    feed.last_build_date = Some(text);
                }
            }

            "generator" => feed.generator = parse_text(child)?,

            "docs" => feed.docs = parse_text(child)?,

            "ttl" => feed.ttl = parse_text(child)?,

            "rating" => feed.rating = parse_text(child)?,

            "skiphours" => feed.skip_hours = handle_name_list(child, "hour")?,

            "skipdays" => feed.skip_days = handle_name_list(child, "day")?,

            "cloud" => feed.cloud = Some(handle_cloud(child)),

            "category" => if_some_then(handle_category(child)?, |category| feed.categories.push(category)),

            "image" => feed.image = handle_image(child)?,

            "textinput" => feed.text_input = handle_text_input(child)?,

            "item" => feed.items.push(handle_item(child, options)?),

            // Nothing required for unknown elements
            _ => {}
        }
    }

    Ok(feed)
}

// Handles <item>
fn handle_item<R: BufRead>(element: Element<R>, options: &ParseOptions) -> ParseFeedResult<Item> {
    let mut item = Item::default();

    for child in element.children() {
        let child = child?;

        if ext::is_extension(&child) {
            ext::harvest(&mut item.extensions, child)?;
            continue;
        }

        match child.name_folded().as_str() {
            "title" => item.title = parse_text(child)?,

            "link" => item.link = parse_text(child)?,

            "description" => item.description = parse_text(child)?,

            "author" => item.author = parse_text(child)?,

            "comments" => item.comments = parse_text(child)?,

            "pubdate" => {
                if let Some(text) = parse_text(child)? {
                    item.pub_date_parsed = parse_timestamp(&text, options)?;
                    item.pub_date = Some(text);
                }
            }

            "source" => item.source = handle_source(child)?,

            "enclosure" => if_some_then(handle_enclosure(child), |enclosure| item.enclosures.push(enclosure)),

            "guid" => item.guid = handle_guid(child)?,

            "category" => if_some_then(handle_category(child)?, |category| item.categories.push(category)),

            // Nothing required for unknown elements
            _ => {}
        }
    }

    // The full content arrives as the content:encoded extension
    if item.content.is_none() {
        item.content = get_extension_value(&item.extensions, "content", "encoded").map(str::to_string);
    }

    Ok(item)
}

// Handles <category> with its optional domain attribute
fn handle_category<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Category>> {
    let domain = element.attr_value("domain");

    Ok(parse_text(element)?.map(|value| Category { domain, value }))
}

// Handles <cloud>, which is attribute-only
fn handle_cloud<R: BufRead>(element: Element<R>) -> Cloud {
    Cloud {
        domain: element.attr_value("domain"),
        port: element.attr_value("port"),
        path: element.attr_value("path"),
        register_procedure: element.attr_value("registerProcedure"),
        protocol: element.attr_value("protocol"),
    }
}

// Handles <enclosure>, which is attribute-only; an enclosure without a URL is
// not worth keeping
fn handle_enclosure<R: BufRead>(element: Element<R>) -> Option<Enclosure> {
    let enclosure = Enclosure {
        url: element.attr_value("url"),
        length: element.attr_value("length"),
        enclosure_type: element.attr_value("type"),
    };

    if enclosure.url.is_some() {
        Some(enclosure)
    } else {
        None
    }
}

// Handles <guid> with its isPermaLink attribute
fn handle_guid<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Guid>> {
    let is_permalink = element.attr_value("isPermaLink").and_then(|value| match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    });

    let value = parse_text(element)?;

    Ok(if value.is_some() || is_permalink.is_some() {
        Some(Guid { value, is_permalink })
    } else {
        None
    })
}

// Handles <image>
fn handle_image<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Image>> {
    let mut image = Image::default();

    for child in element.children() {
        let child = child?;
        match child.name_folded().as_str() {
            "url" => image.url = parse_text(child)?,
            "link" => image.link = parse_text(child)?,
            "title" => image.title = parse_text(child)?,
            "width" => image.width = parse_text(child)?,
            "height" => image.height = parse_text(child)?,
            "description" => image.description = parse_text(child)?,

            // Nothing required for unknown elements
            _ => {}
        }
    }

    // If we don't have a URL there is no point returning an image
    Ok(if image.url.is_some() { Some(image) } else { None })
}

// Handles <source> on an item
fn handle_source<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<Source>> {
    let url = element.attr_value("url");
    let title = parse_text(element)?;

    Ok(if url.is_some() || title.is_some() {
        Some(Source { title, url })
    } else {
        None
    })
}

// Handles <textInput>
fn handle_text_input<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<TextInput>> {
    let mut text_input = TextInput::default();

    for child in element.children() {
        let child = child?;
        match child.name_folded().as_str() {
            "title" => text_input.title = parse_text(child)?,
            "description" => text_input.description = parse_text(child)?,
            "name" => text_input.name = parse_text(child)?,
            "link" => text_input.link = parse_text(child)?,

            // Nothing required for unknown elements
            _ => {}
        }
    }

    Ok(if text_input == TextInput::default() { None } else { Some(text_input) })
}

// Handles <skipHours> and <skipDays>, which wrap lists of <hour>/<day>
fn handle_name_list<R: BufRead>(element: Element<R>, entry_name: &str) -> ParseFeedResult<Vec<String>> {
    let mut entries = Vec::new();

    for child in element.children() {
        let child = child?;
        if child.is_named(entry_name) {
            if_some_then(parse_text(child)?, |entry| entries.push(entry));
        }
    }

    Ok(entries)
}
