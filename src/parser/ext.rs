//! Harvests elements in non-core namespaces into the generic extension tree.

use std::io::BufRead;

use crate::extension::{Extension, ExtensionMap};
use crate::parser::util::if_some_then;
use crate::parser::ParseFeedResult;
use crate::xml::Element;

// Canonical prefixes for well-known namespaces, following the table the
// feedparser lineage of parsers converged on. These override whatever prefix
// the feed itself declared, so lookups like extensions["itunes"]["author"]
// work no matter how the feed spelt it.
fn well_known_prefix(namespace: &str) -> Option<&'static str> {
    let prefix = match namespace {
        "http://webns.net/mvcb/" => "admin",
        "http://purl.org/rss/1.0/modules/aggregation/" => "ag",
        "http://purl.org/rss/1.0/modules/annotate/" => "annotate",
        "http://media.tangent.org/rss/1.0/" => "audio",
        "http://backend.userland.com/blogChannelModule" => "blogChannel",
        "http://creativecommons.org/ns#license" => "cc",
        "http://web.resource.org/cc/" => "cc",
        "http://cyber.law.harvard.edu/rss/creativeCommonsRssModule.html" => "creativeCommons",
        "http://backend.userland.com/creativeCommonsRssModule" => "creativeCommons",
        "http://purl.org/rss/1.0/modules/company" => "co",
        "http://purl.org/rss/1.0/modules/content/" => "content",
        "http://my.theinfo.org/changed/1.0/rss/" => "cp",
        "http://purl.org/dc/elements/1.1/" => "dc",
        "http://purl.org/dc/terms/" => "dcterms",
        "http://purl.org/rss/1.0/modules/email/" => "email",
        "http://purl.org/rss/1.0/modules/event/" => "ev",
        "http://rssnamespace.org/feedburner/ext/1.0" => "feedburner",
        "http://freshmeat.net/rss/fm/" => "fm",
        "http://xmlns.com/foaf/0.1/" => "foaf",
        "http://www.w3.org/2003/01/geo/wgs84_pos#" => "geo",
        "http://www.georss.org/georss" => "georss",
        "http://www.opengis.net/gml" => "gml",
        "http://postneo.com/icbm/" => "icbm",
        "http://purl.org/rss/1.0/modules/image/" => "image",
        "http://www.itunes.com/DTDs/PodCast-1.0.dtd" => "itunes",
        "http://www.itunes.com/dtds/podcast-1.0.dtd" => "itunes",
        "http://purl.org/rss/1.0/modules/link/" => "l",
        "http://search.yahoo.com/mrss" => "media",
        "http://search.yahoo.com/mrss/" => "media",
        "http://madskills.com/public/xml/rss/module/pingback/" => "pingback",
        "http://prismstandard.org/namespaces/1.2/basic/" => "prism",
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#" => "rdf",
        "http://www.w3.org/2000/01/rdf-schema#" => "rdfs",
        "http://purl.org/rss/1.0/modules/reference/" => "ref",
        "http://purl.org/rss/1.0/modules/richequiv/" => "reqv",
        "http://purl.org/rss/1.0/modules/search/" => "search",
        "http://purl.org/rss/1.0/modules/slash/" => "slash",
        "http://schemas.xmlsoap.org/soap/envelope/" => "soap",
        "http://purl.org/rss/1.0/modules/servicestatus/" => "ss",
        "http://hacks.benhammersley.com/rss/streaming/" => "str",
        "http://purl.org/rss/1.0/modules/subscription/" => "sub",
        "http://purl.org/rss/1.0/modules/syndication/" => "sy",
        "http://schemas.pocketsoap.com/rss/myDescModule/" => "szf",
        "http://purl.org/rss/1.0/modules/taxonomy/" => "taxo",
        "http://purl.org/rss/1.0/modules/threading/" => "thr",
        "http://purl.org/rss/1.0/modules/textinput/" => "ti",
        "http://madskills.com/public/xml/rss/module/trackback/" => "trackback",
        "http://wellformedweb.org/commentAPI/" => "wfw",
        "http://purl.org/rss/1.0/modules/wiki/" => "wiki",
        "http://www.w3.org/1999/xhtml" => "xhtml",
        "http://www.w3.org/1999/xlink" => "xlink",
        "http://www.w3.org/XML/1998/namespace" => "xml",
        "http://podlove.org/simple-chapters" => "psc",
        _ => return None,
    };
    Some(prefix)
}

/// Determines the canonical prefix for an element: the well-known table wins,
/// then the prefix the feed used, then the namespace URI itself
///
/// An element whose prefix was never declared resolves its namespace to the
/// prefix literal, so the final fallback of "the URI as prefix" is covered by
/// returning the element's own prefix. Elements in a default-declared
/// namespace yield the empty prefix, which marks them as core content.
pub(crate) fn canonical_prefix<R: BufRead>(element: &Element<R>) -> String {
    if let Some(prefix) = well_known_prefix(&element.namespace) {
        return prefix.to_string();
    }

    element.prefix.clone()
}

/// An element is an extension when it has a namespace and its canonical prefix
/// is not one of the core feed prefixes
pub(crate) fn is_extension<R: BufRead>(element: &Element<R>) -> bool {
    if element.namespace.is_empty() {
        return false;
    }

    !matches!(canonical_prefix(element).as_str(), "" | "rss" | "rdf")
}

/// Harvests the current element and its subtree into the extension map,
/// indexed under its canonical prefix and local name
pub(crate) fn harvest<R: BufRead>(extensions: &mut ExtensionMap, element: Element<R>) -> ParseFeedResult<()> {
    let prefix = canonical_prefix(&element);
    let name = element.name.clone();
    let harvested = harvest_element(element)?;

    extensions
        .entry(prefix)
        .or_default()
        .entry(name)
        .or_default()
        .push(harvested);

    Ok(())
}

// Recursively captures an element: attributes (namespace prefixes stripped),
// accumulated character data and children keyed by local name
fn harvest_element<R: BufRead>(element: Element<R>) -> ParseFeedResult<Extension> {
    let mut harvested = Extension::new(&element.name);

    for attribute in &element.attributes {
        let local = match attribute.name.split_once(':') {
            Some((_, local)) => local,
            None => attribute.name.as_str(),
        };
        harvested.attrs.insert(local.to_string(), attribute.value.clone());
    }

    // Text may interleave with child elements, so alternate between the two
    let mut value = String::new();
    let mut children = element.children();
    loop {
        if_some_then(element.child_as_text()?, |text| value.push_str(&text));

        match children.next() {
            Some(child) => {
                let child = child?;
                let child_name = child.name.clone();
                let harvested_child = harvest_element(child)?;
                harvested.children.entry(child_name).or_default().push(harvested_child);
            }
            None => break,
        }
    }

    let value = value.trim();
    if !value.is_empty() {
        harvested.value = Some(value.to_string());
    }

    Ok(harvested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::ElementSource;

    // Harvest a nested tree and verify structure, attributes and values
    #[test]
    fn test_harvest_nested() {
        let xml = r#"<channel xmlns:itunes="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
            <itunes:owner>
                <itunes:name>Alice</itunes:name>
                <itunes:email>alice@example.com</itunes:email>
            </itunes:owner>
        </channel>"#;

        let source = ElementSource::new(xml.as_bytes(), false);
        let channel = source.root().unwrap().unwrap();
        let owner = channel.children().next().unwrap().unwrap();

        assert!(is_extension(&owner));
        assert_eq!(canonical_prefix(&owner), "itunes");

        let mut extensions = ExtensionMap::new();
        harvest(&mut extensions, owner).unwrap();

        let harvested = &extensions["itunes"]["owner"][0];
        assert_eq!(harvested.name, "owner");
        assert_eq!(harvested.child("name").unwrap().value.as_deref(), Some("Alice"));
        assert_eq!(harvested.child("email").unwrap().value.as_deref(), Some("alice@example.com"));
    }

    // The canonical prefix overrides whatever the feed declared
    #[test]
    fn test_canonical_prefix_override() {
        let xml = r#"<item xmlns:podcast="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
            <podcast:author>Alice</podcast:author>
        </item>"#;

        let source = ElementSource::new(xml.as_bytes(), false);
        let item = source.root().unwrap().unwrap();
        let author = item.children().next().unwrap().unwrap();

        assert_eq!(canonical_prefix(&author), "itunes");
    }

    // A prefix the feed never declared becomes the namespace itself
    #[test]
    fn test_undeclared_prefix() {
        let xml = "<item><custom:rating>5</custom:rating></item>";

        let source = ElementSource::new(xml.as_bytes(), false);
        let item = source.root().unwrap().unwrap();
        let rating = item.children().next().unwrap().unwrap();

        assert!(is_extension(&rating));
        assert_eq!(canonical_prefix(&rating), "custom");
    }

    // Elements in the default (core) namespace are not extensions
    #[test]
    fn test_core_elements_are_not_extensions() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>T</title></feed>"#;

        let source = ElementSource::new(xml.as_bytes(), false);
        let feed = source.root().unwrap().unwrap();
        let title = feed.children().next().unwrap().unwrap();

        assert!(!is_extension(&title));
    }

    // Attribute namespace prefixes are stripped during harvesting
    #[test]
    fn test_attribute_prefixes_stripped() {
        let xml = r#"<item xmlns:media="http://search.yahoo.com/mrss/" xmlns:xlink="http://www.w3.org/1999/xlink">
            <media:content xlink:href="http://example.com/a.mp3" type="audio/mpeg"/>
        </item>"#;

        let source = ElementSource::new(xml.as_bytes(), false);
        let item = source.root().unwrap().unwrap();
        let content = item.children().next().unwrap().unwrap();

        let mut extensions = ExtensionMap::new();
        harvest(&mut extensions, content).unwrap();

        let harvested = &extensions["media"]["content"][0];
        assert_eq!(harvested.attr("href"), Some("http://example.com/a.mp3"));
        assert_eq!(harvested.attr("type"), Some("audio/mpeg"));
    }
}
