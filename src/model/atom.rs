//! The Atom format model (Atom 1.0, RFC 4287, plus the Atom 0.3 aliases).
//!
//! Atom spec: http://www.atomenabled.org/developers/syndication/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extension::ExtensionMap;

/// An Atom feed as it appeared in the document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    /// Atom (required): Contains a human readable title for the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Atom (required): Identifies the feed using a universally unique and permanent URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Atom (required): Indicates the last time the feed was modified in a significant way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    /// Atom (optional): Contains a human-readable description or subtitle for the feed
    /// (`tagline` in Atom 0.3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Atom (recommended): Related Web pages and other resources
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<Link>,
    /// The feed language, from `xml:lang` on the root element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Atom (optional): Identifies the software used to generate the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    /// Atom (optional): Identifies a small image which provides iconic visual identification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Atom (optional): Identifies a larger image which provides visual identification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Atom (optional): Conveys information about rights held in and over the feed
    /// (`copyright` in Atom 0.3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    /// Atom (recommended): Authors defined at the feed level
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Person>,
    /// Atom (optional): Contributors to the feed
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contributors: Vec<Person>,
    /// Atom (optional): Categories the feed belongs to
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<Category>,
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
    /// "1.0" or "0.3", from the version attribute or the namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// An entry within an Atom feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    /// `issued` in Atom 0.3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contributors: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    /// Metadata of the feed this entry was copied from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
}

/// The source feed metadata of a copied entry: a feed without its entries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contributors: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
}

/// A link to an associated resource
/// Atom spec: http://www.atomenabled.org/developers/syndication/#link
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The URI of the referenced resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// A single link relationship type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// The media type of the resource
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// The language of the referenced resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    /// Human readable information about the link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The length of the resource in bytes, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

/// An author, contributor etc.
/// Atom spec: http://www.atomenabled.org/developers/syndication/#person
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `url` in Atom 0.3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A category of a feed or entry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Information on the software used to generate the feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    /// The generator name, from the element body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Link to the tool (`url` in Atom 0.3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The content, or a link to the content, of an entry
/// Atom spec: http://www.atomenabled.org/developers/syndication/#contentElement
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// text, html, xhtml or a MIME type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// The URI where the content can be found, for out-of-line content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// The inline content, with inner markup preserved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
