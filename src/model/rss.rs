//! The RSS format model, covering RSS 0.9x, RSS 1.0 (RDF) and RSS 2.0.
//!
//! Values are preserved as the document wrote them; in particular numeric
//! fields like `ttl` or image dimensions stay strings, since feeds routinely
//! put anything at all in them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extension::ExtensionMap;

/// An RSS channel as it appeared in the document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Email address for the editorial content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_editor: Option<String>,
    /// Email address for technical issues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_master: Option<String>,
    /// Publication date for the channel content, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    /// The last time the channel content changed, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_build_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_build_date_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// A URL pointing at the RSS specification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    /// Cache lifetime in minutes, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// The PICS rating for the channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skip_hours: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skip_days: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_input: Option<TextInput>,
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
    /// "0.9", "0.91", "0.92", "1.0" or "2.0"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// An item within an RSS channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Email address of the item's author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<Category>,
    /// URL of a page for comments on the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enclosures: Vec<Enclosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date_parsed: Option<DateTime<Utc>>,
    /// The channel the item came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// The full item content, from `content:encoded`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
}

/// The image displayed with the channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A media object attached to an item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enclosure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Size in bytes, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub enclosure_type: Option<String>,
}

/// The unique identifier of an item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether the guid doubles as a permalink; absent when the attribute was
    /// not written or not a boolean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_permalink: Option<bool>,
}

/// The channel an item was copied from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A web service that supports the rssCloud interface
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cloud {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_procedure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A text input box displayed with the channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A category with an optional domain qualifier
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub value: String,
}
