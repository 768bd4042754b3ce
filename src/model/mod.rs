//! The unified feed model, plus the format-specific models it is built from.
//!
//! Every format (RSS, Atom, JSON Feed) is first parsed into its own model
//! preserving the source structure, then translated into the unified
//! [`Feed`]/[`Item`] representation through the default translators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extension::{
    get_extension, get_extension_value, DublinCoreExtension, Extension, ExtensionMap, ITunesFeedExtension,
    ITunesItemExtension,
};

pub mod atom;
pub mod json;
pub mod rss;

/// A feed in the unified model, translated from any of the supported formats
///
/// Where several source fields map to the same unified field (e.g. RSS
/// `description` vs `itunes:summary`) the translators apply a fixed precedence,
/// so the same document always produces the same feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The web page this feed is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// The feed's own URL, where advertised (e.g. `atom:link rel="self"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_link: Option<String>,
    /// All links found at the feed level, in document order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<String>,
    /// The last-modified timestamp as it appeared in the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// The last-modified timestamp normalised to UTC, where it could be interpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<String>,
    /// Typed view over the feed's Dublin Core elements, if any were present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    /// Typed view over the feed's iTunes elements, if any were present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesFeedExtension>,
    /// Every namespaced element found at the feed level
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
    pub items: Vec<Item>,
    /// The source format: "rss", "atom" or "json"
    pub feed_type: String,
    /// The source format version e.g. "2.0", "1.0", "https://jsonfeed.org/version/1.1"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_version: Option<String>,
    /// The format-specific feed, retained when the caller asked for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_feed: Option<OriginalFeed>,
}

impl Feed {
    /// Returns the extensions under `namespace`/`element`, or an empty slice
    pub fn get_extension(&self, namespace: &str, element: &str) -> &[Extension] {
        get_extension(&self.extensions, namespace, element)
    }

    /// Returns the text value of the first extension under `namespace`/`element`
    pub fn get_extension_value(&self, namespace: &str, element: &str) -> Option<&str> {
        get_extension_value(&self.extensions, namespace, element)
    }

    /// Returns the items ordered by published timestamp, oldest first
    ///
    /// Items without a parsed timestamp sort before those with one; ties keep
    /// their source order.
    pub fn items_chronological(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_by_key(|item| item.published_parsed);
        items
    }
}

/// An item (RSS), entry (Atom) or item (JSON Feed) in the unified model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The full content of the item, where the format distinguishes it from
    /// the description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<Person>,
    /// The item's unique identifier (`guid` in RSS, `id` in Atom and JSON Feed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enclosures: Vec<Enclosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesItemExtension>,
    #[serde(skip_serializing_if = "ExtensionMap::is_empty", default)]
    pub extensions: ExtensionMap,
}

impl Item {
    /// Returns the extensions under `namespace`/`element`, or an empty slice
    pub fn get_extension(&self, namespace: &str, element: &str) -> &[Extension] {
        get_extension(&self.extensions, namespace, element)
    }

    /// Returns the text value of the first extension under `namespace`/`element`
    pub fn get_extension_value(&self, namespace: &str, element: &str) -> Option<&str> {
        get_extension_value(&self.extensions, namespace, element)
    }
}

/// An author or other person associated with a feed or item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An image associated with a feed or item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A media object attached to an item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enclosure {
    pub url: String,
    /// Size in bytes, as written in the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    /// The declared MIME type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// The format-specific feed a unified feed was translated from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OriginalFeed {
    Rss(Box<rss::Feed>),
    Atom(Box<atom::Feed>),
    Json(Box<json::Feed>),
}
