//! Generic representation for elements in non-core namespaces.
//!
//! Any element whose namespace is not one of the core feed namespaces is
//! captured into an [`Extension`] tree, preserving its attributes and child
//! structure, and indexed by canonical namespace prefix and local name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod dublincore;
pub mod itunes;

pub use dublincore::DublinCoreExtension;
pub use itunes::{ITunesCategory, ITunesFeedExtension, ITunesItemExtension, ITunesOwner};

/// Extensions for a feed or item, keyed by canonical namespace prefix and then
/// element local name
///
/// The canonical prefix for a well-known namespace (e.g. `itunes`, `dc`,
/// `media`) overrides whatever prefix the feed declared; namespaces the
/// library does not know keep the feed's own prefix, or the namespace URI
/// itself if the feed never declared one.
pub type ExtensionMap = BTreeMap<String, BTreeMap<String, Vec<Extension>>>;

/// A generic namespaced element captured from a feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    /// The element's local name, case preserved from the document
    pub name: String,

    /// The trimmed character content of the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Attributes on the element, keyed by local name (namespace prefixes are
    /// dropped, since feeds do not disambiguate attributes by namespace in
    /// practice)
    pub attrs: BTreeMap<String, String>,

    /// Child elements, keyed by local name in document order
    pub children: BTreeMap<String, Vec<Extension>>,
}

impl Extension {
    pub(crate) fn new(name: &str) -> Extension {
        Extension {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the value of the named attribute if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns the first child with the given local name
    pub fn child(&self, name: &str) -> Option<&Extension> {
        self.children.get(name).and_then(|children| children.first())
    }
}

/// Returns the extensions under `extensions[prefix][name]`, or an empty slice
pub fn get_extension<'a>(extensions: &'a ExtensionMap, prefix: &str, name: &str) -> &'a [Extension] {
    extensions
        .get(prefix)
        .and_then(|elements| elements.get(name))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Returns the text value of the first extension under `extensions[prefix][name]`
pub fn get_extension_value<'a>(extensions: &'a ExtensionMap, prefix: &str, name: &str) -> Option<&'a str> {
    get_extension(extensions, prefix, name)
        .first()
        .and_then(|extension| extension.value.as_deref())
}

// Text value of the first element with this name within one namespace's map
pub(crate) fn first_text_value<'a>(elements: &'a BTreeMap<String, Vec<Extension>>, name: &str) -> Option<String> {
    elements
        .get(name)
        .and_then(|matches| matches.first())
        .and_then(|extension| extension.value.clone())
}
