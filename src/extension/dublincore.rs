//! Typed view over the Dublin Core metadata element set
//! (`http://purl.org/dc/elements/1.1/`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{first_text_value, Extension};

/// The Dublin Core elements of a feed or item
///
/// Each field holds the first occurrence of the corresponding `dc:` element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DublinCoreExtension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
}

impl DublinCoreExtension {
    /// Builds the typed view from the `dc` entry of an extension map
    pub fn from_map(elements: &BTreeMap<String, Vec<Extension>>) -> DublinCoreExtension {
        DublinCoreExtension {
            title: first_text_value(elements, "title"),
            creator: first_text_value(elements, "creator"),
            author: first_text_value(elements, "author"),
            subject: first_text_value(elements, "subject"),
            description: first_text_value(elements, "description"),
            publisher: first_text_value(elements, "publisher"),
            contributor: first_text_value(elements, "contributor"),
            date: first_text_value(elements, "date"),
            resource_type: first_text_value(elements, "type"),
            format: first_text_value(elements, "format"),
            identifier: first_text_value(elements, "identifier"),
            source: first_text_value(elements, "source"),
            language: first_text_value(elements, "language"),
            relation: first_text_value(elements, "relation"),
            coverage: first_text_value(elements, "coverage"),
            rights: first_text_value(elements, "rights"),
        }
    }
}
