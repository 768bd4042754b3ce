//! Typed view over the iTunes podcast elements
//! (`http://www.itunes.com/DTDs/PodCast-1.0.dtd`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{first_text_value, Extension};

/// The iTunes elements of a channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITunesFeedExtension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<ITunesCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ITunesOwner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
}

/// The iTunes elements of an item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ITunesItemExtension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// An iTunes category, with an optional nested subcategory
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ITunesCategory {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Box<ITunesCategory>>,
}

/// The owner of a podcast
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ITunesOwner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ITunesFeedExtension {
    /// Builds the typed view from the `itunes` entry of an extension map
    pub fn from_map(elements: &BTreeMap<String, Vec<Extension>>) -> ITunesFeedExtension {
        ITunesFeedExtension {
            author: first_text_value(elements, "author"),
            block: first_text_value(elements, "block"),
            categories: parse_categories(elements),
            explicit: first_text_value(elements, "explicit"),
            keywords: first_text_value(elements, "keywords"),
            owner: parse_owner(elements),
            subtitle: first_text_value(elements, "subtitle"),
            summary: first_text_value(elements, "summary"),
            image: image_href(elements),
            show_type: first_text_value(elements, "type"),
        }
    }
}

impl ITunesItemExtension {
    /// Builds the typed view from the `itunes` entry of an extension map
    pub fn from_map(elements: &BTreeMap<String, Vec<Extension>>) -> ITunesItemExtension {
        ITunesItemExtension {
            author: first_text_value(elements, "author"),
            block: first_text_value(elements, "block"),
            duration: first_text_value(elements, "duration"),
            explicit: first_text_value(elements, "explicit"),
            keywords: first_text_value(elements, "keywords"),
            subtitle: first_text_value(elements, "subtitle"),
            summary: first_text_value(elements, "summary"),
            image: image_href(elements),
            episode: first_text_value(elements, "episode"),
            season: first_text_value(elements, "season"),
        }
    }
}

// <itunes:image> carries its URL in the href attribute
fn image_href(elements: &BTreeMap<String, Vec<Extension>>) -> Option<String> {
    elements
        .get("image")
        .and_then(|matches| matches.first())
        .and_then(|image| image.attr("href").map(str::to_string).or_else(|| image.value.clone()))
}

fn parse_owner(elements: &BTreeMap<String, Vec<Extension>>) -> Option<ITunesOwner> {
    let owner = elements.get("owner").and_then(|matches| matches.first())?;

    Some(ITunesOwner {
        name: owner.child("name").and_then(|name| name.value.clone()),
        email: owner.child("email").and_then(|email| email.value.clone()),
    })
}

fn parse_categories(elements: &BTreeMap<String, Vec<Extension>>) -> Vec<ITunesCategory> {
    let matches = match elements.get("category") {
        Some(matches) => matches,
        None => return Vec::new(),
    };

    matches
        .iter()
        .map(|category| {
            let text = category
                .attr("text")
                .map(str::to_string)
                .or_else(|| category.value.clone())
                .unwrap_or_default();

            // A single level of nesting is defined by the podcast spec
            let subcategory = category.child("category").map(|sub| {
                Box::new(ITunesCategory {
                    text: sub.attr("text").map(str::to_string).or_else(|| sub.value.clone()).unwrap_or_default(),
                    subcategory: None,
                })
            });

            ITunesCategory { text, subcategory }
        })
        .collect()
}
