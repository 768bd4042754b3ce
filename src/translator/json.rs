use chrono::{DateTime, Utc};

use super::JsonTranslator;
use crate::model::{self, json};
use crate::parser::dates::parse_date;
use crate::parser::ParseOptions;

/// The default JSON Feed translator
///
/// JSON Feed was designed with this shape of model in mind, so the mapping is
/// field-by-field; dates are carried as strings by the format model and are
/// interpreted here.
pub struct DefaultJsonTranslator;

impl JsonTranslator for DefaultJsonTranslator {
    fn translate(&self, source: &json::Feed, options: &ParseOptions) -> model::Feed {
        let mut feed = model::Feed {
            feed_type: "json".to_string(),
            feed_version: source.version.clone(),
            ..Default::default()
        };

        feed.title = source.title.clone();
        feed.description = source.description.clone();

        feed.link = source.home_page_url.clone();
        feed.feed_link = source.feed_url.clone();
        feed.links.extend(source.home_page_url.clone());
        feed.links.extend(source.feed_url.clone());

        feed.authors = authors(source.authors.as_deref(), source.author.as_ref());

        feed.language = source.language.clone();

        feed.image = source
            .icon
            .clone()
            .or_else(|| source.favicon.clone())
            .map(|url| model::Image { url, title: None });

        feed.items = source.items.iter().map(|item| self.translate_item(item, options)).collect();

        feed
    }
}

impl DefaultJsonTranslator {
    fn translate_item(&self, source: &json::Item, options: &ParseOptions) -> model::Item {
        let mut item = model::Item::default();

        item.title = source.title.clone();
        item.description = source.summary.clone();

        // HTML content wins over plain text
        item.content = source.content_html.clone().or_else(|| source.content_text.clone());

        item.link = source.url.clone();
        item.links.extend(source.url.clone());
        item.links.extend(source.external_url.clone());

        if let Some(date) = &source.date_published {
            item.published_parsed = parse_when_enabled(date, options);
            item.published = Some(date.clone());
        }

        if let Some(date) = &source.date_modified {
            item.updated_parsed = parse_when_enabled(date, options);
            item.updated = Some(date.clone());
        }

        item.authors = authors(source.authors.as_deref(), source.author.as_ref());

        item.guid = source.id.clone();

        item.image = source
            .image
            .clone()
            .or_else(|| source.banner_image.clone())
            .map(|url| model::Image { url, title: None });

        item.categories = source.tags.clone().unwrap_or_default();

        item.enclosures = source
            .attachments
            .iter()
            .flatten()
            .filter_map(|attachment| {
                attachment.url.clone().map(|url| model::Enclosure {
                    url,
                    length: attachment.size_in_bytes.map(|size| size.to_string()),
                    mime_type: attachment.mime_type.clone(),
                })
            })
            .collect();

        item
    }
}

// The 1.1 authors array wins over the 1.0 singular author
fn authors(plural: Option<&[json::Author]>, singular: Option<&json::Author>) -> Vec<model::Person> {
    let sources: Vec<&json::Author> = match plural {
        Some(authors) if !authors.is_empty() => authors.iter().collect(),
        _ => singular.into_iter().collect(),
    };

    sources
        .into_iter()
        .filter(|author| author.name.is_some())
        .map(|author| model::Person {
            name: author.name.clone(),
            email: None,
        })
        .collect()
}

fn parse_when_enabled(text: &str, options: &ParseOptions) -> Option<DateTime<Utc>> {
    if options.parse_dates {
        parse_date(text)
    } else {
        None
    }
}
