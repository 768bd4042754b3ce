use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::RssTranslator;
use crate::extension::{get_extension, get_extension_value, DublinCoreExtension, ExtensionMap, ITunesFeedExtension, ITunesItemExtension};
use crate::model::{self, rss};
use crate::parser::dates::parse_date;
use crate::parser::util::parse_name_address;
use crate::parser::ParseOptions;

// First <img src="..."> in an HTML fragment, used as the image of last resort
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<img[^>]+src\s*=\s*["']([^"']+)["']"#).unwrap());

/// The default RSS translator
///
/// Applies a fixed precedence between the native RSS fields and the common
/// extensions (Dublin Core, iTunes, media, Atom-within-RSS), so semantically
/// equivalent data lands in the same unified field no matter how the feed
/// spelt it.
pub struct DefaultRssTranslator;

impl RssTranslator for DefaultRssTranslator {
    fn translate(&self, source: &rss::Feed, options: &ParseOptions) -> model::Feed {
        let extensions = &source.extensions;
        let mut feed = model::Feed {
            feed_type: "rss".to_string(),
            feed_version: source.version.clone(),
            ..Default::default()
        };

        feed.title = source.title.clone().or_else(|| ext_value(extensions, "dc", "title"));

        feed.description = source.description.clone().or_else(|| ext_value(extensions, "itunes", "summary"));

        feed.link = source.link.clone().or_else(|| ext_value(extensions, "itunes", "subtitle"));

        feed.feed_link = self_link(extensions);

        feed.links.extend(source.link.clone());
        feed.links.extend(feed.feed_link.clone());

        let (updated, updated_parsed) = self.translate_updated(source, options);
        feed.updated = updated;
        feed.updated_parsed = updated_parsed;

        feed.published = source.pub_date.clone();
        feed.published_parsed = source.pub_date_parsed;

        if let Some(author) = self.translate_feed_author(source) {
            feed.authors.push(author);
        }

        feed.language = source.language.clone().or_else(|| ext_value(extensions, "dc", "language"));

        feed.image = self.translate_feed_image(source);

        feed.copyright = source.copyright.clone().or_else(|| ext_value(extensions, "dc", "rights"));

        feed.generator = source.generator.clone();

        feed.categories = categories_with_extensions(source.categories.iter().map(|category| category.value.clone()), extensions);

        feed.items = source.items.iter().map(|item| self.translate_item(item, options)).collect();

        feed.dublin_core_ext = typed_dublin_core(extensions);
        feed.itunes_ext = extensions.get("itunes").map(ITunesFeedExtension::from_map);
        feed.extensions = extensions.clone();

        feed
    }
}

impl DefaultRssTranslator {
    fn translate_item(&self, source: &rss::Item, options: &ParseOptions) -> model::Item {
        let extensions = &source.extensions;
        let mut item = model::Item::default();

        item.title = source.title.clone().or_else(|| ext_value(extensions, "dc", "title"));

        item.description = source
            .description
            .clone()
            .or_else(|| ext_value(extensions, "dc", "description"))
            .or_else(|| ext_value(extensions, "itunes", "summary"));

        item.content = source.content.clone();

        item.link = source.link.clone();
        item.links.extend(source.link.clone());

        // Items have no native modification date; Dublin Core supplies one
        if let Some(date) = ext_value(extensions, "dc", "date") {
            item.updated_parsed = parse_when_enabled(&date, options);
            item.updated = Some(date);
        }

        item.published = source.pub_date.clone();
        item.published_parsed = source.pub_date_parsed;

        if let Some(author) = self.translate_item_author(source) {
            item.authors.push(author);
        }

        item.guid = source.guid.as_ref().and_then(|guid| guid.value.clone());

        item.image = self.translate_item_image(source);

        item.categories = categories_with_extensions(source.categories.iter().map(|category| category.value.clone()), extensions);

        item.enclosures = source
            .enclosures
            .iter()
            .filter_map(|enclosure| {
                enclosure.url.clone().map(|url| model::Enclosure {
                    url,
                    length: enclosure.length.clone(),
                    mime_type: enclosure.enclosure_type.clone(),
                })
            })
            .collect();

        item.dublin_core_ext = typed_dublin_core(extensions);
        item.itunes_ext = extensions.get("itunes").map(ITunesItemExtension::from_map);
        item.extensions = extensions.clone();

        item
    }

    // lastBuildDate, falling back to dc:date (which arrives unparsed)
    fn translate_updated(&self, source: &rss::Feed, options: &ParseOptions) -> (Option<String>, Option<DateTime<Utc>>) {
        if source.last_build_date.is_some() {
            return (source.last_build_date.clone(), source.last_build_date_parsed);
        }

        match ext_value(&source.extensions, "dc", "date") {
            Some(date) => {
                let parsed = parse_when_enabled(&date, options);
                (Some(date), parsed)
            }
            None => (None, None),
        }
    }

    // managingEditor, webMaster, then the extension authors, split into name
    // and email
    fn translate_feed_author(&self, source: &rss::Feed) -> Option<model::Person> {
        let text = source
            .managing_editor
            .clone()
            .or_else(|| source.web_master.clone())
            .or_else(|| ext_value(&source.extensions, "dc", "author"))
            .or_else(|| ext_value(&source.extensions, "dc", "creator"))
            .or_else(|| ext_value(&source.extensions, "itunes", "author"))?;

        person_from_text(&text)
    }

    fn translate_item_author(&self, source: &rss::Item) -> Option<model::Person> {
        let text = source
            .author
            .clone()
            .or_else(|| ext_value(&source.extensions, "dc", "author"))
            .or_else(|| ext_value(&source.extensions, "dc", "creator"))
            .or_else(|| ext_value(&source.extensions, "itunes", "author"))?;

        person_from_text(&text)
    }

    // The channel image, then iTunes, then media, then scraping the description
    fn translate_feed_image(&self, source: &rss::Feed) -> Option<model::Image> {
        if let Some(image) = &source.image {
            if let Some(url) = image.url.clone() {
                return Some(model::Image { url, title: image.title.clone() });
            }
        }

        itunes_image(&source.extensions)
            .or_else(|| media_image(&source.extensions))
            .or_else(|| source.description.as_deref().and_then(image_from_html))
            .map(|url| model::Image { url, title: None })
    }

    // iTunes, media, image-typed enclosures, then scraping content or description
    fn translate_item_image(&self, source: &rss::Item) -> Option<model::Image> {
        itunes_image(&source.extensions)
            .or_else(|| media_image(&source.extensions))
            .or_else(|| {
                source.enclosures.iter().find_map(|enclosure| {
                    let is_image = enclosure.enclosure_type.as_deref().is_some_and(|t| t.starts_with("image/"));
                    if is_image {
                        enclosure.url.clone()
                    } else {
                        None
                    }
                })
            })
            .or_else(|| source.content.as_deref().and_then(image_from_html))
            .or_else(|| source.description.as_deref().and_then(image_from_html))
            .map(|url| model::Image { url, title: None })
    }
}

// First atom:link with rel="self" harvested into the extensions
fn self_link(extensions: &ExtensionMap) -> Option<String> {
    get_extension(extensions, "atom", "link")
        .iter()
        .find(|link| link.attr("rel") == Some("self"))
        .and_then(|link| link.attr("href").map(str::to_string))
}

// Native categories unioned with itunes:keywords, itunes:category (including
// subcategories) and dc:subject
fn categories_with_extensions(native: impl Iterator<Item = String>, extensions: &ExtensionMap) -> Vec<String> {
    let mut categories: Vec<String> = native.collect();

    if let Some(keywords) = ext_value(extensions, "itunes", "keywords") {
        categories.extend(keywords.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string));
    }

    for category in get_extension(extensions, "itunes", "category") {
        if let Some(text) = category.attr("text").map(str::to_string).or_else(|| category.value.clone()) {
            categories.push(text);
        }
        if let Some(subcategory) = category.child("category") {
            if let Some(text) = subcategory.attr("text").map(str::to_string).or_else(|| subcategory.value.clone()) {
                categories.push(text);
            }
        }
    }

    for subject in get_extension(extensions, "dc", "subject") {
        if let Some(value) = &subject.value {
            categories.push(value.clone());
        }
    }

    categories
}

fn ext_value(extensions: &ExtensionMap, prefix: &str, name: &str) -> Option<String> {
    get_extension_value(extensions, prefix, name).map(str::to_string)
}

fn typed_dublin_core(extensions: &ExtensionMap) -> Option<DublinCoreExtension> {
    extensions.get("dc").map(DublinCoreExtension::from_map)
}

// <itunes:image href="..."/>
fn itunes_image(extensions: &ExtensionMap) -> Option<String> {
    get_extension(extensions, "itunes", "image")
        .first()
        .and_then(|image| image.attr("href").map(str::to_string).or_else(|| image.value.clone()))
}

// media:thumbnail, or a media:content that declares an image type or medium
fn media_image(extensions: &ExtensionMap) -> Option<String> {
    if let Some(url) = get_extension(extensions, "media", "thumbnail").first().and_then(|thumb| thumb.attr("url")) {
        return Some(url.to_string());
    }

    get_extension(extensions, "media", "content")
        .iter()
        .find(|content| {
            content.attr("type").is_some_and(|t| t.starts_with("image/")) || content.attr("medium") == Some("image")
        })
        .and_then(|content| content.attr("url").map(str::to_string))
}

// First <img src> within an HTML fragment
fn image_from_html(html: &str) -> Option<String> {
    IMG_SRC.captures(html).map(|groups| groups[1].to_string())
}

fn person_from_text(text: &str) -> Option<model::Person> {
    let (name, email) = parse_name_address(text);
    if name.is_none() && email.is_none() {
        None
    } else {
        Some(model::Person { name, email })
    }
}

fn parse_when_enabled(text: &str, options: &ParseOptions) -> Option<DateTime<Utc>> {
    if options.parse_dates {
        parse_date(text)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn translate(xml: &str) -> model::Feed {
        let parsed = parser::rss::parse(xml.as_bytes(), &ParseOptions::default()).unwrap();
        DefaultRssTranslator.translate(&parsed, &ParseOptions::default())
    }

    // Native fields win over extensions
    #[test]
    fn test_native_fields_take_precedence() {
        let feed = translate(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
                <channel>
                    <title>Native</title>
                    <dc:title>Extension</dc:title>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("Native"));
    }

    // Extensions fill in missing native fields
    #[test]
    fn test_extension_fallbacks() {
        let feed = translate(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:itunes="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
                <channel>
                    <dc:title>DC Title</dc:title>
                    <itunes:summary>ITunes Summary</itunes:summary>
                    <dc:language>en-au</dc:language>
                    <dc:rights>DC Rights</dc:rights>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("DC Title"));
        assert_eq!(feed.description.as_deref(), Some("ITunes Summary"));
        assert_eq!(feed.language.as_deref(), Some("en-au"));
        assert_eq!(feed.copyright.as_deref(), Some("DC Rights"));
    }

    // The feed link comes from the atom:link rel="self" extension
    #[test]
    fn test_feed_link_from_atom_extension() {
        let feed = translate(
            r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
                <channel>
                    <title>T</title>
                    <atom:link href="http://example.com/feed.xml" rel="self" type="application/rss+xml"/>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.feed_link.as_deref(), Some("http://example.com/feed.xml"));
    }

    // Authors cascade through managingEditor and the extensions, and the
    // person string is split into name and email
    #[test]
    fn test_author_cascade() {
        let feed = translate(
            r#"<rss version="2.0">
                <channel>
                    <title>T</title>
                    <managingEditor>editor@example.com (The Editor)</managingEditor>
                </channel>
            </rss>"#,
        );

        let author = &feed.authors[0];
        assert_eq!(author.name.as_deref(), Some("The Editor"));
        assert_eq!(author.email.as_deref(), Some("editor@example.com"));

        let feed = translate(
            r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
                <channel>
                    <title>T</title>
                    <itunes:author>Alice</itunes:author>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.authors[0].name.as_deref(), Some("Alice"));
    }

    // Categories union native values with keywords, itunes categories and subjects
    #[test]
    fn test_category_union() {
        let feed = translate(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:itunes="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
                <channel>
                    <title>T</title>
                    <category>native</category>
                    <itunes:keywords>one, two</itunes:keywords>
                    <itunes:category text="Technology">
                        <itunes:category text="Software"/>
                    </itunes:category>
                    <dc:subject>subject</dc:subject>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.categories, vec!["native", "one", "two", "Technology", "Software", "subject"]);
    }

    // The image cascades down to scraping the description
    #[test]
    fn test_image_cascade() {
        let feed = translate(
            r#"<rss version="2.0">
                <channel>
                    <title>T</title>
                    <description>&lt;img src="http://example.com/cover.png"&gt;</description>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.image.unwrap().url, "http://example.com/cover.png");

        let feed = translate(
            r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/DTDs/PodCast-1.0.dtd">
                <channel>
                    <title>T</title>
                    <itunes:image href="http://example.com/itunes.png"/>
                    <description>no image here</description>
                </channel>
            </rss>"#,
        );

        assert_eq!(feed.image.unwrap().url, "http://example.com/itunes.png");
    }

    // Item images fall back to image-typed enclosures
    #[test]
    fn test_item_image_from_enclosure() {
        let feed = translate(
            r#"<rss version="2.0">
                <channel>
                    <title>T</title>
                    <item>
                        <title>I</title>
                        <enclosure url="http://example.com/photo.jpg" length="1024" type="image/jpeg"/>
                    </item>
                </channel>
            </rss>"#,
        );

        let item = &feed.items[0];
        assert_eq!(item.image.as_ref().unwrap().url, "http://example.com/photo.jpg");
        assert_eq!(item.enclosures[0].mime_type.as_deref(), Some("image/jpeg"));
    }

    // dc:date supplies the updated timestamp for items
    #[test]
    fn test_item_updated_from_dublin_core() {
        let feed = translate(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
                <channel>
                    <title>T</title>
                    <item>
                        <title>I</title>
                        <dc:date>2020-05-01T12:00:00Z</dc:date>
                    </item>
                </channel>
            </rss>"#,
        );

        let item = &feed.items[0];
        assert_eq!(item.updated.as_deref(), Some("2020-05-01T12:00:00Z"));
        assert!(item.updated_parsed.is_some());
    }
}
