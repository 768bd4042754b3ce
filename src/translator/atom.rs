use super::AtomTranslator;
use crate::extension::{DublinCoreExtension, ITunesFeedExtension, ITunesItemExtension};
use crate::model::{self, atom};
use crate::parser::ParseOptions;

/// The default Atom translator
///
/// Atom maps almost directly onto the unified model; the interesting work is
/// link-relation selection and the generator composition.
pub struct DefaultAtomTranslator;

impl AtomTranslator for DefaultAtomTranslator {
    fn translate(&self, source: &atom::Feed, _options: &ParseOptions) -> model::Feed {
        let mut feed = model::Feed {
            feed_type: "atom".to_string(),
            feed_version: source.version.clone(),
            ..Default::default()
        };

        feed.title = source.title.clone();
        feed.description = source.subtitle.clone();

        feed.link = alternate_link(&source.links);
        feed.feed_link = link_with_rel(&source.links, "self");
        feed.links = source.links.iter().filter_map(|link| link.href.clone()).collect();

        feed.updated = source.updated.clone();
        feed.updated_parsed = source.updated_parsed;

        feed.authors = source.authors.iter().map(person).collect();

        feed.language = source.language.clone();

        feed.image = source
            .logo
            .clone()
            .or_else(|| source.icon.clone())
            .map(|url| model::Image { url, title: None });

        feed.copyright = source.rights.clone();

        feed.generator = source.generator.as_ref().and_then(compose_generator);

        feed.categories = source.categories.iter().filter_map(category_text).collect();

        feed.items = source.entries.iter().map(|entry| self.translate_entry(entry)).collect();

        feed.dublin_core_ext = source.extensions.get("dc").map(DublinCoreExtension::from_map);
        feed.itunes_ext = source.extensions.get("itunes").map(ITunesFeedExtension::from_map);
        feed.extensions = source.extensions.clone();

        feed
    }
}

impl DefaultAtomTranslator {
    fn translate_entry(&self, source: &atom::Entry) -> model::Item {
        let mut item = model::Item::default();

        item.title = source.title.clone();
        item.description = source.summary.clone();
        item.content = source.content.as_ref().and_then(|content| content.value.clone());

        item.link = alternate_link(&source.links);
        item.links = source.links.iter().filter_map(|link| link.href.clone()).collect();

        item.updated = source.updated.clone();
        item.updated_parsed = source.updated_parsed;

        // Entries frequently carry only an updated timestamp, so it doubles
        // as the publication time
        item.published = source.published.clone().or_else(|| source.updated.clone());
        item.published_parsed = source.published_parsed.or(source.updated_parsed);

        item.authors = source.authors.iter().map(person).collect();

        item.guid = source.id.clone();

        item.categories = source.categories.iter().filter_map(category_text).collect();

        // Links with the enclosure relation are this format's media attachments
        item.enclosures = source
            .links
            .iter()
            .filter(|link| link.rel.as_deref() == Some("enclosure"))
            .filter_map(|link| {
                link.href.clone().map(|url| model::Enclosure {
                    url,
                    length: link.length.clone(),
                    mime_type: link.link_type.clone(),
                })
            })
            .collect();

        item.dublin_core_ext = source.extensions.get("dc").map(DublinCoreExtension::from_map);
        item.itunes_ext = source.extensions.get("itunes").map(ITunesItemExtension::from_map);
        item.extensions = source.extensions.clone();

        item
    }
}

// The primary link: an explicit alternate, or the first link with no relation
// (which the Atom spec defines as alternate)
fn alternate_link(links: &[atom::Link]) -> Option<String> {
    links
        .iter()
        .find(|link| matches!(link.rel.as_deref(), None | Some("alternate")))
        .and_then(|link| link.href.clone())
}

fn link_with_rel(links: &[atom::Link], rel: &str) -> Option<String> {
    links.iter().find(|link| link.rel.as_deref() == Some(rel)).and_then(|link| link.href.clone())
}

// "value [vVersion] [uri]"
fn compose_generator(generator: &atom::Generator) -> Option<String> {
    let mut composed = String::new();

    if let Some(value) = &generator.value {
        composed.push_str(value);
    }
    if let Some(version) = &generator.version {
        composed.push_str(" v");
        composed.push_str(version);
    }
    if let Some(uri) = &generator.uri {
        composed.push(' ');
        composed.push_str(uri);
    }

    let composed = composed.trim();
    if composed.is_empty() {
        None
    } else {
        Some(composed.to_string())
    }
}

// A human-readable label wins over the machine-readable term
fn category_text(category: &atom::Category) -> Option<String> {
    category.label.clone().or_else(|| category.term.clone())
}

fn person(source: &atom::Person) -> model::Person {
    model::Person {
        name: source.name.clone(),
        email: source.email.clone(),
    }
}
