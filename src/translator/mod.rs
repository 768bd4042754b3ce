//! Translation from the format-specific models into the unified model.
//!
//! Each format has its own translator trait so a caller can substitute custom
//! mapping rules per format; the default implementations apply a fixed
//! precedence across native fields and extensions, so translation is pure and
//! deterministic.

use crate::model;
use crate::parser::ParseOptions;

mod atom;
mod json;
mod rss;

pub use self::atom::DefaultAtomTranslator;
pub use self::json::DefaultJsonTranslator;
pub use self::rss::DefaultRssTranslator;

/// Converts an Atom feed into the unified model
pub trait AtomTranslator {
    fn translate(&self, feed: &crate::model::atom::Feed, options: &ParseOptions) -> model::Feed;
}

/// Converts an RSS feed into the unified model
pub trait RssTranslator {
    fn translate(&self, feed: &crate::model::rss::Feed, options: &ParseOptions) -> model::Feed;
}

/// Converts a JSON Feed into the unified model
pub trait JsonTranslator {
    fn translate(&self, feed: &crate::model::json::Feed, options: &ParseOptions) -> model::Feed;
}
