//! This crate provides parsers for RSS (0.9x, 1.0, 2.0), Atom (0.3, 1.0) and
//! JSON Feed (1, 1.1) content, along with a unified data model over all of
//! them.
//!
//! The parser automatically detects the type of content (XML vs. JSON) and the
//! feed format (Atom vs. RSS), parses it into a format-specific model that
//! preserves the source structure, then translates that into the unified model
//! through a fixed set of precedence rules. Callers that want the raw
//! representation can use the per-format parsers directly.
//!
//! The parser errs on the side of leniency: malformed XML is tolerated where
//! the real world demands it (unescaped entities, illegal characters, wrong
//! element-name casing), dates are matched against the long tail of formats
//! feeds actually use, and elements in unknown namespaces are captured
//! generically into extension maps rather than dropped. Strict behaviour is
//! opt-in through [`parser::ParseOptions`].
//!
//! It uses [quick-xml](https://crates.io/crates/quick-xml) - a light-weight,
//! streaming XML parser to minimise memory usage.
//!
//! # Usage
//!
//! The `parser::parse` method accepts any source that implements the `Read` trait.
//! For example, to process a string:
//!
//! ```rust
//! use unifeed::parser::{self, ParseOptions};
//!
//! let example_rss = r#"<?xml version="1.0" encoding="UTF-8" ?>
//!   <rss version="2.0">
//!     <channel>
//!       <title>RSS Title</title>
//!       <description>This is an example of an RSS feed</description>
//!       <link>http://www.example.com/main.html</link>
//!       <lastBuildDate>Mon, 06 Sep 2010 00:01:00 +0000</lastBuildDate>
//!       <pubDate>Sun, 06 Sep 2009 16:20:00 +0000</pubDate>
//!       <ttl>1800</ttl>
//!
//!       <item>
//!         <title>Example entry</title>
//!         <description>Here is some text containing an interesting description.</description>
//!         <link>http://www.example.com/blog/post/1</link>
//!         <guid isPermaLink="true">7bd204c6-1655-4c27-aeee-53f933c5395f</guid>
//!         <pubDate>Sun, 06 Sep 2009 16:20:00 +0000</pubDate>
//!       </item>
//!
//!     </channel>
//!   </rss>"#;
//!
//! let feed = parser::parse(example_rss.as_bytes(), &ParseOptions::default()).unwrap();
//! assert_eq!(feed.feed_type, "rss");
//! ```
//!
//! ## Parser configuration
//!
//! `ParseOptions` controls retention of the format-specific feed, date
//! parsing, item limits and strictness. To keep the raw RSS model alongside
//! the unified one:
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use unifeed::parser::{self, ParseOptions};
//!
//! let file = File::open("example.xml").unwrap();
//! let options = ParseOptions {
//!     keep_original_feed: true,
//!     ..Default::default()
//! };
//! let feed = parser::parse(BufReader::new(file), &options).unwrap();
//! ```

#![forbid(unsafe_code)]

mod xml;

pub mod extension;
pub mod model;
pub mod parser;
pub mod translator;
