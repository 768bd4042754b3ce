use std::io::Read;

use crate::model::json::Feed;
use crate::parser::{dates, ParseErrorKind, ParseFeedError, ParseFeedResult, ParseOptions};

#[cfg(test)]
mod tests;

/// Parses a JSON Feed document (version 1 or 1.1) into the JSON Feed model
///
/// The two versions differ only in additive fields (`authors`, `language`), so
/// a single model covers both; dates stay as the RFC 3339 strings the document
/// carried.
pub fn parse<R: Read>(source: R, options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut feed: Feed = serde_json::from_reader(source)?;
    finish(&mut feed, options)?;
    Ok(feed)
}

pub(crate) fn parse_slice(buffer: &[u8], options: &ParseOptions) -> ParseFeedResult<Feed> {
    let mut feed: Feed = serde_json::from_slice(buffer)?;
    finish(&mut feed, options)?;
    Ok(feed)
}

fn finish(feed: &mut Feed, options: &ParseOptions) -> ParseFeedResult<()> {
    if !options.strictness.allow_missing_required {
        if feed.version.is_none() {
            return Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("version")));
        }
        if feed.items.is_empty() {
            return Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("items")));
        }
    }

    // The translator interprets dates, but strictness about them is enforced
    // here so translation stays infallible
    if options.parse_dates && !options.strictness.allow_invalid_dates {
        for item in &feed.items {
            for date in [&item.date_published, &item.date_modified].into_iter().flatten() {
                if dates::parse_date(date).is_none() {
                    return Err(ParseFeedError::ParseError(ParseErrorKind::InvalidDate(date.clone())));
                }
            }
        }
    }

    if options.max_items > 0 && feed.items.len() > options.max_items {
        feed.items.truncate(options.max_items);
    }

    Ok(())
}
