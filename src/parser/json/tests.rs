use crate::parser::{self, ParseErrorKind, ParseFeedError, ParseOptions};

fn parse(json: &str) -> crate::model::json::Feed {
    parser::json::parse(json.as_bytes(), &ParseOptions::default()).unwrap()
}

// The example from the JSON Feed 1.1 specification, plus the optional fields
#[test]
fn test_spec_example() {
    let feed = parse(
        r#"{
            "version": "https://jsonfeed.org/version/1.1",
            "title": "My Example Feed",
            "home_page_url": "https://example.org/",
            "feed_url": "https://example.org/feed.json",
            "description": "An example",
            "user_comment": "This feed allows you to read the posts from this site in any feed reader",
            "next_url": "https://example.org/feed.json?page=2",
            "icon": "https://example.org/icon.png",
            "favicon": "https://example.org/favicon.ico",
            "language": "en-US",
            "expired": false,
            "hubs": [{"type": "WebSub", "url": "https://example.org/hub"}],
            "authors": [{"name": "Brent", "url": "https://example.org/brent", "avatar": "https://example.org/avatar.png"}],
            "items": [
                {
                    "id": "2",
                    "content_text": "This is a second item.",
                    "url": "https://example.org/second-item"
                },
                {
                    "id": "1",
                    "content_html": "<p>Hello, world!</p>",
                    "url": "https://example.org/initial-post"
                }
            ]
        }"#,
    );

    assert_eq!(feed.version.as_deref(), Some("https://jsonfeed.org/version/1.1"));
    assert_eq!(feed.title.as_deref(), Some("My Example Feed"));
    assert_eq!(feed.home_page_url.as_deref(), Some("https://example.org/"));
    assert_eq!(feed.feed_url.as_deref(), Some("https://example.org/feed.json"));
    assert_eq!(feed.user_comment.as_deref(), Some("This feed allows you to read the posts from this site in any feed reader"));
    assert_eq!(feed.next_url.as_deref(), Some("https://example.org/feed.json?page=2"));
    assert_eq!(feed.favicon.as_deref(), Some("https://example.org/favicon.ico"));
    assert_eq!(feed.language.as_deref(), Some("en-US"));
    assert_eq!(feed.expired, Some(false));

    let hub = &feed.hubs.as_ref().unwrap()[0];
    assert_eq!(hub.hub_type.as_deref(), Some("WebSub"));

    let author = &feed.authors.as_ref().unwrap()[0];
    assert_eq!(author.name.as_deref(), Some("Brent"));
    assert_eq!(author.avatar.as_deref(), Some("https://example.org/avatar.png"));

    assert_eq!(feed.items.len(), 2);
    assert_eq!(feed.items[0].id.as_deref(), Some("2"));
    assert_eq!(feed.items[0].content_text.as_deref(), Some("This is a second item."));
    assert_eq!(feed.items[1].content_html.as_deref(), Some("<p>Hello, world!</p>"));
}

// Version 1 used a singular author object
#[test]
fn test_v1_author() {
    let feed = parse(
        r#"{
            "version": "https://jsonfeed.org/version/1",
            "title": "J",
            "author": {"name": "Brent"},
            "items": []
        }"#,
    );

    assert_eq!(feed.author.as_ref().unwrap().name.as_deref(), Some("Brent"));
    assert!(feed.authors.is_none());
}

// Numeric item ids are tolerated and kept as strings
#[test]
fn test_numeric_id() {
    let feed = parse(
        r#"{
            "version": "https://jsonfeed.org/version/1",
            "title": "J",
            "items": [{"id": 42}]
        }"#,
    );

    assert_eq!(feed.items[0].id.as_deref(), Some("42"));
}

// Attachments with sizes and durations
#[test]
fn test_attachments() {
    let feed = parse(
        r#"{
            "version": "https://jsonfeed.org/version/1.1",
            "title": "Podcast",
            "items": [{
                "id": "1",
                "attachments": [{
                    "url": "https://example.org/ep1.mp3",
                    "mime_type": "audio/mpeg",
                    "title": "Episode 1",
                    "size_in_bytes": 31032296,
                    "duration_in_seconds": 2245
                }]
            }]
        }"#,
    );

    let attachment = &feed.items[0].attachments.as_ref().unwrap()[0];
    assert_eq!(attachment.url.as_deref(), Some("https://example.org/ep1.mp3"));
    assert_eq!(attachment.mime_type.as_deref(), Some("audio/mpeg"));
    assert_eq!(attachment.size_in_bytes, Some(31032296.0));
    assert_eq!(attachment.duration_in_seconds, Some(2245.0));
}

// Dates stay as the strings the document carried
#[test]
fn test_dates_stay_strings() {
    let feed = parse(
        r#"{
            "version": "https://jsonfeed.org/version/1",
            "title": "J",
            "items": [{
                "id": "1",
                "date_published": "2010-02-07T14:04:00-05:00"
            }]
        }"#,
    );

    assert_eq!(feed.items[0].date_published.as_deref(), Some("2010-02-07T14:04:00-05:00"));
}

// Invalid JSON is fatal
#[test]
fn test_invalid_json() {
    let result = parser::json::parse(&b"{not json"[..], &ParseOptions::default());
    assert!(matches!(result, Err(ParseFeedError::JsonSerde(_))));
}

// Strict mode requires version and items
#[test]
fn test_strict_missing_required() {
    let mut options = ParseOptions::default();
    options.strictness.allow_missing_required = false;

    let result = parser::json::parse(&br#"{"title": "J", "items": [{"id": "1"}]}"#[..], &options);
    assert!(matches!(
        result,
        Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("version")))
    ));

    let result = parser::json::parse(&br#"{"version": "https://jsonfeed.org/version/1", "title": "J", "items": []}"#[..], &options);
    assert!(matches!(
        result,
        Err(ParseFeedError::ParseError(ParseErrorKind::MissingContent("items")))
    ));
}

// Strict mode rejects unparseable dates
#[test]
fn test_strict_dates() {
    let mut options = ParseOptions::default();
    options.strictness.allow_invalid_dates = false;

    let result = parser::json::parse(
        &br#"{"version": "https://jsonfeed.org/version/1", "title": "J", "items": [{"id": "1", "date_published": "whenever"}]}"#[..],
        &options,
    );
    assert!(matches!(result, Err(ParseFeedError::ParseError(ParseErrorKind::InvalidDate(_)))));
}

// max_items truncates the item list
#[test]
fn test_max_items() {
    let options = ParseOptions {
        max_items: 1,
        ..Default::default()
    };

    let feed = parser::json::parse(
        &br#"{"version": "https://jsonfeed.org/version/1", "title": "J", "items": [{"id": "1"}, {"id": "2"}]}"#[..],
        &options,
    )
    .unwrap();

    assert_eq!(feed.items.len(), 1);
}
