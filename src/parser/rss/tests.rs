use chrono::{TimeZone, Utc};

use crate::parser::{self, ParseOptions};

fn parse(xml: &str) -> crate::model::rss::Feed {
    parser::rss::parse(xml.as_bytes(), &ParseOptions::default()).unwrap()
}

// Basic RSS 2.0 example from various sources (Wikipedia etc)
#[test]
fn test_example_1() {
    let feed = parse(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
        <rss version="2.0">
            <channel>
                <title>RSS Title</title>
                <description>This is an example of an RSS feed</description>
                <link>http://www.example.com/main.html</link>
                <lastBuildDate>Mon, 06 Sep 2010 00:01:00 +0000</lastBuildDate>
                <pubDate>Sun, 06 Sep 2009 16:20:00 +0000</pubDate>
                <ttl>1800</ttl>
                <item>
                    <title>Example entry</title>
                    <description>Here is some text containing an interesting description.</description>
                    <link>http://www.example.com/blog/post/1</link>
                    <guid isPermaLink="false">7bd204c6-1655-4c27-aeee-53f933c5395f</guid>
                    <pubDate>Sun, 06 Sep 2009 16:20:00 +0000</pubDate>
                </item>
            </channel>
        </rss>"#,
    );

    assert_eq!(feed.version.as_deref(), Some("2.0"));
    assert_eq!(feed.title.as_deref(), Some("RSS Title"));
    assert_eq!(feed.description.as_deref(), Some("This is an example of an RSS feed"));
    assert_eq!(feed.link.as_deref(), Some("http://www.example.com/main.html"));
    assert_eq!(feed.ttl.as_deref(), Some("1800"));
    assert_eq!(feed.pub_date_parsed, Some(Utc.with_ymd_and_hms(2009, 9, 6, 16, 20, 0).unwrap()));
    assert_eq!(feed.last_build_date_parsed, Some(Utc.with_ymd_and_hms(2010, 9, 6, 0, 1, 0).unwrap()));

    let item = &feed.items[0];
    assert_eq!(item.title.as_deref(), Some("Example entry"));
    assert_eq!(item.link.as_deref(), Some("http://www.example.com/blog/post/1"));

    let guid = item.guid.as_ref().unwrap();
    assert_eq!(guid.value.as_deref(), Some("7bd204c6-1655-4c27-aeee-53f933c5395f"));
    assert_eq!(guid.is_permalink, Some(false));
}

// The version attribute defaults to 2.0 when absent
#[test]
fn test_version_defaults() {
    let feed = parse("<rss><channel><title>T</title></channel></rss>");
    assert_eq!(feed.version.as_deref(), Some("2.0"));

    let feed = parse(r#"<rss version="0.91"><channel><title>T</title></channel></rss>"#);
    assert_eq!(feed.version.as_deref(), Some("0.91"));
}

// RSS 1.0 (RDF) detects its version from the namespace and merges root-level
// items into the channel
#[test]
fn test_rdf_root_items() {
    let feed = parse(
        r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
            <channel>
                <title>R</title>
                <link>http://example.com/</link>
            </channel>
            <item>
                <title>One</title>
                <link>http://example.com/1</link>
            </item>
            <item>
                <title>Two</title>
                <link>http://example.com/2</link>
            </item>
        </rdf:RDF>"#,
    );

    assert_eq!(feed.version.as_deref(), Some("1.0"));
    assert_eq!(feed.title.as_deref(), Some("R"));
    assert_eq!(feed.items.len(), 2);
    assert_eq!(feed.items[0].title.as_deref(), Some("One"));
    assert_eq!(feed.items[1].title.as_deref(), Some("Two"));
}

// The netscape namespaces mark RSS 0.9
#[test]
fn test_netscape_version() {
    let feed = parse(
        r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://my.netscape.com/rdf/simple/0.9/">
            <channel><title>Old</title></channel>
        </rdf:RDF>"#,
    );

    assert_eq!(feed.version.as_deref(), Some("0.9"));
}

// The full channel element set
#[test]
fn test_channel_elements() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel>
                <title>T</title>
                <language>en-us</language>
                <copyright>Copyright 2020</copyright>
                <managingEditor>editor@example.com (The Editor)</managingEditor>
                <webMaster>web@example.com</webMaster>
                <generator>Example Generator</generator>
                <docs>https://www.rssboard.org/rss-specification</docs>
                <rating>(PICS-1.1 "http://www.rsac.org/ratingsv01.html" l r (n 0 s 0 v 0 l 0))</rating>
                <cloud domain="rpc.example.com" port="80" path="/RPC2" registerProcedure="myCloud.rssPleaseNotify" protocol="xml-rpc"/>
                <category domain="http://www.fool.com/cusips">MSFT</category>
                <skipHours><hour>0</hour><hour>1</hour></skipHours>
                <skipDays><day>Saturday</day><day>Sunday</day></skipDays>
                <image>
                    <url>http://example.com/logo.gif</url>
                    <title>T</title>
                    <link>http://example.com/</link>
                    <width>88</width>
                    <height>31</height>
                </image>
                <textInput>
                    <title>Search</title>
                    <description>Search the site</description>
                    <name>q</name>
                    <link>http://example.com/search</link>
                </textInput>
            </channel>
        </rss>"#,
    );

    assert_eq!(feed.language.as_deref(), Some("en-us"));
    assert_eq!(feed.copyright.as_deref(), Some("Copyright 2020"));
    assert_eq!(feed.managing_editor.as_deref(), Some("editor@example.com (The Editor)"));
    assert_eq!(feed.web_master.as_deref(), Some("web@example.com"));
    assert_eq!(feed.generator.as_deref(), Some("Example Generator"));
    assert_eq!(feed.docs.as_deref(), Some("https://www.rssboard.org/rss-specification"));
    assert!(feed.rating.is_some());

    let cloud = feed.cloud.as_ref().unwrap();
    assert_eq!(cloud.domain.as_deref(), Some("rpc.example.com"));
    assert_eq!(cloud.port.as_deref(), Some("80"));
    assert_eq!(cloud.register_procedure.as_deref(), Some("myCloud.rssPleaseNotify"));
    assert_eq!(cloud.protocol.as_deref(), Some("xml-rpc"));

    let category = &feed.categories[0];
    assert_eq!(category.value, "MSFT");
    assert_eq!(category.domain.as_deref(), Some("http://www.fool.com/cusips"));

    assert_eq!(feed.skip_hours, vec!["0", "1"]);
    assert_eq!(feed.skip_days, vec!["Saturday", "Sunday"]);

    let image = feed.image.as_ref().unwrap();
    assert_eq!(image.url.as_deref(), Some("http://example.com/logo.gif"));
    assert_eq!(image.width.as_deref(), Some("88"));
    assert_eq!(image.height.as_deref(), Some("31"));

    let text_input = feed.text_input.as_ref().unwrap();
    assert_eq!(text_input.name.as_deref(), Some("q"));
    assert_eq!(text_input.link.as_deref(), Some("http://example.com/search"));
}

// The full item element set
#[test]
fn test_item_elements() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel>
                <title>T</title>
                <item>
                    <title>I</title>
                    <author>author@example.com (An Author)</author>
                    <comments>http://example.com/1/comments</comments>
                    <enclosure url="http://example.com/ep.mp3" length="24986239" type="audio/mpeg"/>
                    <source url="http://upstream.example.com/feed.xml">Upstream</source>
                    <category>tech</category>
                    <category>rust</category>
                </item>
            </channel>
        </rss>"#,
    );

    let item = &feed.items[0];
    assert_eq!(item.author.as_deref(), Some("author@example.com (An Author)"));
    assert_eq!(item.comments.as_deref(), Some("http://example.com/1/comments"));

    let enclosure = &item.enclosures[0];
    assert_eq!(enclosure.url.as_deref(), Some("http://example.com/ep.mp3"));
    assert_eq!(enclosure.length.as_deref(), Some("24986239"));
    assert_eq!(enclosure.enclosure_type.as_deref(), Some("audio/mpeg"));

    let source = item.source.as_ref().unwrap();
    assert_eq!(source.url.as_deref(), Some("http://upstream.example.com/feed.xml"));
    assert_eq!(source.title.as_deref(), Some("Upstream"));

    let categories: Vec<&str> = item.categories.iter().map(|category| category.value.as_str()).collect();
    assert_eq!(categories, vec!["tech", "rust"]);
}

// content:encoded supplies the item content and remains in the extension map
#[test]
fn test_content_encoded() {
    let feed = parse(
        r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
            <channel>
                <title>T</title>
                <item>
                    <title>I</title>
                    <description>Short form</description>
                    <content:encoded><![CDATA[<p>Long <b>form</b> content</p>]]></content:encoded>
                </item>
            </channel>
        </rss>"#,
    );

    let item = &feed.items[0];
    assert_eq!(item.description.as_deref(), Some("Short form"));
    assert_eq!(item.content.as_deref(), Some("<p>Long <b>form</b> content</p>"));
    assert_eq!(
        crate::extension::get_extension_value(&item.extensions, "content", "encoded"),
        Some("<p>Long <b>form</b> content</p>")
    );
}

// Element-name casing differences are tolerated
#[test]
fn test_case_insensitive_elements() {
    let feed = parse(
        r#"<RSS version="2.0">
            <Channel>
                <TITLE>T</TITLE>
                <Item><Title>I</Title></Item>
            </Channel>
        </RSS>"#,
    );

    assert_eq!(feed.title.as_deref(), Some("T"));
    assert_eq!(feed.items[0].title.as_deref(), Some("I"));
}

// Root-level image and textInput apply only when the channel has none
#[test]
fn test_root_level_fallbacks() {
    let feed = parse(
        r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
            <channel><title>R</title></channel>
            <image><url>http://example.com/root.gif</url></image>
        </rdf:RDF>"#,
    );
    assert_eq!(feed.image.as_ref().unwrap().url.as_deref(), Some("http://example.com/root.gif"));

    let feed = parse(
        r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
            <channel>
                <title>R</title>
                <image><url>http://example.com/channel.gif</url></image>
            </channel>
            <image><url>http://example.com/root.gif</url></image>
        </rdf:RDF>"#,
    );
    assert_eq!(feed.image.as_ref().unwrap().url.as_deref(), Some("http://example.com/channel.gif"));
}

// Multiple channels: the first wins
#[test]
fn test_first_channel_wins() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel><title>First</title></channel>
            <channel><title>Second</title></channel>
        </rss>"#,
    );

    assert_eq!(feed.title.as_deref(), Some("First"));
}

// Later scalar values overwrite earlier ones, lists accumulate
#[test]
fn test_duplicate_handling() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel>
                <title>First</title>
                <title>Second</title>
                <category>one</category>
                <category>two</category>
            </channel>
        </rss>"#,
    );

    assert_eq!(feed.title.as_deref(), Some("Second"));
    assert_eq!(feed.categories.len(), 2);
}

// Unknown elements are skipped without disturbing their siblings
#[test]
fn test_unknown_elements_skipped() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel>
                <title>T</title>
                <unknownBlock><deeply><nested>ignored</nested></deeply></unknownBlock>
                <link>http://example.com/</link>
            </channel>
        </rss>"#,
    );

    assert_eq!(feed.title.as_deref(), Some("T"));
    assert_eq!(feed.link.as_deref(), Some("http://example.com/"));
}

// Extensions on channel and item land in their extension maps with
// canonical prefixes
#[test]
fn test_extensions() {
    let feed = parse(
        r#"<rss version="2.0"
                 xmlns:dc="http://purl.org/dc/elements/1.1/"
                 xmlns:sy="http://purl.org/rss/1.0/modules/syndication/">
            <channel>
                <title>T</title>
                <sy:updatePeriod>hourly</sy:updatePeriod>
                <item>
                    <title>I</title>
                    <dc:creator>Alice</dc:creator>
                </item>
            </channel>
        </rss>"#,
    );

    assert_eq!(
        crate::extension::get_extension_value(&feed.extensions, "sy", "updatePeriod"),
        Some("hourly")
    );
    assert_eq!(
        crate::extension::get_extension_value(&feed.items[0].extensions, "dc", "creator"),
        Some("Alice")
    );
}

// Entity handling in descriptions: known entities expand, unknown survive
#[test]
fn test_entity_handling() {
    let feed = parse(
        r#"<rss version="2.0">
            <channel>
                <title>T</title>
                <item>
                    <description>See &lt;b&gt;here&lt;/b&gt; for &foo;</description>
                </item>
            </channel>
        </rss>"#,
    );

    assert_eq!(feed.items[0].description.as_deref(), Some("See <b>here</b> for &foo;"));
}
