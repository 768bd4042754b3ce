use std::io::Read;

use super::*;

type Result = XmlResult<()>;

fn handle_book<R: BufRead>(book: Element<R>) -> Result {
    // Iterate over the children of the book
    let mut count = 0;
    for child in book.children() {
        let child = child?;
        match child.name.as_str() {
            "author" => {
                count += 1;
                assert_eq!(child.child_as_text()?.unwrap(), "Gambardella, Matthew");
            }
            "title" => {
                count += 1;
                assert_eq!(child.child_as_text()?.unwrap(), "XML Developer's Guide");
            }
            "nest1" => {
                handle_nest1(child)?;
            }
            "empty1" | "empty2" => {
                assert!(child.child_as_text()?.is_none());
            }
            _ => panic!("Unexpected child node: {}", child.name),
        }
    }

    // Should have found two elements
    assert_eq!(count, 2);

    Ok(())
}

fn handle_nest1<R: BufRead>(nest1: Element<R>) -> Result {
    // Should have a single child called "nest2" with the expected text
    let mut count = 0;
    for child in nest1.children() {
        let child = child?;
        assert_eq!(child.name, "nest2");
        assert_eq!(child.child_as_text()?.unwrap(), "Nested");
        count += 1;
    }
    assert_eq!(count, 1);

    Ok(())
}

#[test]
fn test_iterate_stream() -> Result {
    let test_data = r#"<?xml version="1.0"?>
        <catalog>
            <book id="bk101">
                <author>Gambardella, Matthew</author>
                <title>XML Developer's Guide</title>
                <nest1>
                    <nest2>Nested</nest2>
                </nest1>
                <empty1/>
                <empty2></empty2>
            </book>
        </catalog>"#;

    // Root element should be "catalog"
    let source = ElementSource::new(test_data.as_bytes(), false);
    let catalog = source.root()?.unwrap();
    assert_eq!(catalog.name, "catalog");

    // Should have a single "book" child with the id attribute
    let mut count = 0;
    for child in catalog.children() {
        let child = child?;
        assert_eq!(child.name, "book");
        assert_eq!(child.attr_value("id").as_deref(), Some("bk101"));
        count += 1;
        handle_book(child)?;
    }
    assert_eq!(count, 1);

    Ok(())
}

#[test]
fn test_children_as_string() -> Result {
    let test_data = r#"<catalog xmlns:content="http://purl.org/rss/1.0/modules/content/">
    <book>
        <author>Gambardella, Matthew</author>
        <title>XML Developer's Guide</title>
    </book>
    <content:encoded><![CDATA[<p>10 km, 21.9072&deg; East, 37.102&deg; North. </p>]]></content:encoded>
</catalog>"#;

    let source = ElementSource::new(test_data.as_bytes(), false);
    let catalog = source.root()?.unwrap();
    assert_eq!(catalog.name, "catalog");

    // The book's children re-serialise structurally intact
    let mut children = catalog.children();
    let book = children.next().unwrap()?;
    assert_eq!(book.name, "book");
    let expected = "\n        <author>Gambardella, Matthew</author>\n        <title>XML Developer's Guide</title>\n    ";
    assert_eq!(book.children_as_string()?, expected);

    // The namespaced element resolves against its declaration and its CDATA
    // body is preserved as written
    let encoded = children.next().unwrap()?;
    assert_eq!(encoded.namespace, "http://purl.org/rss/1.0/modules/content/");
    assert_eq!(encoded.prefix, "content");
    assert_eq!(encoded.name, "encoded");
    let text = encoded.children_as_string()?;
    assert_eq!(text, "<![CDATA[<p>10 km, 21.9072&deg; East, 37.102&deg; North. </p>]]>");

    Ok(())
}

// Verifies the decoder handles the encodings detailed in the RSS best
// practices guide (https://www.rssboard.org/rss-profile#data-types-characterdata)
#[test]
fn test_rss_decoding() -> Result {
    let tests = vec![
        ("<title>AT&#x26;T</title>", "AT&T"),
        ("<title>Bill &#x26; Ted's Excellent Adventure</title>", "Bill & Ted's Excellent Adventure"),
        ("<title>The &#x26;amp; entity</title>", "The &amp; entity"),
        ("<title>I &#x3C;3 Phil Ringnalda</title>", "I <3 Phil Ringnalda"),
        ("<title>A &#x3C; B</title>", "A < B"),
        ("<title>A&#x3C;B</title>", "A<B"),
        ("<title>Nice &#x3C;gorilla&#x3E;, what's he weigh?</title>", "Nice <gorilla>, what's he weigh?"),
    ];
    for (xml, expected) in tests {
        let source = ElementSource::new(xml.as_bytes(), false);
        let title = source.root()?.unwrap();
        let parsed = title.child_as_text()?.unwrap();
        assert_eq!(expected, parsed);
    }

    Ok(())
}

// Namespace declarations scope to their element and shadow inherited ones
#[test]
fn test_namespace_scoping() -> Result {
    let xml = r#"<root xmlns:a="http://example.com/outer">
        <a:one/>
        <mid xmlns:a="http://example.com/inner"><a:two/></mid>
        <a:three/>
    </root>"#;

    let source = ElementSource::new(xml.as_bytes(), false);
    let root = source.root()?.unwrap();

    let mut children = root.children();

    let one = children.next().unwrap()?;
    assert_eq!(one.namespace, "http://example.com/outer");

    let mid = children.next().unwrap()?;
    let two = mid.children().next().unwrap()?;
    assert_eq!(two.namespace, "http://example.com/inner");

    // The inner declaration popped with its element
    let three = children.next().unwrap()?;
    assert_eq!(three.namespace, "http://example.com/outer");

    Ok(())
}

// xml:base resolves URI-bearing attributes, nesting relative bases
#[test]
fn test_base_uri_resolution() -> Result {
    let xml = r#"<feed xml:base="http://example.com/feed/">
        <link href="post/1"/>
        <section xml:base="archive/">
            <link href="post/2"/>
        </section>
        <link href="http://other.example.com/absolute"/>
    </feed>"#;

    let source = ElementSource::new(xml.as_bytes(), false);
    let feed = source.root()?.unwrap();
    let mut children = feed.children();

    let first = children.next().unwrap()?;
    assert_eq!(first.attr_value("href").as_deref(), Some("http://example.com/feed/post/1"));

    let section = children.next().unwrap()?;
    let nested = section.children().next().unwrap()?;
    assert_eq!(nested.attr_value("href").as_deref(), Some("http://example.com/feed/archive/post/2"));

    // Absolute URIs pass through resolution unchanged
    let last = children.next().unwrap()?;
    assert_eq!(last.attr_value("href").as_deref(), Some("http://other.example.com/absolute"));

    Ok(())
}

// Element names are matched case-insensitively but reported as written
#[test]
fn test_case_insensitive_names() -> Result {
    let xml = "<RSS><Channel><TITLE>T</TITLE></Channel></RSS>";

    let source = ElementSource::new(xml.as_bytes(), false);
    let root = source.root()?.unwrap();
    assert!(root.is_named("rss"));
    assert_eq!(root.name, "RSS");

    let channel = root.children().next().unwrap()?;
    assert_eq!(channel.name_folded(), "channel");

    Ok(())
}

// A document that ends mid-element is an error
#[test]
fn test_truncated_document() {
    let xml = "<rss><channel><title>T</title>";

    let source = ElementSource::new(xml.as_bytes(), false);
    let root = source.root().unwrap().unwrap();
    let channel = root.children().next().unwrap().unwrap();

    let result: XmlResult<Vec<_>> = channel.children().collect();
    assert!(result.is_err());
}

#[test]
fn test_sanitizer_strips_illegal_chars() {
    // A control character inside the title
    let input = b"<title>He\x08llo</title>".to_vec();

    let mut sanitized = Vec::new();
    XmlSanitizer::new(input.as_slice()).read_to_end(&mut sanitized).unwrap();
    assert_eq!(sanitized, b"<title>Hello</title>");
}

#[test]
fn test_sanitizer_keeps_legal_content() {
    // Multibyte characters, tabs and newlines all survive
    let input = "<title>caf\u{e9} \u{1F600}\t\nok</title>".as_bytes().to_vec();

    let mut sanitized = Vec::new();
    XmlSanitizer::new(input.as_slice()).read_to_end(&mut sanitized).unwrap();
    assert_eq!(sanitized, input);
}

#[test]
fn test_sanitizer_passes_invalid_utf8() {
    // Invalid UTF-8 is left for the tokenizer's encoding layer
    let input = vec![b'<', 0xFF, 0xFE, b'>'];

    let mut sanitized = Vec::new();
    XmlSanitizer::new(input.as_slice()).read_to_end(&mut sanitized).unwrap();
    assert_eq!(sanitized, input);
}
