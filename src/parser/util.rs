use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::ParseFeedResult;
use crate::xml::Element;

// Person strings in RSS feeds come in a handful of shapes ("email (name)",
// "name (email)", bare name, bare email)
static EMAIL_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^@]+@[^\s]+)\s+\(([^@]+)\)$").unwrap());
static NAME_EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^@]+)\s+\(([^@]+@[^)]+)\)$").unwrap());
static NAME_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^@()]+)$").unwrap());
static EMAIL_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^@()]+@[^@()]+)$").unwrap());

/// Invokes the callback if the value is present
pub(crate) fn if_some_then<T, F: FnOnce(T)>(value: Option<T>, f: F) {
    if let Some(value) = value {
        f(value);
    }
}

/// Expands numeric character references and the five predefined XML entities
///
/// Anything unrecognised (e.g. `&foo;`) is preserved literally, since feeds
/// routinely reference entities they never declare.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match rest.find(';') {
            Some(end) if end > 1 => {
                let entity = &rest[1..end];
                match expand_entity(entity) {
                    Some(expanded) => result.push_str(&expanded),
                    None => result.push_str(&rest[..=end]),
                }
                rest = &rest[end + 1..];
            }
            _ => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

// Expands a single entity (the text between '&' and ';') if recognised
fn expand_entity(entity: &str) -> Option<String> {
    match entity {
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        "amp" => Some("&".to_string()),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32).map(String::from)
        }
    }
}

/// Strips surrounding `<![CDATA[ ... ]]>` wrappers, returning `None` if the
/// text was not wrapped at all
pub(crate) fn strip_cdata(text: &str) -> Option<String> {
    let mut current = text.trim();
    let mut unwrapped = false;

    while let Some(inner) = current.strip_prefix("<![CDATA[").and_then(|s| s.strip_suffix("]]>")) {
        current = inner;
        unwrapped = true;
    }

    if unwrapped {
        Some(current.to_string())
    } else {
        None
    }
}

/// Consumes the current element and returns its character content
///
/// The raw inner XML is preferred so that naked markup inside an element
/// survives. CDATA-wrapped content is returned verbatim; anything else has
/// known entities expanded and surrounding whitespace trimmed.
pub(crate) fn parse_text<R: BufRead>(element: Element<R>) -> ParseFeedResult<Option<String>> {
    let inner = element.children_as_string()?;
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = match strip_cdata(trimmed) {
        Some(unwrapped) => unwrapped,
        None => decode_entities(trimmed).trim().to_string(),
    };

    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Splits a person string into name and email address
///
/// Handles the forms commonly found in RSS feeds: "example@site.com (Example
/// Name)", "Example Name (example@site.com)", a bare name or a bare address.
pub(crate) fn parse_name_address(text: &str) -> (Option<String>, Option<String>) {
    let text = text.trim();
    if text.is_empty() {
        return (None, None);
    }

    if let Some(groups) = EMAIL_NAME.captures(text) {
        (Some(groups[2].to_string()), Some(groups[1].to_string()))
    } else if let Some(groups) = NAME_EMAIL.captures(text) {
        (Some(groups[1].to_string()), Some(groups[2].to_string()))
    } else if let Some(groups) = NAME_ONLY.captures(text) {
        (Some(groups[1].to_string()), None)
    } else if let Some(groups) = EMAIL_ONLY.captures(text) {
        (None, Some(groups[1].to_string()))
    } else {
        (None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        let tests = vec![
            // The five predefined entities
            ("a &lt; b &gt; c", "a < b > c"),
            ("&quot;quoted&quot; &apos;quoted&apos;", "\"quoted\" 'quoted'"),
            ("AT&amp;T", "AT&T"),
            // Numeric references, decimal and hex
            ("AT&#38;T", "AT&T"),
            ("AT&#x26;T", "AT&T"),
            ("&#x1F600;", "\u{1F600}"),
            // Unknown entities are preserved
            ("a &foo; b", "a &foo; b"),
            // A dangling ampersand is not an entity
            ("bread & butter", "bread & butter"),
            ("trailing &", "trailing &"),
            // Double-escaped content only unescapes one level
            ("The &amp;amp; entity", "The &amp; entity"),
        ];

        for (source, expected) in tests {
            assert_eq!(decode_entities(source), expected);
        }
    }

    #[test]
    fn test_strip_cdata() {
        assert_eq!(strip_cdata("<![CDATA[hello]]>"), Some("hello".to_string()));
        assert_eq!(strip_cdata("<![CDATA[<![CDATA[nested]]>]]>"), Some("nested".to_string()));
        assert_eq!(strip_cdata("<![CDATA[]]>"), Some(String::new()));
        assert_eq!(strip_cdata("plain text"), None);
        assert_eq!(strip_cdata("<![CDATA[unterminated"), None);
    }

    #[test]
    fn test_parse_name_address() {
        let tests = vec![
            ("example@site.com (Example Name)", (Some("Example Name"), Some("example@site.com"))),
            ("Example Name (example@site.com)", (Some("Example Name"), Some("example@site.com"))),
            ("Example Name", (Some("Example Name"), None)),
            ("example@site.com", (None, Some("example@site.com"))),
            ("", (None, None)),
        ];

        for (source, (name, email)) in tests {
            let (parsed_name, parsed_email) = parse_name_address(source);
            assert_eq!(parsed_name.as_deref(), name);
            assert_eq!(parsed_email.as_deref(), email);
        }
    }
}
