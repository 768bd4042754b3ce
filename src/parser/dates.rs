use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

// Initialise the set of regular expressions we use to clean up broken dates

// Feeds may not comply with the specification in various ways (https://tools.ietf.org/html/rfc2822#page-14)
static RFC2822_FIXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // RFC 2822 mandates a +/- 4 digit offset, or UT/GMT (obsolete) but feeds have "UTC" or "-0000"
        (Regex::new("(UTC|-0000$)").unwrap(), "+0000"),
        // The short weekday can be wrong e.g. "Wed, 25 Aug 2012" was actually a Saturday,
        // or it can be something other than a short weekday name e.g. "Thurs, 13 Jul 2011 07:38:00 GMT".
        // As its extraneous, we just remove it
        (Regex::new("(Sun|Mon|Tue|Wed|Thu|Fri|Sat)[a-z]*, ").unwrap(), ""),
        // Long month names are not allowed, so replace them with short
        (Regex::new("(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*").unwrap(), "$1"),
        // Some timestamps have an hours component adjusted by 24h, while not adjusting the day so we just reset to start of day
        (Regex::new(" 24:").unwrap(), " 00:"),
        // Single digit hours are padded
        (Regex::new(" ([0-9]):").unwrap(), " 0${1}:"),
    ]
});

// Feeds may not comply with the specification (https://tools.ietf.org/html/rfc3339)
static RFC3339_FIXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // inserts missing colon in timezone
        (Regex::new(r"(\+|-)(\d{2})(\d{2})$").unwrap(), "${1}${2}:${3}"),
    ]
});

// A leading weekday carries no information (and is frequently wrong) so the
// ad-hoc formats drop it before matching
static LEADING_WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:sun|mon|tue|wed|thu|fri|sat)[a-z]*\s*,?\s+").unwrap());

// A trailing zone abbreviation e.g. "... 15:04:05 PST"
static TRAILING_ZONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\(?([A-Za-z]{1,5})\)?$").unwrap());

// A zone abbreviation sitting before a numeric offset e.g. "... MST -0700" or "... GMT-0700"
static ZONE_BEFORE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([A-Za-z]{2,5})\s*([+-]\d{2}:?\d{2})$").unwrap());

// A zone abbreviation sitting before the year e.g. the Unix date form "... 15:04:05 MST 2006"
static ZONE_BEFORE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([A-Za-z]{2,5})\s+(\d{4})$").unwrap());

// Dotted meridiems ("p.m.") are normalised to the parseable form
static DOTTED_MERIDIEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b([ap])\.m\.").unwrap());

// Formats with an explicit numeric offset, tried in order.
// Ordering matters: more specific and more commonly used forms appear first to
// minimise false positives, mirroring the classic ordered table that feed
// parsers have converged on.
const OFFSET_FORMATS: &[&str] = &[
    // RSS flavours of RFC 822 / RFC 1123 (weekday already stripped)
    "%d %b %Y %H:%M:%S %z",
    "%d %B %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S%z",
    "%d %b %Y %I:%M:%S %p %z",
    "%d %b %Y %H:%M %z",
    "%d %b %y %H:%M:%S %z",
    "%d %b %y %H:%M %z",
    "%d-%b-%y %H:%M:%S %z",
    // Ruby date form "Jan 02 15:04:05 -0700 2006"
    "%b %d %H:%M:%S %z %Y",
    // Atom-ish timestamps that failed the strict RFC 3339 pass
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S %z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    // Miscellaneous European forms
    "%d.%m.%Y %z",
    "%d/%m/%Y %H:%M %z",
    "%H:%M %d.%m.%Y %z",
];

// Formats with a date and a time but no zone; the result is taken as UTC
const DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %b %y %H:%M:%S",
    "%d %b %y %H:%M",
    "%d-%b-%y %H:%M:%S",
    // Unix / ANSI C forms (weekday stripped, zone normalised away)
    "%b %d %H:%M:%S %Y",
    "%b %d %H:%M %Y",
    // Long and short month-first forms
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y, %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %I:%M %p",
    "%b %d %Y %I:%M:%S%p",
    // ISO-ish forms, with and without the T separator (unpadded components
    // are accepted by the same patterns)
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%d %H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d at %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%y/%m/%d %H:%M",
    "%y-%m-%d %H:%M",
    // Day-first European forms
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y - %H:%M",
    // Month-first US forms
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y - %H:%M",
];

// Date-only forms, taken as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y %B %d",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

/// Parses a date/time string in any of the formats feeds use in the wild
///
/// The string is trimmed then matched against, in order: lenient RFC 3339
/// (Atom, JSON Feed), lenient RFC 2822 (RSS), and finally the ordered table of
/// ad-hoc formats. The first match wins and the result is normalised to UTC.
pub(crate) fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(parsed) = timestamp_rfc3339_lenient(text) {
        return Some(parsed);
    }

    if let Some(parsed) = timestamp_rfc2822_lenient(text) {
        return Some(parsed);
    }

    timestamp_from_table(text)
}

/// Parses a timestamp that should be RFC 3339 (Atom, JSON Feed) with fixes for
/// feeds that do not comply
pub(crate) fn timestamp_rfc3339_lenient(text: &str) -> Option<DateTime<Utc>> {
    // Clean the input string by applying each of the regex fixes
    let mut text = text.trim().to_string();
    for (regex, replacement) in RFC3339_FIXES.iter() {
        text = regex.replace(&text, *replacement).to_string();
    }

    DateTime::parse_from_rfc3339(text.trim()).map(|t| t.with_timezone(&Utc)).ok()
}

/// Parses a timestamp that should be RFC 2822 (RSS) with workarounds for the
/// generally broken stuff found on the internet
pub(crate) fn timestamp_rfc2822_lenient(text: &str) -> Option<DateTime<Utc>> {
    // Clean the input string by applying each of the regex fixes
    let mut text = text.trim().to_string();
    for (regex, replacement) in RFC2822_FIXES.iter() {
        text = regex.replace(&text, *replacement).to_string();
    }

    DateTime::parse_from_rfc2822(&text).map(|t| t.with_timezone(&Utc)).ok()
}

// Matches against the ordered ad-hoc format table
fn timestamp_from_table(text: &str) -> Option<DateTime<Utc>> {
    let normalised = normalise(text);
    let text = normalised.as_str();

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
    }

    None
}

// Normalises a date string for the ad-hoc table: drops the weekday, rewrites
// dotted meridiems and converts named zones to numeric offsets
fn normalise(text: &str) -> String {
    let mut text = LEADING_WEEKDAY.replace(text, "").to_string();
    text = DOTTED_MERIDIEM.replace_all(&text, "${1}m").to_string();

    // "15:04:05 MST -0700" and "15:04:05 GMT-0700" keep the numeric offset
    let edit = ZONE_BEFORE_OFFSET
        .captures(&text)
        .and_then(|groups| groups.get(0).map(|whole| (whole.range(), format!(" {}", &groups[2]))));
    if let Some((range, replacement)) = edit {
        text.replace_range(range, &replacement);
        return text;
    }

    // "15:04:05 MST 2006" (the Unix date form) becomes "15:04:05 -0700 2006"
    let edit = ZONE_BEFORE_YEAR.captures(&text).and_then(|groups| {
        let offset = zone_offset(&groups[1])?;
        groups.get(0).map(|whole| (whole.range(), format!(" {} {}", offset, &groups[2])))
    });
    if let Some((range, replacement)) = edit {
        text.replace_range(range, &replacement);
        return text;
    }

    // "15:04:05 PST" becomes "15:04:05 -0800"
    let edit = TRAILING_ZONE.captures(&text).and_then(|groups| {
        let token = &groups[1];

        // Meridiems are part of the time, not a zone
        if token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm") {
            return None;
        }

        let offset = match zone_offset(token) {
            Some(offset) => offset,
            // An unrecognised all-caps token is somebody's local zone name;
            // without a registry the only consistent reading is UTC
            None if token.chars().all(|c| c.is_ascii_uppercase()) => "+0000".to_string(),
            // A mixed-case trailing word is not zone-like, leave it alone
            None => return None,
        };

        groups.get(0).map(|whole| (whole.range(), format!(" {}", offset)))
    });
    if let Some((range, replacement)) = edit {
        text.replace_range(range, &replacement);
    }

    text
}

// Numeric offsets for the zone abbreviations that actually show up in feeds
fn zone_offset(zone: &str) -> Option<String> {
    let offset = match zone.to_ascii_uppercase().as_str() {
        "Z" | "UT" | "UTC" | "GMT" => "+0000",
        "EST" => "-0500",
        "EDT" => "-0400",
        "CST" => "-0600",
        "CDT" => "-0500",
        "MST" => "-0700",
        "MDT" => "-0600",
        "PST" => "-0800",
        "PDT" => "-0700",
        "AKST" => "-0900",
        "AKDT" => "-0800",
        "HST" => "-1000",
        "BST" => "+0100",
        "CET" => "+0100",
        "CEST" => "+0200",
        "EET" => "+0200",
        "EEST" => "+0300",
        "IST" => "+0530",
        "JST" => "+0900",
        "KST" => "+0900",
        "AEST" => "+1000",
        "AEDT" => "+1100",
        "NZST" => "+1200",
        "NZDT" => "+1300",
        _ => return None,
    };
    Some(offset.to_string())
}
