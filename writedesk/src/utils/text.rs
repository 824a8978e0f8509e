//! Text normalization and escaping helpers.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));
static KEYWORD_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"( ?[\r\n\t,])+ ?").expect("valid regex"));
static KEYWORD_DISPLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\S)").expect("valid regex"));
static TAGS_ENTITIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&\S+?;|<[^>]*>").expect("valid regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-/\\]").expect("valid regex"));
static DASH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-/\\]+").expect("valid regex"));
static NOT_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-_]").expect("valid regex"));

/// Normalizes a keyword list for storage.
///
/// Runs of spaces collapse to one, any run of whitespace or comma
/// separators becomes a single comma, and leading/trailing commas and
/// spaces are trimmed.
#[must_use]
pub fn normalize_keywords(raw: &str) -> String {
    let collapsed = SPACE_RUN.replace_all(raw, " ");
    let joined = KEYWORD_SEP.replace_all(&collapsed, ",");
    joined.trim_matches(|c| c == ',' || c == ' ').to_string()
}

/// Formats stored keywords for display, with a space after each comma.
#[must_use]
pub fn display_keywords(stored: &str) -> String {
    KEYWORD_DISPLAY
        .replace_all(stored, ", $1")
        .into_owned()
}

fn fold_char(c: char) -> Option<&'static str> {
    Some(match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' | 'Ā' | 'Ą' | 'Ă' => "A",
        'Ä' | 'Æ' => "Ae",
        'Ç' | 'Ć' | 'Č' | 'Ĉ' | 'Ċ' => "C",
        'Ď' | 'Đ' | 'Ð' => "D",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' | 'Ĕ' | 'Ė' => "E",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Ĩ' | 'Ĭ' | 'Į' | 'İ' => "I",
        'Ł' | 'Ľ' | 'Ĺ' | 'Ļ' => "L",
        'Ñ' | 'Ń' | 'Ň' | 'Ņ' => "N",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' | 'Ō' | 'Ő' => "O",
        'Ö' => "Oe",
        'Œ' => "OE",
        'Ŕ' | 'Ř' | 'Ŗ' => "R",
        'Ś' | 'Š' | 'Ş' | 'Ŝ' | 'Ș' => "S",
        'Ť' | 'Ţ' | 'Ț' => "T",
        'Ù' | 'Ú' | 'Û' | 'Ū' | 'Ů' | 'Ű' | 'Ŭ' | 'Ũ' | 'Ų' => "U",
        'Ü' => "Ue",
        'Ý' | 'Ŷ' | 'Ÿ' => "Y",
        'Ź' | 'Ž' | 'Ż' => "Z",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ą' | 'ă' => "a",
        'ä' | 'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'ĕ' | 'ė' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ĩ' | 'ĭ' | 'į' | 'ı' => "i",
        'ł' | 'ľ' | 'ĺ' | 'ļ' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
        'ö' => "oe",
        'œ' => "oe",
        'ŕ' | 'ř' | 'ŗ' => "r",
        'ś' | 'š' | 'ş' | 'ŝ' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' | 'ŭ' | 'ũ' | 'ų' => "u",
        'ü' => "ue",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ž' | 'ż' => "z",
        'Þ' => "T",
        'þ' => "t",
        _ => return None,
    })
}

/// Transliterates common accented Latin letters to ASCII.
#[must_use]
pub fn fold_accents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
#[must_use]
pub fn rawurlencode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Reduces text to a URL-safe slug.
///
/// Falls back to percent-encoding the input when nothing usable remains.
#[must_use]
pub fn sanitize_for_url(text: &str) -> String {
    let folded = fold_accents(text);
    let stripped = TAGS_ENTITIES.replace_all(&folded, "");
    let dashed_high: String = stripped
        .chars()
        .map(|c| if c.is_ascii() { c } else { '-' })
        .collect();
    let words = NON_WORD.replace_all(&dashed_high, "");
    let dashed = DASH_RUN.replace_all(words.trim(), "-");
    let slug = NOT_SLUG.replace_all(&dashed, "");

    if slug.is_empty() || slug == "-" {
        rawurlencode(text)
    } else {
        slug.into_owned()
    }
}

/// Derives a URL title from an already-sanitized slug.
///
/// Dashes are trimmed; the slug is lower-cased when `lowercase_dashed`,
/// otherwise its dashes are removed.
#[must_use]
pub fn strip_space(sanitized: &str, lowercase_dashed: bool) -> String {
    let trimmed = sanitized.trim_matches('-');
    if lowercase_dashed {
        trimmed.to_lowercase()
    } else {
        trimmed.replace('-', "")
    }
}

/// Escapes a string for embedding in a JavaScript string literal.
#[must_use]
pub fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes HTML syntax characters, quotes included.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
