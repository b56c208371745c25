//! Text helpers for the XML and HTML payloads the sources consume.
//!
//! These are deliberately small scanners: feeds are well-formed enough that locating
//! `<tag>…</tag>` pairs is sufficient, and nothing here needs a DOM.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Unescapes entities, strips tags and collapses whitespace.
pub fn clean_text(raw: &str) -> String {
    let unescaped = unescape(raw);
    let stripped = TAG.replace_all(&unescaped, " ");
    SPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Converts an HTML document into plain text (scripts and styles dropped).
pub fn html_to_text(html: &str) -> String {
    let without_code = SCRIPT.replace_all(html, " ");
    let stripped = TAG.replace_all(&without_code, " ");
    let text = unescape(&stripped);
    SPACE.replace_all(&text, " ").trim().to_string()
}

/// Replaces named and numeric character references.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        _ => return None,
    })
}

/// First `max` characters of `s`, with `…` appended when something was cut.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// First `max` characters of `s`.
pub fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Every `<tag …>…</tag>` block in document order (inner content only).
pub fn blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let doc = Doc::new(xml);
    let tag = tag.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut from = 0;
    while let Some((inner, next)) = doc.next_element(from, &tag) {
        out.push(inner);
        from = next;
    }
    out
}

/// Inner text of the first `<tag>` element, CDATA unwrapped.
pub fn element<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    Doc::new(xml)
        .next_element(0, &tag.to_ascii_lowercase())
        .map(|(inner, _)| unwrap_cdata(inner.trim()))
}

/// Value of `attr` on the first `<tag …>` opening tag.
pub fn attribute<'a>(xml: &'a str, tag: &str, attr: &str) -> Option<&'a str> {
    let (start, open_end) = Doc::new(xml).find_open(0, &tag.to_ascii_lowercase())?;
    let open = &xml[start..open_end];
    for quote in ['"', '\''] {
        let needle = format!("{attr}={quote}");
        if let Some(pos) = open.find(&needle) {
            let value_start = pos + needle.len();
            let len = open[value_start..].find(quote)?;
            return Some(&open[value_start..value_start + len]);
        }
    }
    None
}

fn unwrap_cdata(s: &str) -> &str {
    s.strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(s)
}

/// A document and its ASCII-lowercased copy. Byte offsets are valid in both.
struct Doc<'a> {
    raw: &'a str,
    lower: String,
}

impl<'a> Doc<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_ascii_lowercase(),
        }
    }

    /// Next opening `<tag` at or after `from` (exact name). Returns (start, end of open tag).
    fn find_open(&self, mut from: usize, tag: &str) -> Option<(usize, usize)> {
        let needle = format!("<{tag}");
        while let Some(pos) = self.lower[from..].find(&needle) {
            let start = from + pos;
            let after = start + needle.len();
            match self.lower.as_bytes().get(after) {
                Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/') => {
                    let end = self.lower[after..].find('>')? + after + 1;
                    return Some((start, end));
                }
                _ => from = after,
            }
        }
        None
    }

    /// Inner content of the next `<tag>` element and the offset just past it.
    fn next_element(&self, from: usize, tag: &str) -> Option<(&'a str, usize)> {
        let (start, open_end) = self.find_open(from, tag)?;
        if self.lower[start..open_end].ends_with("/>") {
            return Some(("", open_end));
        }
        let close = format!("</{tag}>");
        let close_pos = self.lower[open_end..].find(&close)? + open_end;
        Some((&self.raw[open_end..close_pos], close_pos + close.len()))
    }
}
