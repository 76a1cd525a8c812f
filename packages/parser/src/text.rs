//! Character references, escaping and whitespace normalization for text runs.

/// Decode the character references markup authors actually write.
/// Unknown references are left untouched.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escape text content for HTML output
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text content for JSX output; braces would otherwise open expressions
pub fn escape_jsx_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for output inside `quote`
pub fn escape_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML text: collapse ASCII whitespace runs into one space and trim.
/// Whitespace-only runs produce `None`.
pub fn normalize_html_text(raw: &str) -> Option<String> {
    collapse_whitespace(&decode_entities(raw))
}

/// Whitespace part of [`normalize_html_text`], for text that is already decoded
pub fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Class list separated by single spaces. An empty list stays empty.
pub fn normalize_class(value: &str) -> String {
    value.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// JSX text follows the JSX whitespace rule: lines are trimmed where they
/// touch a line break, blank lines vanish and the rest are joined by a space.
pub fn normalize_jsx_text(raw: &str) -> Option<String> {
    jsx_whitespace(raw).map(|text| decode_entities(&text))
}

/// Whitespace part of [`normalize_jsx_text`], for text that is already decoded
pub fn jsx_whitespace(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    let mut parts = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let mut trimmed = line.trim_end_matches('\r');
        if i != 0 {
            trimmed = trimmed.trim_start_matches([' ', '\t']);
        }
        if i != last {
            trimmed = trimmed.trim_end_matches([' ', '\t']);
        }
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    let joined = parts.join(" ");
    (!joined.trim().is_empty()).then_some(joined)
}

/// Byte range of `raw` once leading and trailing ASCII whitespace is removed
pub fn trimmed_range(raw: &str) -> std::ops::Range<usize> {
    let start = raw.len() - raw.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    let end = raw.trim_end_matches(|c: char| c.is_ascii_whitespace()).len();
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_escape_roundtrip() {
        let text = "1 < 2 & 3 > 2";
        assert_eq!(decode_entities(&escape_text(text)), text);

        let value = r#"say "hi""#;
        assert_eq!(decode_entities(&escape_attribute(value, '"')), value);
        assert!(!escape_attribute(value, '"').contains('"'));
    }

    #[test]
    fn test_normalize_html_text() {
        assert_eq!(normalize_html_text("\n   Hello\n   World  ").as_deref(), Some("Hello World"));
        assert_eq!(normalize_html_text(" \n\t "), None);
        assert_eq!(normalize_html_text("a&nbsp;b").as_deref(), Some("a\u{a0}b"));
    }

    #[test]
    fn test_normalize_jsx_text() {
        assert_eq!(normalize_jsx_text("Hello ").as_deref(), Some("Hello "));
        assert_eq!(normalize_jsx_text("\n    Hello\n    world\n  ").as_deref(), Some("Hello world"));
        assert_eq!(normalize_jsx_text("\n   \n  "), None);
    }

    #[test]
    fn test_trimmed_range() {
        let raw = "\n  Hi there \n";
        assert_eq!(&raw[trimmed_range(raw)], "Hi there");
        assert_eq!(trimmed_range("   "), 3..3);
    }
}
