//! Inline style codec: `style="a: b; c: d"` and JSX `style={{ a: 'b' }}`.

use crate::tree::StyleMap;

/// Split a CSS declaration list. Semicolons inside quotes or parentheses
/// (`url(data:…;base64,…)`) don't end a declaration.
pub fn parse_declarations(css: &str) -> StyleMap {
    let mut style = StyleMap::new();
    for declaration in split_top_level(css, ';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        style.insert(property, value.to_string());
    }
    style
}

pub fn format_declarations(style: &StyleMap) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse the expression of a JSX `style={…}` attribute. Only object literals
/// whose values are string or number literals are understood.
pub fn parse_style_object(expression: &str) -> Option<StyleMap> {
    let body = expression
        .trim()
        .strip_prefix('{')?
        .strip_suffix('}')?;

    let mut style = StyleMap::new();
    for entry in split_top_level(body, ',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry.split_once(':')?;
        let key = unquote(key.trim()).unwrap_or(key.trim());
        if !key.starts_with("--") && !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return None;
        }
        let property = camel_to_kebab(key);
        let value = value.trim();

        let value = match unquote(value) {
            Some(text) => text.to_string(),
            None if value.parse::<f64>().is_ok() => number_value(&property, value),
            None => return None,
        };
        style.insert(property, value);
    }
    Some(style)
}

/// `{{ fontSize: "16px" }}` with keys camelCased
pub fn format_style_object(style: &StyleMap, quote: char) -> String {
    if style.is_empty() {
        return "{{}}".to_string();
    }
    let entries = style
        .iter()
        .map(|(property, value)| {
            let key = if property.starts_with("--") {
                quoted(property, quote)
            } else {
                kebab_to_camel(property)
            };
            format!("{key}: {}", quoted(value, quote))
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{{ {entries} }}}}")
}

pub fn camel_to_kebab(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    // `WebkitTransition` → `-webkit-transition`
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn kebab_to_camel(name: &str) -> String {
    let name = name.strip_prefix("-ms-").map_or(name.to_string(), |rest| format!("ms-{rest}"));
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

const UNITLESS: &[&str] = &[
    "opacity",
    "z-index",
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "order",
    "zoom",
];

/// React appends `px` to bare numbers except for unitless properties
fn number_value(property: &str, number: &str) -> String {
    if number == "0" || UNITLESS.contains(&property) {
        number.to_string()
    } else {
        format!("{number}px")
    }
}

fn unquote(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if !matches!(first, '"' | '\'' | '`') || text.len() < 2 || !text.ends_with(first) {
        return None;
    }
    Some(&text[1..text.len() - 1])
}

fn quoted(text: &str, quote: char) -> String {
    let quote = if text.contains(quote) {
        if quote == '"' { '\'' } else { '"' }
    } else {
        quote
    };
    format!("{quote}{text}{quote}")
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'' | '`') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
