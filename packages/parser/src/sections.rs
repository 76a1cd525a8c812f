//! Top-level section scanner for single-file components.

use crate::error::{ParseError, ParseResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Template,
    Script,
    Style,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [SectionKind::Template, SectionKind::Script, SectionKind::Style];

    pub fn tag(self) -> &'static str {
        match self {
            SectionKind::Template => "template",
            SectionKind::Script => "script",
            SectionKind::Style => "style",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// `<script setup lang="ts">`
    pub open_tag: Range<usize>,
    /// Bytes between the open and close tags
    pub content: Range<usize>,
    pub outer: Range<usize>,
}

impl Section {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.content.clone()]
    }

    /// Value of an attribute on the section's open tag, e.g. `lang`
    pub fn attribute<'a>(&self, source: &'a str, name: &str) -> Option<&'a str> {
        let open = &source[self.open_tag.clone()];
        let at = open.find(&format!("{name}="))?;
        let rest = &open[at + name.len() + 1..];
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &rest[1..];
        value.find(quote).map(|end| &value[..end])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub template: Option<Section>,
    pub script: Option<Section>,
    pub style: Option<Section>,
}

impl Sections {
    pub fn get(&self, kind: SectionKind) -> Option<&Section> {
        match kind {
            SectionKind::Template => self.template.as_ref(),
            SectionKind::Script => self.script.as_ref(),
            SectionKind::Style => self.style.as_ref(),
        }
    }

    fn slot(&mut self, kind: SectionKind) -> &mut Option<Section> {
        match kind {
            SectionKind::Template => &mut self.template,
            SectionKind::Script => &mut self.script,
            SectionKind::Style => &mut self.style,
        }
    }
}

/// Locate the top-level `<template>`, `<script>` and `<style>` blocks.
/// The first block of each kind wins; later ones are skipped over.
pub fn split_sections(source: &str) -> ParseResult<Sections> {
    let mut sections = Sections::default();
    let lower = source.to_ascii_lowercase();
    let mut pos = 0;

    while let Some((kind, start)) = next_section_open(&lower, pos) {
        let open_end = find_tag_end(source, start).ok_or_else(|| {
            ParseError::invalid_section(start, format!("<{}> tag is never closed", kind.tag()))
        })?;

        let self_closing = source[..open_end].ends_with("/>");
        let (content, outer_end) = if self_closing {
            (open_end..open_end, open_end)
        } else {
            let close = find_section_close(&lower, kind, open_end).ok_or_else(|| {
                ParseError::invalid_section(start, format!("<{}> has no closing tag", kind.tag()))
            })?;
            let close_end = lower[close..]
                .find('>')
                .map_or(lower.len(), |i| close + i + 1);
            (open_end..close, close_end)
        };

        let slot = sections.slot(kind);
        if slot.is_none() {
            *slot = Some(Section {
                kind,
                open_tag: start..open_end,
                content,
                outer: start..outer_end,
            });
        }
        pos = outer_end;
    }

    Ok(sections)
}

fn next_section_open(lower: &str, from: usize) -> Option<(SectionKind, usize)> {
    let mut pos = from;
    loop {
        let rest = &lower[pos..];
        let lt = rest.find('<')?;
        let at = pos + lt;
        let tail = &lower[at..];

        if tail.starts_with("<!--") {
            pos = lower[at..].find("-->").map(|i| at + i + 3)?;
            continue;
        }
        for kind in SectionKind::ALL {
            if opens(tail, kind.tag()) {
                return Some((kind, at));
            }
        }
        pos = at + 1;
    }
}

/// `tail` starts with `<tag` followed by whitespace, `>` or `/`
fn opens(tail: &str, tag: &str) -> bool {
    tail.strip_prefix('<')
        .and_then(|rest| rest.strip_prefix(tag))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
}

/// End of the open tag starting at `start`, skipping quoted values
fn find_tag_end(source: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in source.as_bytes()[start..].iter().enumerate() {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(start + i + 1),
            _ => {}
        }
    }
    None
}

/// Start of the closing tag for the block opened before `from`. Templates
/// may nest `<template>` elements; scripts and styles end at the first close.
fn find_section_close(lower: &str, kind: SectionKind, from: usize) -> Option<usize> {
    let close = format!("</{}", kind.tag());
    if kind != SectionKind::Template {
        return lower[from..].find(&close).map(|i| from + i);
    }

    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let rest = &lower[pos..];
        let next_close = rest.find(&close)?;
        let next_open = rest
            .match_indices("<template")
            .map(|(i, _)| i)
            .find(|&i| opens(&rest[i..], "template"));

        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos += open + 1;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + next_close);
                }
                pos += next_close + close.len();
            }
        }
    }
}
