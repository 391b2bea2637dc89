//! Doc comment parsing.
//!
//! Turns a raw documentation comment into a [`DocBlock`]: a short description, a long
//! description and the ordered list of `@name content` tags that follow them. Input may be a
//! `/** ... */` block, `///` or `//!` line comments, or text that has already been stripped of
//! comment markers (as produced by joining `#[doc = "..."]` attributes).

use log::debug;

/// A single `@name content` annotation.
///
/// Continuation lines after the tag line belong to the tag and are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the leading `@`
    pub name: String,
    /// Everything after the name, trimmed
    pub content: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Case-insensitive name comparison
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub short_description: String,
    pub long_description: String,
    pub tags: Vec<Tag>,
}

impl DocBlock {
    /// Parses a raw documentation comment.
    ///
    /// The short description is the first paragraph and ends at a blank line or at the first
    /// line ending with a period. Everything between it and the first tag line is the long
    /// description. A comment that starts with a tag has an empty short description.
    pub fn parse(raw: &str) -> Self {
        let lines = clean_lines(raw);

        let first_tag = lines
            .iter()
            .position(|line| is_tag_line(line))
            .unwrap_or(lines.len());
        let (description, tag_lines) = lines.split_at(first_tag);

        let mut index = description
            .iter()
            .position(|line| !line.trim().is_empty())
            .unwrap_or(description.len());

        let mut short = Vec::new();
        while index < description.len() {
            let line = description[index].trim();
            if line.is_empty() {
                break;
            }
            short.push(line);
            index += 1;
            if line.ends_with('.') {
                break;
            }
        }

        let long_description = description[index..].join("\n").trim().to_string();
        let tags = parse_tags(tag_lines);

        debug!(
            "Parsed doc block: {} tag(s), short description {:?}",
            tags.len(),
            short.join(" ")
        );

        Self {
            short_description: short.join(" "),
            long_description,
            tags,
        }
    }

    /// First tag with the given (exact) name
    pub fn first_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.short_description.is_empty() && self.long_description.is_empty() && self.tags.is_empty()
    }
}

fn is_tag_line(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('@') && chars.next().map_or(false, |c| c.is_alphabetic())
}

fn parse_tags(lines: &[String]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();

    for line in lines {
        if is_tag_line(line) {
            let body = &line[1..];
            let (name, content) = match body.find(char::is_whitespace) {
                Some(split) => (&body[..split], body[split..].trim_start()),
                None => (body, ""),
            };
            tags.push(Tag::new(name, content));
        } else if let Some(current) = tags.last_mut() {
            current.content.push('\n');
            current.content.push_str(line);
        }
    }

    for tag in &mut tags {
        tag.content = tag.content.trim().to_string();
    }

    tags
}

/// Strips comment markers from every line. The leading `*` gutter is only removed for block
/// comments so that Markdown emphasis in `///` comments survives.
fn clean_lines(raw: &str) -> Vec<String> {
    let block = raw.trim_start().starts_with("/*");

    let mut lines: Vec<String> = raw
        .lines()
        .map(|line| {
            let mut line = line.trim();
            for prefix in ["/**", "/*!", "/*", "///", "//!", "//"] {
                if let Some(rest) = line.strip_prefix(prefix) {
                    line = rest;
                    break;
                }
            }
            if let Some(rest) = line.strip_suffix("*/") {
                line = rest;
            }
            if block {
                line = line.trim_start();
                line = line.strip_prefix('*').unwrap_or(line);
            }
            line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end().to_string()
        })
        .collect();

    while lines.first().map_or(false, |line| line.is_empty()) {
        lines.remove(0);
    }
    while lines.last().map_or(false, |line| line.is_empty()) {
        lines.pop();
    }

    lines
}
