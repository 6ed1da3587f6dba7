//! Paragraph segmenter: splits raw markup into per-paragraph sources.
//!
//! Paragraphs end at newlines and `<br>` tags. Heading tags get block
//! treatment: `<hN>` starts a new paragraph, and `</hN>` ends one and
//! swallows the newline that usually follows it in the source, so a
//! heading does not leave an empty line behind.

use crate::style::HEADING_LEVELS;

/// Returns the heading level named by a lowercase tag name, if any.
pub(crate) fn heading_level(name: &str) -> Option<u8> {
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=HEADING_LEVELS).contains(&level).then_some(level)
}

/// Finds the `>` that closes a tag whose `<` sits at `chars[open]`.
///
/// Returns `None` when the tag is unterminated or when the `<` is followed
/// by whitespace (a literal less-than sign).
fn tag_end(chars: &[char], open: usize) -> Option<usize> {
    match chars.get(open + 1) {
        None => return None,
        Some(c) if c.is_whitespace() => return None,
        _ => {}
    }
    let mut quoted = false;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if quoted => i += 1,
            '"' => quoted = !quoted,
            '>' if !quoted => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits `markup` into paragraph source strings.
///
/// Tags other than `<br>` and headings are copied through untouched. A
/// backslash before whitespace joins lines: the backslash and the whole
/// whitespace run are removed. A final newline does not start an empty
/// paragraph, and empty markup yields one empty paragraph.
pub fn segment(markup: &str) -> Vec<String> {
    let chars: Vec<char> = markup.chars().collect();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\r' => i += 1,
            '\n' => {
                paragraphs.push(std::mem::take(&mut current));
                i += 1;
            }
            '\\' if chars.get(i + 1).is_some_and(|n| n.is_whitespace()) => {
                i += 1;
                while chars.get(i).is_some_and(|n| n.is_whitespace()) {
                    i += 1;
                }
            }
            '<' => {
                let Some(end) = tag_end(&chars, i) else {
                    current.push(c);
                    i += 1;
                    continue;
                };
                let tag: String = chars[i..=end].iter().collect();
                let name = tag[1..tag.len() - 1]
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                i = end + 1;

                if name == "br" || name == "br/" {
                    paragraphs.push(std::mem::take(&mut current));
                } else if heading_level(&name).is_some() {
                    if !current.is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.push_str(&tag);
                } else if name.strip_prefix('/').and_then(heading_level).is_some() {
                    current.push_str(&tag);
                    paragraphs.push(std::mem::take(&mut current));
                    if chars.get(i) == Some(&'\r') {
                        i += 1;
                    }
                    if chars.get(i) == Some(&'\n') {
                        i += 1;
                    }
                } else {
                    current.push_str(&tag);
                }
            }
            _ => {
                current.push(c);
                i += 1;
            }
        }
    }

    if !current.is_empty() || paragraphs.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
