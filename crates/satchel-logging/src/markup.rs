//! Inline message markup
//!
//! A message may wrap text in `<name>...</name>`. On a colorizing console the
//! text is styled; everywhere else the tags are dropped and the text kept.
//! Pairs do not nest: the text between them is taken as written. A `<` that
//! does not open a complete pair is ordinary text.
//!
//! Names are resolved in order: `bold`, `dimmed`, `italic`, `underline`,
//! then the configured [`Palette`], then `colored`'s color names with `_`
//! for spaces (`red`, `bright_blue`). Unknown names are dropped without
//! styling.

use colored::{Color, ColoredString, Colorize};
use satchel_core::Palette;
use std::borrow::Cow;

#[derive(Debug, PartialEq, Eq)]
enum Span<'a> {
    Text(&'a str),
    Styled { style: &'a str, text: &'a str },
}

fn spans(message: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = message[cursor..].find('<') {
        let open = cursor + offset;
        match pair_at(message, open) {
            Some((style, text, end)) => {
                if text_start < open {
                    spans.push(Span::Text(&message[text_start..open]));
                }
                spans.push(Span::Styled { style, text });
                text_start = end;
                cursor = end;
            }
            None => cursor = open + 1,
        }
    }

    if text_start < message.len() {
        spans.push(Span::Text(&message[text_start..]));
    }
    spans
}

/// Match `<name>text</name>` at byte `open`, returning name, text, and the
/// offset just past the closing tag
fn pair_at(message: &str, open: usize) -> Option<(&str, &str, usize)> {
    let after = &message[open + 1..];
    let name_len = after.find('>')?;
    let name = &after[..name_len];
    let valid_name = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid_name {
        return None;
    }

    let text_start = open + 1 + name_len + 1;
    let closing = format!("</{name}>");
    let text_len = message[text_start..].find(&closing)?;
    let text_end = text_start + text_len;
    Some((name, &message[text_start..text_end], text_end + closing.len()))
}

/// Remove markup tags, keeping the text they wrap
pub(crate) fn strip(message: &str) -> Cow<'_, str> {
    if !message.contains('<') {
        return Cow::Borrowed(message);
    }

    let spans = spans(message);
    if let [Span::Text(text)] = spans.as_slice() {
        return Cow::Borrowed(*text);
    }
    Cow::Owned(
        spans
            .iter()
            .map(|span| match span {
                Span::Text(text) | Span::Styled { text, .. } => *text,
            })
            .collect(),
    )
}

/// Replace markup tags with ANSI styling
pub(crate) fn render(message: &str, palette: &Palette) -> String {
    if !message.contains('<') {
        return message.to_string();
    }

    let mut out = String::with_capacity(message.len());
    for span in spans(message) {
        match span {
            Span::Text(text) => out.push_str(text),
            Span::Styled { style, text } => match styled(style, text, palette) {
                Some(styled) => out.push_str(&styled.to_string()),
                None => out.push_str(text),
            },
        }
    }
    out
}

fn styled(style: &str, text: &str, palette: &Palette) -> Option<ColoredString> {
    let styled = match style {
        "bold" => text.bold(),
        "dim" | "dimmed" => text.dimmed(),
        "italic" => text.italic(),
        "underline" => text.underline(),
        _ => match palette.get(style) {
            Some(rgb) => text.truecolor(rgb.r, rgb.g, rgb.b),
            None => text.color(style.replace('_', " ").parse::<Color>().ok()?),
        },
    };
    Some(styled)
}
