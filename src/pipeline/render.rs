//! Markdown rendering: typed document model → Markdown text.
//!
//! ## Inline markers
//!
//! Mobiledoc separates text runs from formatting: each marker lists the
//! markups it opens and how many currently-open markups close after it.
//! The renderer keeps a stack of open markup indexes; opening emits the
//! Markdown opening delimiter, closing pops the stack and emits the
//! matching closing delimiter. Links need the stack because the closing
//! `](href)` can only be written once the `a` markup actually closes,
//! possibly several markers later.
//!
//! Marker text is inserted without Markdown escaping — the same explicit
//! policy as the card handlers (see [`crate::cards::figure`]).

use crate::cards::{render_image, CardRegistry};
use crate::config::{ConversionConfig, UnknownCardPolicy};
use crate::error::{CardError, ConvertError};
use crate::pipeline::parse::{Document, ListTag, Marker, MarkerValue, Markup, Section};
use tracing::{debug, warn};

/// Render a parsed document to a Markdown string.
///
/// Blocks (paragraphs, headings, lists, images, card fragments) are
/// separated by blank lines. Card handler output is inserted verbatim;
/// the only addition is the separating newlines around it.
pub fn render(
    doc: &Document,
    registry: &CardRegistry,
    config: &ConversionConfig,
) -> Result<String, ConvertError> {
    let mut out = String::new();

    for section in &doc.sections {
        match section {
            Section::Markup { tag, markers } => {
                let text = render_markers(doc, markers);
                push_block(&mut out, &render_block(tag, &text));
            }
            Section::Image { src } => {
                push_block(&mut out, &render_image(src, "", config.use_figure));
            }
            Section::List { tag, items } => {
                push_block(&mut out, &render_list(doc, *tag, items));
            }
            Section::Card { index } => {
                let card = &doc.cards[*index];
                debug!(card = %card.name, "rendering card");
                match registry.render(&card.name, &card.payload, config) {
                    Ok(fragment) => push_block(&mut out, &fragment),
                    Err(CardError::UnknownType { name })
                        if config.unknown_cards == UnknownCardPolicy::Skip =>
                    {
                        warn!(card = %name, "skipping card with no registered handler");
                    }
                    Err(source) => {
                        return Err(ConvertError::Card {
                            name: card.name.clone(),
                            source,
                        })
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Append a block to the output, ensuring a blank line after it.
/// Empty blocks (e.g. an empty paragraph) are dropped.
fn push_block(out: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

/// Wrap rendered run text in its block-level Markdown form.
fn render_block(tag: &str, text: &str) -> String {
    match tag {
        "h1" => format!("# {text}"),
        "h2" => format!("## {text}"),
        "h3" => format!("### {text}"),
        "h4" => format!("#### {text}"),
        "h5" => format!("##### {text}"),
        "h6" => format!("###### {text}"),
        // Pull-quotes and asides have no Markdown equivalent; a quote block
        // is the closest reading.
        "blockquote" | "aside" | "pull-quote" => prefix_lines(text, "> "),
        _ => text.to_string(),
    }
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_list(doc: &Document, tag: ListTag, items: &[Vec<Marker>]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match tag {
            ListTag::Unordered => out.push_str("- "),
            ListTag::Ordered => out.push_str(&format!("{}. ", i + 1)),
        }
        out.push_str(&render_markers(doc, item));
    }
    out
}

/// Resolve one marker run into inline Markdown.
fn render_markers(doc: &Document, markers: &[Marker]) -> String {
    let mut out = String::new();
    // Indexes into doc.markups, innermost last.
    let mut open: Vec<usize> = Vec::new();

    for marker in markers {
        for &idx in &marker.open_markups {
            out.push_str(&opening_delimiter(&doc.markups[idx]));
            open.push(idx);
        }

        match &marker.value {
            MarkerValue::Text(text) => out.push_str(text),
            MarkerValue::Atom(idx) => out.push_str(&render_atom(doc, *idx)),
        }

        for _ in 0..marker.close_count {
            // A well-formed document never closes more than it opened; a
            // hand-edited one might, so surplus closes are ignored.
            if let Some(idx) = open.pop() {
                out.push_str(&closing_delimiter(&doc.markups[idx]));
            }
        }
    }

    // Markups left open at the end of the run close implicitly.
    while let Some(idx) = open.pop() {
        out.push_str(&closing_delimiter(&doc.markups[idx]));
    }

    out
}

fn render_atom(doc: &Document, index: usize) -> String {
    let atom = &doc.atoms[index];
    match atom.name.as_str() {
        "soft-return" => "\n".to_string(),
        // Unknown atoms render as their text fallback, which the producer
        // supplies for exactly this situation.
        _ => atom.text.clone(),
    }
}

fn opening_delimiter(markup: &Markup) -> String {
    match markup.tag.as_str() {
        "b" | "strong" => "**".to_string(),
        "i" | "em" => "*".to_string(),
        "code" => "`".to_string(),
        "s" => "~~".to_string(),
        "a" => "[".to_string(),
        "u" => "<u>".to_string(),
        "sub" => "<sub>".to_string(),
        "sup" => "<sup>".to_string(),
        // Formatting with no Markdown mapping is dropped; the text survives.
        _ => String::new(),
    }
}

fn closing_delimiter(markup: &Markup) -> String {
    match markup.tag.as_str() {
        "b" | "strong" => "**".to_string(),
        "i" | "em" => "*".to_string(),
        "code" => "`".to_string(),
        "s" => "~~".to_string(),
        "a" => format!("]({})", markup.attribute("href").unwrap_or("")),
        "u" => "</u>".to_string(),
        "sub" => "</sub>".to_string(),
        "sup" => "</sup>".to_string(),
        _ => String::new(),
    }
}
