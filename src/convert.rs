//! Conversion entry points.
//!
//! All variants run the same synchronous pipeline: decode the envelope,
//! parse the Mobiledoc payload, render to an in-memory buffer, then write.
//! Rendering into a buffer before touching the output stream means a failed
//! conversion writes nothing — there is no partial-output mode anywhere in
//! this tool, so a consumer of the stream never sees half a document.

use crate::cards::CardRegistry;
use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::pipeline::{decode, parse, render};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Summary of one conversion, returned alongside the written output.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStats {
    /// Number of sections in the document.
    pub sections: usize,
    /// Number of card sections among them.
    pub cards: usize,
    /// Bytes written to the output stream.
    pub bytes_written: usize,
    /// Wall-clock conversion time.
    pub duration_ms: u64,
}

/// Convert one envelope from `reader`, writing Markdown to `writer`.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns [`ConvertError`] on malformed input JSON, an unsupported or
/// malformed Mobiledoc payload, a failing card handler, or a write failure.
/// Nothing is written to `writer` unless the whole render succeeded.
pub fn convert(
    reader: impl Read,
    writer: &mut impl Write,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    convert_with_cards(reader, writer, config, &CardRegistry::builtin())
}

/// Like [`convert`], with a caller-supplied card registry.
///
/// Use this to add handlers for card types beyond the built-in four, or to
/// replace a built-in handler.
pub fn convert_with_cards(
    reader: impl Read,
    writer: &mut impl Write,
    config: &ConversionConfig,
    registry: &CardRegistry,
) -> Result<ConversionStats, ConvertError> {
    let start = Instant::now();

    // ── Step 1: Decode the envelope ──────────────────────────────────────
    let envelope = decode::decode_envelope(reader)?;
    debug!(title = %envelope.title, "decoded envelope");

    // ── Step 2: Parse the Mobiledoc payload ──────────────────────────────
    let doc = parse::parse(&envelope.mobiledoc)?;
    debug!(sections = doc.sections.len(), "parsed mobiledoc document");

    // ── Step 3: Render to a buffer ───────────────────────────────────────
    let body = render::render(&doc, registry, config)?;

    let mut out = String::with_capacity(body.len() + envelope.title.len() + 8);
    if config.include_title && !envelope.title.is_empty() {
        out.push_str("# ");
        out.push_str(&envelope.title);
        out.push_str("\n\n");
    }

    // Blocks separate themselves with blank lines; the body ends with
    // exactly one newline. The title prefix stays untouched: a title-only
    // document is "# T\n\n", the same bytes the heading gets when a body
    // follows.
    let body = body.trim_end();
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }

    // ── Step 4: Write ────────────────────────────────────────────────────
    writer
        .write_all(out.as_bytes())
        .map_err(|source| ConvertError::Write { source })?;

    let stats = ConversionStats {
        sections: doc.sections.len(),
        cards: doc
            .sections
            .iter()
            .filter(|s| matches!(s, parse::Section::Card { .. }))
            .count(),
        bytes_written: out.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        sections = stats.sections,
        cards = stats.cards,
        bytes = stats.bytes_written,
        "conversion complete"
    );
    Ok(stats)
}

/// Convert an envelope held in a string, returning the Markdown.
pub fn convert_str(input: &str, config: &ConversionConfig) -> Result<String, ConvertError> {
    let mut buf = Vec::new();
    convert(input.as_bytes(), &mut buf, config)?;
    // The output is assembled from UTF-8 strings only, so the lossy
    // conversion never actually replaces anything.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Convert an envelope read from a file.
///
/// The file handle is scoped to this call and closed on return.
pub fn convert_file(
    path: impl AsRef<Path>,
    writer: &mut impl Write,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ConvertError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    convert(std::io::BufReader::new(file), writer, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(title: &str, sections: &str) -> String {
        let mobiledoc = format!(r#"{{"version": "0.3.1", "sections": {sections}}}"#);
        serde_json::json!({"title": title, "mobiledoc": mobiledoc}).to_string()
    }

    #[test]
    fn title_becomes_h1() {
        let input = envelope("My Post", r#"[[1, "p", [[0, [], 0, "Body"]]]]"#);
        let out = convert_str(&input, &ConversionConfig::default()).unwrap();
        assert_eq!(out, "# My Post\n\nBody\n");
    }

    #[test]
    fn empty_title_has_no_heading() {
        let input = envelope("", r#"[[1, "p", [[0, [], 0, "Body"]]]]"#);
        let out = convert_str(&input, &ConversionConfig::default()).unwrap();
        assert_eq!(out, "Body\n");
    }

    #[test]
    fn title_only_document_keeps_blank_line_after_heading() {
        // The heading must be the same bytes whether or not a body follows.
        let input = envelope("T", "[]");
        let out = convert_str(&input, &ConversionConfig::default()).unwrap();
        assert_eq!(out, "# T\n\n");
    }

    #[test]
    fn non_ascii_content_survives_the_byte_round_trip() {
        let input = envelope("Überschrift", r#"[[1, "p", [[0, [], 0, "naïve — café"]]]]"#);
        let out = convert_str(&input, &ConversionConfig::default()).unwrap();
        assert_eq!(out, "# Überschrift\n\nnaïve — café\n");
    }

    #[test]
    fn include_title_false_suppresses_heading() {
        let input = envelope("My Post", r#"[[1, "p", [[0, [], 0, "Body"]]]]"#);
        let config = ConversionConfig::builder().include_title(false).build();
        let out = convert_str(&input, &config).unwrap();
        assert_eq!(out, "Body\n");
    }

    #[test]
    fn empty_document_renders_empty() {
        let input = envelope("", "[]");
        let out = convert_str(&input, &ConversionConfig::default()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn nothing_written_on_decode_error() {
        let mut buf = Vec::new();
        let err = convert(b"{broken".as_slice(), &mut buf, &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
        assert!(buf.is_empty(), "output must stay untouched on failure");
    }

    #[test]
    fn nothing_written_on_card_error() {
        // An image card with no src fails mid-render; the buffer must stay empty.
        let mobiledoc =
            r#"{"version": "0.3.1", "cards": [["image", {}]], "sections": [[10, 0]]}"#;
        let input = serde_json::json!({"title": "T", "mobiledoc": mobiledoc}).to_string();
        let mut buf = Vec::new();
        let err = convert(input.as_bytes(), &mut buf, &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Card { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn conversion_is_deterministic() {
        let input = envelope(
            "T",
            r#"[[1, "h2", [[0, [], 0, "A"]]], [1, "p", [[0, [], 0, "B"]]]]"#,
        );
        let config = ConversionConfig::default();
        let a = convert_str(&input, &config).unwrap();
        let b = convert_str(&input, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stats_count_sections_and_cards() {
        let mobiledoc = r#"{"version": "0.3.1",
            "cards": [["markdown", {"markdown": "x"}]],
            "sections": [[1, "p", [[0, [], 0, "a"]]], [10, 0]]}"#;
        let input = serde_json::json!({"title": "", "mobiledoc": mobiledoc}).to_string();
        let mut buf = Vec::new();
        let stats = convert(input.as_bytes(), &mut buf, &ConversionConfig::default()).unwrap();
        assert_eq!(stats.sections, 2);
        assert_eq!(stats.cards, 1);
        assert_eq!(stats.bytes_written, buf.len());
    }

    #[test]
    fn convert_file_reads_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let input = envelope("From File", r#"[[1, "p", [[0, [], 0, "disk"]]]]"#);
        tmp.write_all(input.as_bytes()).unwrap();

        let mut buf = Vec::new();
        convert_file(tmp.path(), &mut buf, &ConversionConfig::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "# From File\n\ndisk\n");
    }

    #[test]
    fn convert_file_missing_is_input_error() {
        let mut buf = Vec::new();
        let err = convert_file(
            "/definitely/not/a/real/file.json",
            &mut buf,
            &ConversionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Input { .. }));
    }

    #[test]
    fn custom_card_registry() {
        let mobiledoc = r#"{"version": "0.3.1",
            "cards": [["hr", null]],
            "sections": [[10, 0]]}"#;
        let input = serde_json::json!({"title": "", "mobiledoc": mobiledoc}).to_string();
        let mut registry = CardRegistry::builtin();
        registry.register("hr", |_payload, _config| Ok("---\n".to_string()));
        let mut buf = Vec::new();
        convert_with_cards(
            input.as_bytes(),
            &mut buf,
            &ConversionConfig::default(),
            &registry,
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "---\n");
    }
}
