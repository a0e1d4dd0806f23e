//! HTML `<figure>` fragment rendering for figure mode.
//!
//! ## Why explicit escaping?
//!
//! The fragment is raw HTML embedded in Markdown output, so `src` and
//! `caption` land inside an attribute value and an element body. Both are
//! escaped with the conservative five-character set (`& < > " '`), matching
//! what a contextual auto-escaping template engine would produce. The
//! Markdown `![caption](src)` branch in [`crate::cards`] deliberately does
//! *not* escape — that asymmetry is the documented policy, not an accident:
//! only the HTML branch can silently change document structure when a value
//! contains markup.

/// Render one image as an HTML `<figure>` fragment.
///
/// The `<figcaption>` line is omitted entirely when `caption` is empty.
/// The fragment is surrounded by newlines so it stays a block of its own
/// inside the Markdown output:
///
/// ```text
/// <figure>
///   <img src="SRC">
///   <figcaption>CAPTION</figcaption>
/// </figure>
/// ```
///
/// Plain string building cannot fail, so unlike the card handlers this
/// returns `String` directly.
pub fn render_figure(src: &str, caption: &str) -> String {
    let mut out = String::with_capacity(64 + src.len() + caption.len());
    out.push_str("\n<figure>\n");
    out.push_str("  <img src=\"");
    push_escaped(&mut out, src);
    out.push_str("\">\n");
    if !caption.is_empty() {
        out.push_str("  <figcaption>");
        push_escaped(&mut out, caption);
        out.push_str("</figcaption>\n");
    }
    out.push_str("</figure>\n");
    out
}

/// Append `s` to `out` with HTML special characters escaped.
fn push_escaped(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_with_caption() {
        let out = render_figure("a.png", "A caption");
        assert_eq!(
            out,
            "\n<figure>\n  <img src=\"a.png\">\n  <figcaption>A caption</figcaption>\n</figure>\n"
        );
    }

    #[test]
    fn figure_without_caption_omits_figcaption() {
        let out = render_figure("a.png", "");
        assert_eq!(out, "\n<figure>\n  <img src=\"a.png\">\n</figure>\n");
        assert!(!out.contains("figcaption"));
    }

    #[test]
    fn src_is_attribute_escaped() {
        let out = render_figure("a\"b.png", "");
        assert!(out.contains("<img src=\"a&quot;b.png\">"), "got: {out}");
    }

    #[test]
    fn caption_is_escaped() {
        let out = render_figure("a.png", "<b>bold</b> & more");
        assert!(
            out.contains("<figcaption>&lt;b&gt;bold&lt;/b&gt; &amp; more</figcaption>"),
            "got: {out}"
        );
    }
}
