//! Card dispatch: map a card-type name to a rendering function.
//!
//! Cards are Mobiledoc's extension mechanism for non-text content. A card
//! section carries only a name and an arbitrary JSON payload; everything
//! about its rendering lives in the handler registered for that name. This
//! registry ships handlers for the four card types Ghost exports use —
//! `image`, `gallery`, `markdown`, and `html` — and accepts additional
//! handlers through [`CardRegistry::register`].
//!
//! ## Why typed payloads?
//!
//! Each built-in handler deserialises its payload into a dedicated struct
//! before touching any field. A payload that is missing a field or carries
//! the wrong type becomes a [`CardError::Payload`] naming the problem,
//! rather than a crash deep inside the renderer.

pub mod figure;

use crate::config::ConversionConfig;
use crate::error::CardError;
use figure::render_figure;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// A card handler: payload JSON in, rendered fragment out.
///
/// Handlers are pure functions of the payload and the conversion config;
/// the returned fragment is inserted verbatim into the Markdown output at
/// the card's position.
pub type CardHandler = Box<dyn Fn(&Value, &ConversionConfig) -> Result<String, CardError>>;

/// Registry of card handlers, keyed by card-type name.
pub struct CardRegistry {
    handlers: HashMap<String, CardHandler>,
}

impl CardRegistry {
    /// An empty registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the four built-in handlers
    /// (`image`, `gallery`, `markdown`, `html`).
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("image", |payload, config| {
            let p: ImagePayload =
                serde_json::from_value(payload.clone()).map_err(CardError::payload)?;
            Ok(render_image(&p.src, &p.caption, config.use_figure))
        });
        reg.register("gallery", |payload, config| {
            let p: GalleryPayload =
                serde_json::from_value(payload.clone()).map_err(CardError::payload)?;
            let mut out = String::new();
            for image in &p.images {
                out.push_str(&render_image(&image.src, "", config.use_figure));
            }
            Ok(out)
        });
        reg.register("markdown", |payload, _config| {
            let p: MarkdownPayload =
                serde_json::from_value(payload.clone()).map_err(CardError::payload)?;
            Ok(p.markdown)
        });
        reg.register("html", |payload, _config| {
            let p: HtmlPayload =
                serde_json::from_value(payload.clone()).map_err(CardError::payload)?;
            Ok(p.html)
        });
        reg
    }

    /// Register (or replace) a handler for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Value, &ConversionConfig) -> Result<String, CardError> + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Render the card `name` with `payload`.
    ///
    /// Returns [`CardError::UnknownType`] when no handler is registered;
    /// the caller decides whether that is fatal
    /// (see [`crate::config::UnknownCardPolicy`]).
    pub fn render(
        &self,
        name: &str,
        payload: &Value,
        config: &ConversionConfig,
    ) -> Result<String, CardError> {
        match self.handlers.get(name) {
            Some(handler) => handler(payload, config),
            None => Err(CardError::UnknownType {
                name: name.to_string(),
            }),
        }
    }

    /// Whether a handler is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl Default for CardRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for CardRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CardRegistry").field("cards", &names).finish()
    }
}

/// Render one image as a Markdown link or an HTML figure.
///
/// Shared by the `image` and `gallery` handlers and by image sections
/// ([`crate::pipeline::render`]). The Markdown branch does not escape
/// `caption` or `src` (see the module docs of [`figure`] for the policy).
pub(crate) fn render_image(src: &str, caption: &str, use_figure: bool) -> String {
    if use_figure {
        render_figure(src, caption)
    } else {
        format!("![{caption}]({src})\n")
    }
}

// ── Built-in card payloads ───────────────────────────────────────────────

/// Payload of an `image` card.
#[derive(Debug, Deserialize)]
struct ImagePayload {
    src: String,
    #[serde(default)]
    caption: String,
}

/// Payload of a `gallery` card.
#[derive(Debug, Deserialize)]
struct GalleryPayload {
    images: Vec<GalleryImage>,
}

/// One gallery entry. The source format also carries `fileName`, `row`,
/// `width`, and `height`; those are layout hints for Ghost's own grid and
/// are intentionally ignored here — `src` is all the Markdown needs.
#[derive(Debug, Deserialize)]
struct GalleryImage {
    src: String,
}

/// Payload of a `markdown` card — trusted verbatim passthrough.
#[derive(Debug, Deserialize)]
struct MarkdownPayload {
    markdown: String,
}

/// Payload of an `html` card — trusted verbatim passthrough.
#[derive(Debug, Deserialize)]
struct HtmlPayload {
    html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg(use_figure: bool) -> ConversionConfig {
        ConversionConfig::builder().use_figure(use_figure).build()
    }

    #[test]
    fn image_markdown_link_empty_caption() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("image", &json!({"src": "S"}), &cfg(false))
            .unwrap();
        assert_eq!(out, "![](S)\n");
    }

    #[test]
    fn image_markdown_link_with_caption() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("image", &json!({"src": "S", "caption": "C"}), &cfg(false))
            .unwrap();
        assert_eq!(out, "![C](S)\n");
    }

    #[test]
    fn image_markdown_link_does_not_escape() {
        // Documented policy: the Markdown branch reproduces the original
        // tool's non-escaping behaviour byte for byte.
        let reg = CardRegistry::builtin();
        let out = reg
            .render(
                "image",
                &json!({"src": "a(b).png", "caption": "x]y"}),
                &cfg(false),
            )
            .unwrap();
        assert_eq!(out, "![x]y](a(b).png)\n");
    }

    #[test]
    fn image_figure_mode() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("image", &json!({"src": "S", "caption": "C"}), &cfg(true))
            .unwrap();
        assert!(out.contains("<figure>"));
        assert!(out.contains("<img src=\"S\">"));
        assert!(out.contains("<figcaption>C</figcaption>"));
    }

    #[test]
    fn image_missing_src_is_payload_error() {
        let reg = CardRegistry::builtin();
        let err = reg
            .render("image", &json!({"caption": "C"}), &cfg(false))
            .unwrap_err();
        assert!(matches!(err, CardError::Payload { .. }), "got: {err:?}");
    }

    #[test]
    fn gallery_concatenates_in_order_with_empty_captions() {
        let reg = CardRegistry::builtin();
        let payload = json!({"images": [
            {"src": "1.png", "fileName": "1.png", "row": 0, "width": 100, "height": 50},
            {"src": "2.png", "row": 0},
            {"src": "3.png"},
        ]});
        let out = reg.render("gallery", &payload, &cfg(false)).unwrap();
        assert_eq!(out, "![](1.png)\n![](2.png)\n![](3.png)\n");
    }

    #[test]
    fn gallery_empty_images_renders_nothing() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("gallery", &json!({"images": []}), &cfg(false))
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn gallery_figure_mode() {
        let reg = CardRegistry::builtin();
        let payload = json!({"images": [{"src": "1.png"}]});
        let out = reg.render("gallery", &payload, &cfg(true)).unwrap();
        assert!(out.contains("<img src=\"1.png\">"));
        assert!(!out.contains("figcaption"));
    }

    #[test]
    fn markdown_card_is_verbatim() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("markdown", &json!({"markdown": "**x**"}), &cfg(false))
            .unwrap();
        assert_eq!(out, "**x**");
    }

    #[test]
    fn html_card_is_verbatim() {
        let reg = CardRegistry::builtin();
        let out = reg
            .render("html", &json!({"html": "<hr>"}), &cfg(false))
            .unwrap();
        assert_eq!(out, "<hr>");
    }

    #[test]
    fn unknown_card_type() {
        let reg = CardRegistry::builtin();
        let err = reg.render("embed", &json!({}), &cfg(false)).unwrap_err();
        assert!(matches!(err, CardError::UnknownType { .. }));
    }

    #[test]
    fn custom_handler_registration() {
        let mut reg = CardRegistry::builtin();
        reg.register("hr", |_payload, _config| Ok("---\n".to_string()));
        assert!(reg.contains("hr"));
        let out = reg.render("hr", &json!(null), &cfg(false)).unwrap();
        assert_eq!(out, "---\n");
    }
}
