//! Configuration types for Mobiledoc-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`] and passed explicitly to the `convert*`
//! functions. The original tool kept the figure flag in process-wide state;
//! an explicit config struct keeps conversions independent and makes two runs
//! trivially diffable.

use serde::{Deserialize, Serialize};

/// Configuration for a Mobiledoc-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mobiledoc2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .use_figure(true)
///     .build();
/// assert!(config.use_figure);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Render `image` and `gallery` cards (and image sections) as HTML
    /// `<figure>` blocks instead of Markdown `![caption](src)` links.
    /// Default: false.
    ///
    /// Figure mode keeps captions visible in HTML-capable renderers and is
    /// what Ghost's own front-end produces. The Markdown-link mode is the
    /// better choice when the output must stay plain Markdown.
    pub use_figure: bool,

    /// Emit `# TITLE` followed by a blank line when the envelope carries a
    /// non-empty title. Default: true.
    pub include_title: bool,

    /// What to do when the document contains a card type with no registered
    /// handler. Default: [`UnknownCardPolicy::Error`].
    pub unknown_cards: UnknownCardPolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            use_figure: false,
            include_title: true,
            unknown_cards: UnknownCardPolicy::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn use_figure(mut self, v: bool) -> Self {
        self.config.use_figure = v;
        self
    }

    pub fn include_title(mut self, v: bool) -> Self {
        self.config.include_title = v;
        self
    }

    pub fn unknown_cards(mut self, policy: UnknownCardPolicy) -> Self {
        self.config.unknown_cards = policy;
        self
    }

    /// Build the configuration. Every combination of fields is valid, so
    /// this cannot fail.
    pub fn build(self) -> ConversionConfig {
        self.config
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to handle a card section whose type has no registered handler.
///
/// The strict default matches the all-or-nothing error policy of the rest of
/// the pipeline: a document relying on an unimplemented card almost certainly
/// loses content, and silence would hide that. `Skip` exists for bulk
/// migrations where a best-effort rendering of the known cards beats no
/// output at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownCardPolicy {
    /// Abort the conversion with [`crate::CardError::UnknownType`]. (default)
    #[default]
    Error,
    /// Render the card as an empty fragment and log a warning.
    Skip,
}
