//! # mobiledoc2md
//!
//! Convert Mobiledoc articles to Markdown.
//!
//! ## Why this crate?
//!
//! Mobiledoc is the JSON document format used by Ghost and other editors
//! built on the mobiledoc-kit. It separates structural *sections* from
//! inline formatting *markers* and hides non-text content behind opaque
//! *cards*. That is great for editors and useless for anything that wants
//! plain text: migrating a blog, feeding articles to a static-site
//! generator, or grepping an export. This crate walks the document
//! structure and emits Markdown, resolving marker ranges into emphasis and
//! links and dispatching cards to pluggable handlers.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON envelope {title, mobiledoc}
//!  │
//!  ├─ 1. Decode  peel the outer envelope
//!  ├─ 2. Parse   Mobiledoc 0.3.x wire arrays → typed document model
//!  ├─ 3. Render  sections + markers → Markdown; cards via the registry
//!  └─ 4. Output  optional "# title" heading + rendered body
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mobiledoc2md::{convert_str, ConversionConfig};
//!
//! let input = r#"{
//!     "title": "Hello",
//!     "mobiledoc": "{\"version\": \"0.3.1\", \"sections\": [[1, \"p\", [[0, [], 0, \"World\"]]]]}"
//! }"#;
//! let markdown = convert_str(input, &ConversionConfig::default()).unwrap();
//! assert_eq!(markdown, "# Hello\n\nWorld\n");
//! ```
//!
//! ## Cards
//!
//! Four card types are built in: `image`, `gallery`, `markdown`, and `html`.
//! Images render as `![caption](src)` links, or as HTML `<figure>` blocks
//! with [`ConversionConfig::use_figure`]. Additional card types can be
//! registered on a [`CardRegistry`] and passed to
//! [`convert_with_cards`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mobiledoc2md` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! mobiledoc2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cards;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cards::{figure::render_figure, CardHandler, CardRegistry};
pub use config::{ConversionConfig, ConversionConfigBuilder, UnknownCardPolicy};
pub use convert::{convert, convert_file, convert_str, convert_with_cards, ConversionStats};
pub use error::{CardError, ConvertError};
pub use pipeline::decode::Envelope;
