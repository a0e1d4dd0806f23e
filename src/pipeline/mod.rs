//! Pipeline stages for Mobiledoc-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and keeps the
//! shape-validation code out of the renderer.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ parse ──▶ render
//! (JSON)  (envelope)  (model)  (markdown + cards)
//! ```
//!
//! 1. [`decode`] — peel the `{title, mobiledoc}` envelope off the input
//! 2. [`parse`]  — convert the Mobiledoc 0.3.x wire arrays into a typed
//!    document model, validating shape and cross-references
//! 3. [`render`] — walk sections, resolve inline markers, dispatch cards
//!    through the [`crate::cards::CardRegistry`]

pub mod decode;
pub mod parse;
pub mod render;
