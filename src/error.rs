//! Error types for the mobiledoc2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — the whole conversion failed (malformed input JSON,
//!   unreadable file, closed output pipe). Returned from the top-level
//!   `convert*` functions.
//!
//! * [`CardError`] — a single card handler rejected its payload (unknown
//!   card type, missing or mistyped field). Wrapped into
//!   [`ConvertError::Card`] together with the card name so the message says
//!   *which* card broke, not just that one did.
//!
//! Conversion is all-or-nothing: every error is fatal and nothing is written
//! to the output stream on failure. Card payload mismatches are structured
//! errors rather than panics, so a bad document produces a readable message
//! instead of a backtrace.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the mobiledoc2md library.
///
/// Card-level failures use [`CardError`] and arrive here wrapped in
/// [`ConvertError::Card`].
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The outer envelope is not valid JSON or does not match
    /// `{ "title": ..., "mobiledoc": ... }`.
    #[error("error decoding input JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    /// The `mobiledoc` string is not valid JSON.
    #[error("error decoding mobiledoc payload: {source}")]
    MobiledocJson {
        #[source]
        source: serde_json::Error,
    },

    /// The document declares a Mobiledoc version this tool does not handle.
    #[error("unsupported mobiledoc version '{version}' (expected 0.3.x)")]
    UnsupportedVersion { version: String },

    /// The mobiledoc JSON parsed but its structure is malformed
    /// (wrong array arity, bad index, non-string tag, ...).
    #[error("malformed mobiledoc structure: {detail}")]
    MobiledocShape { detail: String },

    // ── Card errors ───────────────────────────────────────────────────────
    /// A card handler failed for the named card type.
    #[error("card '{name}': {source}")]
    Card {
        name: String,
        #[source]
        source: CardError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not open the input file.
    #[error("cannot open input file '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write to the output stream.
    #[error("cannot write to output: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
}

/// An error produced by a single card handler.
///
/// Card payloads are deserialised into typed structs; anything the document
/// producer got wrong surfaces here with the offending detail.
#[derive(Debug, Error)]
pub enum CardError {
    /// No handler is registered for this card type.
    ///
    /// Fatal under [`crate::config::UnknownCardPolicy::Error`] (the default);
    /// rendered as an empty fragment under
    /// [`crate::config::UnknownCardPolicy::Skip`].
    #[error("unknown card type '{name}'")]
    UnknownType { name: String },

    /// The payload is missing an expected field or a field has the wrong type.
    #[error("bad payload: {detail}")]
    Payload { detail: String },
}

impl CardError {
    /// Build a [`CardError::Payload`] from a serde deserialisation error.
    pub(crate) fn payload(err: serde_json::Error) -> Self {
        CardError::Payload {
            detail: err.to_string(),
        }
    }
}
