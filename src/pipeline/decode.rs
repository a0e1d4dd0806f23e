//! Envelope decoding: the outer JSON wrapper around the Mobiledoc payload.
//!
//! Ghost exports (and this tool's input format) wrap each article in a small
//! envelope: `{ "title": "...", "mobiledoc": "..." }` where `mobiledoc` is
//! itself a JSON document serialised to a string. Decoding the two layers is
//! kept separate — this stage only peels the envelope; the inner string goes
//! to [`crate::pipeline::parse`] untouched.

use crate::error::ConvertError;
use serde::Deserialize;
use std::io::Read;

/// The outer input document: an optional title plus the serialised
/// Mobiledoc payload.
///
/// Unknown fields (Ghost exports carry many) are ignored. A missing
/// `mobiledoc` field is a decode error; a missing `title` defaults to empty,
/// which suppresses the H1 heading.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Article title, emitted as an H1 heading when non-empty.
    #[serde(default)]
    pub title: String,
    /// The Mobiledoc document, itself JSON, serialised to a string.
    pub mobiledoc: String,
}

/// Decode one envelope from the reader.
pub fn decode_envelope(reader: impl Read) -> Result<Envelope, ConvertError> {
    serde_json::from_reader(reader).map_err(|source| ConvertError::Decode { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_title_and_mobiledoc() {
        let env = decode_envelope(r#"{"title": "T", "mobiledoc": "{}"}"#.as_bytes()).unwrap();
        assert_eq!(env.title, "T");
        assert_eq!(env.mobiledoc, "{}");
    }

    #[test]
    fn missing_title_defaults_to_empty() {
        let env = decode_envelope(r#"{"mobiledoc": "{}"}"#.as_bytes()).unwrap();
        assert_eq!(env.title, "");
    }

    #[test]
    fn missing_mobiledoc_is_decode_error() {
        let err = decode_envelope(r#"{"title": "T"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let env =
            decode_envelope(r#"{"mobiledoc": "{}", "slug": "x", "id": 7}"#.as_bytes()).unwrap();
        assert_eq!(env.mobiledoc, "{}");
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = decode_envelope(b"{not json".as_slice()).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
    }
}
