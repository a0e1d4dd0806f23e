//! Mobiledoc 0.3.x parsing: wire format → typed document model.
//!
//! ## Why a typed model?
//!
//! On the wire, Mobiledoc encodes everything as heterogeneous JSON arrays:
//! a section is `[1, "p", [...]]`, a marker is `[0, [0], 1, "text"]`, a
//! markup is `["a", ["href", "..."]]`. Walking those `Value` arrays directly
//! scatters shape checks through the renderer and turns every producer
//! mistake into an index-out-of-bounds. This stage converts the arrays into
//! [`Document`] once, validating arity, types, and every cross-reference
//! (markup, atom, and card indexes) up front. After `parse` succeeds, the
//! renderer can index freely.
//!
//! Only the constructs this converter consumes are modelled; anything else
//! in the 0.3.x family (an unknown section type, a fifth tuple element) is a
//! [`ConvertError::MobiledocShape`] naming where it was found.

use crate::error::ConvertError;
use serde::Deserialize;
use serde_json::Value;

// Section type identifiers, per the Mobiledoc 0.3 encoding.
const SECTION_MARKUP: u64 = 1;
const SECTION_IMAGE: u64 = 2;
const SECTION_LIST: u64 = 3;
const SECTION_CARD: u64 = 10;

// Marker type identifiers.
const MARKER_TEXT: u64 = 0;
const MARKER_ATOM: u64 = 1;

/// A parsed Mobiledoc document, ready to render.
///
/// All indexes stored in [`Section`] and [`Marker`] values are validated
/// against the corresponding tables during parsing.
#[derive(Debug, Clone)]
pub struct Document {
    pub markups: Vec<Markup>,
    pub atoms: Vec<Atom>,
    pub cards: Vec<Card>,
    pub sections: Vec<Section>,
}

/// An inline markup: a tag name plus optional attributes
/// (e.g. `["a", ["href", "https://..."]]`).
#[derive(Debug, Clone)]
pub struct Markup {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Markup {
    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An inline atom: a named unit of content with a text fallback.
#[derive(Debug, Clone)]
pub struct Atom {
    pub name: String,
    pub text: String,
    pub payload: Value,
}

/// A card: a named opaque content block with an arbitrary payload.
#[derive(Debug, Clone)]
pub struct Card {
    pub name: String,
    pub payload: Value,
}

/// A structural section of the document.
#[derive(Debug, Clone)]
pub enum Section {
    /// Text section with a block tag (`p`, `h1`–`h6`, `blockquote`, ...).
    Markup { tag: String, markers: Vec<Marker> },
    /// Standalone image section.
    Image { src: String },
    /// List section; each item is its own marker run.
    List {
        tag: ListTag,
        items: Vec<Vec<Marker>>,
    },
    /// Card section referencing an entry in [`Document::cards`].
    Card { index: usize },
}

/// List flavour of a list section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTag {
    Unordered,
    Ordered,
}

/// One formatting run: markups to open, text or atom content, and how many
/// currently-open markups close after it.
#[derive(Debug, Clone)]
pub struct Marker {
    /// Indexes into [`Document::markups`] opened before this run.
    pub open_markups: Vec<usize>,
    /// How many open markups close after this run.
    pub close_count: usize,
    pub value: MarkerValue,
}

/// The content of a marker.
#[derive(Debug, Clone)]
pub enum MarkerValue {
    Text(String),
    /// Index into [`Document::atoms`].
    Atom(usize),
}

// ── Wire format ──────────────────────────────────────────────────────────

/// Top level of the 0.3.x wire format. The four tables stay as raw `Value`s
/// here because their entries are positional arrays serde derive cannot
/// express; `parse` converts them element by element.
#[derive(Debug, Deserialize)]
struct Wire {
    version: String,
    #[serde(default)]
    markups: Vec<Value>,
    #[serde(default)]
    atoms: Vec<Value>,
    #[serde(default)]
    cards: Vec<Value>,
    #[serde(default)]
    sections: Vec<Value>,
}

/// Parse a serialised Mobiledoc document into the typed model.
pub fn parse(mobiledoc: &str) -> Result<Document, ConvertError> {
    let wire: Wire =
        serde_json::from_str(mobiledoc).map_err(|source| ConvertError::MobiledocJson { source })?;

    if !wire.version.starts_with("0.3") {
        return Err(ConvertError::UnsupportedVersion {
            version: wire.version,
        });
    }

    let markups = wire
        .markups
        .iter()
        .enumerate()
        .map(|(i, v)| parse_markup(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let atoms = wire
        .atoms
        .iter()
        .enumerate()
        .map(|(i, v)| parse_atom(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let cards = wire
        .cards
        .iter()
        .enumerate()
        .map(|(i, v)| parse_card(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let sections = wire
        .sections
        .iter()
        .enumerate()
        .map(|(i, v)| parse_section(i, v, markups.len(), atoms.len(), cards.len()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Document {
        markups,
        atoms,
        cards,
        sections,
    })
}

// ── Element parsers ──────────────────────────────────────────────────────

fn parse_markup(index: usize, value: &Value) -> Result<Markup, ConvertError> {
    let arr = as_array(value, || format!("markup {index}"))?;
    let tag = as_str(arr.first(), || format!("markup {index} tag"))?.to_string();

    let mut attributes = Vec::new();
    if let Some(attrs) = arr.get(1) {
        let pairs = as_array(attrs, || format!("markup {index} attributes"))?;
        if pairs.len() % 2 != 0 {
            return Err(shape(format!(
                "markup {index} attributes: odd number of entries"
            )));
        }
        for kv in pairs.chunks(2) {
            let k = as_str(kv.first(), || format!("markup {index} attribute name"))?;
            let v = as_str(kv.get(1), || format!("markup {index} attribute value"))?;
            attributes.push((k.to_string(), v.to_string()));
        }
    }

    Ok(Markup { tag, attributes })
}

fn parse_atom(index: usize, value: &Value) -> Result<Atom, ConvertError> {
    let arr = as_array(value, || format!("atom {index}"))?;
    let name = as_str(arr.first(), || format!("atom {index} name"))?.to_string();
    let text = as_str(arr.get(1), || format!("atom {index} text"))?.to_string();
    let payload = arr.get(2).cloned().unwrap_or(Value::Null);
    Ok(Atom {
        name,
        text,
        payload,
    })
}

fn parse_card(index: usize, value: &Value) -> Result<Card, ConvertError> {
    let arr = as_array(value, || format!("card {index}"))?;
    let name = as_str(arr.first(), || format!("card {index} name"))?.to_string();
    let payload = arr.get(1).cloned().unwrap_or(Value::Null);
    Ok(Card { name, payload })
}

fn parse_section(
    index: usize,
    value: &Value,
    markup_count: usize,
    atom_count: usize,
    card_count: usize,
) -> Result<Section, ConvertError> {
    let arr = as_array(value, || format!("section {index}"))?;
    let kind = as_u64(arr.first(), || format!("section {index} type"))?;

    match kind {
        SECTION_MARKUP => {
            let tag = as_str(arr.get(1), || format!("section {index} tag"))?.to_string();
            let markers = parse_markers(index, arr.get(2), markup_count, atom_count)?;
            Ok(Section::Markup { tag, markers })
        }
        SECTION_IMAGE => {
            let src = as_str(arr.get(1), || format!("section {index} image src"))?.to_string();
            Ok(Section::Image { src })
        }
        SECTION_LIST => {
            let tag = as_str(arr.get(1), || format!("section {index} tag"))?;
            let tag = match tag {
                "ul" => ListTag::Unordered,
                "ol" => ListTag::Ordered,
                other => {
                    return Err(shape(format!(
                        "section {index}: unknown list tag '{other}'"
                    )))
                }
            };
            let items_value = arr
                .get(2)
                .ok_or_else(|| shape(format!("section {index}: missing list items")))?;
            let raw_items = as_array(items_value, || format!("section {index} list items"))?;
            let items = raw_items
                .iter()
                .map(|item| parse_markers(index, Some(item), markup_count, atom_count))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Section::List { tag, items })
        }
        SECTION_CARD => {
            let card = as_index(arr.get(1), || format!("section {index} card index"))?;
            if card >= card_count {
                return Err(shape(format!(
                    "section {index}: card index {card} out of range ({card_count} cards)"
                )));
            }
            Ok(Section::Card { index: card })
        }
        other => Err(shape(format!("section {index}: unknown type {other}"))),
    }
}

fn parse_markers(
    section: usize,
    value: Option<&Value>,
    markup_count: usize,
    atom_count: usize,
) -> Result<Vec<Marker>, ConvertError> {
    let value =
        value.ok_or_else(|| shape(format!("section {section}: missing markers")))?;
    let arr = as_array(value, || format!("section {section} markers"))?;
    arr.iter()
        .enumerate()
        .map(|(i, v)| parse_marker(section, i, v, markup_count, atom_count))
        .collect()
}

fn parse_marker(
    section: usize,
    index: usize,
    value: &Value,
    markup_count: usize,
    atom_count: usize,
) -> Result<Marker, ConvertError> {
    let ctx = || format!("section {section} marker {index}");
    let arr = as_array(value, ctx)?;
    if arr.len() < 4 {
        return Err(shape(format!("{}: expected 4 elements", ctx())));
    }

    let kind = as_u64(arr.first(), ctx)?;

    let open_markups = as_array(&arr[1], || format!("{} open markups", ctx()))?
        .iter()
        .map(|v| {
            let idx = as_index(Some(v), || format!("{} markup index", ctx()))?;
            if idx >= markup_count {
                return Err(shape(format!(
                    "{}: markup index {idx} out of range ({markup_count} markups)",
                    ctx()
                )));
            }
            Ok(idx)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let close_count = as_index(arr.get(2), || format!("{} close count", ctx()))?;

    let value = match kind {
        MARKER_TEXT => MarkerValue::Text(as_str(arr.get(3), || format!("{} text", ctx()))?.to_string()),
        MARKER_ATOM => {
            let idx = as_index(arr.get(3), || format!("{} atom index", ctx()))?;
            if idx >= atom_count {
                return Err(shape(format!(
                    "{}: atom index {idx} out of range ({atom_count} atoms)",
                    ctx()
                )));
            }
            MarkerValue::Atom(idx)
        }
        other => return Err(shape(format!("{}: unknown marker type {other}", ctx()))),
    };

    Ok(Marker {
        open_markups,
        close_count,
        value,
    })
}

// ── Shape helpers ────────────────────────────────────────────────────────

fn shape(detail: String) -> ConvertError {
    ConvertError::MobiledocShape { detail }
}

fn as_array<'a>(
    value: &'a Value,
    ctx: impl Fn() -> String,
) -> Result<&'a Vec<Value>, ConvertError> {
    value
        .as_array()
        .ok_or_else(|| shape(format!("{}: expected an array", ctx())))
}

fn as_str<'a>(value: Option<&'a Value>, ctx: impl Fn() -> String) -> Result<&'a str, ConvertError> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| shape(format!("{}: expected a string", ctx())))
}

fn as_u64(value: Option<&Value>, ctx: impl Fn() -> String) -> Result<u64, ConvertError> {
    value
        .and_then(Value::as_u64)
        .ok_or_else(|| shape(format!("{}: expected a non-negative integer", ctx())))
}

/// Like [`as_u64`], but converted losslessly to `usize`. An `as` cast would
/// truncate on 32-bit targets and could wrap a huge index back into range.
fn as_index(value: Option<&Value>, ctx: impl Fn() -> String) -> Result<usize, ConvertError> {
    let n = as_u64(value, &ctx)?;
    usize::try_from(n).map_err(|_| shape(format!("{}: index {n} does not fit usize", ctx())))
}
