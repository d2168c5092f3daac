//! Turns one raw cell into a sequence of [`Item`]s.
//!
//! A cell may already hold decoded structure, or text in one of two encodings:
//! strict JSON, or the permissive literal syntax handled by [`crate::literal`].
//! Decoders are tried in a fixed order and the first success wins. Text that no
//! decoder accepts yields an empty sequence. That loss is deliberate: the cell
//! is treated exactly like an absent one and no structure is guessed.

use serde_json::{Map, Value};

use crate::constants::SOURCE_KEY;
use crate::item::{Entry, FieldValue, Item, Scalar};
use crate::literal;
use crate::presence::Presence;

type Decoder = fn(&str) -> Option<Value>;

const DECODERS: &[(&str, Decoder)] = &[("json", decode_json), ("literal", decode_literal)];

fn decode_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn decode_literal(text: &str) -> Option<Value> {
    literal::decode(text).ok()
}

/// Runs the decoder chain over `text` (trimmed first). `None` when every decoder fails.
pub fn decode_text(text: &str) -> Option<Value> {
    let text = text.trim();
    DECODERS.iter().find_map(|(name, decode)| {
        let value = decode(text)?;
        tracing::trace!(decoder = *name, "decoded cell");
        Some(value)
    })
}

/// Normalizes a raw cell. Total: never fails, never panics.
pub fn parse(raw: &Value) -> Vec<Item> {
    if !raw.is_present() {
        return Vec::new();
    }
    match raw {
        Value::Array(_) | Value::Object(_) => items_from_value(raw),
        Value::String(text) => decode_text(text)
            .map(|decoded| items_from_value(&decoded))
            .unwrap_or_default(),
        scalar => vec![Item::Scalar(scalar_from_value(scalar))],
    }
}

/// Convenience for callers holding plain text rather than a [`Value`].
pub fn parse_text(text: &str) -> Vec<Item> {
    parse(&Value::String(text.to_string()))
}

fn items_from_value(value: &Value) -> Vec<Item> {
    match value {
        Value::Array(elements) => elements.iter().map(item_from_value).collect(),
        Value::Object(map) => vec![Item::Mapping(entry_from_map(map))],
        Value::Null => Vec::new(),
        scalar => vec![Item::Scalar(scalar_from_value(scalar))],
    }
}

fn item_from_value(value: &Value) -> Item {
    match value {
        Value::Object(map) => Item::Mapping(entry_from_map(map)),
        Value::Array(_) => Item::Scalar(Scalar::Text(value.to_string())),
        scalar => Item::Scalar(scalar_from_value(scalar)),
    }
}

fn entry_from_map(map: &Map<String, Value>) -> Entry {
    map.iter()
        .map(|(key, value)| {
            let field = if key == SOURCE_KEY {
                FieldValue::List(source_list(value))
            } else {
                field_from_value(value)
            };
            (key.clone(), field)
        })
        .collect()
}

fn field_from_value(value: &Value) -> FieldValue {
    match value {
        Value::Array(elements) => FieldValue::List(elements.iter().map(text_of).collect()),
        other => FieldValue::Scalar(scalar_from_value(other)),
    }
}

/// `source` always comes out as a list. A string that itself encodes a list is
/// decoded; any other present string becomes a one-element list.
fn source_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(urls) => urls.iter().map(text_of).collect(),
        Value::String(text) if !text.is_present() => Vec::new(),
        Value::String(text) => match decode_text(text) {
            Some(Value::Array(urls)) => urls.iter().map(text_of).collect(),
            _ => vec![text.trim().to_string()],
        },
        Value::Null => Vec::new(),
        other => vec![text_of(other)],
    }
}

fn scalar_from_value(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => Scalar::Number(n.clone()),
        Value::String(s) => Scalar::Text(s.clone()),
        nested => Scalar::Text(nested.to_string()),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
