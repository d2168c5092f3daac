use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Number;

use crate::constants::SOURCE_KEY;

/// A leaf value inside a parsed cell. Numbers and booleans keep their type so a
/// decoded cell re-encodes to the same JSON, but nothing ever does arithmetic on them.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => s.fmt(f),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// One mapping-shaped element of a collection field (an experience, a training
/// entry, an email or insurance record). Keys keep the order of the source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    fields: Vec<(String, FieldValue)>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value in place so the key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Citation URLs. Empty when the entry has no `source` key.
    pub fn sources(&self) -> &[String] {
        match self.get(SOURCE_KEY) {
            Some(FieldValue::List(urls)) => urls,
            _ => &[],
        }
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Entry {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut entry = Entry::new();
        for (k, v) in iter {
            entry.insert(k, v);
        }
        entry
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Item {
    Scalar(Scalar),
    Mapping(Entry),
}

impl Item {
    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Item::Mapping(entry) => Some(entry),
            Item::Scalar(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Scalar(Scalar::Text(s.to_string()))
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut entry = Entry::new();
        entry.insert("employer", text("A"));
        entry.insert("role", text("B"));
        entry.insert("employer", text("C"));
        let keys: Vec<&str> = entry.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["employer", "role"]);
        assert_eq!(entry.get("employer"), Some(&text("C")));
    }

    #[test]
    fn sources_only_reads_lists() {
        let mut entry = Entry::new();
        assert!(entry.sources().is_empty());
        entry.insert("source", FieldValue::List(vec!["http://a.example".into()]));
        assert_eq!(entry.sources(), ["http://a.example".to_string()]);
    }

    #[test]
    fn entry_serializes_in_key_order() {
        let entry: Entry = [("role", text("Attending")), ("employer", text("Mercy"))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&Item::Mapping(entry)).unwrap();
        assert_eq!(json, r#"{"role":"Attending","employer":"Mercy"}"#);
    }

    #[test]
    fn list_display_joins() {
        let v = FieldValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(v.to_string(), "a, b");
    }
}
