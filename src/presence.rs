//! The single emptiness predicate. Every "is this field there?" decision in the
//! crate goes through [`Presence`], so a cell holding `"nan"` and a missing
//! column are indistinguishable downstream.

use serde_json::Value;

use crate::constants::SENTINEL_TOKENS;
use crate::item::{Entry, FieldValue, Item, Scalar};

pub trait Presence {
    fn is_present(&self) -> bool;
}

pub fn is_present<T: Presence + ?Sized>(value: &T) -> bool {
    value.is_present()
}

impl Presence for str {
    fn is_present(&self) -> bool {
        let trimmed = self.trim();
        !SENTINEL_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

// Zero and `false` are data, not absence.
impl Presence for Value {
    fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::String(s) => s.is_present(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        }
    }
}

impl Presence for Scalar {
    fn is_present(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Text(s) => s.is_present(),
            Scalar::Bool(_) | Scalar::Number(_) => true,
        }
    }
}

impl Presence for FieldValue {
    fn is_present(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.is_present(),
            FieldValue::List(items) => !items.is_empty(),
        }
    }
}

impl Presence for Entry {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for Item {
    fn is_present(&self) -> bool {
        match self {
            Item::Scalar(s) => s.is_present(),
            Item::Mapping(e) => e.is_present(),
        }
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}
