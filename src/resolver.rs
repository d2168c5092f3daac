use serde_json::Value;

use crate::presence::Presence;

/// Column lookup over one raw row. `None` means the column does not exist in
/// this source file at all.
pub trait Row {
    fn get(&self, column: &str) -> Option<&Value>;
}

impl Row for serde_json::Map<String, Value> {
    fn get(&self, column: &str) -> Option<&Value> {
        serde_json::Map::get(self, column)
    }
}

impl Row for std::collections::HashMap<String, Value> {
    fn get(&self, column: &str) -> Option<&Value> {
        std::collections::HashMap::get(self, column)
    }
}

/// First candidate column whose value is present, with its name. Stops at the
/// first hit; absent columns are skipped.
pub fn resolve_column<'r, 'c, R: Row + ?Sized>(
    row: &'r R,
    candidates: &[&'c str],
) -> Option<(&'c str, &'r Value)> {
    for &column in candidates {
        match row.get(column) {
            Some(value) if value.is_present() => {
                tracing::debug!(column, "resolved column");
                return Some((column, value));
            }
            _ => {}
        }
    }
    None
}

/// The raw value of the first present candidate, unconverted.
pub fn resolve<'r, R: Row + ?Sized>(row: &'r R, candidates: &[&str]) -> Option<&'r Value> {
    resolve_column(row, candidates).map(|(_, value)| value)
}

/// Like [`resolve`], falling back to a caller-supplied default.
pub fn resolve_or<R: Row + ?Sized>(row: &R, candidates: &[&str], default: Value) -> Value {
    resolve(row, candidates).cloned().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use std::cell::RefCell;

    /// Records every column the resolver asks for.
    struct SpyRow {
        cells: Map<String, Value>,
        asked: RefCell<Vec<String>>,
    }

    impl Row for SpyRow {
        fn get(&self, column: &str) -> Option<&Value> {
            self.asked.borrow_mut().push(column.to_string());
            self.cells.get(column)
        }
    }

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn stops_at_first_present_candidate() {
        let spy = SpyRow {
            cells: row(json!({"a": "nan", "b": "hit", "c": "later"})),
            asked: RefCell::new(Vec::new()),
        };
        assert_eq!(resolve(&spy, &["a", "b", "c"]), Some(&json!("hit")));
        assert_eq!(*spy.asked.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn absent_columns_are_skipped() {
        let r = row(json!({"npi": "0012345678"}));
        let hit = resolve_column(&r, &["cleaned.npi", "raw.npi", "npi"]);
        assert_eq!(hit, Some(("npi", &json!("0012345678"))));
    }

    #[test]
    fn default_when_nothing_matches() {
        let r = row(json!({"cleaned.name": " N/A ", "raw.name": null}));
        let v = resolve_or(&r, &["cleaned.name", "raw.name", "name"], json!("Unknown"));
        assert_eq!(v, json!("Unknown"));
        assert_eq!(resolve_or(&r, &[], json!([])), json!([]));
    }

    #[test]
    fn returns_value_unconverted() {
        let r = row(json!({"cleaned.work_experience": [{"employer": "Mercy"}], "count": 0}));
        assert_eq!(
            resolve(&r, &["cleaned.work_experience"]),
            Some(&json!([{"employer": "Mercy"}]))
        );
        assert_eq!(resolve(&r, &["count"]), Some(&json!(0)));
    }
}
