use serde::Serialize;

use crate::presence::Presence;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: String,
    /// Index into the record list in source row order.
    pub row: usize,
}

/// Explicit navigation context: the stable-sorted key sequence plus the
/// current position. Movement clamps at both ends.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    entries: Vec<NavEntry>,
    position: usize,
}

impl Navigator {
    /// Orders records by display name; equal names keep their row order.
    pub fn new(records: &[Record]) -> Self {
        let mut entries: Vec<(&str, NavEntry)> = records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                (
                    record.display_name(),
                    NavEntry {
                        label: label_for(record),
                        row,
                    },
                )
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Self {
            entries: entries.into_iter().map(|(_, entry)| entry).collect(),
            position: 0,
        }
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&NavEntry> {
        self.entries.get(self.position)
    }

    pub fn at_start(&self) -> bool {
        self.position == 0
    }

    pub fn at_end(&self) -> bool {
        self.position + 1 >= self.entries.len()
    }

    /// Returns false when already at the last entry.
    pub fn next(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.position += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.at_start() {
            return false;
        }
        self.position -= 1;
        true
    }

    pub fn goto(&mut self, index: usize) -> usize {
        self.position = index.min(self.entries.len().saturating_sub(1));
        self.position
    }

    pub fn select_label(&mut self, label: &str) -> bool {
        match self.entries.iter().position(|e| e.label == label) {
            Some(i) => {
                self.position = i;
                true
            }
            None => false,
        }
    }

    /// Case-insensitive substring search over labels, starting after the
    /// current entry and wrapping around.
    pub fn find(&mut self, needle: &str) -> Option<usize> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() || self.entries.is_empty() {
            return None;
        }
        let n = self.entries.len();
        let hit = (1..=n)
            .map(|step| (self.position + step) % n)
            .find(|&i| self.entries[i].label.to_lowercase().contains(&needle))?;
        self.position = hit;
        Some(hit)
    }
}

pub fn label_for(record: &Record) -> String {
    match record.npi.as_deref().filter(|npi| npi.is_present()) {
        Some(npi) => format!("{} — {}", record.display_name(), npi),
        None => record.display_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, npi: Option<&str>) -> Record {
        Record {
            name: name.map(str::to_string),
            npi: npi.map(str::to_string),
            ..Record::default()
        }
    }

    fn nav() -> Navigator {
        Navigator::new(&[
            record(Some("Zhou"), Some("3")),
            record(Some("Adams"), Some("1")),
            record(None, Some("9")),
            record(Some("Adams"), Some("2")),
            record(Some("Baker"), None),
        ])
    }

    #[test]
    fn stable_sort_by_display_name() {
        let binding = nav();
        let labels: Vec<&str> = binding.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Adams — 1", "Adams — 2", "Baker", "Unknown — 9", "Zhou — 3"]
        );
        let rows: Vec<usize> = nav().entries().iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn movement_clamps() {
        let mut n = nav();
        assert!(!n.prev());
        assert_eq!(n.goto(100), 4);
        assert!(!n.next());
        assert!(n.prev());
        assert_eq!(n.position(), 3);
    }

    #[test]
    fn select_and_find() {
        let mut n = nav();
        assert!(n.select_label("Baker"));
        assert_eq!(n.current().unwrap().row, 4);
        assert!(!n.select_label("Nobody"));

        assert_eq!(n.find("adams"), Some(0));
        assert_eq!(n.find("adams"), Some(1));
        assert_eq!(n.find("ADAMS"), Some(0));
        assert_eq!(n.find("missing"), None);
        assert_eq!(n.position(), 0);
    }

    #[test]
    fn empty_navigator() {
        let mut n = Navigator::new(&[]);
        assert!(n.current().is_none());
        assert!(!n.next());
        assert_eq!(n.goto(3), 0);
        assert_eq!(n.find("x"), None);
    }
}
