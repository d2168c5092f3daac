use anyhow::{Result, bail};
use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::navigation::Navigator;
use crate::record::Record;
use crate::render::{RenderOptions, render_record};
use crate::table::{Table, TableCache};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Name(String),
    Npi(String),
}

/// A loaded source table, its normalized records and where the reader is.
/// Records are rebuilt from scratch whenever the source file changes.
#[derive(Debug)]
pub struct Session {
    source: PathBuf,
    cache: TableCache,
    table: Rc<Table>,
    records: Vec<Record>,
    navigator: Navigator,
    options: RenderOptions,
}

impl Session {
    pub fn open(candidates: &[PathBuf], options: RenderOptions) -> Result<Self> {
        let mut cache = TableCache::new();
        let (source, table) = cache.load_first(candidates)?;
        let records = table.records();
        warn_unkeyed(&source, &records);
        let navigator = Navigator::new(&records);
        Ok(Self {
            source,
            cache,
            table,
            records,
            navigator,
            options,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn current(&self) -> Option<&Record> {
        self.navigator
            .current()
            .and_then(|entry| self.records.get(entry.row))
    }

    /// Records in navigation order.
    pub fn records_in_order(&self) -> impl Iterator<Item = &Record> {
        self.navigator
            .entries()
            .iter()
            .filter_map(|entry| self.records.get(entry.row))
    }

    pub fn render_current(&self) -> Option<String> {
        self.current()
            .map(|record| render_record(record, &self.options))
    }

    pub fn select(&mut self, selector: &Selector) -> Result<()> {
        match selector {
            Selector::Index(index) => {
                if *index >= self.navigator.len() {
                    bail!(
                        "Index {} out of range ({} records)",
                        index + 1,
                        self.navigator.len()
                    );
                }
                self.navigator.goto(*index);
            }
            Selector::Name(name) => {
                let wanted = name.trim();
                let row = self
                    .records_in_order()
                    .position(|r| r.display_name().trim().eq_ignore_ascii_case(wanted));
                let Some(position) = row else {
                    bail!("No record named {wanted:?}");
                };
                self.navigator.goto(position);
            }
            Selector::Npi(npi) => {
                let wanted = npi.trim();
                let row = self
                    .records_in_order()
                    .position(|r| r.npi.as_deref().map(str::trim) == Some(wanted));
                let Some(position) = row else {
                    bail!("No record with NPI {wanted:?}");
                };
                self.navigator.goto(position);
            }
        }
        Ok(())
    }

    /// Re-reads the source through the cache. Returns true when the file had
    /// changed and records were rebuilt.
    pub fn refresh(&mut self) -> Result<bool> {
        let table = self.cache.get_or_load(&self.source)?;
        if Rc::ptr_eq(&table, &self.table) {
            return Ok(false);
        }
        self.install(table);
        Ok(true)
    }

    /// Loads the source again even if it looks unchanged. On failure the
    /// session keeps the records it already has.
    pub fn reload(&mut self) -> Result<()> {
        let table = self.cache.reload(&self.source)?;
        self.install(table);
        Ok(())
    }

    // Stays on the same label when it still exists, otherwise on the same position.
    fn install(&mut self, table: Rc<Table>) {
        let label = self.navigator.current().map(|e| e.label.clone());
        let position = self.navigator.position();

        self.records = table.records();
        warn_unkeyed(&self.source, &self.records);
        self.table = table;
        self.navigator = Navigator::new(&self.records);

        let kept = label.is_some_and(|label| self.navigator.select_label(&label));
        if !kept {
            self.navigator.goto(position);
        }
    }
}

// Rows with neither a name nor an NPI all land under the same label.
fn warn_unkeyed(source: &Path, records: &[Record]) {
    let unkeyed = records.iter().filter(|r| r.row_key().is_none()).count();
    if unkeyed > 0 {
        tracing::warn!(
            path = %source.display(),
            rows = unkeyed,
            "rows without a name or NPI cannot be told apart"
        );
    }
}
