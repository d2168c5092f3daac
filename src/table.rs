use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    io::Read,
    path::{Path, PathBuf},
    rc::Rc,
    time::SystemTime,
};

use crate::record::Record;
use crate::resolver::Row;

/// An export loaded as untyped text. Cells are never type-inferred, so an NPI
/// such as `0123456789` survives as written. Empty cells are stored as null.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).with_context(|| format!("Failed opening {}", path.display()))?;
        Self::from_reader(file, path).with_context(|| format!("Failed reading CSV {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .byte_headers()
            .context("Failed reading CSV header")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = String::from_utf8_lossy(h);
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.into_owned()
                }
            })
            .collect();

        let mut columns = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            columns.entry(h.clone()).or_insert(i);
        }

        let mut rows = Vec::new();
        for (line, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Failed reading CSV row {}", line + 1))?;
            let cells = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(String::from_utf8_lossy(cell).into_owned())
                    }
                })
                .collect();
            rows.push(cells);
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            columns,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<TableRow<'_>> {
        (index < self.rows.len()).then_some(TableRow { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        (0..self.rows.len()).map(move |index| TableRow { table: self, index })
    }

    /// Normalized records in source row order.
    pub fn records(&self) -> Vec<Record> {
        self.rows().map(|row| Record::from_row(&row)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableRow<'t> {
    table: &'t Table,
    index: usize,
}

impl Row for TableRow<'_> {
    fn get(&self, column: &str) -> Option<&Value> {
        let col = *self.table.columns.get(column)?;
        self.table.rows[self.index].get(col)
    }
}

/// Tries each path in order. On total failure the error names every attempt.
pub fn load_first_available(candidates: &[PathBuf]) -> Result<Table> {
    first_loaded(candidates, Table::load).map(|(_, table)| table)
}

fn first_loaded<T>(
    candidates: &[PathBuf],
    mut load: impl FnMut(&Path) -> Result<T>,
) -> Result<(PathBuf, T)> {
    if candidates.is_empty() {
        bail!("No input candidates given");
    }
    let mut attempts = Vec::with_capacity(candidates.len());
    for path in candidates {
        match load(path) {
            Ok(loaded) => return Ok((path.clone(), loaded)),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "candidate table failed");
                attempts.push(format!("  - {}: {err:#}", path.display()));
            }
        }
    }
    bail!(
        "Could not load any table from {} candidate(s):\n{}",
        candidates.len(),
        attempts.join("\n")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceIdentity {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceIdentity {
    fn of(path: &Path) -> Result<Self> {
        let canonical =
            fs::canonicalize(path).with_context(|| format!("Failed resolving {}", path.display()))?;
        let meta = fs::metadata(&canonical)
            .with_context(|| format!("Failed reading metadata for {}", canonical.display()))?;
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Read-through cache for a single table: reloads only when the file's
/// identity (path, size, modification time) changes.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(SourceIdentity, Rc<Table>)>,
    loads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Rc<Table>> {
        let identity = SourceIdentity::of(path)?;
        if let Some((cached, table)) = &self.entry {
            if *cached == identity {
                tracing::debug!(path = %path.display(), "table cache hit");
                return Ok(Rc::clone(table));
            }
            tracing::debug!(path = %path.display(), "source changed, reloading");
        }

        self.store(identity, path)
    }

    /// Loads `path` even when the cached identity still matches. A failed load
    /// leaves the cached table in place.
    pub fn reload(&mut self, path: &Path) -> Result<Rc<Table>> {
        let identity = SourceIdentity::of(path)?;
        self.store(identity, path)
    }

    fn store(&mut self, identity: SourceIdentity, path: &Path) -> Result<Rc<Table>> {
        let table = Rc::new(Table::load(path)?);
        self.loads += 1;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers().len(),
            "loaded table"
        );
        self.entry = Some((identity, Rc::clone(&table)));
        Ok(table)
    }

    /// Like [`load_first_available`], caching whichever candidate loads.
    pub fn load_first(&mut self, candidates: &[PathBuf]) -> Result<(PathBuf, Rc<Table>)> {
        first_loaded(candidates, |path| self.get_or_load(path))
    }

    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table(text: &str) -> Table {
        Table::from_reader(text.as_bytes(), Path::new("inline.csv")).unwrap()
    }

    #[test]
    fn cells_stay_text() {
        let t = table("npi,cleaned.name\n0012345678,Dr. A\n");
        let row = t.row(0).unwrap();
        assert_eq!(row.get("npi"), Some(&Value::String("0012345678".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn empty_cells_are_null_and_ragged_rows_are_tolerated() {
        let t = table("a,b,c\n1,,3\n4\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(0).unwrap().get("b"), Some(&Value::Null));
        assert_eq!(t.row(1).unwrap().get("c"), None);
    }

    #[test]
    fn quoted_structured_cells() {
        let t = table(
            "cleaned.work_experience\n\"[{\"\"employer\"\": \"\"Mercy\"\"}]\"\n",
        );
        assert_eq!(
            t.row(0).unwrap().get("cleaned.work_experience"),
            Some(&Value::String(r#"[{"employer": "Mercy"}]"#.into()))
        );
    }

    #[test]
    fn first_duplicate_header_wins_and_bom_is_stripped() {
        let t = table("\u{feff}name,name\nfirst,second\n");
        assert_eq!(t.headers()[0], "name");
        assert_eq!(t.row(0).unwrap().get("name"), Some(&Value::String("first".into())));
    }

    #[test]
    fn load_failure_names_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![dir.path().join("one.csv"), dir.path().join("two.csv")];
        let err = load_first_available(&candidates).unwrap_err().to_string();
        assert!(err.contains("one.csv"), "{err}");
        assert!(err.contains("two.csv"), "{err}");
    }

    #[test]
    fn falls_through_to_later_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("two.csv");
        fs::write(&present, "name\nA\n").unwrap();
        let candidates = vec![dir.path().join("one.csv"), present.clone()];
        let t = load_first_available(&candidates).unwrap();
        assert_eq!(t.path(), present);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn cache_reuses_until_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "name\nA\n").unwrap();

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);

        let mut f = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "B").unwrap();
        drop(f);

        let third = cache.get_or_load(&path).unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(cache.loads(), 2);

        let fourth = cache.reload(&path).unwrap();
        assert!(!Rc::ptr_eq(&third, &fourth));
        assert_eq!(cache.loads(), 3);
    }

    #[test]
    fn failed_reload_keeps_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "name\nA\n").unwrap();

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(cache.reload(&path).is_err());
        assert_eq!(cache.loads(), 1);

        fs::write(&path, "name\nA\n").unwrap();
        let again = cache.get_or_load(&path).unwrap();
        assert_eq!(again.len(), first.len());
    }
}
