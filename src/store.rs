use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};
#[cfg(not(feature = "multi_thread"))]
use std::collections::HashMap;

#[cfg(feature = "multi_thread")]
use dashmap::DashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CleanseError, Result},
    table::{Cell, Table, TableSchema},
};

/// An input text and its cleaned form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub id: u64,
    pub text_input: String,
    pub text_clean: String,
}

/// Rows appended to a table, each with its generated `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTable {
    pub schema: TableSchema,
    pub rows: Vec<(u64, Vec<Cell>)>,
}

/// Persistence for cleaned output.
pub trait RecordStore: Send + Sync {
    /// Stores a single cleansing request and returns its id.
    fn save_text_record(&self, text_input: &str, text_clean: &str) -> Result<u64>;

    /// Creates the table on first use, then appends its rows.
    fn save_table(&self, table: &Table) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    records: Mutex<Vec<TextRecord>>,
    #[cfg(not(feature = "multi_thread"))]
    tables: Mutex<HashMap<String, StoredTable>>,
    #[cfg(feature = "multi_thread")]
    tables: DashMap<String, StoredTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_records(&self) -> Vec<TextRecord> {
        lock(&self.records).clone()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables_snapshot().into_iter().map(|t| t.schema.name).collect();
        names.sort();
        names
    }

    pub fn table(&self, name: &str) -> Option<StoredTable> {
        self.tables_snapshot().into_iter().find(|t| t.schema.name == name)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn new_rows(&self, table: &Table) -> Vec<(u64, Vec<Cell>)> {
        table.rows().into_iter().map(|row| (self.next_id(), row)).collect()
    }

    #[cfg(not(feature = "multi_thread"))]
    fn tables_snapshot(&self) -> Vec<StoredTable> {
        lock(&self.tables).values().cloned().collect()
    }

    #[cfg(feature = "multi_thread")]
    fn tables_snapshot(&self) -> Vec<StoredTable> {
        self.tables.iter().map(|entry| entry.value().clone()).collect()
    }
}

impl RecordStore for MemoryStore {
    fn save_text_record(&self, text_input: &str, text_clean: &str) -> Result<u64> {
        let id = self.next_id();
        lock(&self.records).push(TextRecord {
            id,
            text_input: text_input.to_string(),
            text_clean: text_clean.to_string(),
        });
        Ok(id)
    }

    #[cfg(not(feature = "multi_thread"))]
    fn save_table(&self, table: &Table) -> Result<()> {
        let schema = table.schema();
        let mut tables = lock(&self.tables);
        let stored = tables
            .entry(schema.name.clone())
            .or_insert_with(|| StoredTable {
                schema: schema.clone(),
                rows: Vec::new(),
            });
        if stored.schema != schema {
            return Err(CleanseError::SchemaMismatch(schema.name));
        }
        stored.rows.extend(self.new_rows(table));
        Ok(())
    }

    #[cfg(feature = "multi_thread")]
    fn save_table(&self, table: &Table) -> Result<()> {
        let schema = table.schema();
        let mut stored = self
            .tables
            .entry(schema.name.clone())
            .or_insert_with(|| StoredTable {
                schema: schema.clone(),
                rows: Vec::new(),
            });
        if stored.schema != schema {
            return Err(CleanseError::SchemaMismatch(schema.name));
        }
        stored.rows.extend(self.new_rows(table));
        Ok(())
    }
}

/// Everything a [`FileStore`] keeps on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreFile {
    next_id: u64,
    records: Vec<TextRecord>,
    tables: BTreeMap<String, StoredTable>,
}

impl StoreFile {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`RecordStore`] kept in a single JSON file.
///
/// Every save reads the file, applies the change and writes it back through a
/// temporary sibling, so stores opened on the same path see each other's
/// records. A missing file is an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, checking an existing file parses.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = FileStore {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        };
        let state = store.read()?;
        info!(
            "Opened record store {} ({} records, {} tables)",
            store.path.display(),
            state.records.len(),
            state.tables.len()
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text_records(&self) -> Result<Vec<TextRecord>> {
        Ok(self.read()?.records)
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.tables.into_keys().collect())
    }

    pub fn table(&self, name: &str) -> Result<Option<StoredTable>> {
        Ok(self.read()?.tables.remove(name))
    }

    fn read(&self) -> Result<StoreFile> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, state: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote record store {}", self.path.display());
        Ok(())
    }

    fn update<T>(&self, change: impl FnOnce(&mut StoreFile) -> Result<T>) -> Result<T> {
        let _guard = lock(&self.guard);
        let mut state = self.read()?;
        let value = change(&mut state)?;
        self.write(&state)?;
        Ok(value)
    }
}

impl RecordStore for FileStore {
    fn save_text_record(&self, text_input: &str, text_clean: &str) -> Result<u64> {
        self.update(|state| {
            let id = state.next_id();
            state.records.push(TextRecord {
                id,
                text_input: text_input.to_string(),
                text_clean: text_clean.to_string(),
            });
            Ok(id)
        })
    }

    fn save_table(&self, table: &Table) -> Result<()> {
        let schema = table.schema();
        let rows = table.rows();
        self.update(|state| {
            if let Some(stored) = state.tables.get(&schema.name) {
                if stored.schema != schema {
                    return Err(CleanseError::SchemaMismatch(schema.name.clone()));
                }
            }
            let rows: Vec<(u64, Vec<Cell>)> = rows.into_iter().map(|row| (state.next_id(), row)).collect();
            state
                .tables
                .entry(schema.name.clone())
                .or_insert_with(|| StoredTable {
                    schema: schema.clone(),
                    rows: Vec::new(),
                })
                .rows
                .extend(rows);
            Ok(())
        })
    }
}

// A poisoned lock still holds consistent data: every write is a single push or extend
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
