//! Slang dictionary: an ordered list of (slang, formal) word pairs.
//!
//! The resource is a headerless two-column CSV:
//!
//! ```csv
//! gue,saya
//! gpp,tidak apa apa
//! ```
//!
//! Entries keep their file order and duplicates are kept as-is, since
//! substitution applies them one pass at a time.

use std::{fs, io::Read, path::Path};

use csv::ReaderBuilder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    encoding::decode_with_label,
    error::{CleanseError, Result},
};

/// Encoding of the bundled slang resource.
pub const DEFAULT_DICTIONARY_ENCODING: &str = "ISO-8859-1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlangEntry {
    pub slang: String,
    pub formal: String,
}

impl SlangEntry {
    pub fn new(slang: impl Into<String>, formal: impl Into<String>) -> Self {
        SlangEntry {
            slang: slang.into(),
            formal: formal.into(),
        }
    }
}

/// Immutable, ordered slang-to-formal mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlangDictionary {
    entries: Vec<SlangEntry>,
}

impl SlangDictionary {
    /// Builds a dictionary from in-memory pairs, keeping their order.
    pub fn from_pairs<I, S, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, F)>,
        S: Into<String>,
        F: Into<String>,
    {
        SlangDictionary {
            entries: pairs
                .into_iter()
                .map(|(slang, formal)| SlangEntry::new(slang, formal))
                .collect(),
        }
    }

    /// Parses headerless `slang,formal` rows.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() != 2 {
                return Err(CleanseError::InvalidDictionaryEntry {
                    line,
                    reason: format!("expected 2 columns, found {}", record.len()),
                });
            }

            let slang = &record[0];
            if slang.is_empty() {
                return Err(CleanseError::InvalidDictionaryEntry {
                    line,
                    reason: "slang term is empty".to_string(),
                });
            }
            entries.push(SlangEntry::new(slang, &record[1]));
        }

        Ok(SlangDictionary { entries })
    }

    /// Parses decoded CSV text.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// Loads the dictionary file at `path`, decoding it with `encoding`.
    pub fn from_path(path: impl AsRef<Path>, encoding: &str) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let content = decode_with_label(&bytes, encoding)?;
        let dictionary = Self::from_csv_str(&content)?;
        info!(
            "Loaded {} slang entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    pub fn entries(&self) -> &[SlangEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlangEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SlangDictionary {
    type Item = &'a SlangEntry;
    type IntoIter = std::slice::Iter<'a, SlangEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
