//! Typed in-memory CSV table.
//!
//! The first row holds the column names. A column whose non-empty cells all
//! parse as numbers is numeric; anything else is a text column and keeps its
//! cells verbatim, including ones that look like numbers. Only text columns
//! go through the cleaning pipeline.

use csv::{ReaderBuilder, WriterBuilder};
use log::debug;
#[cfg(feature = "multi_thread")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CleanseError, Result},
    pipeline::Pipeline,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Stored as a variable-length string.
    Text,
    /// Stored as a floating point number.
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    fn to_field(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(number) => number.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    fn from_fields(name: String, fields: Vec<String>) -> Self {
        let numeric = fields
            .iter()
            .all(|field| field.is_empty() || field.trim().parse::<f64>().is_ok());

        let cells = fields
            .into_iter()
            .map(|field| match (field.is_empty(), numeric) {
                (true, _) => Cell::Missing,
                // checked above
                (false, true) => Cell::Number(field.trim().parse().unwrap_or(f64::NAN)),
                (false, false) => Cell::Text(field),
            })
            .collect();

        Column {
            name,
            column_type: if numeric { ColumnType::Numeric } else { ColumnType::Text },
            cells,
        }
    }

    /// Cleans every text cell; missing cells are skipped and left missing.
    fn clean(&mut self, pipeline: &Pipeline) -> CleanReport {
        let mut report = CleanReport::default();
        if self.column_type != ColumnType::Text {
            return report;
        }

        for (row, cell) in self.cells.iter_mut().enumerate() {
            match cell {
                Cell::Text(text) => {
                    *text = pipeline.process(text);
                    report.cleaned_cells += 1;
                }
                _ => {
                    debug!("Skipping non-text cell at row {} of column '{}'", row, self.name);
                    report.skipped_cells += 1;
                }
            }
        }
        report
    }
}

/// Outcome of cleaning one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub cleaned_cells: usize,
    pub skipped_cells: usize,
}

impl CleanReport {
    fn merge(self, other: CleanReport) -> CleanReport {
        CleanReport {
            cleaned_cells: self.cleaned_cells + other.cleaned_cells,
            skipped_cells: self.skipped_cells + other.skipped_cells,
        }
    }
}

/// Column layout of a stored table. An integer `id` key precedes the columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<(String, ColumnType)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Parses CSV text whose first row is the header.
    pub fn from_csv(name: impl Into<String>, content: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(CleanseError::EmptyTable);
        }

        let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(CleanseError::TooManyFields {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            // short rows are padded with missing cells
            for (index, column) in fields.iter_mut().enumerate() {
                column.push(record.get(index).unwrap_or_default().to_string());
            }
        }
        let row_count = fields.first().map(Vec::len).unwrap_or_default();

        let columns = headers
            .iter()
            .zip(fields)
            .map(|(name, fields)| Column::from_fields(name.to_string(), fields))
            .collect();

        Ok(Table {
            name: name.into(),
            columns,
            row_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| (column.name.clone(), column.column_type))
                .collect(),
        }
    }

    /// Row-major copy of the cells.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| column.cells[row].clone())
                    .collect()
            })
            .collect()
    }

    /// Runs `pipeline` over every text cell of every text column.
    #[cfg(not(feature = "multi_thread"))]
    pub fn clean(&mut self, pipeline: &Pipeline) -> CleanReport {
        self.columns
            .iter_mut()
            .map(|column| column.clean(pipeline))
            .fold(CleanReport::default(), CleanReport::merge)
    }

    /// Runs `pipeline` over every text cell of every text column, one
    /// column per task.
    #[cfg(feature = "multi_thread")]
    pub fn clean(&mut self, pipeline: &Pipeline) -> CleanReport {
        self.columns
            .par_iter_mut()
            .map(|column| column.clean(pipeline))
            .reduce(CleanReport::default, CleanReport::merge)
    }

    /// Renders the table back to CSV, header first.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(|column| column.name.as_str()))?;
        for row in 0..self.row_count {
            writer.write_record(self.columns.iter().map(|column| column.cells[row].to_field()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CleanseError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dictionary::SlangDictionary;

    const REVIEWS: &str = "\
Tweet,HS,Score
\"RT @user: gue gak ngerti!!!\",1,4.5
\"  mantap   bgt :) \",0,
,1,3
";

    #[test]
    fn test_column_types_are_inferred() {
        let table = Table::from_csv("reviews", REVIEWS).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.schema().columns,
            vec![
                ("Tweet".to_string(), ColumnType::Text),
                ("HS".to_string(), ColumnType::Numeric),
                ("Score".to_string(), ColumnType::Numeric),
            ]
        );
        assert_eq!(table.column("Score").unwrap().cells[1], Cell::Missing);
        assert_eq!(table.column("HS").unwrap().cells[0].as_number(), Some(1.0));
    }

    #[test]
    fn test_numeric_looking_cells_in_text_columns_stay_text() {
        let table = Table::from_csv("mixed", "code\n123\nabc\n").unwrap();
        let column = table.column("code").unwrap();
        assert_eq!(column.column_type, ColumnType::Text);
        assert_eq!(column.cells[0].as_text(), Some("123"));
    }

    #[test]
    fn test_clean_touches_only_text_cells() {
        let mut table = Table::from_csv("reviews", REVIEWS).unwrap();
        let report = table.clean(&Pipeline::default());

        assert_eq!(report, CleanReport { cleaned_cells: 2, skipped_cells: 1 });
        let tweets = table.column("Tweet").unwrap();
        assert_eq!(tweets.cells[0].as_text(), Some("RT user gue gak ngerti"));
        assert_eq!(tweets.cells[1].as_text(), Some("mantap bgt"));
        assert!(tweets.cells[2].is_missing());
        assert_eq!(table.column("Score").unwrap().cells[0].as_number(), Some(4.5));
    }

    #[test]
    fn test_clean_with_substitution() {
        let dictionary = Arc::new(SlangDictionary::from_pairs([("gue", "saya"), ("bgt", "banget")]));
        let pipeline = Pipeline::new()
            .with_dictionary(dictionary)
            .with_substitution(true)
            .build()
            .unwrap();

        let mut table = Table::from_csv("reviews", REVIEWS).unwrap();
        table.clean(&pipeline);
        let tweets = table.column("Tweet").unwrap();
        assert_eq!(tweets.cells[0].as_text(), Some("RT user saya gak ngerti"));
        assert_eq!(tweets.cells[1].as_text(), Some("mantap banget"));
    }

    #[test]
    fn test_rows_and_csv_output() {
        let mut table = Table::from_csv("reviews", REVIEWS).unwrap();
        table.clean(&Pipeline::default());

        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![Cell::Missing, Cell::Number(1.0), Cell::Number(3.0)]);

        let csv = table.to_csv().unwrap();
        assert_eq!(
            csv,
            "Tweet,HS,Score\nRT user gue gak ngerti,1,4.5\nmantap bgt,0,\n,1,3\n"
        );
    }

    #[test]
    fn test_short_rows_are_padded_with_missing_cells() {
        let table = Table::from_csv("short", "text,score\nhalo,1\ndunia\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("text").unwrap().cells[1].as_text(), Some("dunia"));
        assert!(table.column("score").unwrap().cells[1].is_missing());
        assert_eq!(table.column("score").unwrap().column_type, ColumnType::Numeric);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        assert!(matches!(
            Table::from_csv("bad", "a,b\n1,2\n3,4,5\n"),
            Err(CleanseError::TooManyFields { line: 3, expected: 2, found: 3 })
        ));
    }
}
