//! Request surface: upload a CSV file, or cleanse a single text.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    encoding::decode,
    error::{CleanseError, Result},
    pipeline::Pipeline,
    pipeline_config::PipelineConfig,
    store::{MemoryStore, RecordStore},
    table::Table,
};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and cleaned successfully";

/// A file as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        UploadedFile {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CleanseError::InvalidInput(format!("not a file: {}", path.display())))?;
        Ok(UploadedFile::new(filename, fs::read(path)?))
    }

    /// Name of the table the upload is stored in: the file name without extension.
    pub fn table_name(&self) -> Result<String> {
        Path::new(&self.filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| CleanseError::InvalidInput(format!("invalid file name '{}'", self.filename)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub table: String,
    pub encoding: String,
    pub rows: usize,
    pub cleaned_cells: usize,
    pub skipped_cells: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_file: Option<PathBuf>,
}

/// Body of a single-text request. `text` must be a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanseRequest {
    #[serde(default)]
    pub text: Value,
}

impl CleanseRequest {
    pub fn new(text: impl Into<String>) -> Self {
        CleanseRequest {
            text: Value::String(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanseResponse {
    pub cleaned_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&CleanseError> for ErrorResponse {
    fn from(error: &CleanseError) -> Self {
        ErrorResponse {
            error: error.to_string(),
        }
    }
}

pub struct CleansingService<S: RecordStore = MemoryStore> {
    pipeline: Pipeline,
    config: PipelineConfig,
    store: Arc<S>,
}

impl<S: RecordStore> CleansingService<S> {
    /// Builds the pipeline from `config`, loading the dictionary once.
    pub fn new(config: PipelineConfig, store: Arc<S>) -> Result<Self> {
        let pipeline = config.build_pipeline()?;
        Ok(Self::with_pipeline(pipeline, config, store))
    }

    pub fn with_pipeline(pipeline: Pipeline, config: PipelineConfig, store: Arc<S>) -> Self {
        CleansingService {
            pipeline,
            config,
            store,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Cleans every text column of an uploaded CSV and stores the result.
    ///
    /// Nothing is stored when the file is missing, cannot be decoded or
    /// cannot be parsed.
    pub fn upload(&self, file: Option<UploadedFile>) -> Result<UploadResponse> {
        let file = file.ok_or(CleanseError::NoFile)?;
        let table_name = file.table_name()?;

        let decoded = decode(&file.content, &self.config.fallback_encodings)?;
        let mut table = Table::from_csv(table_name, &decoded.text)?;
        let report = table.clean(&self.pipeline);

        self.store.save_table(&table)?;

        let clean_file = if self.config.write_clean_csv {
            Some(self.write_clean_csv(&table)?)
        } else {
            None
        };

        info!(
            "Cleaned upload '{}': {} rows, {} cells cleaned, {} skipped",
            file.filename,
            table.row_count(),
            report.cleaned_cells,
            report.skipped_cells
        );

        Ok(UploadResponse {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            table: table.name().to_string(),
            encoding: decoded.encoding.to_string(),
            rows: table.row_count(),
            cleaned_cells: report.cleaned_cells,
            skipped_cells: report.skipped_cells,
            clean_file,
        })
    }

    /// Cleans a single text and stores the (input, output) pair.
    pub fn cleanse(&self, request: &CleanseRequest) -> Result<CleanseResponse> {
        let text = request.text.as_str().ok_or_else(|| {
            CleanseError::InvalidInput(format!("'text' must be a string, got {}", request.text))
        })?;

        let cleaned_text = self.pipeline.process(text);
        self.store.save_text_record(text, &cleaned_text)?;

        Ok(CleanseResponse { cleaned_text })
    }

    fn write_clean_csv(&self, table: &Table) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.output_dir)?;
        let path = self
            .config
            .output_dir
            .join(format!("{}_clean.csv", table.name()));
        fs::write(&path, table.to_csv()?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CleansingService {
        let config = PipelineConfig {
            write_clean_csv: false,
            ..PipelineConfig::default()
        };
        CleansingService::new(config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_cleanse_stores_record() {
        let service = service();
        let response = service.cleanse(&CleanseRequest::new("Halo,   Dunia!! 2024")).unwrap();
        assert_eq!(response.cleaned_text, "Halo Dunia");

        let records = service.store().text_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text_input, "Halo,   Dunia!! 2024");
        assert_eq!(records[0].text_clean, "Halo Dunia");
    }

    #[test]
    fn test_cleanse_rejects_non_string_text() {
        let service = service();
        for body in [r#"{}"#, r#"{"text": null}"#, r#"{"text": 42}"#] {
            let request: CleanseRequest = serde_json::from_str(body).unwrap();
            assert!(matches!(
                service.cleanse(&request),
                Err(CleanseError::InvalidInput(_))
            ));
        }
        assert!(service.store().text_records().is_empty());
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let service = service();
        assert!(matches!(service.upload(None), Err(CleanseError::NoFile)));
        assert!(service.store().table_names().is_empty());
    }

    #[test]
    fn test_upload_cleans_and_stores() {
        let service = service();
        let file = UploadedFile::new("tweets.csv", "Tweet,HS\n\"gue!!  bete\",1\n,0\n");
        let response = service.upload(Some(file)).unwrap();

        assert_eq!(response.message, UPLOAD_SUCCESS_MESSAGE);
        assert_eq!(response.table, "tweets");
        assert_eq!(response.rows, 2);
        assert_eq!(response.cleaned_cells, 1);
        assert_eq!(response.skipped_cells, 1);
        assert_eq!(response.clean_file, None);

        let stored = service.store().table("tweets").unwrap();
        assert_eq!(stored.rows[0].1[0].as_text(), Some("gue bete"));
    }

    #[test]
    fn test_table_name_strips_directories_and_extension() {
        let file = UploadedFile::new("../data/kamus.final.csv", Vec::<u8>::new());
        assert_eq!(file.table_name().unwrap(), "kamus.final");
        assert!(UploadedFile::new("", Vec::<u8>::new()).table_name().is_err());
    }

    #[test]
    fn test_error_response_carries_message() {
        let response = ErrorResponse::from(&CleanseError::NoFile);
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"error":"No file provided"}"#);
    }
}
