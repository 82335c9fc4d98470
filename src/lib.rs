mod cleaner;
mod dictionary;
mod encoding;
mod error;
mod pipeline;
mod pipeline_config;
mod service;
mod store;
mod substitutor;
mod table;

pub use cleaner::{cleanse, try_cleanse, Cleanser, TextCleaner};
pub use dictionary::{SlangDictionary, SlangEntry, DEFAULT_DICTIONARY_ENCODING};
pub use encoding::{decode, decode_with, decode_with_label, DecodedText, DEFAULT_FALLBACK_ENCODINGS};
pub use error::{CleanseError, Result};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use pipeline_config::PipelineConfig;
pub use service::{
    CleanseRequest, CleanseResponse, CleansingService, ErrorResponse, UploadResponse,
    UploadedFile, UPLOAD_SUCCESS_MESSAGE,
};
pub use store::{FileStore, MemoryStore, RecordStore, StoredTable, TextRecord};
pub use substitutor::{substitute, DictionarySubstitutor};
pub use table::{Cell, CleanReport, Column, ColumnType, Table, TableSchema};
