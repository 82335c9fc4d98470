use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[cfg(feature = "toml_config")]
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unsupported config file format. Use .json or .toml")]
    UnsupportedFormat,
    #[error("TOML support is not enabled. Enable the 'toml_config' feature to use TOML configs.")]
    TomlNotEnabled,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid pattern for slang term '{slang}': {source}")]
    InvalidPattern {
        slang: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid dictionary entry on line {line}: {reason}")]
    InvalidDictionaryEntry { line: u64, reason: String },
    #[error("Substitution is enabled but no dictionary was provided")]
    MissingDictionary,
    #[error("No file provided")]
    NoFile,
    #[error("File encoding not supported")]
    UnsupportedEncoding,
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),
    #[error("Table '{0}' already exists with a different schema")]
    SchemaMismatch(String),
    #[error("CSV row on line {line} has {found} fields, expected at most {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("CSV file has no columns")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, CleanseError>;
