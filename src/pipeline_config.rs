
use serde::{Deserialize, Serialize};
use std::{fmt::Display, fs, path::{Path, PathBuf}, sync::Arc};

use crate::{
    dictionary::{SlangDictionary, DEFAULT_DICTIONARY_ENCODING},
    encoding::DEFAULT_FALLBACK_ENCODINGS,
    error::{CleanseError, Result},
    pipeline::Pipeline,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Headerless `slang,formal` CSV. Loaded once when a pipeline is built.
    pub dictionary_path: Option<PathBuf>,
    pub dictionary_encoding: String,
    pub enable_substitution: bool,
    /// Tried in order when the detected upload encoding fails.
    pub fallback_encodings: Vec<String>,
    pub output_dir: PathBuf,
    pub write_clean_csv: bool,
    /// JSON file holding stored records; `None` keeps them in memory only.
    pub store_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            dictionary_path: None,
            dictionary_encoding: DEFAULT_DICTIONARY_ENCODING.to_string(),
            enable_substitution: false,
            fallback_encodings: DEFAULT_FALLBACK_ENCODINGS.iter().map(|e| e.to_string()).collect(),
            output_dir: PathBuf::from("uploads"),
            write_clean_csv: true,
            store_path: Some(PathBuf::from("db.json")),
        }
    }
}

impl PipelineConfig {
    /// Reads a `.json`/`.toml` file when `config` is an existing path,
    /// otherwise parses `config` itself as JSON, then TOML.
    pub fn from_config(config: &str) -> Result<PipelineConfig> {
        if Path::new(config).exists() {
            let config_content = fs::read_to_string(config)?;
            if config.ends_with(".json") {
                Ok(serde_json::from_str(&config_content)?)
            } else if config.ends_with(".toml") {
                #[cfg(feature = "toml_config")]
                {
                    Ok(toml::from_str(&config_content)?)
                }
                #[cfg(not(feature = "toml_config"))]
                {
                    Err(CleanseError::TomlNotEnabled)
                }
            } else {
                Err(CleanseError::UnsupportedFormat)
            }
        } else {
            // inline document: JSON wins, TOML only with `toml_config`
            serde_json::from_str(config).or_else(|_| {
                #[cfg(feature = "toml_config")]
                {
                    toml::from_str(config).map_err(|e| e.into())
                }
                #[cfg(not(feature = "toml_config"))]
                {
                    Err(CleanseError::UnsupportedFormat)
                }
            })
        }
    }

    /// Loads the configured dictionary, if any.
    pub fn load_dictionary(&self) -> Result<Option<SlangDictionary>> {
        self.dictionary_path
            .as_ref()
            .map(|path| SlangDictionary::from_path(path, &self.dictionary_encoding))
            .transpose()
    }

    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let mut builder = Pipeline::new().with_substitution(self.enable_substitution);
        if let Some(dictionary) = self.load_dictionary()? {
            builder = builder.with_dictionary(Arc::new(dictionary));
        }
        builder.build()
    }
}

impl Display for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_json_fills_defaults() {
        let config = PipelineConfig::from_config(r#"{"enable_substitution": true}"#).unwrap();
        assert!(config.enable_substitution);
        assert_eq!(config.dictionary_encoding, "ISO-8859-1");
        assert_eq!(config.fallback_encodings, vec!["latin1", "iso-8859-1", "cp1252"]);
        assert_eq!(config.output_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_store_path_can_be_disabled() {
        assert_eq!(PipelineConfig::default().store_path, Some(PathBuf::from("db.json")));
        let config = PipelineConfig::from_config(r#"{"store_path": null}"#).unwrap();
        assert_eq!(config.store_path, None);
        let config = PipelineConfig::from_config(r#"{"store_path": "data/records.json"}"#).unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("data/records.json")));
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleanser.json");
        fs::write(&path, r#"{"write_clean_csv": false, "fallback_encodings": ["cp1252"]}"#).unwrap();

        let config = PipelineConfig::from_config(path.to_str().unwrap()).unwrap();
        assert!(!config.write_clean_csv);
        assert_eq!(config.fallback_encodings, vec!["cp1252"]);
    }

    #[test]
    fn test_unknown_file_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleanser.yaml");
        fs::write(&path, "enable_substitution: true").unwrap();

        assert!(matches!(
            PipelineConfig::from_config(path.to_str().unwrap()),
            Err(CleanseError::UnsupportedFormat)
        ));
    }

    #[cfg(feature = "toml_config")]
    #[test]
    fn test_inline_toml() {
        let config = PipelineConfig::from_config("enable_substitution = true\noutput_dir = \"out\"").unwrap();
        assert!(config.enable_substitution);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_build_pipeline_loads_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kamus.csv");
        fs::write(&path, "bgt,banget\n").unwrap();

        let config = PipelineConfig {
            dictionary_path: Some(path),
            enable_substitution: true,
            ..PipelineConfig::default()
        };
        let pipeline = config.build_pipeline().unwrap();
        assert_eq!(pipeline.process("keren bgt!!"), "keren banget");
    }

    #[test]
    fn test_substitution_without_dictionary_fails() {
        let config = PipelineConfig {
            enable_substitution: true,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.build_pipeline(),
            Err(CleanseError::MissingDictionary)
        ));
    }

    #[test]
    fn test_display_is_json() {
        let rendered = PipelineConfig::default().to_string();
        let parsed = PipelineConfig::from_config(&rendered).unwrap();
        assert_eq!(parsed, PipelineConfig::default());
    }
}
