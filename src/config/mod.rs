use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod error;
pub use error::ConfigError;

pub mod options;
pub use options::{ComplexIntPolicy, LoadMode, RowOrigin};

const DEFAULT_CHUNK_ROWS: usize = 64;
const DEFAULT_CHUNK_ELEMENTS: usize = 1 << 20;
const DEFAULT_SUBDATASET_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    row_origin: RowOrigin,
    complex_integers: ComplexIntPolicy,
    mode: LoadMode,
    recurse_subdatasets: bool,
    max_subdataset_depth: usize,
    chunk_rows: usize,
    chunk_elements: usize,
    inputs: Vec<String>,
    extensions: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            row_origin: RowOrigin::default(),
            complex_integers: ComplexIntPolicy::default(),
            mode: LoadMode::default(),
            recurse_subdatasets: true,
            max_subdataset_depth: DEFAULT_SUBDATASET_DEPTH,
            chunk_rows: DEFAULT_CHUNK_ROWS,
            chunk_elements: DEFAULT_CHUNK_ELEMENTS,
            inputs: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

// Every field is optional; missing ones take the defaults above. Chunk sizes
// must be positive and extensions non-empty.
impl<'de> Deserialize<'de> for LoadConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            row_origin: Option<RowOrigin>,
            complex_integers: Option<ComplexIntPolicy>,
            mode: Option<LoadMode>,
            recurse_subdatasets: Option<bool>,
            max_subdataset_depth: Option<usize>,
            chunk_rows: Option<usize>,
            chunk_elements: Option<usize>,
            inputs: Option<Vec<String>>,
            extensions: Option<Vec<String>>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = LoadConfig::default();

        let chunk_rows = helper.chunk_rows.unwrap_or(defaults.chunk_rows);
        if chunk_rows == 0 {
            return Err(D::Error::custom(ConfigError::ChunkRows));
        }

        let chunk_elements = helper.chunk_elements.unwrap_or(defaults.chunk_elements);
        if chunk_elements == 0 {
            return Err(D::Error::custom(ConfigError::ChunkElements));
        }

        // Extensions are matched without the leading dot, case-insensitively
        let extensions = helper
            .extensions
            .unwrap_or_default()
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect::<Vec<_>>();
        if extensions.iter().any(|ext| ext.is_empty()) {
            return Err(D::Error::custom(ConfigError::EmptyExtension));
        }

        Ok(LoadConfig {
            row_origin: helper.row_origin.unwrap_or(defaults.row_origin),
            complex_integers: helper.complex_integers.unwrap_or(defaults.complex_integers),
            mode: helper.mode.unwrap_or(defaults.mode),
            recurse_subdatasets: helper
                .recurse_subdatasets
                .unwrap_or(defaults.recurse_subdatasets),
            max_subdataset_depth: helper
                .max_subdataset_depth
                .unwrap_or(defaults.max_subdataset_depth),
            chunk_rows,
            chunk_elements,
            inputs: helper.inputs.unwrap_or_default(),
            extensions,
        })
    }
}

impl LoadConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LoadConfig, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: LoadConfig = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn row_origin(&self) -> RowOrigin {
        self.row_origin
    }

    pub fn complex_integers(&self) -> ComplexIntPolicy {
        self.complex_integers
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn recurse_subdatasets(&self) -> bool {
        self.recurse_subdatasets
    }

    pub fn max_subdataset_depth(&self) -> usize {
        self.max_subdataset_depth
    }

    pub fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }

    pub fn chunk_elements(&self) -> usize {
        self.chunk_elements
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn with_row_origin(mut self, row_origin: RowOrigin) -> Self {
        self.row_origin = row_origin;
        self
    }

    pub fn with_complex_integers(mut self, policy: ComplexIntPolicy) -> Self {
        self.complex_integers = policy;
        self
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_recurse_subdatasets(mut self, recurse: bool) -> Self {
        self.recurse_subdatasets = recurse;
        self
    }

    pub fn with_max_subdataset_depth(mut self, depth: usize) -> Self {
        self.max_subdataset_depth = depth;
        self
    }

    /// Zero is clamped to one row.
    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows.max(1);
        self
    }

    /// Zero is clamped to one cell.
    pub fn with_chunk_elements(mut self, elements: usize) -> Self {
        self.chunk_elements = elements.max(1);
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "row_origin": "top_left",
        "complex_integers": "gaussian",
        "mode": "multidim",
        "chunk_rows": 16,
        "inputs": ["data/*.tif"],
        "extensions": [".TIF", "nc"]
    }
    "#;

        file.write_all(config_data.as_bytes()).unwrap();

        let config = LoadConfig::from_file(file_path).unwrap();

        assert_eq!(config.row_origin(), RowOrigin::TopLeft);
        assert_eq!(config.complex_integers(), ComplexIntPolicy::Gaussian);
        assert_eq!(config.mode(), LoadMode::Multidim);
        assert_eq!(config.chunk_rows(), 16);
        assert_eq!(config.inputs(), ["data/*.tif".to_string()]);
        assert_eq!(config.extensions(), ["tif".to_string(), "nc".to_string()]);

        // Untouched fields keep their defaults
        assert!(config.recurse_subdatasets());
        assert_eq!(config.max_subdataset_depth(), DEFAULT_SUBDATASET_DEPTH);
        assert_eq!(config.chunk_elements(), DEFAULT_CHUNK_ELEMENTS);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: LoadConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LoadConfig::default());
    }

    #[test]
    fn test_zero_chunk_rows_rejected() {
        let err = serde_json::from_str::<LoadConfig>(r#"{"chunk_rows": 0}"#).unwrap_err();
        assert!(err.to_string().contains("chunk_rows"));

        let err = serde_json::from_str::<LoadConfig>(r#"{"chunk_elements": 0}"#).unwrap_err();
        assert!(err.to_string().contains("chunk_elements"));
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(serde_json::from_str::<LoadConfig>(r#"{"row_origin": "middle"}"#).is_err());
        assert!(serde_json::from_str::<LoadConfig>(r#"{"extensions": ["."]}"#).is_err());
        assert!(serde_json::from_str::<LoadConfig>(r#"{"bbox": 1}"#).is_err());
    }

    #[test]
    fn test_builders() {
        let config = LoadConfig::default()
            .with_inputs(vec!["a.tif".to_string()])
            .with_chunk_rows(0)
            .with_mode(LoadMode::Multidim);
        assert_eq!(config.inputs(), ["a.tif".to_string()]);
        assert_eq!(config.chunk_rows(), 1);
        assert_eq!(config.mode(), LoadMode::Multidim);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = LoadConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
