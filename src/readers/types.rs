use std::fmt;

use crate::scalar::ScalarKind;

/// Cell type reported by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandType {
    Known(ScalarKind),
    /// A type code the loader has no host representation for.
    Unsupported(String),
}

impl BandType {
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            BandType::Known(kind) => Some(*kind),
            BandType::Unsupported(_) => None,
        }
    }
}

impl From<ScalarKind> for BandType {
    fn from(kind: ScalarKind) -> Self {
        BandType::Known(kind)
    }
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandType::Known(kind) => write!(f, "{}", kind),
            BandType::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// What a source knows about one band of a raster, before any cells are read.
#[derive(Debug, Clone, PartialEq)]
pub struct BandInfo {
    /// 1-based, as GDAL counts bands.
    pub index: usize,
    pub data_type: BandType,
    /// (width, height)
    pub size: (usize, usize),
    pub description: String,
    pub unit: String,
    pub no_data: Option<f64>,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    pub metadata: Vec<(String, String)>,
}

impl BandInfo {
    pub fn new(index: usize, data_type: impl Into<BandType>, size: (usize, usize)) -> Self {
        BandInfo {
            index,
            data_type: data_type.into(),
            size,
            description: String::new(),
            unit: String::new(),
            no_data: None,
            scale: None,
            offset: None,
            metadata: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub size: usize,
    /// Unit of the dimension's indexing variable, if it has one.
    pub unit: String,
}

impl DimensionInfo {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        DimensionInfo {
            name: name.into(),
            size,
            unit: String::new(),
        }
    }
}

/// One array of a multidimensional dataset.
///
/// Dimensions are listed the way GDAL lists them: slowest varying first.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInfo {
    /// Full name including parent groups, e.g. `/forecast/temperature`.
    pub name: String,
    pub dimensions: Vec<DimensionInfo>,
    pub data_type: BandType,
    pub unit: String,
    pub no_data: Option<f64>,
    pub attributes: Vec<(String, String)>,
}

impl ArrayInfo {
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.size).collect()
    }

    pub fn num_elements(&self) -> usize {
        self.dimensions.iter().map(|d| d.size).product()
    }
}

/// Splits `KEY=VALUE` metadata strings. Entries without `=` are dropped.
pub fn split_metadata(entries: &[String]) -> Vec<(String, String)> {
    entries
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
