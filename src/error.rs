use thiserror::Error;

use crate::scalar::StorageKind;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("{dataset}: data has multiple different band types ({expected} in band 1, {found} in band {band})")]
    MixedBandTypes {
        dataset: String,
        band: usize,
        expected: String,
        found: String,
    },

    #[error("{dataset}: data has multiple band resolutions (band {band} is {found:?}, raster is {expected:?})")]
    MixedBandResolutions {
        dataset: String,
        band: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("malformed sub-dataset entry `{entry}`: {reason}")]
    MalformedSubdataset { entry: String, reason: &'static str },

    #[error("sub-datasets nested deeper than {limit} levels at `{name}`")]
    SubdatasetDepth { name: String, limit: usize },

    #[error("expected a {expected} buffer, got {found}")]
    BufferMismatch {
        expected: StorageKind,
        found: StorageKind,
    },

    #[error("cannot convert {from} cells to {to}")]
    UnsupportedConversion { from: StorageKind, to: StorageKind },

    #[error("short read from `{name}`: expected {expected} cells, got {found}")]
    ShortRead {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("raster I/O on band {band} failed (CPLErr {code})")]
    RasterIo { band: usize, code: u32 },

    #[error("no dataset named `{0}`")]
    MissingDataset(String),

    #[error("`{dataset}` has no band {band}")]
    MissingBand { dataset: String, band: usize },

    #[error("no array named `{0}`")]
    MissingArray(String),

    #[error("read window {start:?}+{count:?} lies outside array `{name}`")]
    Window {
        name: String,
        start: Vec<u64>,
        count: Vec<usize>,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error("name contains a NUL byte: {0}")]
    Nul(#[from] std::ffi::NulError),
}
