//! Loads GDAL rasters and multidimensional arrays into typed, dimensioned
//! arrays grouped by cell type.

pub mod bundle;
pub mod config;
pub mod coords;
pub mod dimensioned;
pub mod error;
pub mod inputs;
pub mod loader;
pub mod readers;
pub mod scalar;

pub use bundle::{DataBundle, LoadedArray};
pub use config::{ComplexIntPolicy, LoadConfig, LoadMode, RowOrigin};
pub use coords::{Axis, CoordinateSpace, GeoTransform};
pub use dimensioned::DimensionedArray;
pub use error::LoadError;
pub use loader::Loader;
pub use scalar::{Element, SampleBuffer, ScalarKind, StorageKind};
