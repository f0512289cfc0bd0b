pub mod gdal_source;
pub mod memory;
pub mod subdatasets;
pub mod types;
pub mod utils;

pub use gdal_source::GdalOpener;
pub use memory::{MemoryArray, MemoryCatalog, MemoryDataset};
pub use subdatasets::Subdataset;
pub use types::{ArrayInfo, BandInfo, BandType, DimensionInfo};

use crate::coords::GeoTransform;
use crate::error::LoadError;
use crate::scalar::{SampleBuffer, StorageKind};

/// A banded raster as the external library presents it.
pub trait RasterDataset {
    fn description(&self) -> String;

    /// (width, height)
    fn raster_size(&self) -> (usize, usize);

    fn band_count(&self) -> usize;

    /// `index` is 1-based.
    fn band(&self, index: usize) -> Result<BandInfo, LoadError>;

    fn geo_transform(&self) -> Option<GeoTransform>;

    /// Unit of the x and y axes, taken from the spatial reference.
    fn spatial_unit(&self) -> Option<String>;

    /// Default domain `KEY=VALUE` metadata, split.
    fn metadata(&self) -> Vec<(String, String)>;

    /// Raw `SUBDATASETS` domain strings.
    fn subdataset_entries(&self) -> Vec<String>;

    /// Reads `rows` full scanlines of band `band` starting at `first_row`
    /// (counted from the top), converted to `storage`. Cells come back
    /// row-major, `width * rows` of them.
    fn read_rows(
        &self,
        band: usize,
        first_row: usize,
        rows: usize,
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError>;
}

/// The multidimensional view of a dataset: a tree of named N-d arrays.
pub trait MultidimDataset {
    fn arrays(&self) -> Result<Vec<ArrayInfo>, LoadError>;

    /// Attributes of the root group.
    fn attributes(&self) -> Result<Vec<(String, String)>, LoadError>;

    /// Reads a hyperslab in C order (last dimension fastest).
    fn read_block(
        &self,
        array: &str,
        start: &[u64],
        count: &[usize],
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError>;
}

/// Opens datasets by name. Names are file paths or library-specific
/// connection strings such as sub-dataset names.
pub trait DatasetOpener {
    fn open_raster(&self, name: &str) -> Result<Box<dyn RasterDataset + '_>, LoadError>;

    /// `Ok(None)` when `name` has no multidimensional view.
    fn open_multidim(&self, name: &str)
    -> Result<Option<Box<dyn MultidimDataset + '_>>, LoadError>;
}
