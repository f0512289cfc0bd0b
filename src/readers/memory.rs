use std::collections::HashMap;

use super::types::{ArrayInfo, BandInfo, BandType, DimensionInfo};
use super::{DatasetOpener, MultidimDataset, RasterDataset};
use crate::coords::GeoTransform;
use crate::error::LoadError;
use crate::scalar::{SampleBuffer, ScalarKind, StorageKind};

/// A band held in memory, row-major from the top scanline.
///
/// Complex integer bands keep their cells as Gaussian integers; reads
/// widen them on request.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBand {
    pub info: BandInfo,
    pub data: SampleBuffer,
}

/// An N-d array held in memory in C order.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryArray {
    pub info: ArrayInfo,
    pub data: SampleBuffer,
}

impl MemoryArray {
    /// `dims` are (name, size) pairs, slowest varying first.
    pub fn new(
        name: impl Into<String>,
        dims: &[(&str, usize)],
        data_type: impl Into<BandType>,
        data: SampleBuffer,
    ) -> Self {
        MemoryArray {
            info: ArrayInfo {
                name: name.into(),
                dimensions: dims
                    .iter()
                    .map(|&(n, s)| DimensionInfo::new(n, s))
                    .collect(),
                data_type: data_type.into(),
                unit: String::new(),
                no_data: None,
                attributes: Vec::new(),
            },
            data,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.info.unit = unit.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.attributes.push((key.into(), value.into()));
        self
    }

    /// Sets the unit of dimension `name`, if the array has one.
    pub fn with_dimension_unit(mut self, name: &str, unit: impl Into<String>) -> Self {
        if let Some(dim) = self.info.dimensions.iter_mut().find(|d| d.name == name) {
            dim.unit = unit.into();
        }
        self
    }
}

/// A dataset built by hand: bands, metadata, sub-dataset listings and
/// multidimensional arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDataset {
    description: String,
    size: (usize, usize),
    bands: Vec<MemoryBand>,
    geo_transform: Option<GeoTransform>,
    spatial_unit: Option<String>,
    metadata: Vec<(String, String)>,
    subdatasets: Vec<String>,
    arrays: Vec<MemoryArray>,
}

impl MemoryDataset {
    pub fn new(description: impl Into<String>, width: usize, height: usize) -> Self {
        MemoryDataset {
            description: description.into(),
            size: (width, height),
            ..Default::default()
        }
    }

    /// Adds a band covering the whole raster.
    pub fn with_band(self, kind: ScalarKind, data: SampleBuffer) -> Self {
        let index = self.bands.len() + 1;
        let info = BandInfo::new(index, kind, self.size);
        self.with_band_info(info, data)
    }

    /// Adds a band with explicit info; `info.index` is overwritten.
    pub fn with_band_info(mut self, mut info: BandInfo, data: SampleBuffer) -> Self {
        info.index = self.bands.len() + 1;
        self.bands.push(MemoryBand { info, data });
        self
    }

    pub fn with_geo_transform(mut self, gt: GeoTransform) -> Self {
        self.geo_transform = Some(gt);
        self
    }

    pub fn with_spatial_unit(mut self, unit: impl Into<String>) -> Self {
        self.spatial_unit = Some(unit.into());
        self
    }

    /// Adds a default domain entry. In the multidimensional view entries
    /// are root group attributes.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Lists `name` as the next sub-dataset.
    pub fn with_subdataset(mut self, name: &str, description: &str) -> Self {
        let n = self
            .subdatasets
            .iter()
            .filter(|e| e.starts_with("SUBDATASET_") && e.contains("_NAME="))
            .count()
            + 1;
        self.subdatasets
            .push(format!("SUBDATASET_{}_NAME={}", n, name));
        self.subdatasets
            .push(format!("SUBDATASET_{}_DESC={}", n, description));
        self
    }

    /// Adds a raw `SUBDATASETS` domain string.
    pub fn with_subdataset_entry(mut self, entry: impl Into<String>) -> Self {
        self.subdatasets.push(entry.into());
        self
    }

    pub fn with_array(mut self, array: MemoryArray) -> Self {
        self.arrays.push(array);
        self
    }

    fn band_ref(&self, index: usize) -> Result<&MemoryBand, LoadError> {
        index
            .checked_sub(1)
            .and_then(|i| self.bands.get(i))
            .ok_or_else(|| LoadError::MissingBand {
                dataset: self.description.clone(),
                band: index,
            })
    }
}

impl RasterDataset for MemoryDataset {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn raster_size(&self) -> (usize, usize) {
        self.size
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band(&self, index: usize) -> Result<BandInfo, LoadError> {
        Ok(self.band_ref(index)?.info.clone())
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }

    fn spatial_unit(&self) -> Option<String> {
        self.spatial_unit.clone()
    }

    fn metadata(&self) -> Vec<(String, String)> {
        self.metadata.clone()
    }

    fn subdataset_entries(&self) -> Vec<String> {
        self.subdatasets.clone()
    }

    fn read_rows(
        &self,
        band: usize,
        first_row: usize,
        rows: usize,
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError> {
        let band_ref = self.band_ref(band)?;
        let (width, height) = band_ref.info.size;
        if first_row + rows > height {
            return Err(LoadError::Window {
                name: format!("{} band {}", self.description, band),
                start: vec![first_row as u64, 0],
                count: vec![rows, width],
            });
        }

        let indices: Vec<usize> = (first_row * width..(first_row + rows) * width).collect();
        if band_ref.data.len() < width * height {
            return Err(LoadError::ShortRead {
                name: self.description.clone(),
                expected: width * height,
                found: band_ref.data.len(),
            });
        }
        band_ref.data.gather(&indices).convert(storage)
    }
}

impl MultidimDataset for MemoryDataset {
    fn arrays(&self) -> Result<Vec<ArrayInfo>, LoadError> {
        Ok(self.arrays.iter().map(|a| a.info.clone()).collect())
    }

    fn attributes(&self) -> Result<Vec<(String, String)>, LoadError> {
        Ok(self.metadata.clone())
    }

    fn read_block(
        &self,
        array: &str,
        start: &[u64],
        count: &[usize],
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError> {
        let found = self
            .arrays
            .iter()
            .find(|a| a.info.name == array)
            .ok_or_else(|| LoadError::MissingArray(array.to_string()))?;

        let shape = found.info.shape();
        let indices =
            hyperslab_indices(&shape, start, count).ok_or_else(|| LoadError::Window {
                name: array.to_string(),
                start: start.to_vec(),
                count: count.to_vec(),
            })?;
        if found.data.len() < found.info.num_elements() {
            return Err(LoadError::ShortRead {
                name: array.to_string(),
                expected: found.info.num_elements(),
                found: found.data.len(),
            });
        }
        found.data.gather(&indices).convert(storage)
    }
}

/// Flat C-order offsets of the cells in `start .. start + count`, or `None`
/// when the window leaves `shape`.
fn hyperslab_indices(shape: &[usize], start: &[u64], count: &[usize]) -> Option<Vec<usize>> {
    if start.len() != shape.len() || count.len() != shape.len() {
        return None;
    }
    let start: Vec<usize> = start.iter().map(|&s| s as usize).collect();
    if shape
        .iter()
        .zip(start.iter().zip(count))
        .any(|(&dim, (&s, &c))| s + c > dim)
    {
        return None;
    }

    let total: usize = count.iter().product();
    let mut out = Vec::with_capacity(total);
    if total == 0 {
        return Some(out);
    }

    let mut cursor = vec![0usize; shape.len()];
    loop {
        let mut offset = 0;
        for axis in 0..shape.len() {
            offset = offset * shape[axis] + start[axis] + cursor[axis];
        }
        out.push(offset);

        // Odometer step, last axis fastest
        let mut axis = shape.len();
        loop {
            if axis == 0 {
                return Some(out);
            }
            axis -= 1;
            cursor[axis] += 1;
            if cursor[axis] < count[axis] {
                break;
            }
            cursor[axis] = 0;
        }
    }
}

/// Named [`MemoryDataset`]s, so sub-dataset names can be resolved.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    datasets: HashMap<String, MemoryDataset>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, dataset: MemoryDataset) {
        self.datasets.insert(name.into(), dataset);
    }

    pub fn with(mut self, name: impl Into<String>, dataset: MemoryDataset) -> Self {
        self.insert(name, dataset);
        self
    }

    fn get(&self, name: &str) -> Result<&MemoryDataset, LoadError> {
        self.datasets
            .get(name)
            .ok_or_else(|| LoadError::MissingDataset(name.to_string()))
    }
}

impl DatasetOpener for MemoryCatalog {
    fn open_raster(&self, name: &str) -> Result<Box<dyn RasterDataset + '_>, LoadError> {
        Ok(Box::new(self.get(name)?.clone()))
    }

    fn open_multidim(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn MultidimDataset + '_>>, LoadError> {
        let dataset = self.get(name)?;
        if dataset.arrays.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Box::new(dataset.clone())))
        }
    }
}
