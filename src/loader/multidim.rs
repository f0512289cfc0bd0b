use log::{debug, warn};

use crate::bundle::DataBundle;
use crate::config::LoadConfig;
use crate::coords::{Axis, CoordinateSpace};
use crate::dimensioned::DimensionedArray;
use crate::error::LoadError;
use crate::readers::{ArrayInfo, MultidimDataset};
use crate::scalar::{Element, ScalarKind, StorageKind, with_storage};

/// Loads every supported array of a multidimensional dataset.
pub(crate) fn load_arrays(
    dataset: &dyn MultidimDataset,
    config: &LoadConfig,
) -> Result<DataBundle, LoadError> {
    let mut bundle = DataBundle::default();

    for info in dataset.arrays()? {
        let kind = match info.data_type.kind() {
            Some(kind) if kind.is_complex() => {
                warn!("Ignoring complex array {} ({})", info.name, kind);
                continue;
            }
            Some(kind) => kind,
            None => {
                warn!(
                    "Ignoring unknown data type {} of array {}",
                    info.data_type, info.name
                );
                continue;
            }
        };

        debug!("array {} {} {:?}", info.name, kind, info.shape());
        let storage = kind.storage(config.complex_integers());
        let loaded = with_storage!(storage, T => {
            T::into_loaded(fill::<T>(dataset, &info, kind, storage, config)?)
        });
        bundle.push_loaded(loaded);
    }

    Ok(bundle)
}

/// Number of slowest-axis slices read at once so a read holds at most
/// `chunk_elements` cells, never less than one slice.
fn slices_per_read(slice_len: usize, chunk_elements: usize) -> usize {
    (chunk_elements / slice_len.max(1)).max(1)
}

fn fill<T: Element>(
    dataset: &dyn MultidimDataset,
    info: &ArrayInfo,
    kind: ScalarKind,
    storage: StorageKind,
    config: &LoadConfig,
) -> Result<DimensionedArray<T>, LoadError> {
    let shape = info.shape();
    let total = info.num_elements();
    let mut data: Vec<T> = Vec::with_capacity(total);

    if shape.is_empty() {
        data = T::from_buffer(dataset.read_block(&info.name, &[], &[], storage)?)?;
    } else if total > 0 {
        let slice_len: usize = shape[1..].iter().product();
        let per_read = slices_per_read(slice_len, config.chunk_elements());

        let mut first = 0;
        while first < shape[0] {
            let n = per_read.min(shape[0] - first);
            let mut start = vec![0u64; shape.len()];
            start[0] = first as u64;
            let mut count = shape.clone();
            count[0] = n;

            let cells = T::from_buffer(dataset.read_block(&info.name, &start, &count, storage)?)?;
            if cells.len() != n * slice_len {
                return Err(LoadError::ShortRead {
                    name: info.name.clone(),
                    expected: n * slice_len,
                    found: cells.len(),
                });
            }
            data.extend_from_slice(&cells);
            first += n;
        }
    }

    if data.len() != total {
        return Err(LoadError::ShortRead {
            name: info.name.clone(),
            expected: total,
            found: data.len(),
        });
    }

    // GDAL lists the fastest dimension last; the host wants it first. C order
    // over the GDAL shape is column-major order over the reversed shape.
    let host_dims: Vec<usize> = shape.iter().rev().copied().collect();
    let axis_names: Vec<&str> = info
        .dimensions
        .iter()
        .rev()
        .map(|d| d.name.as_str())
        .collect();

    let axes = info
        .dimensions
        .iter()
        .rev()
        .map(|d| Axis {
            unit: d.unit.clone(),
            ..Axis::identity(d.name.as_str())
        })
        .collect();
    let mut array = DimensionedArray::from_column_major(info.name.as_str(), &host_dims, data)?
        .with_space(CoordinateSpace::new(axes));

    array.set_metadata("data_type", kind.gdal_name());
    array.set_metadata("dimensions", axis_names.join(","));
    if !info.unit.is_empty() {
        array.set_metadata("unit", info.unit.as_str());
    }
    if let Some(no_data) = info.no_data {
        array.set_metadata("no_data", no_data.to_string());
    }
    for (key, value) in &info.attributes {
        array.set_metadata(key.as_str(), value.as_str());
    }
    Ok(array)
}
