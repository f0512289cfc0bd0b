use log::{debug, info, warn};

use crate::bundle::LoadedArray;
use crate::config::{LoadConfig, RowOrigin};
use crate::coords::CoordinateSpace;
use crate::dimensioned::DimensionedArray;
use crate::error::LoadError;
use crate::readers::{BandInfo, RasterDataset};
use crate::scalar::{Element, ScalarKind, StorageKind, with_storage};

/// Checks that every band shares one type and the raster's size.
pub(crate) fn collect_bands(dataset: &dyn RasterDataset) -> Result<Vec<BandInfo>, LoadError> {
    let raster_size = dataset.raster_size();
    let mut bands: Vec<BandInfo> = Vec::with_capacity(dataset.band_count());

    for index in 1..=dataset.band_count() {
        let band = dataset.band(index)?;
        if let Some(first) = bands.first()
            && band.data_type != first.data_type
        {
            return Err(LoadError::MixedBandTypes {
                dataset: dataset.description(),
                band: index,
                expected: first.data_type.to_string(),
                found: band.data_type.to_string(),
            });
        }
        if band.size != raster_size {
            return Err(LoadError::MixedBandResolutions {
                dataset: dataset.description(),
                band: index,
                expected: raster_size,
                found: band.size,
            });
        }
        debug!(
            "   band {} {} {}",
            index, band.data_type, band.description
        );
        bands.push(band);
    }

    Ok(bands)
}

/// Loads every band of `dataset` into one array, or `None` when the band
/// type has no host representation.
pub(crate) fn load_bands(
    dataset: &dyn RasterDataset,
    config: &LoadConfig,
) -> Result<Option<LoadedArray>, LoadError> {
    let (width, height) = dataset.raster_size();
    info!(
        " x size {}, y size {}, rasters {}",
        width,
        height,
        dataset.band_count()
    );

    let bands = collect_bands(dataset)?;
    let Some(first) = bands.first() else {
        return Ok(None);
    };
    let Some(kind) = first.data_type.kind() else {
        warn!(
            "Ignoring unknown data type {} in {}",
            first.data_type,
            dataset.description()
        );
        return Ok(None);
    };

    let storage = kind.storage(config.complex_integers());
    let loaded = with_storage!(storage, T => {
        T::into_loaded(fill::<T>(dataset, &bands, kind, storage, config)?)
    });
    info!("data loaded");
    Ok(Some(loaded))
}

/// Host row that GDAL row `row` of a `height` tall raster lands on.
fn host_row(row: usize, height: usize, origin: RowOrigin) -> usize {
    match origin {
        RowOrigin::BottomLeft => height - 1 - row,
        RowOrigin::TopLeft => row,
    }
}

fn fill<T: Element>(
    dataset: &dyn RasterDataset,
    bands: &[BandInfo],
    kind: ScalarKind,
    storage: StorageKind,
    config: &LoadConfig,
) -> Result<DimensionedArray<T>, LoadError> {
    let (width, height) = dataset.raster_size();
    let planes = bands.len();
    let dims = if planes == 1 {
        vec![width, height]
    } else {
        vec![width, height, planes]
    };
    let plane_len = width * height;
    let origin = config.row_origin();
    let chunk_rows = config.chunk_rows().max(1);

    let mut data = vec![T::default(); plane_len * planes];

    for (plane, band) in bands.iter().enumerate() {
        if plane_len == 0 {
            break;
        }
        let mut first_row = 0;
        while first_row < height {
            let rows = chunk_rows.min(height - first_row);
            let cells = T::from_buffer(dataset.read_rows(band.index, first_row, rows, storage)?)?;
            if cells.len() != width * rows {
                return Err(LoadError::ShortRead {
                    name: format!("{} band {}", dataset.description(), band.index),
                    expected: width * rows,
                    found: cells.len(),
                });
            }

            for (k, line) in cells.chunks_exact(width).enumerate() {
                let start = plane * plane_len + host_row(first_row + k, height, origin) * width;
                data[start..start + width].copy_from_slice(line);
            }
            first_row += rows;
        }
    }

    let mut array = DimensionedArray::from_column_major(dataset.description(), &dims, data)?;
    let band_axis = planes > 1;
    let mut space = match dataset.geo_transform() {
        Some(gt) => {
            if CoordinateSpace::is_rotated(&gt) {
                warn!(
                    "{} has a rotated geotransform; rotation terms are kept as metadata only",
                    dataset.description()
                );
                array.set_metadata("geotransform", format!("{:?}", gt));
            }
            CoordinateSpace::from_geo_transform(&gt, height, origin, band_axis)
        }
        None if band_axis => CoordinateSpace::identity(&["x", "y", "band"]),
        None => CoordinateSpace::identity(&["x", "y"]),
    };
    if let Some(unit) = dataset.spatial_unit() {
        for axis in 0..2 {
            if let Some(axis) = space.axis_mut(axis) {
                axis.unit = unit.clone();
            }
        }
    }
    let mut array = array.with_space(space);

    array.set_metadata("data_type", kind.gdal_name());
    array.set_metadata("row_origin", origin.to_string());
    describe_bands(&mut array, bands);
    Ok(array)
}

/// Copies per-band descriptions, units, scaling and key/value attributes
/// into `band.<n>.<key>` metadata entries.
fn describe_bands<T>(array: &mut DimensionedArray<T>, bands: &[BandInfo]) {
    for band in bands {
        let prefix = format!("band.{}", band.index);
        if !band.description.is_empty() {
            array.set_metadata(format!("{}.description", prefix), band.description.as_str());
        }
        if !band.unit.is_empty() {
            array.set_metadata(format!("{}.unit", prefix), band.unit.as_str());
        }
        if let Some(no_data) = band.no_data {
            array.set_metadata(format!("{}.no_data", prefix), no_data.to_string());
        }
        if let Some(scale) = band.scale {
            array.set_metadata(format!("{}.scale", prefix), scale.to_string());
        }
        if let Some(offset) = band.offset {
            array.set_metadata(format!("{}.offset", prefix), offset.to_string());
        }
        for (key, value) in &band.metadata {
            array.set_metadata(format!("{}.{}", prefix, key), value.as_str());
        }
    }

    // A unit shared by every band is the unit of the whole array
    if let Some(first) = bands.first()
        && !first.unit.is_empty()
        && bands.iter().all(|b| b.unit == first.unit)
    {
        array.set_metadata("unit", first.unit.as_str());
    }
}
