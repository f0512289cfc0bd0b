use std::ffi::{CStr, CString, c_char, c_int, c_void};

use gdal::cpl::CslStringList;
use gdal::raster::{Attribute, GdalDataType, GdalType, Group, MDArray, RasterBand};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags, Metadata};
use gdal_sys::{
    CPLErr, GDALAttributeH, GDALDataType, GDALGroupH, GDALMDArrayH, GDALRWFlag,
};
use log::debug;

use super::types::{ArrayInfo, BandInfo, BandType, DimensionInfo, split_metadata};
use super::{DatasetOpener, MultidimDataset, RasterDataset};
use crate::coords::GeoTransform;
use crate::error::LoadError;
use crate::scalar::{Complex32, Complex64, Gaussian16, Gaussian32, SampleBuffer, ScalarKind, StorageKind};

/// Opens datasets through GDAL. Drivers must be registered, which the
/// `gdal` crate does on first open.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalOpener;

impl DatasetOpener for GdalOpener {
    fn open_raster(&self, name: &str) -> Result<Box<dyn RasterDataset + '_>, LoadError> {
        let dataset = Dataset::open(name)?;
        Ok(Box::new(GdalRaster {
            name: name.to_string(),
            dataset,
        }))
    }

    fn open_multidim(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn MultidimDataset + '_>>, LoadError> {
        let options = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_MULTIDIM_RASTER,
            ..Default::default()
        };

        // Most raster drivers have no multidimensional API
        let dataset = match Dataset::open_ex(name, options) {
            Ok(dataset) => dataset,
            Err(e) => {
                debug!("{} has no multidimensional view: {}", name, e);
                return Ok(None);
            }
        };
        if let Err(e) = dataset.root_group() {
            debug!("{} has no root group: {}", name, e);
            return Ok(None);
        }

        Ok(Some(Box::new(GdalMultidim { dataset })))
    }
}

struct GdalRaster {
    name: String,
    dataset: Dataset,
}

fn scalar_kind(data_type: GdalDataType) -> Option<ScalarKind> {
    #[allow(unreachable_patterns)]
    match data_type {
        GdalDataType::UInt8 => Some(ScalarKind::UInt8),
        GdalDataType::Int8 => Some(ScalarKind::Int8),
        GdalDataType::UInt16 => Some(ScalarKind::UInt16),
        GdalDataType::Int16 => Some(ScalarKind::Int16),
        GdalDataType::UInt32 => Some(ScalarKind::UInt32),
        GdalDataType::Int32 => Some(ScalarKind::Int32),
        GdalDataType::UInt64 => Some(ScalarKind::UInt64),
        GdalDataType::Int64 => Some(ScalarKind::Int64),
        GdalDataType::Float32 => Some(ScalarKind::Float32),
        GdalDataType::Float64 => Some(ScalarKind::Float64),
        _ => None,
    }
}

// GdalDataType has no complex variants, so complex bands are told apart
// by their raw type code.
fn complex_kind(code: GDALDataType::Type) -> Option<ScalarKind> {
    match code {
        GDALDataType::GDT_CInt16 => Some(ScalarKind::CInt16),
        GDALDataType::GDT_CInt32 => Some(ScalarKind::CInt32),
        GDALDataType::GDT_CFloat32 => Some(ScalarKind::CFloat32),
        GDALDataType::GDT_CFloat64 => Some(ScalarKind::CFloat64),
        _ => None,
    }
}

/// Copies a string GDAL keeps ownership of.
fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn type_name(code: GDALDataType::Type) -> String {
    let name = unsafe { gdal_sys::GDALGetDataTypeName(code) };
    if name.is_null() {
        return format!("type {}", code);
    }
    c_string(name)
}

fn band_type(band: &RasterBand) -> BandType {
    if let Some(kind) = scalar_kind(band.band_type()) {
        return BandType::Known(kind);
    }
    let code = unsafe { gdal_sys::GDALGetRasterDataType(band.c_rasterband()) };
    match complex_kind(code) {
        Some(kind) => BandType::Known(kind),
        None => BandType::Unsupported(type_name(code)),
    }
}

fn read_real<T: GdalType + Copy>(
    band: &RasterBand,
    window: (isize, isize),
    size: (usize, usize),
) -> Result<Vec<T>, LoadError> {
    let (_, data) = band.read_as::<T>(window, size, size, None)?.into_shape_and_vec();
    Ok(data)
}

/// Reads complex cells with `GDALRasterIO`, letting GDAL convert from the
/// band type to `buffer_type`. `T` must have the layout of `buffer_type`:
/// two packed parts of the matching width.
fn read_complex<T: Copy + Default>(
    band: &RasterBand,
    index: usize,
    window: (isize, isize),
    size: (usize, usize),
    buffer_type: GDALDataType::Type,
) -> Result<Vec<T>, LoadError> {
    let mut data = vec![T::default(); size.0 * size.1];
    // SAFETY: `data` holds exactly size.0 * size.1 cells of `buffer_type`
    // and outlives the call.
    let rv = unsafe {
        gdal_sys::GDALRasterIO(
            band.c_rasterband(),
            GDALRWFlag::GF_Read,
            window.0 as c_int,
            window.1 as c_int,
            size.0 as c_int,
            size.1 as c_int,
            data.as_mut_ptr() as *mut c_void,
            size.0 as c_int,
            size.1 as c_int,
            buffer_type,
            0,
            0,
        )
    };
    if rv != CPLErr::CE_None {
        return Err(LoadError::RasterIo {
            band: index,
            code: rv as u32,
        });
    }
    Ok(data)
}

impl RasterDataset for GdalRaster {
    fn description(&self) -> String {
        match self.dataset.description() {
            Ok(description) if !description.is_empty() => description,
            _ => self.name.clone(),
        }
    }

    fn raster_size(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }

    fn band_count(&self) -> usize {
        self.dataset.raster_count()
    }

    fn band(&self, index: usize) -> Result<BandInfo, LoadError> {
        let band = self.dataset.rasterband(index)?;
        let mut info = BandInfo::new(index, band_type(&band), band.size());
        info.description = band.description().unwrap_or_default();
        info.unit = band.unit();
        info.no_data = band.no_data_value();
        info.scale = band.scale();
        info.offset = band.offset();
        info.metadata = split_metadata(&band.metadata_domain("").unwrap_or_default());
        Ok(info)
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.dataset.geo_transform().ok()
    }

    fn spatial_unit(&self) -> Option<String> {
        let srs = self.dataset.spatial_ref().ok()?;
        let unit = if srs.is_geographic() {
            srs.angular_units_name()
        } else {
            srs.linear_units_name()
        };
        unit.ok().filter(|u| !u.is_empty())
    }

    fn metadata(&self) -> Vec<(String, String)> {
        split_metadata(&self.dataset.metadata_domain("").unwrap_or_default())
    }

    fn subdataset_entries(&self) -> Vec<String> {
        self.dataset
            .metadata_domain("SUBDATASETS")
            .unwrap_or_default()
    }

    fn read_rows(
        &self,
        band: usize,
        first_row: usize,
        rows: usize,
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError> {
        let raster_band = self.dataset.rasterband(band)?;
        let (width, _) = raster_band.size();
        let window = (0, first_row as isize);
        let size = (width, rows);
        let b = &raster_band;

        let buffer = match storage {
            StorageKind::UInt8 => SampleBuffer::UInt8(read_real(b, window, size)?),
            StorageKind::Int8 => SampleBuffer::Int8(read_real(b, window, size)?),
            StorageKind::UInt16 => SampleBuffer::UInt16(read_real(b, window, size)?),
            StorageKind::Int16 => SampleBuffer::Int16(read_real(b, window, size)?),
            StorageKind::UInt32 => SampleBuffer::UInt32(read_real(b, window, size)?),
            StorageKind::Int32 => SampleBuffer::Int32(read_real(b, window, size)?),
            StorageKind::UInt64 => SampleBuffer::UInt64(read_real(b, window, size)?),
            StorageKind::Int64 => SampleBuffer::Int64(read_real(b, window, size)?),
            StorageKind::Float32 => SampleBuffer::Float32(read_real(b, window, size)?),
            StorageKind::Float64 => SampleBuffer::Float64(read_real(b, window, size)?),
            StorageKind::Complex32 => SampleBuffer::Complex32(read_complex::<Complex32>(
                b,
                band,
                window,
                size,
                GDALDataType::GDT_CFloat32,
            )?),
            StorageKind::Complex64 => SampleBuffer::Complex64(read_complex::<Complex64>(
                b,
                band,
                window,
                size,
                GDALDataType::GDT_CFloat64,
            )?),
            StorageKind::Gaussian16 => SampleBuffer::Gaussian16(read_complex::<Gaussian16>(
                b,
                band,
                window,
                size,
                GDALDataType::GDT_CInt16,
            )?),
            StorageKind::Gaussian32 => SampleBuffer::Gaussian32(read_complex::<Gaussian32>(
                b,
                band,
                window,
                size,
                GDALDataType::GDT_CInt32,
            )?),
        };
        Ok(buffer)
    }
}

struct GdalMultidim {
    dataset: Dataset,
}

// The safe `Group`/`MDArray` wrappers do not list attributes or reach
// dimension indexing variables, so those go through raw handles.
struct RawGroup(GDALGroupH);

impl Drop for RawGroup {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALGroupRelease(self.0) };
    }
}

struct RawArray(GDALMDArrayH);

impl Drop for RawArray {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALMDArrayRelease(self.0) };
    }
}

impl RawGroup {
    fn root(dataset: &Dataset) -> Option<RawGroup> {
        let handle = unsafe { gdal_sys::GDALDatasetGetRootGroup(dataset.c_dataset()) };
        (!handle.is_null()).then_some(RawGroup(handle))
    }

    fn group(&self, name: &str) -> Result<Option<RawGroup>, LoadError> {
        let name = CString::new(name)?;
        let handle = unsafe {
            gdal_sys::GDALGroupOpenGroup(self.0, name.as_ptr(), std::ptr::null_mut())
        };
        Ok((!handle.is_null()).then_some(RawGroup(handle)))
    }

    fn array(&self, name: &str) -> Result<Option<RawArray>, LoadError> {
        let name = CString::new(name)?;
        let handle = unsafe {
            gdal_sys::GDALGroupOpenMDArray(self.0, name.as_ptr(), std::ptr::null_mut())
        };
        Ok((!handle.is_null()).then_some(RawArray(handle)))
    }

    fn attributes(&self) -> Vec<(String, String)> {
        let mut count = 0usize;
        unsafe {
            let list = gdal_sys::GDALGroupGetAttributes(self.0, &mut count, std::ptr::null_mut());
            take_attributes(list, count)
        }
    }
}

impl RawArray {
    fn attributes(&self) -> Vec<(String, String)> {
        let mut count = 0usize;
        unsafe {
            let list = gdal_sys::GDALMDArrayGetAttributes(self.0, &mut count, std::ptr::null_mut());
            take_attributes(list, count)
        }
    }

    /// Units of each dimension's indexing variable, empty where there is none.
    fn dimension_units(&self) -> Vec<String> {
        let mut count = 0usize;
        let dims = unsafe { gdal_sys::GDALMDArrayGetDimensions(self.0, &mut count) };
        if dims.is_null() {
            return Vec::new();
        }

        let units = unsafe { std::slice::from_raw_parts(dims, count) }
            .iter()
            .map(|&dim| {
                let handle = unsafe { gdal_sys::GDALDimensionGetIndexingVariable(dim) };
                if handle.is_null() {
                    return String::new();
                }
                let variable = RawArray(handle);
                c_string(unsafe { gdal_sys::GDALMDArrayGetUnit(variable.0) })
            })
            .collect();
        unsafe { gdal_sys::GDALReleaseDimensions(dims, count) };
        units
    }
}

/// Reads and releases an attribute list. Multi-valued attributes are
/// joined with commas.
///
/// # Safety
/// `list` must be null or a GDAL-allocated list of `count` attribute handles.
unsafe fn take_attributes(list: *mut GDALAttributeH, count: usize) -> Vec<(String, String)> {
    if list.is_null() {
        return Vec::new();
    }
    let handles = unsafe { std::slice::from_raw_parts(list, count) }.to_vec();
    unsafe { gdal_sys::VSIFree(list as *mut c_void) };

    handles
        .into_iter()
        .map(|handle| {
            // `Attribute` releases the handle on drop
            let (name, attribute) = unsafe {
                (
                    c_string(gdal_sys::GDALAttributeGetName(handle)),
                    Attribute::from_c_attribute(handle),
                )
            };
            (name, attribute.read_as_string_array().join(","))
        })
        .collect()
}

fn describe(array: &MDArray, name: String) -> Result<ArrayInfo, LoadError> {
    let dimensions = array
        .dimensions()?
        .iter()
        .map(|d| DimensionInfo::new(d.name(), d.size()))
        .collect();

    let numeric = array.datatype().numeric_datatype();
    let data_type = match scalar_kind(numeric) {
        Some(kind) => BandType::Known(kind),
        None => BandType::Unsupported(format!("{:?}", numeric)),
    };

    Ok(ArrayInfo {
        name,
        dimensions,
        data_type,
        unit: array.unit(),
        no_data: array.no_data_value_as_double(),
        attributes: Vec::new(),
    })
}

fn collect_arrays(
    group: &Group,
    prefix: &str,
    out: &mut Vec<ArrayInfo>,
) -> Result<(), LoadError> {
    for name in group.array_names(CslStringList::new()) {
        let array = group.open_md_array(&name, CslStringList::new())?;
        out.push(describe(&array, format!("{}/{}", prefix, name))?);
    }
    for name in group.group_names(CslStringList::new()) {
        let child = group.open_group(&name, CslStringList::new())?;
        collect_arrays(&child, &format!("{}/{}", prefix, name), out)?;
    }
    Ok(())
}

/// Walks `path` (group names then the array name) below `group`.
fn with_array<R, F>(group: &Group, path: &[&str], full: &str, f: F) -> Result<R, LoadError>
where
    F: FnOnce(&MDArray) -> Result<R, LoadError>,
{
    match path {
        [] => Err(LoadError::MissingArray(full.to_string())),
        [name] => {
            let array = group.open_md_array(name, CslStringList::new())?;
            f(&array)
        }
        [head, rest @ ..] => {
            let child = group.open_group(head, CslStringList::new())?;
            with_array(&child, rest, full, f)
        }
    }
}

fn read_md<T: GdalType + Copy>(
    array: &MDArray,
    start: &[u64],
    count: &[usize],
) -> Result<Vec<T>, LoadError> {
    Ok(array.read_as::<T>(start.to_vec(), count.to_vec())?)
}

impl GdalMultidim {
    /// Walks `/group/.../array` from the root group.
    fn raw_array(&self, path: &str) -> Result<Option<RawArray>, LoadError> {
        let Some(mut group) = RawGroup::root(&self.dataset) else {
            return Ok(None);
        };
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((name, parents)) = parts.split_last() else {
            return Ok(None);
        };
        for parent in parents {
            match group.group(parent)? {
                Some(child) => group = child,
                None => return Ok(None),
            }
        }
        group.array(name)
    }
}

impl MultidimDataset for GdalMultidim {
    fn arrays(&self) -> Result<Vec<ArrayInfo>, LoadError> {
        let root = self.dataset.root_group()?;
        let mut out = Vec::new();
        collect_arrays(&root, "", &mut out)?;

        for info in &mut out {
            let Some(array) = self.raw_array(&info.name)? else {
                continue;
            };
            info.attributes = array.attributes();
            for (dim, unit) in info.dimensions.iter_mut().zip(array.dimension_units()) {
                dim.unit = unit;
            }
        }
        Ok(out)
    }

    fn attributes(&self) -> Result<Vec<(String, String)>, LoadError> {
        Ok(RawGroup::root(&self.dataset)
            .map(|root| root.attributes())
            .unwrap_or_default())
    }

    fn read_block(
        &self,
        array: &str,
        start: &[u64],
        count: &[usize],
        storage: StorageKind,
    ) -> Result<SampleBuffer, LoadError> {
        let root = self.dataset.root_group()?;
        let path: Vec<&str> = array.split('/').filter(|p| !p.is_empty()).collect();

        with_array(&root, &path, array, |a| {
            Ok(match storage {
                StorageKind::UInt8 => SampleBuffer::UInt8(read_md(a, start, count)?),
                StorageKind::Int8 => SampleBuffer::Int8(read_md(a, start, count)?),
                StorageKind::UInt16 => SampleBuffer::UInt16(read_md(a, start, count)?),
                StorageKind::Int16 => SampleBuffer::Int16(read_md(a, start, count)?),
                StorageKind::UInt32 => SampleBuffer::UInt32(read_md(a, start, count)?),
                StorageKind::Int32 => SampleBuffer::Int32(read_md(a, start, count)?),
                StorageKind::UInt64 => SampleBuffer::UInt64(read_md(a, start, count)?),
                StorageKind::Int64 => SampleBuffer::Int64(read_md(a, start, count)?),
                StorageKind::Float32 => SampleBuffer::Float32(read_md(a, start, count)?),
                StorageKind::Float64 => SampleBuffer::Float64(read_md(a, start, count)?),
                other => {
                    return Err(LoadError::UnsupportedConversion {
                        from: other,
                        to: other,
                    });
                }
            })
        })
    }
}
