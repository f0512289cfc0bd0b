use std::ffi::{CStr, CString, c_char, c_void};
use std::path::Path;

use gdal_sys::GDALDataType;

use rasterbundle::config::{LoadConfig, LoadMode};
use rasterbundle::loader::Loader;

/// Writes `value` into a freshly created scalar string attribute and
/// releases it.
unsafe fn write_string(attribute: gdal_sys::GDALAttributeH, value: &CStr) {
    unsafe {
        assert!(!attribute.is_null());
        assert_ne!(gdal_sys::GDALAttributeWriteString(attribute, value.as_ptr()), 0);
        gdal_sys::GDALAttributeRelease(attribute);
    }
}

/// Writes a netCDF-4 file holding `/forecast/v`, an Int16 array of shape
/// y = 2, x = 3 with values 1..=6 in C order. Returns false when GDAL has no
/// netCDF driver.
fn write_cube(path: &Path) -> bool {
    let name = CString::new(path.to_str().unwrap()).unwrap();
    unsafe {
        gdal_sys::GDALAllRegister();
        let driver = gdal_sys::GDALGetDriverByName(c"netCDF".as_ptr());
        if driver.is_null() {
            return false;
        }

        let mut options = [c"FORMAT=NC4".as_ptr() as *mut c_char, std::ptr::null_mut()];
        let dataset = gdal_sys::GDALCreateMultiDimensional(
            driver,
            name.as_ptr(),
            std::ptr::null_mut(),
            options.as_mut_ptr(),
        );
        assert!(!dataset.is_null());
        let root = gdal_sys::GDALDatasetGetRootGroup(dataset);
        assert!(!root.is_null());

        let string_type = gdal_sys::GDALExtendedDataTypeCreateString(0);
        write_string(
            gdal_sys::GDALGroupCreateAttribute(
                root,
                c"title".as_ptr(),
                0,
                std::ptr::null(),
                string_type,
                std::ptr::null_mut(),
            ),
            c"test cube",
        );

        let y = gdal_sys::GDALGroupCreateDimension(
            root,
            c"y".as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            2,
            std::ptr::null_mut(),
        );
        let x = gdal_sys::GDALGroupCreateDimension(
            root,
            c"x".as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            3,
            std::ptr::null_mut(),
        );
        assert!(!y.is_null() && !x.is_null());

        let forecast =
            gdal_sys::GDALGroupCreateGroup(root, c"forecast".as_ptr(), std::ptr::null_mut());
        assert!(!forecast.is_null());

        let int16 = gdal_sys::GDALExtendedDataTypeCreate(GDALDataType::GDT_Int16);
        let mut dims = [y, x];
        let array = gdal_sys::GDALGroupCreateMDArray(
            forecast,
            c"v".as_ptr(),
            2,
            dims.as_mut_ptr(),
            int16,
            std::ptr::null_mut(),
        );
        assert!(!array.is_null());

        write_string(
            gdal_sys::GDALMDArrayCreateAttribute(
                array,
                c"long_name".as_ptr(),
                0,
                std::ptr::null(),
                string_type,
                std::ptr::null_mut(),
            ),
            c"wind speed",
        );

        let values: [i16; 6] = [1, 2, 3, 4, 5, 6];
        let start: [u64; 2] = [0, 0];
        let count: [usize; 2] = [2, 3];
        let ok = gdal_sys::GDALMDArrayWrite(
            array,
            start.as_ptr(),
            count.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            int16,
            values.as_ptr() as *const c_void,
            values.as_ptr() as *const c_void,
            std::mem::size_of_val(&values),
        );
        assert_ne!(ok, 0);

        gdal_sys::GDALMDArrayRelease(array);
        gdal_sys::GDALExtendedDataTypeRelease(int16);
        gdal_sys::GDALExtendedDataTypeRelease(string_type);
        gdal_sys::GDALDimensionRelease(y);
        gdal_sys::GDALDimensionRelease(x);
        gdal_sys::GDALGroupRelease(forecast);
        gdal_sys::GDALGroupRelease(root);
        gdal_sys::GDALClose(dataset);
    }
    true
}

#[test]
fn test_netcdf_group_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.nc");
    if !write_cube(&path) {
        eprintln!("GDAL built without netCDF, skipping");
        return;
    }

    let config = LoadConfig::default().with_mode(LoadMode::Multidim);
    let bundle = Loader::gdal(config)
        .load_all(path.to_str().unwrap())
        .unwrap();

    assert_eq!(bundle.int16s.len(), 1);
    let array = &bundle.int16s[0];
    assert_eq!(array.name(), "/forecast/v");
    // GDAL shape (y, x) becomes (x, y)
    assert_eq!(array.dims(), &[3, 2]);
    assert_eq!(array.get(&[2, 0]), Some(&3));
    assert_eq!(array.get(&[0, 1]), Some(&4));
    assert_eq!(array.space().axis(0).unwrap().name, "x");
    assert_eq!(array.metadata_value("dimensions"), Some("x,y"));
    assert_eq!(array.metadata_value("long_name"), Some("wind speed"));

    assert_eq!(bundle.chars.get("title").map(String::as_str), Some("test cube"));
}

#[test]
fn test_netcdf_chunked_reads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.nc");
    if !write_cube(&path) {
        return;
    }

    let name = path.to_str().unwrap();
    let whole = Loader::gdal(LoadConfig::default().with_mode(LoadMode::Multidim))
        .load_all(name)
        .unwrap();
    // One y row per read
    let config = LoadConfig::default()
        .with_mode(LoadMode::Multidim)
        .with_chunk_elements(1);
    let chunked = Loader::gdal(config).load_all(name).unwrap();
    assert_eq!(whole, chunked);
}
