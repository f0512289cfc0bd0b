use std::path::Path;

/// True when `path` ends in one of `extensions` (lowercase, no dot).
/// An empty list accepts everything.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| *e == ext)
        }
        None => false,
    }
}

/// GDAL connection strings look like `DRIVER:...`, e.g.
/// `NETCDF:"file.nc":var` or `HDF4_EOS:EOS_GRID:"f.hdf":grid:field`.
pub fn is_connection_string(name: &str) -> bool {
    match name.split_once(':') {
        // Skip Windows drive letters such as `C:\data`
        Some((prefix, _)) => {
            prefix.len() > 1
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    }
}
