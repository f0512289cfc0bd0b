use serde::Deserialize;
use std::fmt;

/// Where row 0 of a loaded raster sits.
///
/// GDAL counts rows from the top of the image. `BottomLeft` flips them so
/// that host row 0 is the bottom scanline.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    #[default]
    BottomLeft,
    TopLeft,
}

/// How `CInt16`/`CInt32` cells are stored.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplexIntPolicy {
    #[default]
    Widen,
    Gaussian,
}

/// Which view of a file gets loaded.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Bands and sub-datasets only.
    Raster,
    /// Multidimensional arrays only.
    Multidim,
    /// Bands and sub-datasets, falling back to arrays when nothing loaded.
    #[default]
    Auto,
}

impl fmt::Display for RowOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowOrigin::BottomLeft => write!(f, "bottom_left"),
            RowOrigin::TopLeft => write!(f, "top_left"),
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadMode::Raster => write!(f, "raster"),
            LoadMode::Multidim => write!(f, "multidim"),
            LoadMode::Auto => write!(f, "auto"),
        }
    }
}
