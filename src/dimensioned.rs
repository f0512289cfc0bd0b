use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use std::collections::BTreeMap;
use std::fmt;

use crate::coords::CoordinateSpace;

/// A dense N-dimensional array of one scalar type with coordinates and
/// free-form metadata.
///
/// Axis 0 varies fastest in memory (column-major), matching the order cells
/// arrive in from a raster scanline.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionedArray<T> {
    name: String,
    data: ArrayD<T>,
    space: CoordinateSpace,
    metadata: BTreeMap<String, String>,
}

impl<T> DimensionedArray<T> {
    /// Wraps column-major `data` of shape `dims` with an identity space.
    pub fn from_column_major(
        name: impl Into<String>,
        dims: &[usize],
        data: Vec<T>,
    ) -> Result<Self, ndarray::ShapeError> {
        let data = ArrayD::from_shape_vec(IxDyn(dims).f(), data)?;
        let names: Vec<String> = (0..dims.len()).map(|i| format!("d{}", i)).collect();
        Ok(DimensionedArray {
            name: name.into(),
            data,
            space: CoordinateSpace::identity(names.as_slice()),
            metadata: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn num_dimensions(&self) -> usize {
        self.data.ndim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.data.get(index)
    }

    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// Replaces the coordinate space. Axes beyond the array rank are ignored
    /// by lookups; missing ones behave as identity.
    pub fn with_space(mut self, space: CoordinateSpace) -> Self {
        debug_assert_eq!(space.num_axes(), self.num_dimensions());
        self.space = space;
        self
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}

impl<T> fmt::Display for DimensionedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dims {:?} ({} cells, {} metadata entries)",
            self.name,
            self.dims(),
            self.len(),
            self.metadata.len()
        )
    }
}
