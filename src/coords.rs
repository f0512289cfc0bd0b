use crate::config::RowOrigin;

/// Affine geotransform as returned by GDAL:
/// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
pub type GeoTransform = [f64; 6];

/// Maps indices along one axis to world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub unit: String,
    pub offset: f64,
    pub scale: f64,
}

impl Axis {
    pub fn identity(name: impl Into<String>) -> Self {
        Axis {
            name: name.into(),
            unit: String::new(),
            offset: 0.0,
            scale: 1.0,
        }
    }

    pub fn coordinate(&self, index: usize) -> f64 {
        self.offset + self.scale * index as f64
    }
}

/// One [`Axis`] per dimension of a [`DimensionedArray`](crate::dimensioned::DimensionedArray).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateSpace {
    axes: Vec<Axis>,
}

impl CoordinateSpace {
    pub fn new(axes: Vec<Axis>) -> Self {
        CoordinateSpace { axes }
    }

    pub fn identity<S: AsRef<str>>(names: &[S]) -> Self {
        CoordinateSpace {
            axes: names.iter().map(|n| Axis::identity(n.as_ref())).collect(),
        }
    }

    /// Builds the space of a banded raster `height` rows tall.
    ///
    /// With [`RowOrigin::BottomLeft`] host row `j` holds GDAL row
    /// `height - 1 - j`, so the y axis starts at the bottom edge and runs
    /// with the opposite sign. A band axis is appended when `band_axis` is set.
    pub fn from_geo_transform(
        gt: &GeoTransform,
        height: usize,
        origin: RowOrigin,
        band_axis: bool,
    ) -> Self {
        let x = Axis {
            name: "x".to_string(),
            unit: String::new(),
            offset: gt[0],
            scale: gt[1],
        };
        let y = match origin {
            RowOrigin::TopLeft => Axis {
                name: "y".to_string(),
                unit: String::new(),
                offset: gt[3],
                scale: gt[5],
            },
            RowOrigin::BottomLeft => Axis {
                name: "y".to_string(),
                unit: String::new(),
                offset: gt[3] + gt[5] * height.saturating_sub(1) as f64,
                scale: -gt[5],
            },
        };

        let mut axes = vec![x, y];
        if band_axis {
            axes.push(Axis::identity("band"));
        }
        CoordinateSpace { axes }
    }

    /// True when the transform has rotation terms an axis-aligned space drops.
    pub fn is_rotated(gt: &GeoTransform) -> bool {
        gt[2] != 0.0 || gt[4] != 0.0
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    pub fn axis_mut(&mut self, index: usize) -> Option<&mut Axis> {
        self.axes.get_mut(index)
    }

    pub fn num_axes(&self) -> usize {
        self.axes.len()
    }

    /// World coordinates of a cell. Missing axes are treated as identity.
    pub fn coordinates(&self, index: &[usize]) -> Vec<f64> {
        index
            .iter()
            .enumerate()
            .map(|(i, &idx)| match self.axes.get(i) {
                Some(axis) => axis.coordinate(idx),
                None => idx as f64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GT: GeoTransform = [100.0, 2.0, 0.0, 50.0, 0.0, -0.5];

    #[test]
    fn test_top_left_keeps_gdal_rows() {
        let space = CoordinateSpace::from_geo_transform(&GT, 10, RowOrigin::TopLeft, false);
        assert_eq!(space.num_axes(), 2);
        assert_eq!(space.coordinates(&[0, 0]), vec![100.0, 50.0]);
        assert_eq!(space.coordinates(&[3, 4]), vec![106.0, 48.0]);
    }

    #[test]
    fn test_bottom_left_flips_rows() {
        let space = CoordinateSpace::from_geo_transform(&GT, 10, RowOrigin::BottomLeft, false);
        // Host row 0 is GDAL row 9
        assert_eq!(space.coordinates(&[0, 0]), vec![100.0, 45.5]);
        // Host row 9 is GDAL row 0
        assert_eq!(space.coordinates(&[0, 9]), vec![100.0, 50.0]);
        assert_eq!(space.axis(1).unwrap().scale, 0.5);
    }

    #[test]
    fn test_band_axis_is_identity() {
        let space = CoordinateSpace::from_geo_transform(&GT, 4, RowOrigin::TopLeft, true);
        let band = space.axis(2).unwrap();
        assert_eq!(band.name, "band");
        assert_eq!(band.coordinate(2), 2.0);
    }

    #[test]
    fn test_rotation_detection() {
        assert!(!CoordinateSpace::is_rotated(&GT));
        assert!(CoordinateSpace::is_rotated(&[0.0, 1.0, 0.1, 0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_identity_space() {
        let space = CoordinateSpace::identity(&["lon", "lat", "time"]);
        assert_eq!(space.coordinates(&[1, 2, 3]), vec![1.0, 2.0, 3.0]);
        assert_eq!(space.axis(2).unwrap().name, "time");
    }
}
