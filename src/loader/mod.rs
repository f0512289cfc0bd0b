mod banded;
mod multidim;

use log::{debug, info};

use crate::bundle::DataBundle;
use crate::config::{LoadConfig, LoadMode};
use crate::error::LoadError;
use crate::readers::{DatasetOpener, GdalOpener, MultidimDataset, RasterDataset, subdatasets};

/// Opens files through a [`DatasetOpener`] and gathers everything they hold
/// into a [`DataBundle`].
#[derive(Debug)]
pub struct Loader<O: DatasetOpener> {
    opener: O,
    config: LoadConfig,
}

impl Loader<GdalOpener> {
    pub fn gdal(config: LoadConfig) -> Self {
        Loader::new(GdalOpener, config)
    }
}

impl<O: DatasetOpener> Loader<O> {
    pub fn new(opener: O, config: LoadConfig) -> Self {
        Loader { opener, config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Loads everything `name` holds according to the configured mode.
    pub fn load_all(&self, name: &str) -> Result<DataBundle, LoadError> {
        match self.config.mode() {
            LoadMode::Raster => self.load_dataset(name, 0),
            LoadMode::Multidim => self.load_multidim(name),
            LoadMode::Auto => self.load_auto(name),
        }
    }

    /// Loads the multidimensional arrays of `name`, if it has any. Root
    /// group attributes go into `chars`.
    pub fn load_multidim(&self, name: &str) -> Result<DataBundle, LoadError> {
        match self.opener.open_multidim(name)? {
            Some(dataset) => self.load_arrays(dataset.as_ref()),
            None => {
                debug!("{} has no multidimensional arrays", name);
                Ok(DataBundle::default())
            }
        }
    }

    // Banded first. The multidimensional view is tried when the banded path
    // loaded no arrays, or when `name` does not open as a raster at all.
    fn load_auto(&self, name: &str) -> Result<DataBundle, LoadError> {
        let raster = match self.opener.open_raster(name) {
            Ok(raster) => raster,
            Err(e) => {
                return match self.opener.open_multidim(name)? {
                    Some(dataset) => {
                        info!("{} only opens as multidimensional arrays", name);
                        self.load_arrays(dataset.as_ref())
                    }
                    None => Err(e),
                };
            }
        };

        let mut bundle = self.load_opened(raster.as_ref(), 0)?;
        if bundle.loaded_kinds().is_empty() {
            info!("{}: no raster bands loaded, trying multidimensional arrays", name);
            bundle.merge(self.load_multidim(name)?);
        }
        Ok(bundle)
    }

    fn load_arrays(&self, dataset: &dyn MultidimDataset) -> Result<DataBundle, LoadError> {
        let mut bundle = multidim::load_arrays(dataset, &self.config)?;
        bundle.chars.extend(dataset.attributes()?);
        Ok(bundle)
    }

    fn load_dataset(&self, name: &str, depth: usize) -> Result<DataBundle, LoadError> {
        let dataset = self.opener.open_raster(name)?;
        self.load_opened(dataset.as_ref(), depth)
    }

    /// Sub-datasets are merged first, in listing order, then the bands of
    /// `dataset` itself.
    fn load_opened(&self, dataset: &dyn RasterDataset, depth: usize) -> Result<DataBundle, LoadError> {
        let mut results = DataBundle::default();

        if self.config.recurse_subdatasets() {
            for sub in subdatasets::parse(&dataset.subdataset_entries())? {
                if depth >= self.config.max_subdataset_depth() {
                    return Err(LoadError::SubdatasetDepth {
                        name: sub.name,
                        limit: self.config.max_subdataset_depth(),
                    });
                }
                debug!(
                    "sub-dataset {}: {} {}",
                    sub.index,
                    sub.name,
                    sub.description.as_deref().unwrap_or("")
                );
                results.merge(self.load_dataset(&sub.name, depth + 1)?);
            }
        }

        let description = dataset.description();
        info!("{}", description);

        let mut own = DataBundle::default();
        own.chars.extend(dataset.metadata());
        if dataset.band_count() == 0 {
            info!("{} has no bands of its own; it is a set of sub-datasets", description);
        } else if let Some(array) = banded::load_bands(dataset, &self.config)? {
            own.push_loaded(array);
        }
        results.merge(own);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::{MemoryArray, MemoryCatalog, MemoryDataset};
    use crate::scalar::{SampleBuffer, ScalarKind};

    fn band(name: &str, value: u8) -> MemoryDataset {
        MemoryDataset::new(name, 1, 1).with_band(ScalarKind::UInt8, SampleBuffer::UInt8(vec![value]))
    }

    fn container() -> MemoryCatalog {
        MemoryCatalog::new()
            .with(
                "modis.hdf",
                MemoryDataset::new("modis.hdf", 0, 0)
                    .with_metadata("SHORTNAME", "MOD09")
                    .with_subdataset("HDF4_EOS:EOS_GRID:\"modis.hdf\":b1", "band 1")
                    .with_subdataset("HDF4_EOS:EOS_GRID:\"modis.hdf\":qa", "quality"),
            )
            .with("HDF4_EOS:EOS_GRID:\"modis.hdf\":b1", band("b1", 10))
            .with(
                "HDF4_EOS:EOS_GRID:\"modis.hdf\":qa",
                MemoryDataset::new("qa", 1, 1)
                    .with_metadata("SHORTNAME", "MOD09_QA")
                    .with_band(ScalarKind::Float32, SampleBuffer::Float32(vec![0.25])),
            )
    }

    #[test]
    fn test_plain_dataset() {
        let catalog = MemoryCatalog::new().with("a.tif", band("a.tif", 7));
        let loader = Loader::new(catalog, LoadConfig::default());

        let bundle = loader.load_all("a.tif").unwrap();
        assert_eq!(bundle.uint8s.len(), 1);
        assert_eq!(bundle.uint8s[0].get(&[0, 0]), Some(&7));
    }

    #[test]
    fn test_subdatasets_merged_in_order() {
        let loader = Loader::new(container(), LoadConfig::default());
        let bundle = loader.load_all("modis.hdf").unwrap();

        assert_eq!(bundle.uint8s.len(), 1);
        assert_eq!(bundle.uint8s[0].name(), "b1");
        assert_eq!(bundle.floats.len(), 1);
        // The container's own metadata is merged last
        assert_eq!(bundle.chars["SHORTNAME"], "MOD09");
    }

    #[test]
    fn test_subdataset_recursion_can_be_disabled() {
        let config = LoadConfig::default()
            .with_recurse_subdatasets(false)
            .with_mode(LoadMode::Raster);
        let loader = Loader::new(container(), config);
        let bundle = loader.load_all("modis.hdf").unwrap();
        assert_eq!(bundle.len(), 0);
        assert_eq!(bundle.chars.len(), 1);
    }

    #[test]
    fn test_self_referencing_container_hits_depth_limit() {
        let catalog = MemoryCatalog::new().with(
            "loop.nc",
            MemoryDataset::new("loop.nc", 0, 0).with_subdataset("loop.nc", "itself"),
        );
        let loader = Loader::new(catalog, LoadConfig::default().with_max_subdataset_depth(2));
        let err = loader.load_all("loop.nc").unwrap_err();
        assert!(matches!(err, LoadError::SubdatasetDepth { limit: 2, .. }));
    }

    #[test]
    fn test_malformed_subdataset_aborts() {
        let catalog = MemoryCatalog::new().with(
            "bad.hdf",
            MemoryDataset::new("bad.hdf", 0, 0).with_subdataset_entry("SUBDATASET_1_NAME=a=b"),
        );
        let loader = Loader::new(catalog, LoadConfig::default());
        assert!(matches!(
            loader.load_all("bad.hdf"),
            Err(LoadError::MalformedSubdataset { .. })
        ));
    }

    #[test]
    fn test_failure_in_subdataset_propagates() {
        let catalog = MemoryCatalog::new().with(
            "c.nc",
            MemoryDataset::new("c.nc", 0, 0).with_subdataset("missing", ""),
        );
        let loader = Loader::new(catalog, LoadConfig::default());
        assert!(matches!(
            loader.load_all("c.nc"),
            Err(LoadError::MissingDataset(name)) if name == "missing"
        ));
    }

    fn cube_catalog() -> MemoryCatalog {
        MemoryCatalog::new().with(
            "cube.nc",
            MemoryDataset::new("cube.nc", 0, 0).with_array(MemoryArray::new(
                "/v",
                &[("y", 2), ("x", 2)],
                ScalarKind::Int16,
                SampleBuffer::Int16(vec![1, 2, 3, 4]),
            )),
        )
    }

    #[test]
    fn test_auto_mode_falls_back_to_arrays() {
        let loader = Loader::new(cube_catalog(), LoadConfig::default());
        let bundle = loader.load_all("cube.nc").unwrap();
        assert_eq!(bundle.int16s.len(), 1);
        assert_eq!(bundle.int16s[0].get(&[1, 0]), Some(&2));
    }

    #[test]
    fn test_raster_mode_skips_arrays() {
        let loader = Loader::new(cube_catalog(), LoadConfig::default().with_mode(LoadMode::Raster));
        assert_eq!(loader.load_all("cube.nc").unwrap().len(), 0);
    }

    #[test]
    fn test_multidim_mode_merges_root_attributes() {
        let catalog = MemoryCatalog::new().with(
            "cf.nc",
            MemoryDataset::new("cf.nc", 0, 0)
                .with_metadata("Conventions", "CF-1.8")
                .with_array(
                    MemoryArray::new(
                        "/sst",
                        &[("x", 1)],
                        ScalarKind::Float32,
                        SampleBuffer::Float32(vec![271.5]),
                    )
                    .with_attribute("standard_name", "sea_surface_temperature"),
                ),
        );
        let loader = Loader::new(catalog, LoadConfig::default().with_mode(LoadMode::Multidim));
        let bundle = loader.load_all("cf.nc").unwrap();

        assert_eq!(bundle.chars["Conventions"], "CF-1.8");
        assert_eq!(
            bundle.floats[0].metadata_value("standard_name"),
            Some("sea_surface_temperature")
        );
    }

    // Opens nothing as a raster, like a driver that only has the
    // multidimensional API.
    struct ArraysOnly(MemoryCatalog);

    impl DatasetOpener for ArraysOnly {
        fn open_raster(&self, name: &str) -> Result<Box<dyn RasterDataset + '_>, LoadError> {
            Err(LoadError::MissingDataset(name.to_string()))
        }

        fn open_multidim(
            &self,
            name: &str,
        ) -> Result<Option<Box<dyn MultidimDataset + '_>>, LoadError> {
            self.0.open_multidim(name)
        }
    }

    #[test]
    fn test_auto_mode_when_raster_open_fails() {
        let loader = Loader::new(ArraysOnly(cube_catalog()), LoadConfig::default());
        let bundle = loader.load_all("cube.nc").unwrap();
        assert_eq!(bundle.int16s.len(), 1);

        // No multidimensional view either: the raster error is kept
        let catalog = MemoryCatalog::new().with("a.tif", band("a.tif", 1));
        let loader = Loader::new(ArraysOnly(catalog), LoadConfig::default());
        assert!(matches!(
            loader.load_all("a.tif"),
            Err(LoadError::MissingDataset(name)) if name == "a.tif"
        ));
    }

    #[test]
    fn test_multidim_mode_skips_bands() {
        let catalog = MemoryCatalog::new().with("a.tif", band("a.tif", 1));
        let loader = Loader::new(catalog, LoadConfig::default().with_mode(LoadMode::Multidim));
        assert!(loader.load_all("a.tif").unwrap().is_empty());
    }
}
