use anyhow::{Context, Result};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{DriverManager, Metadata};
use std::path::Path;

use crate::catalog::Attribute;
use crate::frame::GridFrame;
use crate::grid::DenseGrid;

/// WGS84 geographic coordinates.
pub const WGS84_EPSG: u32 = 4326;

/// Writes single-band Float32 GeoTIFFs through the GDAL `GTiff` driver.
#[derive(Debug, Clone)]
pub struct GeoTiffWriter {
    epsg: u32,
}

impl Default for GeoTiffWriter {
    fn default() -> Self {
        Self { epsg: WGS84_EPSG }
    }
}

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or overwrites) `output_path` with `grid`, georeferenced by
    /// `frame`. `attribute`, when given, is recorded as dataset metadata.
    ///
    /// The grid is consumed; its buffer is handed to GDAL without a copy.
    pub fn write(
        &self,
        output_path: &Path,
        frame: &GridFrame,
        grid: DenseGrid,
        no_data: f32,
        attribute: Option<&Attribute>,
    ) -> Result<()> {
        let (rows, cols) = frame.shape();
        anyhow::ensure!(
            grid.shape() == (rows, cols),
            "grid shape {:?} does not match frame shape {:?}",
            grid.shape(),
            (rows, cols)
        );

        // Requires a GDAL build with GeoTIFF support
        let driver =
            DriverManager::get_driver_by_name("GTiff").context("Failed to get GTiff driver")?;

        let mut dataset = driver
            .create_with_band_type::<f32, _>(output_path, cols, rows, 1)
            .with_context(|| format!("Failed to create dataset {:?}", output_path))?;

        dataset
            .set_geo_transform(&frame.geo_transform())
            .context("Failed to set geo transform")?;

        let srs = SpatialRef::from_epsg(self.epsg)
            .with_context(|| format!("Failed to create SpatialRef from EPSG:{}", self.epsg))?;
        let wkt = srs
            .to_wkt()
            .context("Failed to convert SpatialRef to WKT")?;
        dataset
            .set_projection(&wkt)
            .context("Failed to set projection")?;

        if let Some(attribute) = attribute {
            dataset
                .set_metadata_item("ATTRIBUTE", attribute.name(), "")
                .context("Failed to set attribute metadata")?;
            dataset
                .set_metadata_item("SUBJECT", &attribute.subject, "")
                .context("Failed to set subject metadata")?;
            dataset
                .set_metadata_item("VARIANT", &attribute.variant.label, "")
                .context("Failed to set variant metadata")?;
        }

        let mut band = dataset.rasterband(1).context("Failed to get raster band")?;
        band.set_no_data_value(Some(f64::from(no_data)))
            .context("Failed to set no data value")?;

        // Row-major, north row first
        let mut buffer = Buffer::new((cols, rows), grid.into_values());
        band.write((0, 0), (cols, rows), &mut buffer)
            .context("Failed to write raster data")?;

        Ok(())
    }
}
