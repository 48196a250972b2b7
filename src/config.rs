use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::frame::{Extent, GridFrame};
use crate::naming::NamingPolicy;

pub const DEFAULT_NO_DATA: f32 = -1.0;
pub const DEFAULT_CELL_FIELD: &str = "CELL5M";
pub const DEFAULT_INPUT_EXTENSION: &str = "dbf";

/// Everything a batch run needs. Immutable once the run starts.
///
/// The no-data value defaults to `-1`, which is also a plausible data value
/// for some attributes; the loader warns when a layer contains it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Matched case-insensitively, without the dot.
    pub input_extension: String,
    pub cell_field: String,
    pub frame: GridFrame,
    /// Area the frame must tile exactly.
    pub extent: Extent,
    pub no_data: f32,
    pub catalog: Catalog,
    pub naming: NamingPolicy,
    /// Worker threads; `None` uses the rayon default.
    pub threads: Option<usize>,
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            cell_field: DEFAULT_CELL_FIELD.to_string(),
            frame: GridFrame::spam_5min(),
            extent: Extent::GLOBAL,
            no_data: DEFAULT_NO_DATA,
            catalog: Catalog::spam(),
            naming: NamingPolicy::default(),
            threads: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame.validate()?;
        self.frame.validate_extent(&self.extent)?;
        if self.no_data.is_nan() {
            return Err(ConfigError::NanNoData);
        }
        if self.cell_field.trim().is_empty() {
            return Err(ConfigError::Empty("cell field name"));
        }
        if self.input_extension.trim().is_empty() {
            return Err(ConfigError::Empty("input extension"));
        }
        if self.naming.raster_extension.trim().is_empty() {
            return Err(ConfigError::Empty("raster extension"));
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::Empty("attribute catalog"));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RunConfig::new("in", "out");
        config.validate().unwrap();
        assert_eq!(config.cell_field, "CELL5M");
        assert_eq!(config.no_data, -1.0);
        assert_eq!(config.catalog.len(), 306);
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let mut config = RunConfig::new("in", "out");
        config.no_data = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::NanNoData)));

        let mut config = RunConfig::new("in", "out");
        config.cell_field = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Empty(_))));

        let mut config = RunConfig::new("in", "out");
        config.frame.cell_size = 0.01;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ExtentMismatch { .. })
        ));

        let mut config = RunConfig::new("in", "out");
        config.frame.cols = 8640;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ExtentOutOfDomain { .. })
        ));
    }
}
