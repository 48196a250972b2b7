use std::path::Path;

use crate::error::NamingError;

/// How output raster names are derived from input table names.
///
/// SPAM tables are named like `spam2005V3r2_global_A_TA.dbf`, where the last
/// three characters (`_TA`) mark the table kind. The output for column
/// `WHEA_A` becomes `spam2005V3r2_global_A_WHEA_A.tif`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    pub trailing_marker_len: usize,
    pub raster_extension: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            trailing_marker_len: 3,
            raster_extension: "tif".to_string(),
        }
    }
}

impl NamingPolicy {
    pub fn output_file_name(&self, input: &Path, attribute: &str) -> Result<String, NamingError> {
        let file_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| NamingError::NonUtf8(input.to_path_buf()))?;

        // Everything after the first dot is treated as extension.
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let keep = stem
            .chars()
            .count()
            .checked_sub(self.trailing_marker_len)
            .ok_or_else(|| NamingError::StemTooShort {
                stem: stem.to_string(),
                marker_len: self.trailing_marker_len,
            })?;
        let base: String = stem.chars().take(keep).collect();

        Ok(format!("{}_{}.{}", base, attribute, self.raster_extension))
    }
}
