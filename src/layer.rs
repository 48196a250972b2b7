use std::collections::HashMap;

use tracing::debug;

use crate::error::LoadError;
use crate::table::TableSource;

/// Cell index → value for one attribute of one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseLayer {
    cells: HashMap<u64, f64>,
}

impl SparseLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same cell replace earlier ones.
    pub fn insert(&mut self, cell: u64, value: f64) {
        self.cells.insert(cell, value);
    }

    pub fn get(&self, cell: u64) -> Option<f64> {
        self.cells.get(&cell).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells whose value equals `value` after narrowing to `f32`,
    /// i.e. cells that would be indistinguishable from that value in a raster.
    pub fn count_value(&self, value: f32) -> usize {
        self.cells.values().filter(|&&v| v as f32 == value).count()
    }
}

impl FromIterator<(u64, f64)> for SparseLayer {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub records: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Reads `column` from `table` into a [`SparseLayer`] keyed by `cell_field`.
///
/// The caller is expected to have checked the column with
/// [`TableSource::has_column`]; an absent column is an error here. Records
/// without a finite value or a usable cell index are skipped.
pub fn load(
    table: &dyn TableSource,
    cell_field: &str,
    column: &str,
) -> Result<(SparseLayer, LoadStats), LoadError> {
    if !table.has_column(column)? {
        return Err(LoadError::MissingColumn {
            path: table.path().to_path_buf(),
            column: column.to_string(),
        });
    }

    let mut layer = SparseLayer::new();
    let mut stats = LoadStats::default();

    table.for_each_record(cell_field, column, &mut |record| {
        stats.records += 1;
        let value = record.value.filter(|v| v.is_finite());
        match (record.cell.and_then(cell_index), value) {
            (Some(cell), Some(value)) => {
                layer.insert(cell, value);
                stats.loaded += 1;
            }
            _ => stats.skipped += 1,
        }
    })?;

    debug!(
        "Loaded {} from {:?}: {} records, {} cells, {} skipped",
        column,
        table.path(),
        stats.records,
        layer.len(),
        stats.skipped
    );

    Ok((layer, stats))
}

/// Cell identifiers arrive as dBASE numerics; only non-negative integers are
/// valid indices.
fn cell_index(raw: f64) -> Option<u64> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= u64::MAX as f64 {
        Some(raw as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::testing::MemoryTable;

    #[test]
    fn test_load_last_write_wins() {
        let table = MemoryTable::new(
            &["CELL5M", "WHEA_A"],
            vec![
                vec![("CELL5M", 4.0), ("WHEA_A", 1.0)],
                vec![("CELL5M", 9.0), ("WHEA_A", 2.0)],
                vec![("CELL5M", 4.0), ("WHEA_A", 3.0)],
            ],
        );

        let (layer, stats) = load(&table, "CELL5M", "WHEA_A").unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.get(4), Some(3.0));
        assert_eq!(layer.get(9), Some(2.0));
        assert_eq!(stats.records, 3);
        assert_eq!(stats.loaded, 3);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_load_skips_malformed_records() {
        let table = MemoryTable::new(
            &["CELL5M", "WHEA_A"],
            vec![
                vec![("CELL5M", 1.0), ("WHEA_A", 10.0)],
                vec![("CELL5M", 2.0)],
                vec![("WHEA_A", 30.0)],
                vec![("CELL5M", -5.0), ("WHEA_A", 40.0)],
                vec![("CELL5M", 2.5), ("WHEA_A", 50.0)],
            ],
        );

        let (layer, stats) = load(&table, "CELL5M", "WHEA_A").unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.get(1), Some(10.0));
        assert_eq!(stats.records, 5);
        assert_eq!(stats.skipped, 4);
    }

    #[test]
    fn test_load_skips_non_finite_values() {
        let table = MemoryTable::new(
            &["CELL5M", "WHEA_A"],
            vec![
                vec![("CELL5M", 0.0), ("WHEA_A", f64::NAN)],
                vec![("CELL5M", 1.0), ("WHEA_A", f64::INFINITY)],
                vec![("CELL5M", 2.0), ("WHEA_A", f64::NEG_INFINITY)],
                vec![("CELL5M", 3.0), ("WHEA_A", 0.5)],
            ],
        );

        let (layer, stats) = load(&table, "CELL5M", "WHEA_A").unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.get(3), Some(0.5));
        assert_eq!(layer.get(0), None);
        assert_eq!(stats.loaded, 1);
        assert_eq!(stats.skipped, 3);
    }

    #[test]
    fn test_load_absent_column_is_usage_error() {
        let table = MemoryTable::new(&["CELL5M"], Vec::new());
        let result = load(&table, "CELL5M", "RICE_A");
        assert!(matches!(result, Err(LoadError::MissingColumn { .. })));
    }

    #[test]
    fn test_count_value_matches_sentinel() {
        let layer: SparseLayer = [(0, -1.0), (1, 0.0), (2, -1.0)].into_iter().collect();
        assert_eq!(layer.count_value(-1.0), 2);
        assert_eq!(layer.count_value(5.0), 0);
    }
}
