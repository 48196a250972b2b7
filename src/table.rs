//! Access to tabular input files.
//!
//! The loader only needs two things from a table: whether a column exists, and
//! a stream of `(cell, value)` pairs for one column. [`TableSource`] captures
//! that, and [`DbfTable`] provides it for dBASE files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use shapefile::dbase::{self, FieldValue, Record};
use tracing::debug;

use crate::error::LoadError;

/// One input row reduced to the cell identifier and one attribute value.
/// Either side is `None` when the field is empty or not numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub cell: Option<f64>,
    pub value: Option<f64>,
}

pub trait TableSource {
    /// Location used in log and error messages.
    fn path(&self) -> &Path;

    /// Schema-only check; must not read the record stream.
    fn has_column(&self, column: &str) -> Result<bool, LoadError>;

    /// Streams every record, in file order, projected onto `cell_field` and
    /// `column`.
    fn for_each_record(
        &self,
        cell_field: &str,
        column: &str,
        f: &mut dyn FnMut(RawRecord),
    ) -> Result<(), LoadError>;
}

/// A dBASE (`.dbf`) table on disk. The header is read once and cached.
#[derive(Debug, Clone)]
pub struct DbfTable {
    path: PathBuf,
    columns: OnceLock<Vec<String>>,
}

impl DbfTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: OnceLock::new(),
        }
    }

    fn open(&self) -> Result<dbase::Reader<impl std::io::Read + std::io::Seek>, LoadError> {
        dbase::Reader::from_path(&self.path).map_err(|source| LoadError::Dbf {
            path: self.path.clone(),
            source,
        })
    }

    /// Field names as stored in the header.
    pub fn columns(&self) -> Result<&[String], LoadError> {
        if let Some(columns) = self.columns.get() {
            return Ok(columns.as_slice());
        }
        let reader = self.open()?;
        let columns = field_names(&reader);
        Ok(self.columns.get_or_init(|| columns).as_slice())
    }

    /// Resolves `column` against the header, ignoring ASCII case.
    fn resolve(&self, columns: &[String], column: &str) -> Result<String, LoadError> {
        columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(column))
            .cloned()
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }
}

impl TableSource for DbfTable {
    fn path(&self) -> &Path {
        &self.path
    }

    fn has_column(&self, column: &str) -> Result<bool, LoadError> {
        Ok(self
            .columns()?
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column)))
    }

    fn for_each_record(
        &self,
        cell_field: &str,
        column: &str,
        f: &mut dyn FnMut(RawRecord),
    ) -> Result<(), LoadError> {
        let mut reader = self.open()?;
        let columns = field_names(&reader);
        let cell_field = self.resolve(&columns, cell_field)?;
        let column = self.resolve(&columns, column)?;

        for (i, result) in reader.iter_records().enumerate() {
            match result {
                Ok(record) => f(project(&record, &cell_field, &column)),
                Err(e) if matches!(e.kind(), dbase::ErrorKind::IoError(_)) => {
                    return Err(LoadError::Dbf {
                        path: self.path.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    debug!("Undecodable record {} in {:?}: {}", i, self.path, e);
                    f(RawRecord {
                        cell: None,
                        value: None,
                    })
                }
            }
        }
        Ok(())
    }
}

fn field_names<T: std::io::Read + std::io::Seek>(reader: &dbase::Reader<T>) -> Vec<String> {
    reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect()
}

fn project(record: &Record, cell_field: &str, column: &str) -> RawRecord {
    RawRecord {
        cell: record.get(cell_field).and_then(numeric_value),
        value: record.get(column).and_then(numeric_value),
    }
}

/// Numeric reading of a dBASE field. SPAM tables store values as `N` fields,
/// but some exports write them as character data.
pub fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(n) => *n,
        FieldValue::Float(f) => f.map(f64::from),
        FieldValue::Double(d) => Some(*d),
        FieldValue::Integer(i) => Some(f64::from(*i)),
        FieldValue::Currency(c) => Some(*c),
        FieldValue::Character(Some(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
