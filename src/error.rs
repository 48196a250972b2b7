use std::path::PathBuf;

use shapefile::dbase;
use thiserror::Error;

/// Problems with the run configuration. Always fatal, and raised before any
/// input file is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {cols} x {rows}")]
    EmptyGrid { cols: usize, rows: usize },

    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),

    #[error("grid origin ({lon}, {lat}) lies outside the geographic domain")]
    OriginOutOfDomain { lon: f64, lat: f64 },

    #[error(
        "grid extent [{west}, {east}] x [{south}, {north}] does not fit the geographic domain; \
         check that dimensions and cell size agree"
    )]
    ExtentOutOfDomain {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },

    #[error(
        "grid {axis} span {span} (cells x cell size) does not match the declared extent {expected}"
    )]
    ExtentMismatch {
        axis: &'static str,
        span: f64,
        expected: f64,
    },

    #[error("grid origin ({lon}, {lat}) does not match the extent's north-west corner ({west}, {north})")]
    OriginMismatch {
        lon: f64,
        lat: f64,
        west: f64,
        north: f64,
    },

    #[error("extent [{west}, {east}] x [{south}, {north}] is empty or inverted")]
    InvalidExtent {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },

    #[error("no-data value must not be NaN")]
    NanNoData,

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("duplicate {kind} code: {code:?}")]
    DuplicateCode { kind: &'static str, code: String },

    #[error("unknown {kind} code: {code:?}")]
    UnknownCode { kind: &'static str, code: String },
}

/// Failures while reading a tabular input file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dBASE file {path}: {source}")]
    Dbf {
        path: PathBuf,
        #[source]
        source: dbase::Error,
    },

    #[error("column {column:?} is not present in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("file name {0:?} is not valid UTF-8")]
    NonUtf8(PathBuf),

    #[error("stem {stem:?} is shorter than the {marker_len}-character trailing marker")]
    StemTooShort { stem: String, marker_len: usize },
}
