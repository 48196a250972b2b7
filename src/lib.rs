pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod layer;
pub mod naming;
pub mod table;
pub mod writer;

pub use batch::{discover_inputs, Batch, BatchReport, UnitFailure};
pub use catalog::{Attribute, Catalog, Variant};
pub use config::RunConfig;
pub use frame::{Extent, GridFrame};
pub use grid::{rasterize, DenseGrid};
pub use layer::{load, SparseLayer};
pub use naming::NamingPolicy;
pub use table::{DbfTable, TableSource};
pub use writer::GeoTiffWriter;
