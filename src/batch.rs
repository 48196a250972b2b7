//! Directory-level driver: discover tables, test each catalog attribute, and
//! write one raster per attribute found.
//!
//! Every (file, attribute) pair is an independent unit. A failing unit is
//! recorded in the [`BatchReport`] and the run carries on with the rest.

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::catalog::Attribute;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::grid::rasterize;
use crate::layer::load;
use crate::table::{DbfTable, TableSource};
use crate::writer::GeoTiffWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub input: PathBuf,
    /// `None` when the whole file could not be inspected.
    pub attribute: Option<String>,
    pub message: String,
}

impl std::fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{} [{}]: {}", self.input.display(), attribute, self.message),
            None => write!(f, "{}: {}", self.input.display(), self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub inputs: usize,
    /// Inputs that contained none of the catalog attributes.
    pub inputs_without_attributes: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<UnitFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, outcome: FileOutcome) {
        self.inputs += 1;
        if outcome.matched == 0 && outcome.failures.is_empty() {
            self.inputs_without_attributes += 1;
        }
        self.written.extend(outcome.written);
        self.failures.extend(outcome.failures);
    }
}

#[derive(Debug, Default)]
struct FileOutcome {
    matched: usize,
    written: Vec<PathBuf>,
    failures: Vec<UnitFailure>,
}

/// Lists files in `dir` (non-recursive) whose extension matches `extension`
/// ignoring case, sorted by path.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub struct Batch {
    config: RunConfig,
    writer: GeoTiffWriter,
}

impl Batch {
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            writer: GeoTiffWriter::new(),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Processes every input table. Only failures to list the input directory,
    /// create the output directory, or start the thread pool abort the run.
    pub fn run(&self) -> Result<BatchReport> {
        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!("Failed to create output directory {:?}", self.config.output_dir)
        })?;

        let inputs = discover_inputs(&self.config.input_dir, &self.config.input_extension)?;
        info!(
            "Found {} input files, {} candidate attributes",
            inputs.len(),
            self.config.catalog.len()
        );

        let outcomes: Vec<FileOutcome> = match self.config.threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?
                .install(|| self.process_all(&inputs)),
            None => self.process_all(&inputs),
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.merge(outcome);
        }

        info!(
            "Wrote {} rasters from {} input files ({} without catalog attributes)",
            report.written.len(),
            report.inputs,
            report.inputs_without_attributes
        );
        if !report.failures.is_empty() {
            error!("Failed to process {} units:", report.failures.len());
            for failure in &report.failures {
                error!("  {}", failure);
            }
        }

        Ok(report)
    }

    fn process_all(&self, inputs: &[PathBuf]) -> Vec<FileOutcome> {
        inputs
            .par_iter()
            .map(|path| self.process_table(&DbfTable::new(path)))
            .collect()
    }

    /// Runs every catalog attribute against one table, in catalog order.
    fn process_table(&self, table: &dyn TableSource) -> FileOutcome {
        info!("Processing table: {:?}", table.path());
        let mut outcome = FileOutcome::default();

        for attribute in self.config.catalog.attributes() {
            match table.has_column(attribute.name()) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    // Without a readable schema no attribute can succeed.
                    outcome.failures.push(UnitFailure {
                        input: table.path().to_path_buf(),
                        attribute: None,
                        message: e.to_string(),
                    });
                    return outcome;
                }
            }

            outcome.matched += 1;
            match self.process_unit(table, attribute) {
                Ok(path) => outcome.written.push(path),
                Err(e) => outcome.failures.push(UnitFailure {
                    input: table.path().to_path_buf(),
                    attribute: Some(attribute.name().to_string()),
                    message: format!("{:#}", e),
                }),
            }
        }

        if outcome.matched == 0 {
            debug!("No catalog attributes in {:?}", table.path());
        }
        outcome
    }

    fn process_unit(&self, table: &dyn TableSource, attribute: &Attribute) -> Result<PathBuf> {
        let config = &self.config;
        let file_name = config
            .naming
            .output_file_name(table.path(), attribute.name())?;
        let output_path = config.output_dir.join(&file_name);
        info!("Creating {}", file_name);

        let (layer, stats) = load(table, &config.cell_field, attribute.name())?;
        if stats.skipped > 0 {
            debug!(
                "Skipped {} of {} records for {}",
                stats.skipped,
                stats.records,
                attribute.name()
            );
        }
        let collisions = layer.count_value(config.no_data);
        if collisions > 0 {
            warn!(
                "{} cells of {} in {:?} equal the no-data value {} and will read as missing",
                collisions,
                attribute.name(),
                table.path(),
                config.no_data
            );
        }

        let grid = rasterize(&config.frame, &layer, config.no_data);
        drop(layer);

        self.writer
            .write(&output_path, &config.frame, grid, config.no_data, Some(attribute))
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        Ok(output_path)
    }
}
