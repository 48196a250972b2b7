use anyhow::Result;
use clap::Parser;
use spam_raster::{Batch, Catalog, RunConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing SPAM dBASE tables
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Value written to cells without an observation
    #[arg(long, default_value_t = spam_raster::config::DEFAULT_NO_DATA, allow_negative_numbers = true)]
    no_data: f32,

    /// Column holding the cell index
    #[arg(long, default_value = spam_raster::config::DEFAULT_CELL_FIELD)]
    cell_field: String,

    /// Input file extension (case-insensitive)
    #[arg(long, default_value = spam_raster::config::DEFAULT_INPUT_EXTENSION)]
    extension: String,

    /// Number of trailing characters dropped from the input stem when naming outputs
    #[arg(long, default_value_t = 3)]
    marker_len: usize,

    /// Only rasterize these subject codes (repeatable)
    #[arg(long = "subject", value_name = "CODE")]
    subjects: Vec<String>,

    /// Only rasterize these variant codes, e.g. `_I` (repeatable)
    #[arg(long = "variant", value_name = "CODE")]
    variants: Vec<String>,
}

/// `RUST_LOG` directives, falling back to `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    let mut config = RunConfig::new(&args.input, &args.output);
    config.threads = args.threads;
    config.no_data = args.no_data;
    config.cell_field = args.cell_field;
    config.input_extension = args.extension.trim_start_matches('.').to_string();
    config.naming.trailing_marker_len = args.marker_len;
    config.catalog = Catalog::spam().restrict(&args.subjects, &args.variants)?;

    if !args.input.is_dir() {
        error!("Invalid input path: {:?}", args.input);
        anyhow::bail!("Input path must be a directory");
    }

    let batch = Batch::new(config)?;
    info!("Processing directory: {:?}", args.input);
    let report = batch.run()?;

    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    if !report.is_success() {
        anyhow::bail!("{} units failed to process", report.failures.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_honours_rust_log() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("spam_raster=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["spam-raster", "in", "-o", "out"]);
        assert_eq!(args.no_data, -1.0);
        assert_eq!(args.cell_field, "CELL5M");
        assert_eq!(args.extension, "dbf");
        assert_eq!(args.marker_len, 3);
        assert!(args.subjects.is_empty());
    }

    #[test]
    fn test_args_filters() {
        let args = Args::parse_from([
            "spam-raster",
            "in",
            "-o",
            "out",
            "--no-data",
            "-9999",
            "--subject",
            "WHEA",
            "--subject",
            "RICE",
            "--variant",
            "_I",
        ]);
        assert_eq!(args.no_data, -9999.0);
        assert_eq!(args.subjects, vec!["WHEA", "RICE"]);
        assert_eq!(args.variants, vec!["_I"]);
    }
}
