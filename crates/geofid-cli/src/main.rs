//! GeoFid 命令行入口
//!
//! 读取一个 CAD 文件，按允许的几何类型过滤或降级，再写出到另一种格式。

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geofid_core::fidelity::KindSet;
use geofid_core::geometry::GeometryKind;
use geofid_core::request::ConversionRequest;
use geofid_core::units::Unit;
use geofid_file::{export_file, import_file, ExportOptions, ImportOptions};

#[derive(Parser)]
#[command(
    name = "geofid",
    version,
    about = "Down-convert CAD geometry to the kinds a downstream tool accepts"
)]
struct Cli {
    /// Input file (.dxf, .csv, .txt, .json)
    input: PathBuf,

    /// Output file (.dxf, .csv, .txt, .json)
    output: PathBuf,

    /// Allowed geometry kinds, e.g. "point,line" (empty = all)
    #[arg(long, value_delimiter = ',')]
    allowed: Vec<String>,

    /// Convert disallowed geometry instead of dropping it
    #[arg(long)]
    convert: bool,

    /// Number of segments per converted geometry
    #[arg(long, default_value = "0")]
    num_segments: usize,

    /// Segment length, used when --num-segments is 0
    #[arg(long, default_value = "0")]
    segment_length: f64,

    /// Unit of --segment-length
    #[arg(long, default_value = "um")]
    segment_units: String,

    /// Coordinate unit of CSV/TXT input
    #[arg(long, default_value = "um")]
    units: String,

    /// Coordinate unit of the output file
    #[arg(long, default_value = "um")]
    export_units: String,

    /// CSV input has no header row, and none is written on output
    #[arg(long)]
    no_header: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn import_options(&self) -> Result<ImportOptions> {
        let allowed = self
            .allowed
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<GeometryKind>())
            .collect::<Result<KindSet, _>>()?;

        Ok(ImportOptions {
            request: ConversionRequest {
                allowed,
                convert: self.convert,
                num_segments: self.num_segments,
                segment_length: self.segment_length,
                segment_unit: self.segment_units.parse::<Unit>()?,
            },
            units: self.units.parse::<Unit>()?,
            header: !self.no_header,
        })
    }

    fn export_options(&self) -> Result<ExportOptions> {
        Ok(ExportOptions {
            units: self.export_units.parse::<Unit>()?,
            header: !self.no_header,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())?;

    let import_options = cli.import_options()?;
    let export_options = cli.export_options()?;
    info!(
        "Allowed kinds: {}, convert: {}",
        import_options.request.allowed, import_options.request.convert
    );

    let imported = import_file(&cli.input, &import_options)
        .with_context(|| format!("failed to import {}", cli.input.display()))?;

    export_file(&cli.output, &imported.records, &export_options)
        .with_context(|| format!("failed to export {}", cli.output.display()))?;

    info!(
        "Wrote {} records to {} ({} skipped)",
        imported.records.len(),
        cli.output.display(),
        imported.skipped()
    );
    Ok(())
}
