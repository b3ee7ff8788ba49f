use std::path::PathBuf;

use clap::Args;

use cellgraph::config::OverlapConfig;
use cellgraph::error::Result;
use cellgraph::overlap::generate_overlap;
use cellgraph::writer::RdfFormat;

//==================================================
// CLI spec.
//==================================================
#[derive(Debug, Args)]
#[command(about = "Generate RDF for the S2 cells that overlap input geometries.")]
pub struct OverlapArgs {
    #[arg(short, long, help = "The path to geometry files used to select s2 cells.")]
    geometry_path: PathBuf,

    #[arg(short, long, default_value_t = RdfFormat::Ttl, help = "The format to write the RDF in.")]
    format: RdfFormat,

    #[arg(
        short,
        long,
        default_value_t = 1e-2,
        help = "Tolerance used during spatial operations."
    )]
    tolerance: f64,

    #[arg(long, default_value_t = 5, help = "The level where generation starts.")]
    min_level: u8,

    #[arg(long, default_value_t = 5, help = "The level where generation ends.")]
    max_level: u8,

    #[arg(
        short,
        long,
        default_value_t = 100_000,
        help = "The number of geometries to process into a single output file."
    )]
    batch_size: usize,

    #[arg(short, long, default_value = "./output", help = "Where the files are written to.")]
    output_path: PathBuf,

    #[arg(long, help = "Number of workers. Defaults to one per logical CPU.")]
    pool_size: Option<usize>,
}

//==================================================
// Core subcommand logic.
//==================================================
pub fn handle_overlap_subcommand(args: &OverlapArgs) -> Result<()> {
    generate_overlap(OverlapConfig {
        geometry_path: args.geometry_path.clone(),
        output_path: args.output_path.clone(),
        tolerance: args.tolerance,
        min_level: args.min_level,
        max_level: args.max_level,
        format: args.format,
        batch_size: args.batch_size,
        pool_size: args.pool_size,
    })
}
