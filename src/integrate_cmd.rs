use std::path::PathBuf;

use clap::Args;

use cellgraph::config::IntegrateConfig;
use cellgraph::error::Result;
use cellgraph::integrator::integrate;
use cellgraph::writer::RdfFormat;

//==================================================
// CLI spec.
//==================================================
#[derive(Debug, Args)]
#[command(about = "Integrate features with S2 cells through topological relations.")]
pub struct IntegrateArgs {
    #[arg(short, long, help = "Path to the folder with triples being integrated.")]
    geometry_path: PathBuf,

    #[arg(
        long,
        help = "Use the S2 hierarchy to write a compressed collection of relations at \
                various levels."
    )]
    compressed: bool,

    #[arg(
        short,
        long,
        default_value_t = 1e-2,
        help = "Tolerance used during spatial operations."
    )]
    tolerance: f64,

    #[arg(long, default_value_t = 1, help = "The level where generation starts.")]
    min_level: u8,

    #[arg(long, default_value_t = 1, help = "The level where generation ends.")]
    max_level: u8,

    #[arg(short, long, default_value_t = RdfFormat::Ttl, help = "The format to write the RDF in.")]
    format: RdfFormat,

    #[arg(
        long,
        help = "Flush a worker's triples to a new file once this many accumulate. \
                Unset means one file per worker."
    )]
    flush_threshold: Option<usize>,

    #[arg(short, long, default_value = "./output", help = "Where the files are written to.")]
    output_path: PathBuf,

    #[arg(long, help = "Number of workers. Defaults to one per logical CPU.")]
    pool_size: Option<usize>,
}

//==================================================
// Core subcommand logic.
//==================================================
pub fn handle_integrate_subcommand(args: &IntegrateArgs) -> Result<()> {
    integrate(IntegrateConfig {
        compressed: args.compressed,
        geometry_path: args.geometry_path.clone(),
        output_path: args.output_path.clone(),
        tolerance: args.tolerance,
        min_level: args.min_level,
        max_level: args.max_level,
        format: args.format,
        flush_threshold: args.flush_threshold,
        pool_size: args.pool_size,
    })
}
