use std::path::PathBuf;

use clap::Args;

use cellgraph::config::LevelConfig;
use cellgraph::error::Result;
use cellgraph::level::generate_level;
use cellgraph::writer::RdfFormat;

//==================================================
// CLI spec.
//==================================================
#[derive(Debug, Args)]
#[command(about = "Generate RDF for every S2 cell of one level.")]
pub struct LevelArgs {
    #[arg(short, long, help = "The S2 level [0, 30] to generate cells for.")]
    level: u64,

    #[arg(short, long, default_value_t = RdfFormat::Ttl, help = "The format to write the RDF in.")]
    format: RdfFormat,

    #[arg(
        long,
        default_value_t = -1,
        help = "The parent level to link cells against. Negative links one level up."
    )]
    target_parent_level: i64,

    #[arg(
        short,
        long,
        default_value_t = 100_000,
        help = "The number of s2 cells to include in a single output file. Larger numbers \
                (100000+) are recommended for levels 10 and higher to reduce the number of \
                files written."
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
pub fn handle_level_subcommand(args: &LevelArgs) -> Result<()> {
    let target_parent_level = u64::try_from(args.target_parent_level).ok();
    generate_level(LevelConfig {
        level: args.level,
        format: args.format,
        batch_size: args.batch_size,
        target_parent_level,
        output_path: args.output_path.clone(),
        pool_size: args.pool_size,
    })
}
