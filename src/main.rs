use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod integrate_cmd;
mod level_cmd;
mod overlap_cmd;

use integrate_cmd::{handle_integrate_subcommand, IntegrateArgs};
use level_cmd::{handle_level_subcommand, LevelArgs};
use overlap_cmd::{handle_overlap_subcommand, OverlapArgs};

#[derive(Parser)]
#[command(name = "cellgraph")]
#[command(version)]
#[command(about = "Generates an RDF knowledge graph over the S2 cell hierarchy.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Level(LevelArgs),
    Overlap(OverlapArgs),
    Integrate(IntegrateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Level(args) => handle_level_subcommand(args)?,
        Commands::Overlap(args) => handle_overlap_subcommand(args)?,
        Commands::Integrate(args) => handle_integrate_subcommand(args)?,
    }
    Ok(())
}
