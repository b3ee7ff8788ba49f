use rayon::prelude::*;
use tracing::info;

use crate::cell::CellId;
use crate::config::{build_pool, LevelConfig};
use crate::describe::CellDescriber;
use crate::error::Result;
use crate::rdf::Graph;
use crate::writer::{create_output_path, level_dir, write_graph};

/**
 * The cell-mode driver: walks every cell of one level in id order, splits
 * the stream into fixed-size batches, and has the pool describe and write
 * each batch to `level_{L}/{first_cell_id}.{ext}`. Together the files cover
 * the level exactly once.
 */
#[derive(Debug)]
pub struct LevelGenerator {
    config: LevelConfig,
}

impl LevelGenerator {
    pub fn new(config: LevelConfig) -> Result<LevelGenerator> {
        config.validate()?;
        Ok(LevelGenerator { config })
    }

    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        create_output_path(Some(config.level), &config.output_path)?;
        let dir = level_dir(&config.output_path, config.level);
        let describer = CellDescriber::new(config.target_parent_level);

        info!(level = config.level, batch_size = config.batch_size, "generating cell level");

        let mut cells = CellId::iter_at_level(config.level);
        let batch_size = config.batch_size;
        let batches = std::iter::from_fn(move || {
            let batch: Vec<CellId> = cells.by_ref().take(batch_size).collect();
            (!batch.is_empty()).then_some(batch)
        });

        let pool = build_pool(config.pool_size)?;
        pool.install(|| {
            batches.par_bridge().try_for_each(|batch| {
                let mut graph = Graph::new();
                for cell in &batch {
                    describer.describe_into(&mut graph, *cell)?;
                }
                let path = dir.join(format!("{}{}", batch[0].id(), config.format.extension()));
                write_graph(&graph, &path, config.format)
            })
        })?;
        info!(path = %dir.display(), "cell level written");
        Ok(())
    }
}

pub fn generate_level(config: LevelConfig) -> Result<()> {
    LevelGenerator::new(config)?.run()
}
