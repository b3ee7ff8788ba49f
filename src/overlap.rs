use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::cell::CellId;
use crate::config::{build_pool, OverlapConfig};
use crate::coverer::ConstrainedCoverer;
use crate::describe::CellDescriber;
use crate::error::Result;
use crate::features::GeometricFeatures;
use crate::rdf::Graph;
use crate::tiling::Tiler;
use crate::writer::{create_output_path, level_dir, write_graph};

/**
 * The overlap driver: cell mode steered by input features. Features are
 * processed in batches; each batch's geometries are covered homogeneously at
 * `[min_level, max_level]`, the covering cells (deduplicated across the
 * batch) are described, and the batch lands in one file named after its
 * first cell under `level_{max_level}/`.
 */
#[derive(Debug)]
pub struct OverlapGenerator {
    config: OverlapConfig,
}

impl OverlapGenerator {
    pub fn new(config: OverlapConfig) -> Result<OverlapGenerator> {
        config.validate()?;
        Ok(OverlapGenerator { config })
    }

    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        create_output_path(Some(u64::from(config.max_level)), &config.output_path)?;
        let dir = level_dir(&config.output_path, u64::from(config.max_level));

        let features = GeometricFeatures::new(&config.geometry_path).features()?;
        info!(count = features.len(), "covering input features");

        let tiler = Tiler::new(config.tolerance);
        let describer = CellDescriber::new(None);

        let pool = build_pool(config.pool_size)?;
        pool.install(|| {
            features.par_chunks(config.batch_size).try_for_each(|batch| {
                let mut coverer =
                    ConstrainedCoverer::new(i32::from(config.min_level), i32::from(config.max_level));
                let mut cells: BTreeSet<CellId> = BTreeSet::new();
                for feature in batch {
                    cells.extend(tiler.covering(&feature.geometry, &mut coverer)?);
                }
                let Some(first) = cells.first() else {
                    // Nothing covered this batch; nothing to write.
                    debug!("batch produced an empty covering");
                    return Ok(());
                };
                let path = dir.join(format!("{}{}", first.id(), config.format.extension()));
                let mut graph = Graph::new();
                for cell in &cells {
                    describer.describe_into(&mut graph, *cell)?;
                }
                write_graph(&graph, &path, config.format)
            })
        })?;
        info!(path = %dir.display(), "overlap cells written");
        Ok(())
    }
}

pub fn generate_overlap(config: OverlapConfig) -> Result<()> {
    OverlapGenerator::new(config)?.run()
}
