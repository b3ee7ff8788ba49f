use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{build_pool, IntegrateConfig};
use crate::coverer::ConstrainedCoverer;
use crate::error::Result;
use crate::features::GeometricFeatures;
use crate::relate::RelationMaterializer;
use crate::tiling::Tiler;
use crate::writer::{create_output_path, BatchedWriter};

/**
 * The feature-mode driver: integrates user features with the cell hierarchy
 * by materializing their topological relations and writing them under
 * `<output>/<input-stem>[_compressed]/`. Features are fanned out across the
 * pool in chunks; every worker owns its coverer and its sink.
 */
#[derive(Debug)]
pub struct Integrator {
    config: IntegrateConfig,
}

impl Integrator {
    pub fn new(config: IntegrateConfig) -> Result<Integrator> {
        config.validate()?;
        Ok(Integrator { config })
    }

    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        if config.compressed {
            info!("compression on; relations will be compressed using the s2 hierarchy");
        }

        let stem = config
            .geometry_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("features");
        let out_dir = if config.compressed {
            config.output_path.join(format!("{stem}_compressed"))
        } else {
            config.output_path.join(stem)
        };
        create_output_path(None, &out_dir)?;

        let features = GeometricFeatures::new(&config.geometry_path).features()?;
        info!(count = features.len(), "materialized input features");

        let writer = BatchedWriter::new(&out_dir, config.format, config.flush_threshold);
        let tiler = Tiler::new(config.tolerance);
        let materializer = RelationMaterializer::new(
            &tiler,
            i32::from(config.min_level),
            i32::from(config.max_level),
        );

        let pool = build_pool(config.pool_size)?;
        let chunk_size = features
            .len()
            .div_ceil(pool.current_num_threads())
            .max(1);
        pool.install(|| {
            features.par_chunks(chunk_size).try_for_each(|chunk| {
                let mut sink = writer.sink();
                for feature in chunk {
                    let graph = materializer.relations(feature, &mut self.feature_coverer())?;
                    if graph.is_empty() {
                        // Empty coverage is not an error; there is just
                        // nothing to say about this feature.
                        debug!(feature = %feature.iri, "empty coverage");
                    }
                    sink.extend(graph)?;
                }
                sink.finish()
            })
        })?;
        info!(path = %out_dir.display(), "relations written");
        Ok(())
    }

    // Compressed output widens the filling range down to the hierarchy root,
    // overriding the configured lower bound.
    fn feature_coverer(&self) -> ConstrainedCoverer {
        let mut coverer = ConstrainedCoverer::new(
            i32::from(self.config.min_level),
            i32::from(self.config.max_level),
        );
        if self.config.compressed {
            coverer.set_min_level(0);
        }
        coverer
    }
}

/// Convenience entry point mirroring the other run modes.
pub fn integrate(config: IntegrateConfig) -> Result<()> {
    Integrator::new(config)?.run()
}
