use std::fs;
use std::path::{Path, PathBuf};

use crate::cell::MAX_LEVEL;
use crate::error::{Error, Result};
use crate::writer::RdfFormat;

/**
 * Parameters of a feature-mode (`integrate`) run: relations between the
 * features under `geometry_path` and the cells of `[min_level, max_level]`.
 */
#[derive(Debug, Clone)]
pub struct IntegrateConfig {
    pub compressed: bool,
    pub geometry_path: PathBuf,
    pub output_path: PathBuf,
    pub tolerance: f64,
    pub min_level: u8,
    pub max_level: u8,
    pub format: RdfFormat,
    pub flush_threshold: Option<usize>,
    pub pool_size: Option<usize>,
}

impl IntegrateConfig {
    pub fn validate(&self) -> Result<()> {
        check_levels(self.min_level, self.max_level)?;
        check_tolerance(self.tolerance)?;
        if self.flush_threshold == Some(0) {
            return Err(Error::InvalidConfig(
                "flush_threshold must be at least 1".to_string(),
            ));
        }
        check_writable(&self.output_path)
    }
}

/**
 * Parameters of a cell-mode (`level`) run: every cell of `level`, described
 * in batches of `batch_size`.
 */
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub level: u64,
    pub format: RdfFormat,
    pub batch_size: usize,
    pub target_parent_level: Option<u64>,
    pub output_path: PathBuf,
    pub pool_size: Option<usize>,
}

impl LevelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.level > MAX_LEVEL {
            return Err(Error::InvalidConfig(format!(
                "level {} outside the S2 hierarchy",
                self.level
            )));
        }
        if let Some(target) = self.target_parent_level {
            if target > self.level {
                return Err(Error::InvalidConfig(format!(
                    "target parent level {target} is below level {}",
                    self.level
                )));
            }
        }
        check_batch_size(self.batch_size)?;
        check_writable(&self.output_path)
    }
}

/**
 * Parameters of an overlap run: homogeneous coverings of the features under
 * `geometry_path`, with the covering cells described per feature batch.
 */
#[derive(Debug, Clone)]
pub struct OverlapConfig {
    pub geometry_path: PathBuf,
    pub output_path: PathBuf,
    pub tolerance: f64,
    pub min_level: u8,
    pub max_level: u8,
    pub format: RdfFormat,
    pub batch_size: usize,
    pub pool_size: Option<usize>,
}

impl OverlapConfig {
    pub fn validate(&self) -> Result<()> {
        check_levels(self.min_level, self.max_level)?;
        check_tolerance(self.tolerance)?;
        check_batch_size(self.batch_size)?;
        check_writable(&self.output_path)
    }
}

fn check_levels(min_level: u8, max_level: u8) -> Result<()> {
    if min_level > max_level {
        return Err(Error::InvalidConfig(format!(
            "min_level {min_level} above max_level {max_level}"
        )));
    }
    if u64::from(max_level) > MAX_LEVEL {
        return Err(Error::InvalidConfig(format!(
            "max_level {max_level} outside the S2 hierarchy"
        )));
    }
    Ok(())
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if !(tolerance > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    Ok(())
}

fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(Error::InvalidConfig(
            "batch_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// Fail at startup when the output tree cannot be created, rather than from
// inside a worker.
fn check_writable(output_path: &Path) -> Result<()> {
    fs::create_dir_all(output_path)
        .map_err(|err| Error::InvalidConfig(format!("output path not writable: {err}")))
}

/**
 * The worker pool for a run. A size of `None` leaves the decision to the
 * runtime, which defaults to one worker per logical CPU.
 */
pub fn build_pool(pool_size: Option<usize>) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_size.unwrap_or(0))
        .build()?;
    Ok(pool)
}
