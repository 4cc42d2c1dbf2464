//! Orchestration of full mapping passes

// crate modules
use crate::config::{MapperConfig, ScalingConstants};
use crate::deposition::deposit_energy;
use crate::emission::build_emission_centers;
use crate::emitter::{SeEmitter, SeTrace};
use crate::error::{Error, Result};
use crate::trajectory::{SegmentBatch, Trajectory};

// etmap modules
use etmap_grid::{Field, Grid, Materials};

// external crates
use log::{debug, info};
use rayon::prelude::*;

// standard library
use std::ops::Range;

/// Everything a mapping pass adds to
///
/// A pass only ever adds to these, and trajectories are independent, so two
/// sets of accumulators covering different trajectories can be merged in any
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulators {
    /// Deposited energy per cell (eV)
    pub deposited: Field,
    /// Amplified secondary electron count per cell
    pub flux: Field,
    /// Every secondary electron vector fired
    pub traces: Vec<SeTrace>,
}

impl Accumulators {
    /// Zeroed accumulators matching a grid
    pub fn zeros_like(grid: &Grid) -> Self {
        Self {
            deposited: Field::zeros_like(grid),
            flux: Field::zeros_like(grid),
            traces: Vec::new(),
        }
    }

    /// Add another set of accumulators into this one
    ///
    /// Fields are summed elementwise and traces appended.
    pub fn merge(&mut self, other: Accumulators) -> Result<()> {
        self.deposited.merge(&other.deposited)?;
        self.flux.merge(&other.flux)?;
        self.traces.extend(other.traces);
        Ok(())
    }

    /// Reset to zero
    pub fn clear(&mut self) {
        self.deposited.clear();
        self.flux.clear();
        self.traces.clear();
    }
}

/// Maps primary electron trajectories onto the grid
///
/// The grid and materials are borrowed read-only from the surrounding
/// simulation for the lifetime of the mapper, while the deposited energy and
/// flux accumulators are owned by it.
///
/// A pass runs three stages over all solid segments of all trajectories at
/// once:
///
/// 1. Deposit the energy of each segment into the cells it crosses
/// 2. Build secondary electron emission centres along the segments
/// 3. Fire a secondary electron vector from each centre towards the surface
///
/// Results accumulate across passes until [reset()](TrajectoryMapper::reset).
///
/// ```rust
/// # use etmap_grid::{Grid, Material, Materials, Phase};
/// # use etmap_mapper::{MapperConfig, TrajectoryMapper, Trajectory};
/// let grid = Grid::filled([2, 1, 1], 5.0, Phase::Substrate).unwrap();
/// let materials = Materials {
///     substrate: Material::new("Au", 35.0, 0.5).unwrap(),
///     deposit: Material::new("PtC", 60.0, 0.6).unwrap(),
/// };
/// let mut mapper = TrajectoryMapper::new(&grid, &materials, MapperConfig::default()).unwrap();
///
/// let trajectory = Trajectory::from_arrays(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]], &[1.0, 0.5], &[true]);
/// let (deposited, _flux) = mapper.map_follow(&[trajectory]).unwrap();
///
/// assert_eq!(deposited.values(), &[250.0, 250.0]);
/// ```
#[derive(Debug)]
pub struct TrajectoryMapper<'a> {
    grid: &'a Grid,
    materials: &'a Materials,
    config: MapperConfig,
    seed: u64,
    accumulators: Accumulators,
}

impl<'a> TrajectoryMapper<'a> {
    /// Set up a mapper with zeroed accumulators
    ///
    /// If the configuration has no seed, one is drawn now and kept for the
    /// life of the mapper.
    pub fn new(grid: &'a Grid, materials: &'a Materials, config: MapperConfig) -> Result<Self> {
        config.validate()?;
        materials.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        debug!("Mapper seed {seed}");

        Ok(Self {
            grid,
            materials,
            config,
            seed,
            accumulators: Accumulators::zeros_like(grid),
        })
    }

    /// Map a set of trajectories on the current thread
    ///
    /// Returns the deposited energy and flux fields after the pass. On error
    /// nothing from the failed pass is kept.
    pub fn map_follow(&mut self, trajectories: &[Trajectory]) -> Result<(&Field, &Field)> {
        let result = self.map_chunk(trajectories, 0)?;
        self.accumulators.merge(result)?;
        Ok((&self.accumulators.deposited, &self.accumulators.flux))
    }

    /// Map a set of trajectories split over `workers` threads
    ///
    /// The trajectories are split into `workers` contiguous chunks of near
    /// equal size. Each chunk is mapped into private accumulators, sharing the
    /// grid and materials, and the results are merged once every worker has
    /// returned. If any chunk fails the whole pass is discarded.
    ///
    /// For the same seed the result matches [map_follow()](TrajectoryMapper::map_follow)
    /// up to floating point summation order.
    pub fn map_follow_parallel(
        &mut self,
        trajectories: &[Trajectory],
        workers: usize,
    ) -> Result<(&Field, &Field)> {
        if workers == 0 {
            return Err(Error::ZeroWorkers);
        }

        let chunks = split_even(trajectories.len(), workers);
        info!(
            "Mapping {} trajectories over {} workers",
            trajectories.len(),
            chunks.len()
        );

        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        let results = pool.install(|| {
            chunks
                .par_iter()
                .map(|range| self.map_chunk(&trajectories[range.clone()], range.start))
                .collect::<Result<Vec<Accumulators>>>()
        })?;

        for result in results {
            self.accumulators.merge(result)?;
        }

        Ok((&self.accumulators.deposited, &self.accumulators.flux))
    }

    /// Run all three stages for a chunk into fresh accumulators
    ///
    /// `offset` is the global index of the first trajectory of the chunk.
    fn map_chunk(&self, trajectories: &[Trajectory], offset: usize) -> Result<Accumulators> {
        let mut result = Accumulators::zeros_like(self.grid);

        let batch = SegmentBatch::from_trajectories(
            trajectories,
            offset,
            self.grid,
            self.config.perturbation,
        )?;

        if batch.is_empty() {
            debug!("No solid segments in {} trajectories", trajectories.len());
            return Ok(result);
        }

        deposit_energy(self.grid, &batch, &mut result.deposited)?;

        let centers = build_emission_centers(self.grid, &batch, self.config.segment_min_length)?;

        SeEmitter::new(self.grid, self.materials, &self.config).emit(
            &centers,
            self.seed,
            &mut result.flux,
            &mut result.traces,
        )?;

        Ok(result)
    }

    /// Deposited energy per cell (eV)
    pub fn deposited(&self) -> &Field {
        &self.accumulators.deposited
    }

    /// Amplified secondary electron count per cell
    pub fn flux(&self) -> &Field {
        &self.accumulators.flux
    }

    /// Every secondary electron vector fired so far
    pub fn traces(&self) -> &[SeTrace] {
        &self.accumulators.traces
    }

    /// Configuration in use
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Seed of the escape directions
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Constants needed to convert the flux into a physical yield
    pub fn scaling(&self) -> ScalingConstants {
        ScalingConstants::new(self.grid, &self.config)
    }

    /// Zero the accumulators ready for a fresh pass
    pub fn reset(&mut self) {
        self.accumulators.clear();
    }

    /// Hand the accumulators over to the consumer
    pub fn into_parts(self) -> Accumulators {
        self.accumulators
    }
}

/// Split `n` items into `k` contiguous, order preserving ranges
///
/// Sizes differ by at most one, with the longer ranges first. Some ranges are
/// empty when there are fewer items than chunks.
pub fn split_even(n: usize, k: usize) -> Vec<Range<usize>> {
    if k == 0 {
        return Vec::new();
    }

    let (base, extra) = (n / k, n % k);
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}
