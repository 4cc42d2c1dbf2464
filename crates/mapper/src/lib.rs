//! Map electron trajectories to deposited energy and secondary electron flux
//!
//! # Overview
//!
//! The [TrajectoryMapper] borrows a [Grid](etmap_grid::Grid) and the
//! [Materials](etmap_grid::Materials) of the simulation, and owns two
//! accumulator fields that each mapping pass adds to:
//!
//! - `deposited` - energy deposited per cell (eV)
//! - `flux` - secondary electron count per surface cell, amplified
//!
//! The flux is multiplied by the `amplification` of the [MapperConfig] so
//! that the small yield of a single vector survives accumulation. Use the
//! [ScalingConstants] from [TrajectoryMapper::scaling()] to convert it back.
//!
//! ## Basic use
//!
//! ```rust
//! # use etmap_grid::{Grid, Material, Materials, Phase};
//! # use etmap_mapper::{MapperConfig, Trajectory, TrajectoryMapper};
//! let mut grid = Grid::filled([10, 10, 10], 1.0, Phase::Void).unwrap();
//! for i in 0..10 {
//!     for j in 0..10 {
//!         grid.set_phase(i, j, 0, Phase::Substrate).unwrap();
//!     }
//! }
//! grid.mark_surface();
//!
//! let materials = Materials {
//!     substrate: Material::new("Si", 90.0, 2.7).unwrap(),
//!     deposit: Material::new("PtC", 60.0, 0.6).unwrap(),
//! };
//!
//! let trajectory = Trajectory::from_arrays(
//!     &[[5.0, 5.0, 1.0], [5.2, 5.1, 0.6], [5.9, 4.8, 0.2]],
//!     &[5.0, 4.8, 4.1],
//!     &[true, true],
//! );
//!
//! let mut mapper = TrajectoryMapper::new(&grid, &materials, MapperConfig::default()).unwrap();
//! let (deposited, flux) = mapper.map_follow(&[trajectory]).unwrap();
//!
//! assert!((deposited.sum() - 900.0).abs() < 1e-6);
//! assert!(flux.is_finite());
//! ```
//!
//! ## Parallel passes
//!
//! Trajectories are independent, so a pass can be split over workers with
//! [TrajectoryMapper::map_follow_parallel()]. Every worker maps its own chunk
//! into private accumulators and the results are summed at the end.
//!
//! ```rust, no_run
//! # use etmap_grid::{Grid, Material, Materials, Phase};
//! # use etmap_mapper::{MapperConfig, Trajectory, TrajectoryMapper};
//! # let grid = Grid::filled([10, 10, 10], 1.0, Phase::Substrate).unwrap();
//! # let materials = Materials {
//! #     substrate: Material::new("Si", 90.0, 2.7).unwrap(),
//! #     deposit: Material::new("PtC", 60.0, 0.6).unwrap(),
//! # };
//! # let trajectories: Vec<Trajectory> = Vec::new();
//! let mut mapper = TrajectoryMapper::new(&grid, &materials, MapperConfig::default()).unwrap();
//! let (deposited, flux) = mapper.map_follow_parallel(&trajectories, 8).unwrap();
//! ```
//!
//! ## Individual stages
//!
//! The stages are public for anyone wanting to drive them directly, see
//! [deposit_energy()], [build_emission_centers()] and [SeEmitter].

mod config;
mod deposition;
mod emission;
mod emitter;
mod error;
mod mapper;
mod trajectory;

#[doc(inline)]
pub use crate::mapper::{split_even, Accumulators, TrajectoryMapper};

#[doc(inline)]
pub use crate::config::{MapperConfig, ScalingConstants};

#[doc(inline)]
pub use crate::trajectory::{Segment, SegmentBatch, Trajectory, TrajectorySpan};

#[doc(inline)]
pub use crate::deposition::deposit_energy;

#[doc(inline)]
pub use crate::emission::{build_emission_centers, EmissionCenter, EmissionKind};

#[doc(inline)]
pub use crate::emitter::{random_direction, trajectory_rng, SeEmitter, SeTrace};

#[doc(inline)]
pub use crate::error::{Error, Result};
