//! Result and Error types for etmap-mapper

use nalgebra::Point3;

/// Type alias for Result<T, mapper::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `etmap-mapper` crate
///
/// Duplicate points and zero direction components are dealt with where they
/// are found. Only a segment the nudge cannot separate is reported. Anything
/// that is returned aborts the whole mapping pass.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("point {point:?} of trajectory {trajectory}, segment {segment} is outside the grid")]
    OutOfBoundsCoordinate {
        trajectory: usize,
        segment: usize,
        point: Point3<f64>,
    },

    #[error("energy loss {de} eV of trajectory {trajectory}, segment {segment} is not finite")]
    NonFiniteEnergy {
        trajectory: usize,
        segment: usize,
        de: f64,
    },

    #[error("segment {segment} of trajectory {trajectory} has zero length at {point:?}")]
    DegenerateSegment {
        trajectory: usize,
        segment: usize,
        point: Point3<f64>,
    },

    #[error(
        "trajectory {trajectory} has inconsistent lengths ({points} points, {energies} energies, {mask} mask values)"
    )]
    InconsistentTrajectory {
        trajectory: usize,
        points: usize,
        energies: usize,
        mask: usize,
    },

    #[error("invalid mapper configuration: {0}")]
    InvalidConfig(String),

    #[error("parallel mapping needs at least one worker")]
    ZeroWorkers,

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("grid error")]
    Grid(#[from] etmap_grid::Error),

    #[error("failed to parse configuration")]
    ConfigParse(#[from] serde_json::Error),
}
