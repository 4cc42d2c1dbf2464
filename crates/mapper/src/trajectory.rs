//! Trajectories from the scattering simulation and the segments cut from them

// crate modules
use crate::error::{Error, Result};

// etmap modules
use etmap_grid::Grid;
use etmap_traversal::Ray;

// external crates
use itertools::Itertools;
use log::{error, trace, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

// standard library
use std::ops::Range;

/// Conversion of residual energies from keV to eV
const KEV_TO_EV: f64 = 1000.0;

/// A single primary electron trajectory
///
/// Produced by the scattering simulation and only ever read here. The three
/// sequences run in parallel:
///
/// - `points` - absolute (x, y, z) positions in the grid (nm)
/// - `energies` - residual electron energy at each point (keV)
/// - `mask` - one flag per consecutive pair of points, true where the
///   segment between them passes through solid material
///
/// ```rust
/// # use etmap_mapper::Trajectory;
/// let trajectory = Trajectory::from_arrays(
///     &[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 5.0, 0.0]],
///     &[1.0, 0.5, 0.4],
///     &[true, false],
/// );
///
/// // only the solid segment counts, 0.5 keV => 500 eV
/// assert_eq!(trajectory.total_loss(), 500.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Sampled positions along the path (nm)
    pub points: Vec<Point3<f64>>,
    /// Residual energy at each point (keV)
    pub energies: Vec<f64>,
    /// Whether each segment lies in solid material
    pub mask: Vec<bool>,
}

impl Trajectory {
    /// Create a trajectory from its three parallel sequences
    pub fn new(points: Vec<Point3<f64>>, energies: Vec<f64>, mask: Vec<bool>) -> Self {
        Self {
            points,
            energies,
            mask,
        }
    }

    /// Create a trajectory from plain coordinate arrays
    pub fn from_arrays(points: &[[f64; 3]], energies: &[f64], mask: &[bool]) -> Self {
        Self {
            points: points.iter().map(|&p| Point3::from(p)).collect(),
            energies: energies.to_vec(),
            mask: mask.to_vec(),
        }
    }

    /// Number of sampled points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a trajectory with no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Energy lost over the solid segments (eV)
    pub fn total_loss(&self) -> f64 {
        self.energies
            .iter()
            .tuple_windows()
            .zip(self.mask.iter())
            .filter(|(_, solid)| **solid)
            .map(|((e0, en), _)| (e0 - en) * KEV_TO_EV)
            .sum()
    }

    /// Check the three sequences describe the same number of points
    pub fn validate(&self, trajectory: usize) -> Result<()> {
        let n = self.points.len();
        if self.energies.len() != n || self.mask.len() != n.saturating_sub(1) {
            return Err(Error::InconsistentTrajectory {
                trajectory,
                points: n,
                energies: self.energies.len(),
                mask: self.mask.len(),
            });
        }
        Ok(())
    }

    /// Cut the solid parts of the trajectory into [Segment]s
    ///
    /// Segments where the mask is false are dropped. A segment whose end
    /// points coincide has its end nudged by `perturbation` along x, towards
    /// the inside of the grid, so that it always has a direction.
    ///
    /// Any point outside the grid, a non-finite energy loss, or a segment
    /// that stays zero length after the nudge means the upstream bookkeeping
    /// has gone wrong. The trajectory is dumped to the log and the error
    /// returned.
    pub fn segments(&self, trajectory: usize, grid: &Grid, perturbation: f64) -> Result<Vec<Segment>> {
        self.validate(trajectory)?;

        let mut segments = Vec::with_capacity(self.mask.iter().filter(|&&m| m).count());
        let pairs = self
            .points
            .iter()
            .zip(self.energies.iter())
            .tuple_windows()
            .enumerate();

        for (index, ((p0, e0), (pn, en))) in pairs {
            if !self.mask[index] {
                continue;
            }

            for point in [p0, pn] {
                if !grid.contains(point) {
                    self.dump(trajectory);
                    return Err(Error::OutOfBoundsCoordinate {
                        trajectory,
                        segment: index,
                        point: *point,
                    });
                }
            }

            let mut pn = *pn;
            if *p0 == pn {
                pn.x += if pn.x + perturbation <= grid.extent().x {
                    perturbation
                } else {
                    -perturbation
                };
                trace!("Perturbed duplicate point {p0:?} in trajectory {trajectory}, segment {index}");
            }

            // perturbation lost below the precision of the coordinate
            if *p0 == pn {
                self.dump(trajectory);
                return Err(Error::DegenerateSegment {
                    trajectory,
                    segment: index,
                    point: pn,
                });
            }

            let de = (e0 - en) * KEV_TO_EV;
            if !de.is_finite() {
                self.dump(trajectory);
                return Err(Error::NonFiniteEnergy {
                    trajectory,
                    segment: index,
                    de,
                });
            }

            if de < 0.0 {
                warn!("Energy gain of {:.3e} eV in trajectory {trajectory}, segment {index}", -de);
            }

            segments.push(Segment {
                index,
                p0: *p0,
                pn,
                de,
            });
        }

        Ok(segments)
    }

    /// Write everything about the trajectory to the log for a postmortem
    fn dump(&self, trajectory: usize) {
        error!("Trajectory {trajectory} failed, {} points", self.len());
        for (i, (p, e)) in self.points.iter().zip(self.energies.iter()).enumerate() {
            let solid = self.mask.get(i).map_or("-".to_string(), |m| m.to_string());
            error!("  {i:>5} ({:.6}, {:.6}, {:.6}) {e:.6} keV {solid}", p.x, p.y, p.z);
        }
    }
}

/// Straight piece of a trajectory through solid material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Position of the segment in its trajectory, i.e. points `index` and `index + 1`
    pub index: usize,
    /// Start point (nm)
    pub p0: Point3<f64>,
    /// End point (nm)
    pub pn: Point3<f64>,
    /// Energy lost along the segment (eV)
    pub de: f64,
}

impl Segment {
    /// Vector from start to end
    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.pn - self.p0
    }

    /// Length of the segment (nm)
    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// The segment as a [Ray] for traversal
    #[inline]
    pub fn ray(&self) -> Ray {
        Ray::new(self.p0, self.pn)
    }
}

/// Range of a [SegmentBatch] belonging to one trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySpan {
    /// Global index of the trajectory in the full set being mapped
    pub trajectory: usize,
    /// Positions of its segments in the batch
    pub range: Range<usize>,
}

/// Segments of many trajectories collected into one flat array
///
/// Segments deposit energy and emit secondary electrons independently, so
/// they are processed as a single batch. The spans keep just enough of the
/// trajectory boundaries for the end of trajectory emission rules.
/// Trajectories without a single solid segment have no span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentBatch {
    /// Every solid segment, in trajectory order
    pub segments: Vec<Segment>,
    /// Where each trajectory starts and ends in `segments`
    pub spans: Vec<TrajectorySpan>,
}

impl SegmentBatch {
    /// Collect the segments of a set of trajectories
    ///
    /// `offset` is the global index of the first trajectory, so that errors
    /// and random streams refer to the full set even when mapping a chunk.
    pub fn from_trajectories(
        trajectories: &[Trajectory],
        offset: usize,
        grid: &Grid,
        perturbation: f64,
    ) -> Result<Self> {
        let mut batch = Self::default();

        for (i, trajectory) in trajectories.iter().enumerate() {
            let segments = trajectory.segments(offset + i, grid, perturbation)?;
            if segments.is_empty() {
                continue;
            }

            let start = batch.segments.len();
            batch.segments.extend(segments);
            batch.spans.push(TrajectorySpan {
                trajectory: offset + i,
                range: start..batch.segments.len(),
            });
        }

        Ok(batch)
    }

    /// Total number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if no trajectory had a solid segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of energy lost over every segment (eV)
    pub fn total_energy(&self) -> f64 {
        self.segments.iter().map(|s| s.de).sum()
    }

    /// Segments belonging to a single span
    pub fn segments_of(&self, span: &TrajectorySpan) -> &[Segment] {
        &self.segments[span.range.clone()]
    }
}
