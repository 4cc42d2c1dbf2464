//! Secondary electron emission centres along trajectory segments
//!
//! Energy lost along a segment is released as secondary electrons from
//! points spread along it. Segments are often shorter than a cell and are
//! kept whole, while long segments are cut into even pieces no longer than
//! `segment_min_length`, each emitting from its start point.
//!
//! Because every piece emits from its start, the last point of a trajectory
//! would never emit at all. Two extra centres are therefore placed at the end
//! of each trajectory:
//!
//! 1. [EmissionKind::EndRepeat] - repeats the energy of the last centre
//! 2. [EmissionKind::EndResidual] - `segment_min_length / L * de` of the last
//!    segment, the share of a final piece of standard length
//!
//! These two are deliberately outside the energy balance of the trajectory.

// crate modules
use crate::error::{Error, Result};
use crate::trajectory::{Segment, SegmentBatch, TrajectorySpan};

// etmap modules
use etmap_grid::Grid;

use log::debug;
use nalgebra::Point3;

/// Origin of an [EmissionCenter]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionKind {
    /// Start of a segment or of one of its pieces
    Segment,
    /// End of trajectory, repeating the energy of the centre before it
    EndRepeat,
    /// End of trajectory, residual share of the last segment
    EndResidual,
}

/// Point emitting secondary electrons with an energy share (eV)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionCenter {
    /// Global index of the trajectory it came from
    pub trajectory: usize,
    /// Index of the segment it came from within the trajectory
    pub segment: usize,
    /// Position of the centre (nm)
    pub point: Point3<f64>,
    /// Energy released from this centre (eV)
    pub energy: f64,
    /// How the centre was produced
    pub kind: EmissionKind,
}

/// Build emission centres for every trajectory in a batch
///
/// Centres are grouped by trajectory, in segment order, with the two end of
/// trajectory centres last in each group.
///
/// ```rust
/// # use etmap_grid::{Grid, Phase};
/// # use etmap_mapper::{build_emission_centers, EmissionKind, SegmentBatch, Trajectory};
/// let grid = Grid::filled([2, 1, 1], 5.0, Phase::Substrate).unwrap();
/// let trajectory = Trajectory::from_arrays(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]], &[1.0, 0.5], &[true]);
/// let batch = SegmentBatch::from_trajectories(&[trajectory], 0, &grid, 1e-6).unwrap();
///
/// let centers = build_emission_centers(&grid, &batch, 5.0).unwrap();
/// let pieces: Vec<_> = centers.iter().filter(|c| c.kind == EmissionKind::Segment).collect();
///
/// assert_eq!(pieces.len(), 2);
/// assert_eq!(pieces[1].point.x, 5.0);
/// assert_eq!(pieces[1].energy, 250.0);
/// ```
pub fn build_emission_centers(
    grid: &Grid,
    batch: &SegmentBatch,
    segment_min_length: f64,
) -> Result<Vec<EmissionCenter>> {
    debug!("Preparing emission centres for {} segments", batch.len());
    let mut centers = Vec::with_capacity(batch.len() + 2 * batch.spans.len());

    for span in &batch.spans {
        trajectory_centers(grid, span, batch.segments_of(span), segment_min_length, &mut centers)?;
    }

    debug!("Built {} emission centres", centers.len());
    Ok(centers)
}

/// Emission centres for the segments of a single trajectory
fn trajectory_centers(
    grid: &Grid,
    span: &TrajectorySpan,
    segments: &[Segment],
    segment_min_length: f64,
    centers: &mut Vec<EmissionCenter>,
) -> Result<()> {
    let Some(last) = segments.last() else {
        return Ok(());
    };

    let mut push = |point: Point3<f64>, energy: f64, kind: EmissionKind, segment: usize| {
        // a centre outside the grid is a broken subdivision, never clamp it
        if !grid.contains(&point) {
            return Err(Error::OutOfBoundsCoordinate {
                trajectory: span.trajectory,
                segment,
                point,
            });
        }
        centers.push(EmissionCenter {
            trajectory: span.trajectory,
            segment,
            point,
            energy,
            kind,
        });
        Ok(())
    };

    let mut last_energy = 0.0;
    for segment in segments {
        let length = segment.length();

        if length <= segment_min_length {
            push(segment.p0, segment.de, EmissionKind::Segment, segment.index)?;
            last_energy = segment.de;
            continue;
        }

        // ceiling so no piece is longer than the threshold
        let n = (length / segment_min_length).ceil() as usize;
        let step = segment.direction() / n as f64;
        let energy = segment.de / n as f64;

        for i in 0..n {
            push(segment.p0 + step * i as f64, energy, EmissionKind::Segment, segment.index)?;
        }
        last_energy = energy;
    }

    push(last.pn, last_energy, EmissionKind::EndRepeat, last.index)?;

    let residual = segment_min_length / last.length() * last.de;
    push(last.pn, residual, EmissionKind::EndResidual, last.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trajectory;
    use etmap_grid::Phase;

    fn centers_for(trajectory: Trajectory, segment_min_length: f64) -> Vec<EmissionCenter> {
        let grid = Grid::filled([4, 4, 4], 5.0, Phase::Substrate).unwrap();
        let batch = SegmentBatch::from_trajectories(&[trajectory], 0, &grid, 1e-6).unwrap();
        build_emission_centers(&grid, &batch, segment_min_length).unwrap()
    }

    #[test]
    fn short_segment_kept_whole() {
        let centers = centers_for(
            Trajectory::from_arrays(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]], &[1.0, 0.5], &[true]),
            10.0,
        );

        assert_eq!(centers.len(), 3);
        assert_eq!(centers[0].point, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(centers[0].energy, 500.0);
        assert_eq!(centers[0].kind, EmissionKind::Segment);

        assert_eq!(centers[1].kind, EmissionKind::EndRepeat);
        assert_eq!(centers[1].point, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(centers[1].energy, 500.0);

        assert_eq!(centers[2].kind, EmissionKind::EndResidual);
        assert_eq!(centers[2].energy, 500.0);
    }

    #[test]
    fn residual_uses_last_segment() {
        let centers = centers_for(
            Trajectory::from_arrays(
                &[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 8.0, 0.0]],
                &[1.0, 0.9, 0.5],
                &[true, true],
            ),
            1.0,
        );

        // 2 pieces of 50 eV, then 8 pieces of 50 eV
        let pieces = centers.iter().filter(|c| c.kind == EmissionKind::Segment).count();
        assert_eq!(pieces, 10);

        let repeat = centers.iter().find(|c| c.kind == EmissionKind::EndRepeat).unwrap();
        assert!((repeat.energy - 50.0).abs() < 1e-9);

        let residual = centers.iter().find(|c| c.kind == EmissionKind::EndResidual).unwrap();
        assert!((residual.energy - 400.0 / 8.0).abs() < 1e-9);
        assert_eq!(residual.point, Point3::new(2.0, 8.0, 0.0));
    }

    #[test]
    fn pieces_cover_segment_start_to_end() {
        let centers = centers_for(
            Trajectory::from_arrays(&[[19.0, 19.0, 19.0], [1.0, 4.0, 0.5]], &[1.0, 0.0], &[true]),
            0.7,
        );
        let pieces: Vec<&EmissionCenter> = centers
            .iter()
            .filter(|c| c.kind == EmissionKind::Segment)
            .collect();

        let length: f64 = (Point3::new(1.0, 4.0, 0.5) - Point3::new(19.0, 19.0, 19.0)).norm();
        assert_eq!(pieces.len(), (length / 0.7).ceil() as usize);
        assert!(pieces.iter().all(|c| c.point.coords.iter().all(|&v| v >= 0.0)));
    }
}
