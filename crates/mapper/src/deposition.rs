//! Energy deposition along trajectory segments

// crate modules
use crate::error::{Error, Result};
use crate::trajectory::SegmentBatch;

// etmap modules
use etmap_grid::{Field, Grid};

use log::debug;

/// Distribute the energy lost along every segment into the cells it crosses
///
/// Each cell crossed receives a share of the segment energy proportional to
/// the length of segment inside it:
///
/// ```text
/// deposited[cell] += de * (length in cell / segment length)
/// ```
///
/// so the total added to `deposited` is exactly the total energy of the
/// batch. Segments do not depend on each other and are simply processed in
/// order.
///
/// The segment end points have already been checked against the grid, so a
/// piece falling outside it can only come from a broken batch and is
/// reported as an [Error::OutOfBoundsCoordinate]. A zero length segment would
/// lose its energy and is reported as an [Error::DegenerateSegment].
pub fn deposit_energy(grid: &Grid, batch: &SegmentBatch, deposited: &mut Field) -> Result<()> {
    debug!("Depositing energy of {} segments", batch.len());
    let cell_dim = grid.cell_dim();

    for span in &batch.spans {
        for segment in batch.segments_of(span) {
            let length = segment.length();
            if length == 0.0 {
                return Err(Error::DegenerateSegment {
                    trajectory: span.trajectory,
                    segment: segment.index,
                    point: segment.p0,
                });
            }

            // energy per unit length
            let de = segment.de / length;

            for piece in segment.ray().pieces(cell_dim) {
                let idx = grid
                    .cell_of(&piece.midpoint)
                    .ok_or(Error::OutOfBoundsCoordinate {
                        trajectory: span.trajectory,
                        segment: segment.index,
                        point: piece.midpoint,
                    })?;
                deposited.add(idx, de * piece.length);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{Segment, TrajectorySpan};
    use etmap_grid::Phase;
    use nalgebra::Point3;

    fn batch(segments: Vec<Segment>) -> SegmentBatch {
        SegmentBatch {
            spans: vec![TrajectorySpan {
                trajectory: 0,
                range: 0..segments.len(),
            }],
            segments,
        }
    }

    #[test]
    fn split_evenly_across_two_cells() {
        let grid = Grid::filled([2, 1, 1], 5.0, Phase::Substrate).unwrap();
        let mut deposited = Field::zeros_like(&grid);
        let batch = batch(vec![Segment {
            index: 0,
            p0: Point3::new(0.0, 0.0, 0.0),
            pn: Point3::new(10.0, 0.0, 0.0),
            de: 500.0,
        }]);

        deposit_energy(&grid, &batch, &mut deposited).unwrap();
        assert_eq!(deposited.values(), &[250.0, 250.0]);
    }

    #[test]
    fn unequal_pieces() {
        let grid = Grid::filled([4, 1, 1], 1.0, Phase::Substrate).unwrap();
        let mut deposited = Field::zeros_like(&grid);
        let batch = batch(vec![Segment {
            index: 0,
            p0: Point3::new(0.5, 0.5, 0.5),
            pn: Point3::new(2.5, 0.5, 0.5),
            de: 100.0,
        }]);

        deposit_energy(&grid, &batch, &mut deposited).unwrap();
        assert_eq!(deposited.values(), &[25.0, 50.0, 25.0, 0.0]);
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        let grid = Grid::filled([2, 1, 1], 1.0, Phase::Substrate).unwrap();
        let mut deposited = Field::zeros_like(&grid);
        let p = Point3::new(0.5, 0.5, 0.5);
        let batch = batch(vec![Segment {
            index: 4,
            p0: p,
            pn: p,
            de: 10.0,
        }]);

        assert!(matches!(
            deposit_energy(&grid, &batch, &mut deposited),
            Err(Error::DegenerateSegment { segment: 4, .. })
        ));
        assert_eq!(deposited.sum(), 0.0);
    }
}
