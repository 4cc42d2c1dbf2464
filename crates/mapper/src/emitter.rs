//! Secondary electron escape and surface flux
//!
//! Every emission centre fires a single secondary electron vector in a random
//! direction. The vector is as long as the escape length of the material the
//! centre sits in, and is walked cell by cell with the same traversal used for
//! energy deposition. The first surface cell it reaches collects the
//! secondary electron count of the centre. A vector that runs into void, out
//! of the grid, or out of length before finding the surface contributes
//! nothing.

// crate modules
use crate::config::MapperConfig;
use crate::emission::EmissionCenter;
use crate::error::{Error, Result};

// etmap modules
use etmap_grid::{Field, Grid, Materials, Phase};
use etmap_traversal::Ray;

// external crates
use itertools::Itertools;
use log::debug;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Path of one secondary electron vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeTrace {
    /// Emission centre the vector was fired from
    pub origin: Point3<f64>,
    /// Where the vector would end at its full escape length
    pub end: Point3<f64>,
}

/// Fires secondary electron vectors from emission centres into a flux field
#[derive(Debug, Clone, Copy)]
pub struct SeEmitter<'a> {
    grid: &'a Grid,
    materials: &'a Materials,
    config: &'a MapperConfig,
}

impl<'a> SeEmitter<'a> {
    /// Emitter over a read-only grid and material set
    pub fn new(grid: &'a Grid, materials: &'a Materials, config: &'a MapperConfig) -> Self {
        Self {
            grid,
            materials,
            config,
        }
    }

    /// Generation energy (eV) and escape length (nm) for a cell phase
    ///
    /// Cells that are not solid get a huge generation energy and a vanishing
    /// escape length, so anything emitted from them is negligible and never
    /// travels.
    pub fn escape_parameters(&self, phase: Phase) -> (f64, f64) {
        match self.materials.get(phase) {
            Some(m) => (m.e, m.lambda_escape * self.config.escape_factor),
            None => (
                self.config.void_ionization_energy,
                self.config.void_escape_length,
            ),
        }
    }

    /// Fire one vector from every centre, adding counts to `flux`
    ///
    /// The directions for each trajectory are drawn from their own stream,
    /// seeded by `seed` and the global trajectory index. The same trajectory
    /// therefore fires the same vectors no matter how the set is chunked.
    pub fn emit(
        &self,
        centers: &[EmissionCenter],
        seed: u64,
        flux: &mut Field,
        traces: &mut Vec<SeTrace>,
    ) -> Result<()> {
        debug!("Firing {} secondary electron vectors", centers.len());
        traces.reserve(centers.len());
        let mut collected = 0_usize;

        for (trajectory, group) in &centers.iter().chunk_by(|c| c.trajectory) {
            let mut rng = trajectory_rng(seed, trajectory);
            for center in group {
                let direction = random_direction(&mut rng);
                let (trace, hit) = self.fire(center, direction, flux)?;
                traces.push(trace);
                collected += usize::from(hit);
            }
        }

        debug!("{collected} vectors reached the surface");
        Ok(())
    }

    /// Trace a single vector along a unit `direction`
    ///
    /// Returns the path and whether a surface cell collected it.
    pub fn fire(
        &self,
        center: &EmissionCenter,
        direction: Vector3<f64>,
        flux: &mut Field,
    ) -> Result<(SeTrace, bool)> {
        let idx = self
            .grid
            .cell_of(&center.point)
            .ok_or(Error::OutOfBoundsCoordinate {
                trajectory: center.trajectory,
                segment: center.segment,
                point: center.point,
            })?;

        let (e, escape_length) = self.escape_parameters(self.grid.phase(idx));
        let n_se = center.energy / e * self.config.amplification;

        let ray = Ray::from_direction(center.point, direction * escape_length);
        let trace = SeTrace {
            origin: ray.origin,
            end: ray.end,
        };

        for piece in ray.pieces(self.grid.cell_dim()) {
            let Some(idx) = self.grid.cell_of(&piece.midpoint) else {
                break;
            };

            if self.grid.is_surface(idx) {
                flux.add(idx, n_se);
                return Ok((trace, true));
            }

            if !self.grid.phase(idx).is_solid() {
                break;
            }
        }

        Ok((trace, false))
    }
}

/// Random stream for the vectors of one trajectory
pub fn trajectory_rng(seed: u64, trajectory: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (trajectory as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Isotropic unit vector from three normal samples
///
/// The normal distribution is spherically symmetric, so normalising removes
/// the magnitude and leaves a uniform direction.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
        );
        let norm = v.norm();
        if norm > 0.0 {
            return v / norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::EmissionKind;
    use etmap_grid::Material;

    fn materials() -> Materials {
        Materials {
            substrate: Material::new("Si", 100.0, 2.0).unwrap(),
            deposit: Material::new("PtC", 50.0, 1.0).unwrap(),
        }
    }

    /// 1x1x3 column of 1 nm cells: substrate, surface, void
    fn column() -> Grid {
        let phases = vec![Phase::Substrate, Phase::Void, Phase::Void];
        Grid::new([1, 1, 3], 1.0, phases, vec![false, true, false]).unwrap()
    }

    fn center(point: Point3<f64>, energy: f64) -> EmissionCenter {
        EmissionCenter {
            trajectory: 0,
            segment: 0,
            point,
            energy,
            kind: EmissionKind::Segment,
        }
    }

    #[test]
    fn upward_vector_reaches_surface() {
        let (grid, materials, config) = (column(), materials(), MapperConfig::default());
        let emitter = SeEmitter::new(&grid, &materials, &config);
        let mut flux = Field::zeros_like(&grid);

        // escape length 4 nm from the middle of the substrate cell
        let c = center(Point3::new(0.5, 0.5, 0.5), 10.0);
        let (trace, hit) = emitter.fire(&c, Vector3::z(), &mut flux).unwrap();

        assert!(hit);
        assert_eq!(trace.end, Point3::new(0.5, 0.5, 4.5));
        assert_eq!(flux.values(), &[0.0, 10.0 / 100.0 * 10000.0, 0.0]);
    }

    #[test]
    fn downward_vector_leaves_grid() {
        let (grid, materials, config) = (column(), materials(), MapperConfig::default());
        let emitter = SeEmitter::new(&grid, &materials, &config);
        let mut flux = Field::zeros_like(&grid);

        let c = center(Point3::new(0.5, 0.5, 0.5), 10.0);
        let (_, hit) = emitter.fire(&c, -Vector3::z(), &mut flux).unwrap();

        assert!(!hit);
        assert_eq!(flux.sum(), 0.0);
    }

    #[test]
    fn short_escape_stays_in_cell() {
        let (grid, materials) = (column(), materials());
        let config = MapperConfig {
            escape_factor: 0.1,
            ..Default::default()
        };
        let emitter = SeEmitter::new(&grid, &materials, &config);
        let mut flux = Field::zeros_like(&grid);

        let c = center(Point3::new(0.5, 0.5, 0.2), 10.0);
        let (_, hit) = emitter.fire(&c, Vector3::z(), &mut flux).unwrap();
        assert!(!hit);
    }

    #[test]
    fn void_cells_use_nominal_parameters() {
        let (grid, materials, config) = (column(), materials(), MapperConfig::default());
        let emitter = SeEmitter::new(&grid, &materials, &config);

        assert_eq!(emitter.escape_parameters(Phase::Substrate), (100.0, 4.0));
        assert_eq!(emitter.escape_parameters(Phase::Deposit), (50.0, 2.0));
        assert_eq!(emitter.escape_parameters(Phase::Void), (1e6, 1e-5));
    }

    #[test]
    fn directions_are_unit_and_reproducible() {
        let mut a = trajectory_rng(42, 3);
        let mut b = trajectory_rng(42, 3);
        for _ in 0..100 {
            let v = random_direction(&mut a);
            assert!((v.norm() - 1.0).abs() < 1e-12);
            assert_eq!(v, random_direction(&mut b));
        }
        assert_ne!(
            random_direction(&mut trajectory_rng(42, 3)),
            random_direction(&mut trajectory_rng(42, 4))
        );
    }
}
