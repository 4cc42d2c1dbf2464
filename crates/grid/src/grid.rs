//! Module for grid-related data and implementations

// crate modules
use crate::error::{Error, Result};
use crate::phase::Phase;

// external crates
use log::debug;
use nalgebra::{Point3, Vector3};

/// Uniform cubic voxel grid of material phases and surface flags
///
/// The grid origin is at (0,0,0) and every cell has the same edge length
/// `cell_dim` (nm) along all three axes. Absolute coordinates therefore run
/// from zero to the [extent()](Grid::extent) in each direction.
///
/// ## Indexing
///
/// Cells are stored flat in the usual VTK order, looping i fastest:
///
/// ```text
/// for k in 0..nz
///     for j in 0..ny
///         for i in 0..nx
///             // ...cell index = i + j*nx + k*nx*ny
/// ```
///
/// ## Examples
///
/// ```rust
/// # use etmap_grid::{Grid, Phase};
/// // 4x4x4 grid of 2 nm cells, substrate everywhere
/// let grid = Grid::filled([4, 4, 4], 2.0, Phase::Substrate).unwrap();
///
/// assert_eq!(grid.n_cells(), 64);
/// assert_eq!(grid.extent().x, 8.0);
/// assert_eq!(grid.ijk_to_index(1, 2, 3), 1 + 2 * 4 + 3 * 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of cells in (i, j, k)
    shape: [usize; 3],
    /// Edge length of every cell (nm)
    cell_dim: f64,
    /// Material phase of each cell
    phases: Vec<Phase>,
    /// Cells exposed to vacuum
    surface: Vec<bool>,
}

impl Grid {
    /// Build a grid from explicit phase and surface arrays
    ///
    /// Both arrays must be flat in cell index order with exactly
    /// `nx * ny * nz` values.
    pub fn new(
        shape: [usize; 3],
        cell_dim: f64,
        phases: Vec<Phase>,
        surface: Vec<bool>,
    ) -> Result<Self> {
        if shape.iter().any(|&n| n == 0) {
            return Err(Error::EmptyShape(shape));
        }

        if !(cell_dim.is_finite() && cell_dim > 0.0) {
            return Err(Error::InvalidCellDimension(cell_dim));
        }

        let expected = shape.iter().product();
        if phases.len() != expected {
            return Err(Error::ShapeMismatch {
                name: "phase",
                expected,
                found: phases.len(),
            });
        }

        if surface.len() != expected {
            return Err(Error::ShapeMismatch {
                name: "surface",
                expected,
                found: surface.len(),
            });
        }

        Ok(Self {
            shape,
            cell_dim,
            phases,
            surface,
        })
    }

    /// Build a grid from the integer cell codes of the growth simulation
    ///
    /// See [Phase] for how the codes are interpreted.
    pub fn from_codes(
        shape: [usize; 3],
        cell_dim: f64,
        codes: &[i8],
        surface: Vec<bool>,
    ) -> Result<Self> {
        let phases = codes.iter().map(|&c| Phase::from_code(c)).collect();
        Self::new(shape, cell_dim, phases, surface)
    }

    /// Grid with every cell set to one phase and no surface cells
    pub fn filled(shape: [usize; 3], cell_dim: f64, phase: Phase) -> Result<Self> {
        let n = shape.iter().product();
        Self::new(shape, cell_dim, vec![phase; n], vec![false; n])
    }

    /// Number of cells in (i, j, k)
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of cells
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.phases.len()
    }

    /// Edge length of a cell (nm)
    #[inline]
    pub fn cell_dim(&self) -> f64 {
        self.cell_dim
    }

    /// Volume of a single cell (nm^3)
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.cell_dim.powi(3)
    }

    /// Absolute size of the grid along each axis (nm)
    pub fn extent(&self) -> Vector3<f64> {
        Vector3::new(
            self.shape[0] as f64,
            self.shape[1] as f64,
            self.shape[2] as f64,
        ) * self.cell_dim
    }

    /// Flat phase array in cell index order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Flat surface mask in cell index order
    pub fn surface(&self) -> &[bool] {
        &self.surface
    }

    /// Phase of the cell at a flat index
    #[inline]
    pub fn phase(&self, idx: usize) -> Phase {
        self.phases[idx]
    }

    /// Whether the cell at a flat index is exposed to vacuum
    #[inline]
    pub fn is_surface(&self, idx: usize) -> bool {
        self.surface[idx]
    }

    /// Set the phase of a single cell
    pub fn set_phase(&mut self, i: usize, j: usize, k: usize, phase: Phase) -> Result<()> {
        let idx = self.checked_index(i, j, k)?;
        self.phases[idx] = phase;
        Ok(())
    }

    /// Flag or unflag a single cell as surface
    pub fn set_surface(&mut self, i: usize, j: usize, k: usize, value: bool) -> Result<()> {
        let idx = self.checked_index(i, j, k)?;
        self.surface[idx] = value;
        Ok(())
    }

    /// Find the flat cell index from (i,j,k) indices
    ///
    /// No bounds checking is done, see [Grid::checked_index()].
    #[inline]
    pub fn ijk_to_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.shape;
        i + j * nx + k * nx * ny
    }

    /// Find the flat cell index from (i,j,k) indices, if they are in range
    pub fn checked_index(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        let [nx, ny, nz] = self.shape;
        if i < nx && j < ny && k < nz {
            Ok(self.ijk_to_index(i, j, k))
        } else {
            Err(Error::CellOutOfRange {
                i,
                j,
                k,
                shape: self.shape,
            })
        }
    }

    /// Find the (i,j,k) indices for a flat cell index
    ///
    /// The reverse of [ijk_to_index()](Grid::ijk_to_index).
    pub fn index_to_ijk(&self, idx: usize) -> (usize, usize, usize) {
        let [nx, ny, _] = self.shape;
        let k = idx / (nx * ny);
        let j = (idx - k * nx * ny) / nx;
        let i = idx - k * nx * ny - j * nx;
        (i, j, k)
    }

    /// Checks if a point is within the grid bounds
    ///
    /// Points exactly on the outer faces are considered inside. Anything
    /// negative or non-finite is outside.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let extent = self.extent();
        (0..3).all(|a| point[a] >= 0.0 && point[a] <= extent[a])
    }

    /// Find the flat index of the cell enclosing a point
    ///
    /// Points on an internal cell wall belong to the upper cell, and points
    /// on the outer upper faces belong to the last cell along that axis.
    ///
    /// Will return `None` for any point that is outside the grid bounds.
    ///
    /// ```rust
    /// # use etmap_grid::{Grid, Phase};
    /// # use nalgebra::Point3;
    /// let grid = Grid::filled([2, 1, 1], 5.0, Phase::Deposit).unwrap();
    ///
    /// assert_eq!(grid.cell_of(&Point3::new(2.5, 0.0, 0.0)), Some(0));
    /// assert_eq!(grid.cell_of(&Point3::new(5.0, 0.0, 0.0)), Some(1));
    /// assert_eq!(grid.cell_of(&Point3::new(10.0, 5.0, 5.0)), Some(1));
    /// assert_eq!(grid.cell_of(&Point3::new(-0.1, 0.0, 0.0)), None);
    /// ```
    pub fn cell_of(&self, point: &Point3<f64>) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }

        let mut ijk = [0_usize; 3];
        for (a, idx) in ijk.iter_mut().enumerate() {
            // truncation is a floor for the non-negative values left here
            *idx = ((point[a] / self.cell_dim) as usize).min(self.shape[a] - 1);
        }

        Some(self.ijk_to_index(ijk[0], ijk[1], ijk[2]))
    }

    /// Flag every void cell sharing a face with a solid cell as surface
    ///
    /// Replaces the current surface mask and returns the number of surface
    /// cells found. Useful when the surrounding simulation does not provide a
    /// mask of its own.
    pub fn mark_surface(&mut self) -> usize {
        let [nx, ny, nz] = self.shape;
        let mut surface = vec![false; self.n_cells()];

        for (idx, flag) in surface.iter_mut().enumerate() {
            if self.phases[idx].is_solid() {
                continue;
            }

            let (i, j, k) = self.index_to_ijk(idx);
            let neighbours = [
                (i > 0).then(|| self.ijk_to_index(i - 1, j, k)),
                (i + 1 < nx).then(|| self.ijk_to_index(i + 1, j, k)),
                (j > 0).then(|| self.ijk_to_index(i, j - 1, k)),
                (j + 1 < ny).then(|| self.ijk_to_index(i, j + 1, k)),
                (k > 0).then(|| self.ijk_to_index(i, j, k - 1)),
                (k + 1 < nz).then(|| self.ijk_to_index(i, j, k + 1)),
            ];

            *flag = neighbours
                .iter()
                .flatten()
                .any(|&n| self.phases[n].is_solid());
        }

        self.surface = surface;
        let count = self.surface.iter().filter(|&&s| s).count();
        debug!("Marked {count} surface cells");
        count
    }
}
