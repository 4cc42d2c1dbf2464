//! Dense per-cell accumulation fields

// crate modules
use crate::error::{Error, Result};
use crate::grid::Grid;

// standard library
use std::ops::{AddAssign, Index, IndexMut};

/// Dense `f64` value for every cell of a [Grid]
///
/// Fields hold the deposited energy (eV) and secondary electron flux of a
/// mapping pass. They start at zero and are only ever added to, so fields
/// produced independently can be combined with [merge()](Field::merge) in any
/// order.
///
/// ```rust
/// # use etmap_grid::{Field, Grid, Phase};
/// let grid = Grid::filled([2, 2, 2], 1.0, Phase::Deposit).unwrap();
///
/// let mut a = Field::zeros_like(&grid);
/// let mut b = Field::zeros_like(&grid);
/// a.add(0, 1.5);
/// b.add(0, 2.0);
/// b.add(7, 1.0);
///
/// a.merge(&b).unwrap();
/// assert_eq!(a[0], 3.5);
/// assert_eq!(a.sum(), 4.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    shape: [usize; 3],
    values: Vec<f64>,
}

impl Field {
    /// Zero-initialised field of a given shape
    pub fn zeros(shape: [usize; 3]) -> Self {
        Self {
            shape,
            values: vec![0.0; shape.iter().product()],
        }
    }

    /// Zero-initialised field matching the shape of a [Grid]
    pub fn zeros_like(grid: &Grid) -> Self {
        Self::zeros(grid.shape())
    }

    /// Number of cells in (i, j, k)
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Flat values in cell index order
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the field, returning the flat values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Add to the value of a single cell
    #[inline]
    pub fn add(&mut self, idx: usize, value: f64) {
        self.values[idx] += value;
    }

    /// Elementwise sum of another field into this one
    pub fn merge(&mut self, other: &Field) -> Result<()> {
        if self.shape != other.shape {
            return Err(Error::FieldShapeMismatch {
                left: self.shape,
                right: other.shape,
            });
        }

        *self += other;
        Ok(())
    }

    /// Reset every cell to zero
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    /// Multiply every cell by a constant factor
    pub fn scale(&mut self, factor: f64) {
        self.values.iter_mut().for_each(|v| *v *= factor);
    }

    /// Sum over all cells
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Largest cell value, 0.0 for an empty field
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// True if no cell holds a NaN or infinite value
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Number of cells with a non-zero value
    pub fn non_zero(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }
}

/// Elementwise sum, the unchecked form of [Field::merge()]
///
/// # Panics
///
/// Panics if the two fields differ in shape.
impl AddAssign<&Field> for Field {
    fn add_assign(&mut self, other: &Field) {
        assert_eq!(self.shape, other.shape, "cannot add fields of different shape");
        self.values
            .iter_mut()
            .zip(other.values.iter())
            .for_each(|(a, b)| *a += b);
    }
}

impl Index<usize> for Field {
    type Output = f64;
    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

impl IndexMut<usize> for Field {
    fn index_mut(&mut self, idx: usize) -> &mut f64 {
        &mut self.values[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_rejects_other_shapes() {
        let mut a = Field::zeros([2, 2, 2]);
        let b = Field::zeros([2, 2, 3]);
        assert_eq!(
            a.merge(&b),
            Err(Error::FieldShapeMismatch {
                left: [2, 2, 2],
                right: [2, 2, 3]
            })
        );
    }

    #[test]
    fn merge_order_is_irrelevant() {
        let mut a = Field::zeros([3, 1, 1]);
        let mut b = Field::zeros([3, 1, 1]);
        let mut c = Field::zeros([3, 1, 1]);
        a[0] = 0.1;
        b[0] = 0.2;
        c[2] = 5.0;

        let mut left = a.clone();
        left.merge(&b).unwrap();
        left.merge(&c).unwrap();

        let mut right = c.clone();
        right.merge(&b).unwrap();
        right.merge(&a).unwrap();

        for (l, r) in left.values().iter().zip(right.values()) {
            assert!((l - r).abs() < 1e-15);
        }
    }

    #[test]
    fn add_assign_matches_merge() {
        let mut a = Field::zeros([2, 1, 1]);
        let mut b = Field::zeros([2, 1, 1]);
        a[0] = 1.5;
        b[0] = 2.0;
        b[1] = 0.25;

        let mut merged = a.clone();
        merged.merge(&b).unwrap();
        a += &b;

        assert_eq!(a, merged);
        assert_eq!(a.values(), &[3.5, 0.25]);
    }

    #[test]
    #[should_panic(expected = "cannot add fields of different shape")]
    fn add_assign_other_shape_panics() {
        let mut a = Field::zeros([2, 1, 1]);
        a += &Field::zeros([1, 2, 1]);
    }

    #[test]
    fn statistics() {
        let mut f = Field::zeros([2, 1, 1]);
        assert_eq!(f.max(), 0.0);
        f[1] = 4.0;
        f.scale(0.5);
        assert_eq!(f.max(), 2.0);
        assert_eq!(f.non_zero(), 1);
        assert!(f.is_finite());
        f[0] = f64::NAN;
        assert!(!f.is_finite());
        f.clear();
        assert_eq!(f.sum(), 0.0);
    }
}
