//! AABB ray-voxel traversal
//!
//! The walk is the usual 3D DDA. Each axis keeps the parametric `t` of the
//! next cell wall it will cross and the `t` increment between walls. The axis
//! with the smallest pending `t` is crossed next, until the next crossing
//! would lie beyond the end of the ray.

// internal modules
use crate::ray::Ray;

// external crates
use nalgebra::Point3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Origin,
    Walking,
    Finished,
}

/// Iterator over the parametric cell wall crossings of a [Ray]
///
/// Always starts with `0.0` for the origin and finishes with `1.0` for the
/// endpoint. Between the two are the `t` values of every wall crossed, in
/// non-decreasing order.
///
/// Axes with a zero direction component never cross a wall. Their pending
/// `t` is held at infinity rather than dividing by zero, so they can never be
/// selected and never poison the comparison with `NaN`.
///
/// Ties between axes go to the earliest axis (x, then y, then z). The later
/// axis is crossed immediately after at the same `t`.
///
/// ```rust
/// # use etmap_traversal::Ray;
/// # use nalgebra::Point3;
/// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0));
/// let t: Vec<f64> = ray.crossings(5.0).collect();
///
/// // walls at x=5 and x=10, then the endpoint
/// assert_eq!(t, vec![0.0, 0.5, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Crossings {
    /// Pending `t` of the next wall on each axis
    t: [f64; 3],
    /// Increment of `t` between consecutive walls on each axis
    step_t: [f64; 3],
    state: State,
}

impl Crossings {
    /// Set up the traversal of a ray through cells of edge length `cell_dim`
    pub fn new(ray: &Ray, cell_dim: f64) -> Self {
        let mut t = [f64::INFINITY; 3];
        let mut step_t = [f64::INFINITY; 3];

        for a in 0..3 {
            let d = ray.direction[a];
            if d == 0.0 || !d.is_finite() {
                continue;
            }

            // position of the origin within its enclosing cell
            let delta = ray.origin[a].rem_euclid(cell_dim);

            // distance along this axis to the first wall in the ray direction
            let distance = if d > 0.0 {
                cell_dim - delta
            } else if delta == 0.0 {
                cell_dim
            } else {
                delta
            };

            t[a] = distance / d.abs();
            step_t[a] = cell_dim / d.abs();
        }

        Self {
            t,
            step_t,
            state: State::Origin,
        }
    }
}

impl Iterator for Crossings {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match self.state {
            State::Origin => {
                self.state = State::Walking;
                Some(0.0)
            }
            State::Walking => {
                let a = arg_min(&self.t);
                let next_t = self.t[a];

                // ray ends inside a cell, also catches a NaN origin
                if next_t > 1.0 || next_t.is_nan() {
                    self.state = State::Finished;
                    return Some(1.0);
                }

                self.t[a] += self.step_t[a];
                Some(next_t)
            }
            State::Finished => None,
        }
    }
}

/// Index of the smallest of three values, preferring the earliest on ties
///
/// Three comparisons rather than a sort, this runs once per crossing.
#[inline]
fn arg_min(t: &[f64; 3]) -> usize {
    if t[0] <= t[1] {
        if t[0] <= t[2] {
            0
        } else {
            2
        }
    } else if t[1] <= t[2] {
        1
    } else {
        2
    }
}

/// Portion of a [Ray] lying inside a single cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    /// Parametric position where the ray enters the cell
    pub t0: f64,
    /// Parametric position where the ray leaves the cell
    pub t1: f64,
    /// Length of ray inside the cell
    pub length: f64,
    /// Point halfway through the cell, safely away from its walls
    pub midpoint: Point3<f64>,
}

/// Iterator over the [Piece]s of a [Ray], one for every cell crossed
///
/// Consecutive crossings at the same `t` (a ray through an edge or corner, or
/// ending exactly on a wall) would give empty pieces and are skipped. The
/// piece lengths therefore always sum to the length of the ray.
///
/// ```rust
/// # use etmap_traversal::Ray;
/// # use nalgebra::Point3;
/// let ray = Ray::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 9.0));
/// let lengths: Vec<f64> = ray.pieces(2.0).map(|p| p.length).collect();
///
/// assert_eq!(lengths, vec![1.0, 2.0, 2.0, 2.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Pieces {
    ray: Ray,
    length: f64,
    crossings: Crossings,
    previous: Option<f64>,
}

impl Pieces {
    /// Set up the pieces of a ray through cells of edge length `cell_dim`
    pub fn new(ray: Ray, cell_dim: f64) -> Self {
        Self {
            length: ray.length(),
            crossings: Crossings::new(&ray, cell_dim),
            ray,
            previous: None,
        }
    }
}

impl Iterator for Pieces {
    type Item = Piece;

    fn next(&mut self) -> Option<Piece> {
        loop {
            let t1 = self.crossings.next()?;
            let Some(t0) = self.previous.replace(t1) else {
                continue;
            };

            if t1 > t0 && self.length > 0.0 {
                return Some(Piece {
                    t0,
                    t1,
                    length: (t1 - t0) * self.length,
                    midpoint: self.ray.at(0.5 * (t0 + t1)),
                });
            }
        }
    }
}
