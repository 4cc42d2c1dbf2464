//! Straight rays between two points

// internal modules
use crate::crossings::{Crossings, Pieces};

// external crates
use nalgebra::{Point3, Vector3};

/// A straight ray from `origin` to `end`
///
/// The `direction` is the full vector `end - origin`, not a unit vector, so
/// that the parametric position `origin + t * direction` runs over `t` in
/// `[0, 1]` from one end to the other.
///
/// ```rust
/// # use etmap_traversal::Ray;
/// # use nalgebra::{Point3, Vector3};
/// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
/// assert_eq!(ray.direction, Vector3::new(3.0, 4.0, 0.0));
/// assert_eq!(ray.length(), 5.0);
/// assert_eq!(ray.at(0.5), Point3::new(1.5, 2.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray
    pub origin: Point3<f64>,
    /// End of the ray
    pub end: Point3<f64>,
    /// Vector from origin to end
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Ray between two points
    pub fn new(origin: Point3<f64>, end: Point3<f64>) -> Self {
        Self {
            origin,
            end,
            direction: end - origin,
        }
    }

    /// Ray from an origin along a full length direction vector
    pub fn from_direction(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            end: origin + direction,
            direction,
        }
    }

    /// Euclidean length of the ray
    #[inline]
    pub fn length(&self) -> f64 {
        self.direction.norm()
    }

    /// Point at parametric position `t`
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// True if origin and end coincide
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.origin == self.end
    }

    /// Parametric wall crossings through cells of edge length `cell_dim`
    pub fn crossings(&self, cell_dim: f64) -> Crossings {
        Crossings::new(self, cell_dim)
    }

    /// Traversed length within each crossed cell of edge length `cell_dim`
    pub fn pieces(&self, cell_dim: f64) -> Pieces {
        Pieces::new(*self, cell_dim)
    }
}
