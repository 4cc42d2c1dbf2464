//! Result and Error types for etmap-grid

/// Type alias for Result<T, grid::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `etmap-grid` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("inconsistent number of {name} values (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("cell dimension must be finite and positive, found {0}")]
    InvalidCellDimension(f64),

    #[error("grid shape {0:?} has an empty axis")]
    EmptyShape([usize; 3]),

    #[error("material \"{name}\" has unphysical parameters (e={e}, lambda_escape={lambda_escape})")]
    InvalidMaterial {
        name: String,
        e: f64,
        lambda_escape: f64,
    },

    #[error("cannot merge fields of shape {left:?} and {right:?}")]
    FieldShapeMismatch { left: [usize; 3], right: [usize; 3] },

    #[error("cell ({i}, {j}, {k}) is outside grid of shape {shape:?}")]
    CellOutOfRange {
        i: usize,
        j: usize,
        k: usize,
        shape: [usize; 3],
    },
}
