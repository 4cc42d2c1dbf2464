//! Voxel grid geometry, material parameters and accumulation fields
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod field;
mod grid;
mod material;
mod phase;

#[doc(inline)]
pub use crate::grid::Grid;

#[doc(inline)]
pub use crate::field::Field;

#[doc(inline)]
pub use crate::material::{Material, Materials};

#[doc(inline)]
pub use crate::phase::Phase;

#[doc(inline)]
pub use crate::error::{Error, Result};
