//! Ray to voxel traversal for uniform cubic grids
#![doc = include_str!("../readme.md")]

mod crossings;
mod ray;

#[doc(inline)]
pub use crate::crossings::{Crossings, Piece, Pieces};

#[doc(inline)]
pub use crate::ray::Ray;
