//! `etmap` maps primary electron trajectories onto a voxel grid, producing
//! the deposited energy and secondary electron surface flux fields needed by
//! beam induced deposition growth models
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of workspace crates.
#[doc(inline)]
pub use etmap_grid as grid;

#[doc(inline)]
pub use etmap_traversal as traversal;

#[cfg(feature = "mapper")]
#[cfg_attr(docsrs, doc(cfg(feature = "mapper")))]
#[doc(inline)]
pub use etmap_mapper as mapper;
