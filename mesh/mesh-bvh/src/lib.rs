//! Flat bounding-volume hierarchy for triangle meshes.
//!
//! This crate builds a strictly-binary BVH over a set of axis-aligned
//! bounding boxes using a surface-area-heuristic (SAH) partition, and
//! exposes the result as a read-only flat node array suitable for fast
//! top-down traversal:
//!
//! - [`Aabb`] - Bounding box primitive with union, surface area, and
//!   sphere overlap tests
//! - [`IndexBuilder`] - One-shot SAH partitioner with reusable scratch
//!   buffers
//! - [`SpatialIndex`] - The built tree: node array, leaf id permutation,
//!   and height
//! - [`Node`] / [`NodeKind`] - Flat nodes with an explicit internal/leaf
//!   view
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies. It can be used in
//! CLI tools, WASM, servers, and other engines.
//!
//! # Example
//!
//! ```
//! use mesh_bvh::{Aabb, IndexBuilder};
//! use nalgebra::Point3;
//!
//! // One box per primitive; here, four unit boxes along the X axis.
//! let aabbs: Vec<Aabb> = (0..4)
//!     .map(|i| {
//!         let x = f64::from(i) * 2.0;
//!         Aabb::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
//!     })
//!     .collect();
//!
//! let mut builder = IndexBuilder::new(1, 1024);
//! let index = builder.build(&aabbs).unwrap();
//!
//! assert_eq!(index.primitive_count(), 4);
//! // Every primitive ends up in exactly one leaf.
//! let mut seen: Vec<u32> = index.leaf_ids().to_vec();
//! seen.sort_unstable();
//! assert_eq!(seen, vec![0, 1, 2, 3]);
//! ```
//!
//! # Structure
//!
//! The tree is strictly binary: an internal node's two children always
//! occupy adjacent slots in the node array. Nodes reference children by
//! array index rather than pointers, which keeps the structure trivially
//! serializable (enable the `serde` feature) and free of aliasing hazards.
//! Construction is iterative with explicit work stacks; no native
//! recursion is used anywhere.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod builder;
mod error;
mod index;
mod node;

pub use bounds::{Aabb, THIN_AXIS_EPS};
pub use builder::IndexBuilder;
pub use error::{BvhError, BvhResult};
pub use index::SpatialIndex;
pub use node::{Node, NodeKind};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
