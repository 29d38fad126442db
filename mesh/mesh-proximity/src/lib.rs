//! Nearest-surface-point queries over triangle meshes.
//!
//! This crate pairs a triangle soup with a [`mesh_bvh`] spatial index
//! and answers "what is the closest point on the surface to this world
//! position, within a radius?". Each triangle is stored in a
//! precomputed tangent frame so the closest-point case analysis (face
//! interior, the three edges, the three vertices) runs in 2D.
//!
//! The pipeline:
//!
//! 1. [`SurfaceAccel::build`] validates the mesh, computes per-triangle
//!    bounds and tangent frames, and builds the index through a
//!    reusable [`mesh_bvh::IndexBuilder`].
//! 2. [`NearestSurfaceQuery`] traverses the index with per-engine
//!    scratch buffers. Three [`TraversalMode`]s trade pruning
//!    aggressiveness for inspectability; all return identical hits.
//!
//! # Example
//!
//! ```
//! use mesh_bvh::IndexBuilder;
//! use mesh_proximity::{NearestSurfaceQuery, SurfaceAccel, TraversalMode};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0u32, 1, 2]];
//!
//! let mut builder = IndexBuilder::new(4, 1024);
//! let accel = SurfaceAccel::build(&positions, &faces, &mut builder)?;
//!
//! let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::default());
//! if let Some(hit) = query.find(&accel, &Point3::new(0.2, 0.2, 3.0), 10.0)? {
//!     println!("closest point {} at distance {}", hit.point, hit.distance);
//! }
//! # Ok::<(), mesh_proximity::ProximityError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod accel;
mod error;
mod query;
mod triangle;

pub use accel::SurfaceAccel;
pub use error::{ProximityError, ProximityResult};
pub use query::{LeafRange, NearestSurfaceQuery, SurfaceHit, TraversalMode};
pub use triangle::{ClosestPointCandidate, SurfaceClass, TangentTriangle};

pub use nalgebra::{Point3, Vector3};
