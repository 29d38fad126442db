//! Error types for proximity queries.

use mesh_bvh::BvhError;
use thiserror::Error;

/// Result type alias for proximity operations.
pub type ProximityResult<T> = Result<T, ProximityError>;

/// Errors that can occur building or querying a surface accelerator.
///
/// A query that simply finds nothing within the requested radius is *not*
/// an error; it is the `Ok(None)` case of
/// [`NearestSurfaceQuery::find`](crate::NearestSurfaceQuery::find).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProximityError {
    /// The input mesh has no faces.
    #[error("input mesh has no faces")]
    EmptyMesh,

    /// A face references a vertex index outside the position array.
    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        /// Index of the offending face.
        face: usize,
        /// The out-of-range vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The traversal stack was sized for a shorter tree than the one
    /// being queried. This is a precondition violation (the query engine
    /// was constructed for a different mesh), reported explicitly rather
    /// than silently overflowing.
    #[error("traversal needs {needed} stack slots, but this engine was sized for {capacity}")]
    StackCapacity {
        /// Slots the traversal attempted to use.
        needed: usize,
        /// Slots the engine was constructed with.
        capacity: usize,
    },

    /// The deferred leaf buffer was sized for a smaller index than the
    /// one being queried. The partially filled buffer must not be
    /// trusted after this error.
    #[error("deferred traversal needs {needed} leaf slots, but this engine was sized for {capacity}")]
    DeferredCapacity {
        /// Slots the traversal attempted to use.
        needed: usize,
        /// Slots the engine was constructed with.
        capacity: usize,
    },

    /// Index construction failed.
    #[error(transparent)]
    Bvh(#[from] BvhError),
}
