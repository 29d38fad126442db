//! Per-mesh acceleration structure: spatial index + tangent cache.

use mesh_bvh::{Aabb, IndexBuilder, SpatialIndex};
use nalgebra::Point3;
use tracing::debug;

use crate::error::{ProximityError, ProximityResult};
use crate::triangle::TangentTriangle;

/// The built query artifacts for one triangle mesh.
///
/// Owns the [`SpatialIndex`] over the mesh's triangle bounds and the
/// matching [`TangentTriangle`] cache, indexed by original face number.
/// Both are immutable after [`build`](Self::build) and safe for
/// concurrent readers; per-query scratch lives in
/// [`NearestSurfaceQuery`](crate::NearestSurfaceQuery) instead.
#[derive(Debug, Clone)]
pub struct SurfaceAccel {
    index: SpatialIndex,
    triangles: Vec<TangentTriangle>,
}

impl SurfaceAccel {
    /// Build the accelerator for a mesh given as a vertex position array
    /// and per-face vertex index triples.
    ///
    /// The `builder`'s scratch buffers are borrowed for the duration of
    /// the build and can be reused for other meshes afterwards; the
    /// returned accelerator holds no reference to it or to the input
    /// arrays.
    ///
    /// Triangle bounds are thin-axis padded
    /// ([`Aabb::from_triangle`]), so flat and degenerate faces are
    /// indexed rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`ProximityError::EmptyMesh`] if `faces` is empty.
    /// - [`ProximityError::FaceIndexOutOfRange`] if a face references a
    ///   missing vertex.
    /// - [`ProximityError::Bvh`] if index construction fails (for
    ///   example, a mesh larger than the builder's capacity).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_bvh::IndexBuilder;
    /// use mesh_proximity::SurfaceAccel;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let faces = vec![[0u32, 1, 2]];
    ///
    /// let mut builder = IndexBuilder::new(4, 1024);
    /// let accel = SurfaceAccel::build(&positions, &faces, &mut builder).unwrap();
    /// assert_eq!(accel.triangle_count(), 1);
    /// ```
    pub fn build(
        positions: &[Point3<f64>],
        faces: &[[u32; 3]],
        builder: &mut IndexBuilder,
    ) -> ProximityResult<Self> {
        if faces.is_empty() {
            return Err(ProximityError::EmptyMesh);
        }

        let mut aabbs = Vec::with_capacity(faces.len());
        let mut triangles = Vec::with_capacity(faces.len());
        for (face_idx, face) in faces.iter().enumerate() {
            for &vertex in face {
                if vertex as usize >= positions.len() {
                    return Err(ProximityError::FaceIndexOutOfRange {
                        face: face_idx,
                        vertex,
                        vertex_count: positions.len(),
                    });
                }
            }
            let v1 = positions[face[0] as usize];
            let v2 = positions[face[1] as usize];
            let v3 = positions[face[2] as usize];
            aabbs.push(Aabb::from_triangle(v1, v2, v3));
            triangles.push(TangentTriangle::new(v1, v2, v3));
        }

        let index = builder.build(&aabbs)?;
        debug!(
            triangles = triangles.len(),
            nodes = index.node_count(),
            height = index.height(),
            "surface accelerator built"
        );

        Ok(Self { index, triangles })
    }

    /// Get the spatial index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Get the tangent-space triangle cache, indexed by face number.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[TangentTriangle] {
        &self.triangles
    }

    /// Get the number of indexed triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
