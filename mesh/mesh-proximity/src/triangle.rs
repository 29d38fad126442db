//! Tangent-space triangle representation and exact closest-point tests.

// Tangent coordinates use the conventional short names
#![allow(clippy::many_single_char_names)]

use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where on a triangle a closest point landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfaceClass {
    /// Strictly inside the triangle.
    Face,
    /// On an edge, away from the corners.
    Edge,
    /// At one of the three corners.
    Vertex,
}

/// A candidate closest point produced by one triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPointCandidate {
    /// The closest point on this triangle.
    pub point: Point3<f64>,
    /// Face/edge/vertex classification of that point.
    pub class: SurfaceClass,
    /// Squared world-space distance from the query point.
    pub distance_squared: f64,
}

/// Precomputed tangent-space form of one mesh triangle.
///
/// From vertices `v1, v2, v3` the triangle stores its origin (`v1`), the
/// two edge vectors `U = v3 - v1` and `V = v2 - v1`, the unit normal, and
/// the inverse basis matrix mapping a world offset `p - position` to
/// tangent coefficients `(u, v, n)` with
/// `p = position + u * U + v * V + n * normal`.
///
/// `U` and `V` are deliberately *not* orthonormalized: the tangent frame
/// is sheared, and the closest-point case analysis below is written
/// against exactly that frame (`u >= 0, v >= 0, u + v <= 1` is the
/// interior). Substituting an orthonormal frame would shift the
/// classification boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentTriangle {
    position: Point3<f64>,
    edge_u: Vector3<f64>,
    edge_v: Vector3<f64>,
    normal: Vector3<f64>,
    world_to_tangent: Matrix3<f64>,
}

impl TangentTriangle {
    /// Precompute the tangent frame for a triangle.
    ///
    /// Degenerate (zero-area) triangles are tolerated, not rejected: the
    /// normal falls back to +Z and the singular basis collapses to the
    /// zero matrix, so every query against such a triangle resolves to
    /// its base vertex.
    #[must_use]
    pub fn new(v1: Point3<f64>, v2: Point3<f64>, v3: Point3<f64>) -> Self {
        let edge_u = v3 - v1;
        let edge_v = v2 - v1;
        let normal = edge_u
            .cross(&edge_v)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z);
        let basis = Matrix3::from_columns(&[edge_u, edge_v, normal]);
        let world_to_tangent = basis.try_inverse().unwrap_or_else(Matrix3::zeros);
        Self {
            position: v1,
            edge_u,
            edge_v,
            normal,
            world_to_tangent,
        }
    }

    /// Get the triangle's origin vertex (`v1`).
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Get the unit normal.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Map a world point into tangent coefficients `(u, v, n)`.
    #[inline]
    #[must_use]
    pub fn to_tangent(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.world_to_tangent * (point - self.position)
    }

    /// Compute the exact closest point on this triangle to `point`.
    ///
    /// The tangent plane is divided into seven regions: the interior, the
    /// three edges, and the three corner wedges. Each branch produces its
    /// candidate in world space together with the face/edge/vertex
    /// classification; the squared distance is measured in world space
    /// because the tangent frame is not angle-preserving.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_proximity::{SurfaceClass, TangentTriangle};
    /// use nalgebra::Point3;
    ///
    /// let tri = TangentTriangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// );
    ///
    /// let hit = tri.closest_point(&Point3::new(0.25, 0.25, 5.0));
    /// assert_eq!(hit.class, SurfaceClass::Face);
    /// assert!((hit.distance_squared - 25.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> ClosestPointCandidate {
        let local = self.to_tangent(point);
        let u = local.x;
        let v = local.y;

        let (candidate, class) = if u < 0.0 {
            // Beyond the V-edge: clamp along V.
            let t = v.clamp(0.0, 1.0);
            let class = if (0.0..=1.0).contains(&v) {
                SurfaceClass::Edge
            } else {
                SurfaceClass::Vertex
            };
            (self.position + self.edge_v * t, class)
        } else if v < 0.0 {
            // Beyond the U-edge: clamp along U.
            let t = u.clamp(0.0, 1.0);
            let class = if (0.0..=1.0).contains(&u) {
                SurfaceClass::Edge
            } else {
                SurfaceClass::Vertex
            };
            (self.position + self.edge_u * t, class)
        } else if u + v <= 1.0 {
            (
                self.position + self.edge_u * u + self.edge_v * v,
                SurfaceClass::Face,
            )
        } else if v - 1.0 >= u {
            (self.position + self.edge_v, SurfaceClass::Vertex)
        } else if u - 1.0 >= v {
            (self.position + self.edge_u, SurfaceClass::Vertex)
        } else {
            // Beyond the hypotenuse: project onto it. The edge runs from
            // (0, 1) to (1, 0) in tangent space, so the parameter along U
            // is t = (u - v + 1) / 2.
            let t = 0.5 * (u - v + 1.0);
            (
                self.position + self.edge_u * t + self.edge_v * (1.0 - t),
                SurfaceClass::Edge,
            )
        };

        ClosestPointCandidate {
            point: candidate,
            class,
            distance_squared: (candidate - point).norm_squared(),
        }
    }
}
