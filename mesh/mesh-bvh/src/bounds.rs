//! Axis-aligned bounding box primitive.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spans below this threshold are considered degenerate and padded.
///
/// Perfectly flat geometry (an axis-aligned triangle, a planar mesh) would
/// otherwise produce zero-thickness boxes whose surface area and overlap
/// tests misbehave. Padding is a deliberate tolerance, not a repair step.
pub const THIN_AXIS_EPS: f64 = 1e-4;

/// An axis-aligned bounding box (AABB).
///
/// Defined by minimum and maximum corner points with the invariant
/// `min <= max` componentwise.
///
/// # Example
///
/// ```
/// use mesh_bvh::Aabb;
/// use nalgebra::Point3;
///
/// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
/// // 2 * (2*3 + 3*4 + 4*2) = 52
/// assert!((a.surface_area() - 52.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Point3<f64>,
    /// Maximum corner (largest x, y, z values).
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new AABB from two corners.
    ///
    /// The corners are reordered componentwise if necessary.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create an empty (inverted) AABB.
    ///
    /// An empty AABB is the identity element for [`union`](Self::union):
    /// it has `min > max` and absorbs nothing.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create an AABB enclosing an iterator of points.
    ///
    /// Returns an empty AABB if the iterator is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Create the bounding box of a triangle, with thin axes padded.
    ///
    /// This is the constructor index builders should use for triangle
    /// primitives: an axis-aligned triangle yields a zero-thickness box on
    /// one axis, which [`padded_thin_axes`](Self::padded_thin_axes)
    /// expands by [`THIN_AXIS_EPS`].
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_bvh::{Aabb, THIN_AXIS_EPS};
    /// use nalgebra::Point3;
    ///
    /// // Triangle in the z = 0 plane: the z axis gets padded.
    /// let aabb = Aabb::from_triangle(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// );
    /// assert!((aabb.min.z - (-THIN_AXIS_EPS)).abs() < 1e-12);
    /// assert!((aabb.max.z - THIN_AXIS_EPS).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_triangle(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        let mut aabb = Self::from_point(v0);
        aabb.expand_to_include(&v1);
        aabb.expand_to_include(&v2);
        aabb.padded_thin_axes()
    }

    /// Create an AABB from a single point (zero volume).
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Check if the AABB is empty (inverted on any axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the size (extent) of the AABB on each axis.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Get the center of the AABB.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Get the surface area of the AABB.
    ///
    /// Returns 0.0 for empty AABBs.
    #[inline]
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        2.0 * s.z.mul_add(s.x, s.x.mul_add(s.y, s.y * s.z))
    }

    /// Expand the AABB in place to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Compute the union (enclosing AABB) of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Check if the AABB overlaps a sphere.
    ///
    /// True iff the squared distance from `center` to the closest point of
    /// the box (each axis clamped into `[min, max]`) is at most
    /// `radius * radius`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_bvh::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// assert!(aabb.overlaps_sphere(&Point3::new(2.0, 0.5, 0.5), 1.0));
    /// assert!(!aabb.overlaps_sphere(&Point3::new(2.0, 0.5, 0.5), 0.5));
    /// ```
    #[must_use]
    pub fn overlaps_sphere(&self, center: &Point3<f64>, radius: f64) -> bool {
        let dx = center.x - center.x.clamp(self.min.x, self.max.x);
        let dy = center.y - center.y.clamp(self.min.y, self.max.y);
        let dz = center.z - center.z.clamp(self.min.z, self.max.z);
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)) <= radius * radius
    }

    /// Return a copy with every thin axis expanded symmetrically.
    ///
    /// An axis whose span is below [`THIN_AXIS_EPS`] is grown by the
    /// epsilon on both sides. Axes with a healthy span are untouched.
    #[must_use]
    pub fn padded_thin_axes(&self) -> Self {
        let mut out = *self;
        let s = self.size();
        if s.x < THIN_AXIS_EPS {
            out.min.x -= THIN_AXIS_EPS;
            out.max.x += THIN_AXIS_EPS;
        }
        if s.y < THIN_AXIS_EPS {
            out.min.y -= THIN_AXIS_EPS;
            out.max.y += THIN_AXIS_EPS;
        }
        if s.z < THIN_AXIS_EPS {
            out.min.z -= THIN_AXIS_EPS;
            out.max.z += THIN_AXIS_EPS;
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
