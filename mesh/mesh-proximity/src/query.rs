//! Nearest-surface-point search over an indexed mesh.

use nalgebra::Point3;

use mesh_bvh::NodeKind;

use crate::accel::SurfaceAccel;
use crate::error::{ProximityError, ProximityResult};
use crate::triangle::{SurfaceClass, TangentTriangle};

/// How the index is traversed and when triangle tests run.
///
/// The mode changes the search cost, never the geometric answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// One DFS pass collects every leaf overlapping the fixed initial
    /// sphere; triangles are tested afterwards over all collected
    /// ranges. Useful for inspecting the visited leaves before paying
    /// the triangle-test cost.
    Deferred,
    /// Triangles are tested as soon as their leaf is reached, in the
    /// same DFS that prunes by bounds. The search radius never shrinks.
    Immediate,
    /// As `Immediate`, but every improvement shrinks the effective
    /// search radius, so later siblings are pruned against the tighter
    /// bound. Best average-case pruning; the recommended default.
    #[default]
    Adaptive,
}

/// A successful nearest-surface result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// The closest point on the mesh surface.
    pub point: Point3<f64>,
    /// Index of the triangle carrying that point.
    pub triangle: usize,
    /// Face/edge/vertex classification.
    pub class: SurfaceClass,
    /// World-space distance from the query point.
    pub distance: f64,
}

/// A leaf collected by a deferred traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafRange {
    /// Node-array index of the leaf.
    pub node: u32,
    /// Offset of its ids in the index's leaf id array.
    pub start: u32,
    /// Number of primitive ids.
    pub count: u32,
}

/// Best candidate carried through one query.
struct BestCandidate {
    distance_squared: f64,
    hit: Option<(usize, Point3<f64>, SurfaceClass)>,
}

/// Nearest-surface query engine for one specific [`SurfaceAccel`].
///
/// Owns the transient traversal state: a node stack with capacity equal
/// to the index height (sufficient for a strictly binary tree) and, in
/// [`TraversalMode::Deferred`], a leaf-range buffer sized to the index's
/// leaf count. Running it against a taller or larger index than the one
/// it was sized for is a precondition violation reported as
/// [`ProximityError::StackCapacity`] / [`ProximityError::DeferredCapacity`].
///
/// The scratch is mutable per query: never share one engine between
/// concurrent callers; construct one per thread instead (cheap, a few
/// dozen slots).
///
/// # Example
///
/// ```
/// use mesh_bvh::IndexBuilder;
/// use mesh_proximity::{NearestSurfaceQuery, SurfaceAccel, SurfaceClass, TraversalMode};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![[0u32, 1, 2]];
/// let mut builder = IndexBuilder::new(4, 64);
/// let accel = SurfaceAccel::build(&positions, &faces, &mut builder).unwrap();
///
/// let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);
/// let hit = query
///     .find(&accel, &Point3::new(0.25, 0.25, 5.0), 10.0)
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(hit.class, SurfaceClass::Face);
/// assert!((hit.distance - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct NearestSurfaceQuery {
    mode: TraversalMode,
    stack: Vec<u32>,
    stack_capacity: usize,
    deferred: Vec<LeafRange>,
    deferred_capacity: usize,
    visited: usize,
}

impl NearestSurfaceQuery {
    /// Create an engine sized for `accel`, with a fixed traversal mode.
    #[must_use]
    pub fn new(accel: &SurfaceAccel, mode: TraversalMode) -> Self {
        let index = accel.index();
        let stack_capacity = index.height() as usize;
        let deferred_capacity = if mode == TraversalMode::Deferred {
            // Worst case: every leaf overlaps the probe sphere.
            index.leaf_count()
        } else {
            0
        };
        Self {
            mode,
            stack: Vec::with_capacity(stack_capacity),
            stack_capacity,
            deferred: Vec::with_capacity(deferred_capacity),
            deferred_capacity,
            visited: 0,
        }
    }

    /// Get the engine's traversal mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Number of nodes whose bounds were tested during the last query.
    ///
    /// Instrumentation for comparing traversal modes; reset by every
    /// [`find`](Self::find).
    #[inline]
    #[must_use]
    pub const fn nodes_visited(&self) -> usize {
        self.visited
    }

    /// Leaf ranges collected by the last [`TraversalMode::Deferred`]
    /// query. Empty in the other modes. After a failed call the contents
    /// are unspecified.
    #[inline]
    #[must_use]
    pub fn collected_leaves(&self) -> &[LeafRange] {
        &self.deferred
    }

    /// Find the closest point on the mesh surface within `max_radius` of
    /// `point`.
    ///
    /// Returns `Ok(None)` when no surface lies within the radius - a
    /// valid negative result, not an error.
    ///
    /// # Errors
    ///
    /// [`ProximityError::StackCapacity`] or
    /// [`ProximityError::DeferredCapacity`] when the engine is used
    /// against an index larger than the one it was sized for.
    pub fn find(
        &mut self,
        accel: &SurfaceAccel,
        point: &Point3<f64>,
        max_radius: f64,
    ) -> ProximityResult<Option<SurfaceHit>> {
        let index = accel.index();
        let triangles = accel.triangles();

        self.visited = 0;
        self.stack.clear();
        self.deferred.clear();

        let mut best = BestCandidate {
            distance_squared: max_radius * max_radius,
            hit: None,
        };
        let mut radius = max_radius;

        let root = index.root();
        self.visited += 1;
        if !root.aabb.overlaps_sphere(point, radius) {
            return Ok(None);
        }

        match root.kind() {
            NodeKind::Leaf { .. } => {
                // Single-leaf tree: no traversal needed.
                test_primitives(triangles, index.leaf_primitives(root), point, &mut best);
            }
            NodeKind::Internal { left, right } => {
                self.push(left)?;
                self.push(right)?;

                while let Some(id) = self.stack.pop() {
                    let node = index.node(id);
                    self.visited += 1;
                    if !node.aabb.overlaps_sphere(point, radius) {
                        continue;
                    }
                    match node.kind() {
                        NodeKind::Internal { left, right } => {
                            self.push(left)?;
                            self.push(right)?;
                        }
                        NodeKind::Leaf { start, count } => match self.mode {
                            TraversalMode::Deferred => {
                                self.collect(LeafRange {
                                    node: id,
                                    start,
                                    count,
                                })?;
                            }
                            TraversalMode::Immediate => {
                                test_primitives(
                                    triangles,
                                    index.leaf_primitives(node),
                                    point,
                                    &mut best,
                                );
                            }
                            TraversalMode::Adaptive => {
                                let improved = test_primitives(
                                    triangles,
                                    index.leaf_primitives(node),
                                    point,
                                    &mut best,
                                );
                                if improved {
                                    radius = best.distance_squared.sqrt();
                                }
                            }
                        },
                    }
                }

                if self.mode == TraversalMode::Deferred {
                    let leaf_ids = index.leaf_ids();
                    for range in &self.deferred {
                        let start = range.start as usize;
                        let ids = &leaf_ids[start..start + range.count as usize];
                        test_primitives(triangles, ids, point, &mut best);
                    }
                }
            }
        }

        Ok(best.hit.map(|(triangle, hit_point, class)| SurfaceHit {
            point: hit_point,
            triangle,
            class,
            distance: best.distance_squared.sqrt(),
        }))
    }

    fn push(&mut self, id: u32) -> ProximityResult<()> {
        if self.stack.len() == self.stack_capacity {
            return Err(ProximityError::StackCapacity {
                needed: self.stack.len() + 1,
                capacity: self.stack_capacity,
            });
        }
        self.stack.push(id);
        Ok(())
    }

    fn collect(&mut self, range: LeafRange) -> ProximityResult<()> {
        if self.deferred.len() == self.deferred_capacity {
            return Err(ProximityError::DeferredCapacity {
                needed: self.deferred.len() + 1,
                capacity: self.deferred_capacity,
            });
        }
        self.deferred.push(range);
        Ok(())
    }
}

/// Test every primitive in a leaf range against the running best.
///
/// A candidate replaces the best only on a strict improvement of the
/// squared distance, so a valid but non-improving hit is distinguishable
/// from a miss. Returns whether the best improved.
fn test_primitives(
    triangles: &[TangentTriangle],
    ids: &[u32],
    point: &Point3<f64>,
    best: &mut BestCandidate,
) -> bool {
    let mut improved = false;
    for &id in ids {
        let candidate = triangles[id as usize].closest_point(point);
        if candidate.distance_squared < best.distance_squared {
            best.distance_squared = candidate.distance_squared;
            best.hit = Some((id as usize, candidate.point, candidate.class));
            improved = true;
        }
    }
    improved
}
