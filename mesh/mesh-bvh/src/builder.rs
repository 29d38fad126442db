//! Surface-area-heuristic index construction.
//!
//! Implements top-down binary SAH partitioning with an explicit work
//! stack and reusable scratch buffers.

// Primitive counts fit u32 and f64 by construction
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use tracing::{debug, info};

use crate::bounds::Aabb;
use crate::error::{BvhError, BvhResult};
use crate::index::SpatialIndex;
use crate::node::Node;

/// A pending range of the working permutation, waiting to become a node.
#[derive(Debug, Clone, Copy)]
struct BuildRange {
    start: usize,
    end: usize,
    node: usize,
    depth: u32,
}

/// One-shot SAH partitioner with reusable scratch buffers.
///
/// The builder owns only transient scratch arrays, sized once at
/// construction for the largest mesh it will handle and reused across
/// builds; it holds no reference to any mesh. Feeding it a larger input is
/// a capacity violation reported as [`BvhError::CapacityExceeded`] before
/// any work happens, so a failed build never leaves a partially built tree
/// behind.
///
/// At every split the builder greedily minimizes the SAH cost
/// `left_area(k) * k + right_area(n - k) * (n - k)` over all three axes
/// and all split points, sorting candidate orders by AABB max coordinate.
///
/// A builder instance is single-threaded; concurrent construction of
/// multiple meshes needs one builder per thread.
///
/// # Example
///
/// ```
/// use mesh_bvh::{Aabb, IndexBuilder};
/// use nalgebra::Point3;
///
/// let aabbs: Vec<Aabb> = (0..16)
///     .map(|i| {
///         let x = f64::from(i);
///         Aabb::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 0.5, 1.0, 1.0))
///     })
///     .collect();
///
/// let mut builder = IndexBuilder::new(4, 1024);
/// let index = builder.build(&aabbs).unwrap();
/// assert!(index.height() >= 2);
/// ```
#[derive(Debug)]
pub struct IndexBuilder {
    max_leaf_size: usize,
    max_primitives: usize,
    /// Working permutation of primitive ids; committed split by split.
    ids: Vec<u32>,
    /// Per-axis candidate order for the range being split.
    axis_ids: Vec<u32>,
    /// Candidate order of the best (axis, split) seen so far.
    best_ids: Vec<u32>,
    /// Running union areas, left to right.
    left_area: Vec<f64>,
    /// Running union areas, right to left.
    right_area: Vec<f64>,
    /// Quicksort bound stack (inclusive index pairs).
    sort_stack: Vec<(usize, usize)>,
    /// Pending build ranges.
    range_stack: Vec<BuildRange>,
}

impl IndexBuilder {
    /// Create a builder sized for up to `max_primitives` primitives, with
    /// leaves holding at most `max_leaf_size` primitives each.
    ///
    /// All scratch buffers are allocated here and reused by every
    /// subsequent [`build`](Self::build).
    #[must_use]
    pub fn new(max_leaf_size: usize, max_primitives: usize) -> Self {
        Self {
            max_leaf_size,
            max_primitives,
            ids: vec![0; max_primitives],
            axis_ids: vec![0; max_primitives],
            best_ids: vec![0; max_primitives],
            left_area: vec![0.0; max_primitives],
            right_area: vec![0.0; max_primitives],
            // Stack entries are disjoint subranges of the working
            // permutation: sort ranges hold at least 2 ids, build ranges
            // at least 1, so these bounds cover the worst case and the
            // stacks never reallocate mid-build.
            sort_stack: Vec::with_capacity(max_primitives / 2 + 1),
            range_stack: Vec::with_capacity(max_primitives),
        }
    }

    /// Get the configured maximum leaf size.
    #[inline]
    #[must_use]
    pub const fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// Get the primitive capacity the scratch buffers were sized for.
    #[inline]
    #[must_use]
    pub const fn max_primitives(&self) -> usize {
        self.max_primitives
    }

    /// Build a spatial index over one AABB per primitive.
    ///
    /// The returned index records, for primitive `i`, the box `aabbs[i]`;
    /// its `leaf_ids` array is the permutation of `0..aabbs.len()` the
    /// partition settled on.
    ///
    /// # Errors
    ///
    /// - [`BvhError::CapacityExceeded`] if `aabbs.len()` exceeds the
    ///   builder's capacity.
    /// - [`BvhError::EmptyInput`] for an empty slice.
    /// - [`BvhError::InvalidLeafSize`] if the builder was constructed with
    ///   a zero leaf size.
    pub fn build(&mut self, aabbs: &[Aabb]) -> BvhResult<SpatialIndex> {
        if self.max_leaf_size == 0 {
            return Err(BvhError::InvalidLeafSize);
        }
        let n = aabbs.len();
        if n == 0 {
            return Err(BvhError::EmptyInput);
        }
        if n > self.max_primitives {
            return Err(BvhError::CapacityExceeded {
                required: n,
                capacity: self.max_primitives,
            });
        }

        debug!(
            primitives = n,
            max_leaf_size = self.max_leaf_size,
            "building spatial index"
        );

        for (i, slot) in self.ids[..n].iter_mut().enumerate() {
            *slot = i as u32;
        }

        // Strictly binary: at most 2 * ceil(n / max_leaf) - 1 nodes.
        let mut nodes: Vec<Node> = Vec::with_capacity(2 * n.div_ceil(self.max_leaf_size));
        let mut leaf_ids: Vec<u32> = Vec::with_capacity(n);
        let mut height = 0u32;

        nodes.push(Node {
            aabb: Aabb::empty(),
            first_child: 0,
            count: 0,
            depth: 0,
        });
        self.range_stack.clear();
        self.range_stack.push(BuildRange {
            start: 0,
            end: n,
            node: 0,
            depth: 0,
        });

        while let Some(range) = self.range_stack.pop() {
            let len = range.end - range.start;
            let mut bounds = Aabb::empty();
            for &id in &self.ids[range.start..range.end] {
                bounds = bounds.union(&aabbs[id as usize]);
            }

            if len <= self.max_leaf_size {
                let offset = leaf_ids.len() as u32;
                leaf_ids.extend_from_slice(&self.ids[range.start..range.end]);
                let node = &mut nodes[range.node];
                node.aabb = bounds;
                node.first_child = offset;
                node.count = len as u32;
                node.depth = range.depth;
                height = height.max(range.depth + 1);
            } else {
                let split = self.partition(aabbs, range.start, range.end);
                let left = nodes.len();
                for _ in 0..2 {
                    nodes.push(Node {
                        aabb: Aabb::empty(),
                        first_child: 0,
                        count: 0,
                        depth: range.depth + 1,
                    });
                }
                let node = &mut nodes[range.node];
                node.aabb = bounds;
                node.first_child = left as u32;
                node.count = 0;
                node.depth = range.depth;
                // Right first, so the left range is processed next and the
                // leaf id array is laid out left to right.
                self.range_stack.push(BuildRange {
                    start: range.start + split,
                    end: range.end,
                    node: left + 1,
                    depth: range.depth + 1,
                });
                self.range_stack.push(BuildRange {
                    start: range.start,
                    end: range.start + split,
                    node: left,
                    depth: range.depth + 1,
                });
            }
        }

        info!(
            primitives = n,
            nodes = nodes.len(),
            height,
            "spatial index built"
        );

        Ok(SpatialIndex::new(nodes, leaf_ids, height))
    }

    /// Find the best SAH split of `ids[start..end]`, commit the winning
    /// axis order into the working permutation, and return the split
    /// point `k` (left child takes `k` primitives).
    fn partition(&mut self, aabbs: &[Aabb], start: usize, end: usize) -> usize {
        let len = end - start;
        let mut best_cost = f64::INFINITY;
        let mut best_split = 1usize;

        for axis in 0..3 {
            self.axis_ids[..len].copy_from_slice(&self.ids[start..end]);
            self.sort_axis_ids(aabbs, axis, len);

            let mut running = Aabb::empty();
            for i in 0..len {
                running = running.union(&aabbs[self.axis_ids[i] as usize]);
                self.left_area[i] = running.surface_area();
            }
            let mut running = Aabb::empty();
            for i in (0..len).rev() {
                running = running.union(&aabbs[self.axis_ids[i] as usize]);
                self.right_area[i] = running.surface_area();
            }

            // Strict improvement keeps ties deterministic: the earliest
            // axis and split point win.
            let mut improved = false;
            for split in 1..len {
                let cost = self.left_area[split - 1] * split as f64
                    + self.right_area[split] * (len - split) as f64;
                if cost < best_cost {
                    best_cost = cost;
                    best_split = split;
                    improved = true;
                }
            }
            if improved {
                self.best_ids[..len].copy_from_slice(&self.axis_ids[..len]);
            }
        }

        self.ids[start..end].copy_from_slice(&self.best_ids[..len]);
        best_split
    }

    /// Sort `axis_ids[..len]` by AABB max coordinate on `axis`.
    ///
    /// Plain 2-way quicksort with a last-element pivot and an explicit
    /// bound stack: deterministic and allocation-free, but unmitigated,
    /// so pre-sorted or adversarial orders degrade to O(n^2). Inherited
    /// limitation, accepted for behavioral parity.
    fn sort_axis_ids(&mut self, aabbs: &[Aabb], axis: usize, len: usize) {
        self.sort_stack.clear();
        if len > 1 {
            self.sort_stack.push((0, len - 1));
        }
        while let Some((lo, hi)) = self.sort_stack.pop() {
            let pivot = aabbs[self.axis_ids[hi] as usize].max[axis];
            let mut i = lo;
            for j in lo..hi {
                if aabbs[self.axis_ids[j] as usize].max[axis] < pivot {
                    self.axis_ids.swap(i, j);
                    i += 1;
                }
            }
            self.axis_ids.swap(i, hi);
            if i > lo + 1 {
                self.sort_stack.push((lo, i - 1));
            }
            if i + 2 <= hi {
                self.sort_stack.push((i + 1, hi));
            }
        }
    }
}
