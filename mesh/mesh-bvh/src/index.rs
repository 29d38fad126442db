//! Read-only spatial index structure.

use crate::bounds::Aabb;
use crate::node::{Node, NodeKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A built spatial index: flat node array, leaf id permutation, height.
///
/// Node 0 is the root. The structure is immutable after construction and
/// carries no parent pointers; all traversal is top-down with an explicit
/// stack bounded by [`height`](Self::height). A `SpatialIndex` is safe to
/// share between concurrent readers.
///
/// Depth convention: the root has depth 0 and `height` counts levels, so a
/// tree whose root is itself a leaf has height 1 and a root with two leaf
/// children has height 2.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialIndex {
    nodes: Vec<Node>,
    leaf_ids: Vec<u32>,
    height: u32,
}

impl SpatialIndex {
    pub(crate) fn new(nodes: Vec<Node>, leaf_ids: Vec<u32>, height: u32) -> Self {
        Self {
            nodes,
            leaf_ids,
            height,
        }
    }

    /// Get the root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Get a node by array index.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    #[must_use]
    pub fn node(&self, id: u32) -> &Node {
        &self.nodes[id as usize]
    }

    /// Get the full node array.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get the leaf id permutation array.
    ///
    /// This is a permutation of `0..primitive_count`: every original
    /// primitive index appears in exactly one leaf's range.
    #[inline]
    #[must_use]
    pub fn leaf_ids(&self) -> &[u32] {
        &self.leaf_ids
    }

    /// Get the primitive ids held by a leaf node.
    ///
    /// Returns an empty slice for internal nodes, whose `first_child` is a
    /// node index instead of a leaf id offset.
    #[must_use]
    pub fn leaf_primitives(&self, node: &Node) -> &[u32] {
        match node.kind() {
            NodeKind::Leaf { start, count } => {
                let start = start as usize;
                &self.leaf_ids[start..start + count as usize]
            }
            NodeKind::Internal { .. } => &[],
        }
    }

    /// Get the number of levels in the tree (max leaf depth + 1).
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the total number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of indexed primitives.
    #[inline]
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.leaf_ids.len()
    }

    /// Get the number of leaf nodes.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Iterate over `(depth, bounds)` for every node.
    ///
    /// Intended for debug visualization (drawing the tree's boxes level by
    /// level); the index itself attaches no meaning to the order beyond
    /// the node array layout.
    pub fn node_bounds(&self) -> impl Iterator<Item = (u32, &Aabb)> {
        self.nodes.iter().map(|n| (n.depth, &n.aabb))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;
    use nalgebra::Point3;

    fn deep_index() -> SpatialIndex {
        // Strung-out boxes with single-primitive leaves: more nodes than
        // leaf id slots, so internal first_child values exceed the leaf
        // id array length.
        let aabbs: Vec<Aabb> = (0..8)
            .map(|i| {
                let x = f64::from(i) * 2.0;
                Aabb::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
            })
            .collect();
        let mut builder = IndexBuilder::new(1, 8);
        builder.build(&aabbs).unwrap()
    }

    #[test]
    fn leaf_primitives_is_empty_for_internal_nodes() {
        let index = deep_index();
        assert!(index.node_count() > index.primitive_count());

        let mut internals = 0;
        for node in index.nodes() {
            if node.is_leaf() {
                assert_eq!(index.leaf_primitives(node).len(), 1);
            } else {
                internals += 1;
                assert!(index.leaf_primitives(node).is_empty());
            }
        }
        assert_eq!(internals, 7);
    }

    #[test]
    fn leaf_count_and_primitive_count_agree() {
        let index = deep_index();
        assert_eq!(index.leaf_count(), 8);
        assert_eq!(index.primitive_count(), 8);
        assert_eq!(index.node_count(), 15);
    }
}
