//! Flat tree node.

use crate::bounds::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of the flat spatial index.
///
/// The `count` field doubles as the internal/leaf tag: `count == 0` marks
/// an internal node whose two children sit at `first_child` and
/// `first_child + 1` in the node array; `count > 0` marks a leaf whose
/// primitive ids occupy `leaf_ids[first_child .. first_child + count]`.
/// [`Node::kind`] exposes the same information as an explicit sum type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    /// Bounds of everything below this node.
    pub aabb: Aabb,
    /// Index of the left child (internal) or offset into the leaf id
    /// array (leaf).
    pub first_child: u32,
    /// Number of primitives in the leaf; 0 tags an internal node.
    pub count: u32,
    /// Level in the tree; the root has depth 0.
    pub depth: u32,
}

/// Explicit view of a node's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Internal node with two children at adjacent array slots.
    Internal {
        /// Node-array index of the left child.
        left: u32,
        /// Node-array index of the right child (`left + 1`).
        right: u32,
    },
    /// Leaf node holding a contiguous range of primitive ids.
    Leaf {
        /// Offset of the first primitive id in the leaf id array.
        start: u32,
        /// Number of primitive ids.
        count: u32,
    },
}

impl Node {
    /// Check whether this node is a leaf.
    #[inline]
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.count != 0
    }

    /// Decode the overloaded `first_child`/`count` pair.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_bvh::{Aabb, Node, NodeKind};
    ///
    /// let leaf = Node { aabb: Aabb::empty(), first_child: 8, count: 3, depth: 2 };
    /// assert_eq!(leaf.kind(), NodeKind::Leaf { start: 8, count: 3 });
    ///
    /// let inner = Node { aabb: Aabb::empty(), first_child: 5, count: 0, depth: 1 };
    /// assert_eq!(inner.kind(), NodeKind::Internal { left: 5, right: 6 });
    /// ```
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        if self.count == 0 {
            NodeKind::Internal {
                left: self.first_child,
                right: self.first_child + 1,
            }
        } else {
            NodeKind::Leaf {
                start: self.first_child,
                count: self.count,
            }
        }
    }
}
