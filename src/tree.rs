//! A persistent binary search tree whose child links are [`Optional`]s.
//!
//! Nodes are reference counted, so cloning a [`Tree`] is cheap and shares
//! every node. Inserting into a tree copies the nodes along the path to the
//! new leaf if they are shared, and leaves every other clone untouched.

use core::cmp::Ordering;

use triomphe::Arc;

use crate::{Absent, InvalidReason, Optional};

type Link<T> = Optional<Arc<TreeNode<T>>>;

/// An unbalanced binary search tree.
///
/// Equal values are kept, each one to the right of the previous ones.
///
/// # Examples
///
/// ```
/// use oneof::Tree;
///
/// let mut tree = Tree::new();
/// for value in [5, 2, 8, 2] {
///     tree.insert(value);
/// }
///
/// let snapshot = tree.clone();
/// tree.insert(1);
///
/// let mut values = Vec::new();
/// tree.for_each(|value| values.push(*value));
/// assert_eq!(values, [1, 2, 2, 5, 8]);
/// assert_eq!(snapshot.len(), 4);
/// assert!(!snapshot.contains(&1));
/// ```
pub struct Tree<T: 'static> {
    root: Link<T>,
    len: usize,
}

#[derive(Clone)]
struct TreeNode<T: 'static> {
    value: T,
    left: Link<T>,
    right: Link<T>,
}

impl<T: 'static> Tree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Optional::none(),
            len: 0,
        }
    }

    /// Returns `true` if the tree holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of values in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Calls `f` with every value in ascending order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        walk(&self.root, &mut f);
    }
}

impl<T: 'static + Ord> Tree<T> {
    /// Returns `true` if the tree holds a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        let mut link = &self.root;
        while let Some(node) = link.as_ref() {
            link = match value.cmp(&node.value) {
                Ordering::Less => &node.left,
                Ordering::Equal => return true,
                Ordering::Greater => &node.right,
            };
        }
        false
    }
}

impl<T: 'static + Ord + Clone> Tree<T> {
    /// Inserts `value`, copying any node on its path that is shared with
    /// another tree.
    pub fn insert(&mut self, value: T) {
        insert(&mut self.root, value);
        self.len += 1;
    }
}

impl<T: 'static> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T: 'static> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn insert<T: 'static + Ord + Clone>(link: &mut Link<T>, value: T) {
    match link.as_mut() {
        Some(node) => {
            let node = Arc::make_mut(node);
            if value < node.value {
                insert(&mut node.left, value);
            } else {
                insert(&mut node.right, value);
            }
        }
        None => {
            *link = Optional::some(Arc::new(TreeNode {
                value,
                left: Optional::none(),
                right: Optional::none(),
            }));
        }
    }
}

fn walk<T: 'static, F: FnMut(&T)>(link: &Link<T>, f: &mut F) {
    link.as_variant().match_with(arms![
        |_: &Absent| {},
        |node: &Arc<TreeNode<T>>| {
            walk(&node.left, f);
            f(&node.value);
            walk(&node.right, f);
        },
        // Links are only ever replaced wholesale, never taken from
        |_: InvalidReason| {},
    ]);
}
