use std::cmp;
use std::fmt::Debug;
use std::iter::FusedIterator;

use crate::range_map::{Entry, RangeMap};

mod inner {
    use super::Node;

    #[cfg(feature = "small-vec")]
    pub type Stack<'a, V> = smallvec::SmallVec<[(&'a Node<V>, usize); 48]>;
    #[cfg(not(feature = "small-vec"))]
    pub type Stack<'a, V> = Vec<(&'a Node<V>, usize)>;
}

/// Height-balanced tree implementing [`RangeMap`][crate::RangeMap].
///
/// Nodes are ordered by position and carry the extent of their subtree, so the start of a range
/// is never stored; it is recovered while descending.
pub struct AvlRangeMap<V> {
    root: Link<V>,
    len: usize,
}

#[derive(Clone)]
pub struct Node<V> {
    length: usize,
    extent: usize,
    height: u8,
    value: V,
    left: Link<V>,
    right: Link<V>,
}

type Link<V> = Option<Box<Node<V>>>;

impl<V> Node<V> {
    fn new(length: usize, value: V) -> Self {
        Node {
            length,
            extent: length,
            height: 1,
            value,
            left: None,
            right: None,
        }
    }

    fn extent(node: &Link<V>) -> usize {
        node.as_ref().map(|n| n.extent).unwrap_or(0)
    }

    fn height(node: &Link<V>) -> u8 {
        node.as_ref().map(|n| n.height).unwrap_or(0)
    }

    fn recalc(&mut self) {
        self.extent = Self::extent(&self.left) + self.length + Self::extent(&self.right);
        self.height = 1 + cmp::max(Self::height(&self.left), Self::height(&self.right));
    }
}

impl<V> AvlRangeMap<V> {
    pub fn new() -> Self {
        AvlRangeMap { root: None, len: 0 }
    }

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> usize {
        Node::height(&self.root) as usize
    }

    fn rotate_right(mut root: Box<Node<V>>) -> Box<Node<V>> {
        let mut left = match root.left.take() {
            Some(left) => left,
            None => unreachable!("rotate_right needs a left child"),
        };
        root.left = left.right.take();
        root.recalc();
        left.right = Some(root);
        left.recalc();
        left
    }

    fn rotate_left(mut root: Box<Node<V>>) -> Box<Node<V>> {
        let mut right = match root.right.take() {
            Some(right) => right,
            None => unreachable!("rotate_left needs a right child"),
        };
        root.right = right.left.take();
        root.recalc();
        right.left = Some(root);
        right.recalc();
        right
    }

    fn rebalance(mut node: Box<Node<V>>) -> Box<Node<V>> {
        node.recalc();
        let balance = i32::from(Node::height(&node.left)) - i32::from(Node::height(&node.right));
        if balance > 1 {
            if let Some(left) = node.left.as_ref() {
                if Node::height(&left.right) > Node::height(&left.left) {
                    node.left = node.left.take().map(Self::rotate_left);
                }
            }
            return Self::rotate_right(node);
        }
        if balance < -1 {
            if let Some(right) = node.right.as_ref() {
                if Node::height(&right.left) > Node::height(&right.right) {
                    node.right = node.right.take().map(Self::rotate_right);
                }
            }
            return Self::rotate_left(node);
        }
        node
    }

    // `start` must be a boundary of the subtree.
    fn insert_node(root: Link<V>, start: usize, node: Box<Node<V>>) -> Box<Node<V>> {
        let mut root = match root {
            Some(root) => root,
            None => return node,
        };
        let left_extent = Node::extent(&root.left);
        if start <= left_extent {
            root.left = Some(Self::insert_node(root.left.take(), start, node));
        } else {
            let skip = left_extent + root.length;
            root.right = Some(Self::insert_node(root.right.take(), start - skip, node));
        }
        Self::rebalance(root)
    }

    fn remove_min(mut root: Box<Node<V>>) -> (Link<V>, Box<Node<V>>) {
        match root.left.take() {
            None => {
                let rest = root.right.take();
                (rest, root)
            }
            Some(left) => {
                let (left, min) = Self::remove_min(left);
                root.left = left;
                (Some(Self::rebalance(root)), min)
            }
        }
    }

    // `start` must be the start of a range in the subtree.
    fn remove_node(root: Link<V>, start: usize) -> (Link<V>, Option<Box<Node<V>>>) {
        let mut root = match root {
            Some(root) => root,
            None => return (None, None),
        };
        let left_extent = Node::extent(&root.left);
        if start < left_extent {
            let (left, removed) = Self::remove_node(root.left.take(), start);
            root.left = left;
            return (Some(Self::rebalance(root)), removed);
        }
        if start > left_extent {
            let skip = left_extent + root.length;
            let (right, removed) = Self::remove_node(root.right.take(), start - skip);
            root.right = right;
            return (Some(Self::rebalance(root)), removed);
        }

        let left = root.left.take();
        let right = root.right.take();
        let rest = match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (left, Some(right)) => {
                let (right, mut successor) = Self::remove_min(right);
                successor.left = left;
                successor.right = right;
                Some(Self::rebalance(successor))
            }
        };
        (rest, Some(root))
    }

    fn set_length_node(node: &mut Node<V>, start: usize, length: usize) -> bool {
        let left_extent = Node::extent(&node.left);
        let found = if start < left_extent {
            match node.left.as_deref_mut() {
                Some(left) => Self::set_length_node(left, start, length),
                None => false,
            }
        } else if start == left_extent {
            node.length = length;
            true
        } else if start - left_extent >= node.length {
            let skip = left_extent + node.length;
            match node.right.as_deref_mut() {
                Some(right) => Self::set_length_node(right, start - skip, length),
                None => false,
            }
        } else {
            false
        };
        if found {
            node.recalc();
        }
        found
    }
}

impl<V: Clone> Clone for AvlRangeMap<V> {
    fn clone(&self) -> Self {
        AvlRangeMap {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<V> Default for AvlRangeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for AvlRangeMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries_from(0)).finish()
    }
}

impl<V> RangeMap<V> for AvlRangeMap<V> {
    type Entries<'a> = Entries<'a, V> where Self: 'a, V: 'a;
    type EntriesRev<'a> = EntriesRev<'a, V> where Self: 'a, V: 'a;

    fn extent(&self) -> usize {
        Node::extent(&self.root)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn nearest_less_or_equal(&self, position: usize) -> Option<Entry<'_, V>> {
        let extent = self.extent();
        if extent == 0 {
            return None;
        }
        let mut position = cmp::min(position, extent - 1);
        let mut base = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_extent = Node::extent(&node.left);
            if position < left_extent {
                current = node.left.as_deref();
            } else if position - left_extent < node.length {
                return Some(Entry {
                    start: base + left_extent,
                    length: node.length,
                    value: &node.value,
                });
            } else {
                let skip = left_extent + node.length;
                base += skip;
                position -= skip;
                current = node.right.as_deref();
            }
        }
        None
    }

    fn get_mut(&mut self, start: usize) -> Option<(usize, &mut V)> {
        let mut start = start;
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            let left_extent = Node::extent(&node.left);
            if start < left_extent {
                current = node.left.as_deref_mut();
            } else if start == left_extent {
                return Some((node.length, &mut node.value));
            } else if start - left_extent >= node.length {
                start -= left_extent + node.length;
                current = node.right.as_deref_mut();
            } else {
                return None;
            }
        }
        None
    }

    fn insert(&mut self, start: usize, length: usize, value: V) -> Result<(), V> {
        if length == 0 || !self.is_boundary(start) {
            return Err(value);
        }
        let node = Box::new(Node::new(length, value));
        self.root = Some(Self::insert_node(self.root.take(), start, node));
        self.len += 1;
        Ok(())
    }

    fn remove(&mut self, start: usize) -> Option<(usize, V)> {
        self.get(start)?;
        let (root, removed) = Self::remove_node(self.root.take(), start);
        self.root = root;
        let removed = removed?;
        self.len -= 1;
        Some((removed.length, removed.value))
    }

    fn set_length(&mut self, start: usize, length: usize) -> bool {
        if length == 0 {
            return false;
        }
        match self.root.as_deref_mut() {
            Some(root) => Self::set_length_node(root, start, length),
            None => false,
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    fn entries_from(&self, position: usize) -> Entries<'_, V> {
        let mut stack = inner::Stack::new();
        if position >= self.extent() {
            return Entries { stack };
        }
        let mut position = position;
        let mut base = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            let left_extent = Node::extent(&node.left);
            if position < left_extent {
                stack.push((node, base + left_extent));
                current = node.left.as_deref();
            } else if position - left_extent < node.length {
                stack.push((node, base + left_extent));
                break;
            } else {
                let skip = left_extent + node.length;
                base += skip;
                position -= skip;
                current = node.right.as_deref();
            }
        }
        Entries { stack }
    }

    fn entries_rev_from(&self, position: usize) -> EntriesRev<'_, V> {
        let mut stack = inner::Stack::new();
        let extent = self.extent();
        if extent > 0 {
            let mut position = cmp::min(position, extent - 1);
            let mut base = 0;
            let mut current = self.root.as_deref();
            while let Some(node) = current {
                let left_extent = Node::extent(&node.left);
                if position < left_extent {
                    current = node.left.as_deref();
                } else if position - left_extent < node.length {
                    stack.push((node, base + left_extent));
                    break;
                } else {
                    stack.push((node, base + left_extent));
                    let skip = left_extent + node.length;
                    base += skip;
                    position -= skip;
                    current = node.right.as_deref();
                }
            }
        }
        EntriesRev { stack }
    }
}

/// Ascending iterator over the ranges of an [`AvlRangeMap`].
pub struct Entries<'a, V> {
    stack: inner::Stack<'a, V>,
}

impl<'a, V> Iterator for Entries<'a, V> {
    type Item = Entry<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, start) = self.stack.pop()?;
        // every node on the left spine of the right subtree shares its base
        let base = start + node.length;
        let mut current = node.right.as_deref();
        while let Some(child) = current {
            self.stack.push((child, base + Node::extent(&child.left)));
            current = child.left.as_deref();
        }
        Some(Entry {
            start,
            length: node.length,
            value: &node.value,
        })
    }
}

impl<'a, V> FusedIterator for Entries<'a, V> {}

/// Descending iterator over the ranges of an [`AvlRangeMap`].
pub struct EntriesRev<'a, V> {
    stack: inner::Stack<'a, V>,
}

impl<'a, V> Iterator for EntriesRev<'a, V> {
    type Item = Entry<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, start) = self.stack.pop()?;
        let mut base = start - Node::extent(&node.left);
        let mut current = node.left.as_deref();
        while let Some(child) = current {
            let child_start = base + Node::extent(&child.left);
            self.stack.push((child, child_start));
            base = child_start + child.length;
            current = child.right.as_deref();
        }
        Some(Entry {
            start,
            length: node.length,
            value: &node.value,
        })
    }
}

impl<'a, V> FusedIterator for EntriesRev<'a, V> {}
