//! Binomial Heap implementation
//!
//! A binomial heap is a forest of heap-ordered binomial trees with:
//! - O(log n) insert and extract_min
//! - O(log n) decrease_key
//! - O(log n) merge of two root lists
//!
//! # Algorithm Overview
//!
//! The roots form a singly linked list ordered by ascending degree, and after
//! every public operation no two roots share a degree. This is analogous to
//! the binary representation of n.
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two B_{k-1} trees
//! - Bₖ has exactly 2ᵏ nodes and height k
//!
//! **Key Operations**:
//! - **Insert**: merge a single-node tree into the root list (binary increment)
//! - **Extract-min**: scan roots, detach the minimum, reverse its children and merge them back
//! - **Decrease-key**: bubble the (key, element) pair up toward the root (no cutting)
//! - **Remove**: bubble the pair all the way to a root, then detach it like extract-min
//!
//! # Arena layout
//!
//! Nodes live in a fixed `Vec` and link to each other by slot index. Because
//! decrease-key swaps *values* rather than relinking nodes, an element does
//! not stay in one slot: `slot_of` tracks where each element currently lives
//! so the element index remains a stable handle.

use crate::traits::{check_range, HeapError, IndexedHeap, KeyedHeap, Priority};
use std::mem;

/// Internal node structure for binomial heap
///
/// **Binomial Tree Structure**: a node of degree k has exactly k children with
/// degrees k-1, k-2, ..., 0 along its child list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node<P> {
    key: P,
    /// Element whose entry currently occupies this slot
    element: usize,
    degree: usize,
    /// Parent slot (None if root)
    parent: Option<usize>,
    /// First child, the one with the highest degree
    child: Option<usize>,
    /// Next root in the root list, or next sibling in the parent's child list
    sibling: Option<usize>,
}

impl<P: Priority> Node<P> {
    fn reset(element: usize) -> Self {
        Node {
            key: P::INFINITY,
            element,
            degree: 0,
            parent: None,
            child: None,
            sibling: None,
        }
    }
}

/// Binomial Heap over a fixed node arena
///
/// # Example
///
/// ```rust
/// use rust_sssp_heaps::binomial::BinomialHeap;
/// use rust_sssp_heaps::IndexedHeap;
///
/// let mut heap: BinomialHeap<u64> = BinomialHeap::with_capacity(3);
/// heap.insert(0, 50).unwrap();
/// heap.insert(1, 20).unwrap();
/// heap.insert(2, 40).unwrap();
/// heap.decrease_key(0, 1).unwrap();
/// assert_eq!(heap.extract_min(), Some((1, 0)));
/// assert_eq!(heap.extract_min(), Some((20, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct BinomialHeap<P> {
    nodes: Vec<Node<P>>,
    /// Slot currently holding each element's (key, element) pair
    slot_of: Vec<usize>,
    in_heap: Vec<bool>,
    /// First root of the degree-ordered root list
    head: Option<usize>,
    len: usize,
}

impl<P: Priority> IndexedHeap<P> for BinomialHeap<P> {
    fn with_capacity(capacity: usize) -> Self {
        BinomialHeap {
            nodes: (0..capacity).map(Node::reset).collect(),
            slot_of: (0..capacity).collect(),
            in_heap: vec![false; capacity],
            head: None,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    /// Inserts a new element into the heap
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**: the element's slot is turned into a B₀ tree and merged
    /// with the root list. Equal-degree collisions carry upward exactly like
    /// incrementing a binary counter.
    fn insert(&mut self, element: usize, key: P) -> Result<(), HeapError> {
        check_range(element, self.capacity())?;
        if self.in_heap[element] {
            return Err(HeapError::AlreadyInHeap { element });
        }

        let slot = self.slot_of[element];
        self.nodes[slot] = Node {
            key,
            ..Node::reset(element)
        };
        self.head = self.combine(self.head, Some(slot));
        self.in_heap[element] = true;
        self.len += 1;
        Ok(())
    }

    fn peek(&self) -> Option<(P, usize)> {
        let (_, min) = self.find_min_root()?;
        let node = &self.nodes[min];
        Some((node.key, node.element))
    }

    /// Removes and returns the minimum element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**:
    /// 1. Scan the root list for the minimum root and its predecessor
    /// 2. Unlink that root
    /// 3. Its children form Bₖ₋₁ … B₀ in descending order; reverse them so the
    ///    list is degree-ascending and clear their parent links
    /// 4. Merge the reversed child list back into the remaining forest
    fn extract_min(&mut self) -> Option<(P, usize)> {
        let (prev, min) = self.find_min_root()?;
        self.unlink_root(prev, min);
        self.absorb_children(min);
        Some(self.release(min))
    }

    /// Decreases the key of an element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**: store the new key, then repeatedly swap the (key,
    /// element) pair with the parent's while it is smaller. The tree shape
    /// never changes; only values move toward the root.
    fn decrease_key(&mut self, element: usize, key: P) -> Result<bool, HeapError> {
        let slot = self.occupied_slot(element)?;
        if key >= self.nodes[slot].key {
            return Ok(false);
        }

        self.nodes[slot].key = key;
        self.sift_up(slot);
        Ok(true)
    }

    fn contains(&self, element: usize) -> bool {
        element < self.capacity() && self.in_heap[element]
    }

    fn key_of(&self, element: usize) -> Option<P> {
        if self.contains(element) {
            Some(self.nodes[self.slot_of[element]].key)
        } else {
            None
        }
    }

    fn rebuild(&mut self, len: usize) -> Result<(), HeapError> {
        let capacity = self.capacity();
        if len > capacity {
            return Err(HeapError::CapacityExceeded {
                requested: len,
                capacity,
            });
        }

        for element in 0..capacity {
            self.nodes[element] = Node::reset(element);
            self.slot_of[element] = element;
            self.in_heap[element] = false;
        }
        self.head = None;
        self.len = 0;

        for element in 0..len {
            self.insert(element, P::INFINITY)?;
        }
        Ok(())
    }

    fn check_invariants(&self) -> Result<(), HeapError> {
        let mut seen = 0;
        let mut last_degree: Option<usize> = None;
        let mut root = self.head;
        while let Some(r) = root {
            let node = &self.nodes[r];
            if node.parent.is_some() {
                return Err(corrupt(format!("root slot {r} has a parent")));
            }
            if last_degree.is_some_and(|d| d >= node.degree) {
                return Err(corrupt(format!(
                    "root degrees not strictly ascending at slot {r}"
                )));
            }
            last_degree = Some(node.degree);
            let size = self.check_tree(r)?;
            if size != 1 << node.degree {
                return Err(corrupt(format!(
                    "tree at slot {r} has degree {} but {size} nodes",
                    node.degree
                )));
            }
            seen += size;
            root = node.sibling;
        }

        if seen != self.len {
            return Err(corrupt(format!(
                "forest holds {seen} nodes, len is {}",
                self.len
            )));
        }
        let flagged = self.in_heap.iter().filter(|&&b| b).count();
        if flagged != self.len {
            return Err(corrupt(format!(
                "{flagged} elements flagged, len is {}",
                self.len
            )));
        }
        for (element, &slot) in self.slot_of.iter().enumerate() {
            if self.nodes[slot].element != element {
                return Err(corrupt(format!(
                    "slot_of[{element}] points at the wrong slot"
                )));
            }
        }
        Ok(())
    }
}

impl<P: Priority> KeyedHeap<P> for BinomialHeap<P> {
    /// Raises the key and sifts the pair down toward the smallest child.
    fn increase_key(&mut self, element: usize, key: P) -> Result<bool, HeapError> {
        let slot = self.occupied_slot(element)?;
        if key <= self.nodes[slot].key {
            return Ok(false);
        }

        self.nodes[slot].key = key;
        self.sift_down(slot);
        Ok(true)
    }

    /// Removes an arbitrary element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// The pair is swapped with every ancestor until it sits in a root, and
    /// that root is then detached exactly as in `extract_min`.
    fn remove(&mut self, element: usize) -> Result<P, HeapError> {
        let mut slot = self.occupied_slot(element)?;
        while let Some(parent) = self.nodes[slot].parent {
            self.swap_values(slot, parent);
            slot = parent;
        }

        let prev = self.root_predecessor(slot)?;
        self.unlink_root(prev, slot);
        self.absorb_children(slot);
        let (key, _) = self.release(slot);
        Ok(key)
    }

    fn find_key(&self, key: P) -> Option<usize> {
        let mut stack: Vec<usize> = self.head.into_iter().collect();
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            if node.key == key {
                return Some(node.element);
            }
            // Subtrees rooted above `key` cannot contain it.
            if node.key < key {
                stack.extend(node.child);
            }
            stack.extend(node.sibling);
        }
        None
    }

    /// Melds `other`'s forest into this one
    ///
    /// **Time Complexity**: O(n) to move the nodes, O(log n) to combine
    ///
    /// **Algorithm**: every element of `other` is absent here, so the slot
    /// this arena keeps for it is free. Each of `other`'s occupied slots maps
    /// onto that free slot, its links are rewritten through the same mapping,
    /// and the two degree-ordered root lists are combined like two binary
    /// numbers being added.
    fn merge(&mut self, other: Self) -> Result<(), HeapError> {
        let capacity = self.capacity();
        if other.capacity() != capacity {
            return Err(HeapError::CapacityMismatch {
                capacity,
                other: other.capacity(),
            });
        }
        let shared = |e: &usize| self.in_heap[*e] && other.in_heap[*e];
        if let Some(element) = (0..capacity).find(shared) {
            return Err(HeapError::AlreadyInHeap { element });
        }

        let moved: Vec<usize> = (0..capacity).filter(|&e| other.in_heap[e]).collect();
        let mut remap = vec![0; capacity];
        for &element in &moved {
            remap[other.slot_of[element]] = self.slot_of[element];
        }

        for &element in &moved {
            let node = &other.nodes[other.slot_of[element]];
            self.nodes[remap[other.slot_of[element]]] = Node {
                key: node.key,
                element,
                degree: node.degree,
                parent: node.parent.map(|s| remap[s]),
                child: node.child.map(|s| remap[s]),
                sibling: node.sibling.map(|s| remap[s]),
            };
            self.in_heap[element] = true;
        }

        self.len += other.len;
        let other_head = other.head.map(|s| remap[s]);
        self.head = self.combine(self.head, other_head);
        Ok(())
    }
}

impl<P: Priority> BinomialHeap<P> {
    /// Degrees along the root list, in list order
    pub fn root_degrees(&self) -> Vec<usize> {
        let mut degrees = Vec::new();
        let mut root = self.head;
        while let Some(r) = root {
            degrees.push(self.nodes[r].degree);
            root = self.nodes[r].sibling;
        }
        degrees
    }

    fn occupied_slot(&self, element: usize) -> Result<usize, HeapError> {
        check_range(element, self.capacity())?;
        if !self.in_heap[element] {
            return Err(HeapError::NotInHeap { element });
        }
        Ok(self.slot_of[element])
    }

    /// Returns (predecessor, minimum root); first root wins ties
    fn find_min_root(&self) -> Option<(Option<usize>, usize)> {
        let mut min = self.head?;
        let mut prev_min = None;
        let mut prev = min;
        let mut current = self.nodes[min].sibling;
        while let Some(c) = current {
            if self.nodes[c].key < self.nodes[min].key {
                min = c;
                prev_min = Some(prev);
            }
            prev = c;
            current = self.nodes[c].sibling;
        }
        Some((prev_min, min))
    }

    fn root_predecessor(&self, root: usize) -> Result<Option<usize>, HeapError> {
        let mut prev = None;
        let mut current = self.head;
        while let Some(c) = current {
            if c == root {
                return Ok(prev);
            }
            prev = Some(c);
            current = self.nodes[c].sibling;
        }
        Err(corrupt(format!("slot {root} is not on the root list")))
    }

    fn unlink_root(&mut self, prev: Option<usize>, root: usize) {
        let next = self.nodes[root].sibling.take();
        match prev {
            Some(p) => self.nodes[p].sibling = next,
            None => self.head = next,
        }
    }

    /// Reverses `root`'s child list and merges it back into the forest
    fn absorb_children(&mut self, root: usize) {
        let children = self.nodes[root].child.take();
        let reversed = self.reverse(children);
        self.head = self.combine(self.head, reversed);
    }

    /// Marks a detached slot as free and returns its pair
    fn release(&mut self, slot: usize) -> (P, usize) {
        let node = &mut self.nodes[slot];
        node.degree = 0;
        node.parent = None;
        node.child = None;
        node.sibling = None;
        let (key, element) = (node.key, node.element);
        self.in_heap[element] = false;
        self.len -= 1;
        (key, element)
    }

    /// Makes `child` the first child of `root`
    ///
    /// **Time Complexity**: O(1)
    ///
    /// Linking two Bₖ trees yields a Bₖ₊₁ tree; the caller guarantees
    /// `root.key <= child.key` so heap order holds.
    fn link(&mut self, child: usize, root: usize) {
        self.nodes[child].parent = Some(root);
        self.nodes[child].sibling = self.nodes[root].child;
        self.nodes[root].child = Some(child);
        self.nodes[root].degree += 1;
    }

    /// Merges two degree-ascending root lists into one, without linking
    fn merge_lists(&mut self, mut a: Option<usize>, mut b: Option<usize>) -> Option<usize> {
        let mut head = None;
        let mut tail: Option<usize> = None;
        loop {
            let next = match (a, b) {
                (Some(x), Some(y)) => {
                    if self.nodes[x].degree < self.nodes[y].degree {
                        a = self.nodes[x].sibling;
                        x
                    } else {
                        b = self.nodes[y].sibling;
                        y
                    }
                }
                (rest, None) | (None, rest) => {
                    match tail {
                        Some(t) => self.nodes[t].sibling = rest,
                        None => head = rest,
                    }
                    return head;
                }
            };
            match tail {
                Some(t) => self.nodes[t].sibling = Some(next),
                None => head = Some(next),
            }
            tail = Some(next);
        }
    }

    /// Merges two root lists and links equal-degree neighbours
    ///
    /// **Time Complexity**: O(log n)
    ///
    /// **Algorithm**: after the raw degree merge, walk the list keeping
    /// (prev, cur, next). Skip ahead when `cur` and `next` differ in degree,
    /// or when three consecutive roots share a degree (the first of them must
    /// stay so the carry lands in order). Otherwise link the larger-key root
    /// under the smaller one.
    fn combine(&mut self, a: Option<usize>, b: Option<usize>) -> Option<usize> {
        let mut head = self.merge_lists(a, b)?;
        let mut prev: Option<usize> = None;
        let mut cur = head;

        while let Some(next) = self.nodes[cur].sibling {
            let degree = self.nodes[cur].degree;
            let next_degree = self.nodes[next].degree;
            let triple = self.nodes[next]
                .sibling
                .is_some_and(|after| self.nodes[after].degree == next_degree);

            if degree != next_degree || triple {
                prev = Some(cur);
                cur = next;
            } else if self.nodes[cur].key <= self.nodes[next].key {
                self.nodes[cur].sibling = self.nodes[next].sibling;
                self.link(next, cur);
            } else {
                match prev {
                    Some(p) => self.nodes[p].sibling = Some(next),
                    None => head = next,
                }
                self.link(cur, next);
                cur = next;
            }
        }
        Some(head)
    }

    /// Reverses a child list and clears parent links
    fn reverse(&mut self, mut list: Option<usize>) -> Option<usize> {
        let mut reversed = None;
        while let Some(node) = list {
            list = self.nodes[node].sibling;
            self.nodes[node].sibling = reversed;
            self.nodes[node].parent = None;
            reversed = Some(node);
        }
        reversed
    }

    /// Swaps the (key, element) pairs of two slots and fixes `slot_of`
    fn swap_values(&mut self, a: usize, b: usize) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.nodes.split_at_mut(hi);
        let (x, y) = (&mut left[lo], &mut right[0]);
        mem::swap(&mut x.key, &mut y.key);
        mem::swap(&mut x.element, &mut y.element);
        self.slot_of[self.nodes[a].element] = a;
        self.slot_of[self.nodes[b].element] = b;
    }

    fn sift_up(&mut self, mut slot: usize) {
        while let Some(parent) = self.nodes[slot].parent {
            if self.nodes[slot].key >= self.nodes[parent].key {
                break;
            }
            self.swap_values(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let mut smallest: Option<usize> = None;
            let mut child = self.nodes[slot].child;
            while let Some(c) = child {
                if smallest.map_or(true, |s| self.nodes[c].key < self.nodes[s].key) {
                    smallest = Some(c);
                }
                child = self.nodes[c].sibling;
            }
            match smallest {
                Some(s) if self.nodes[s].key < self.nodes[slot].key => {
                    self.swap_values(slot, s);
                    slot = s;
                }
                _ => break,
            }
        }
    }

    /// Validates one tree and returns its node count
    fn check_tree(&self, root: usize) -> Result<usize, HeapError> {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            if !self.in_heap[node.element] {
                return Err(corrupt(format!(
                    "element {} linked but not flagged",
                    node.element
                )));
            }
            count += 1;

            let mut children = 0;
            let mut expected_degree = node.degree;
            let mut child = node.child;
            while let Some(c) = child {
                let child_node = &self.nodes[c];
                if child_node.parent != Some(slot) {
                    return Err(corrupt(format!(
                        "slot {c} does not point back at its parent"
                    )));
                }
                if child_node.key < node.key {
                    return Err(HeapError::HeapOrderViolated {
                        parent: node.element,
                        child: child_node.element,
                    });
                }
                expected_degree = expected_degree.wrapping_sub(1);
                if child_node.degree != expected_degree {
                    return Err(corrupt(format!(
                        "child degrees under slot {slot} out of order"
                    )));
                }
                children += 1;
                stack.push(c);
                child = child_node.sibling;
            }
            if children != node.degree {
                return Err(corrupt(format!(
                    "slot {slot} has degree {} but {children} children",
                    node.degree
                )));
            }
        }
        Ok(count)
    }
}

fn corrupt(detail: String) -> HeapError {
    HeapError::CorruptStructure(detail)
}
