//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease_key
//! - O(log n) amortized extract_min
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list. The heap maintains the minimum root.
//!
//! Nodes live in a fixed arena indexed by element, and every `left`, `right`,
//! `parent` and `child` link is an arena index. A node reset by `rebuild` is a
//! ring of one, so no link can dangle across queries.

use crate::traits::{check_range, HeapError, IndexedHeap, KeyedHeap, Priority};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node<P> {
    key: P,
    degree: usize,
    left: usize,
    right: usize,
    parent: Option<usize>,
    child: Option<usize>,
    /// Set when a child was cut since this node last became a child
    marked: bool,
    /// Whether the node is currently part of the heap
    linked: bool,
}

impl<P: Priority> Node<P> {
    fn reset(index: usize) -> Self {
        Node {
            key: P::INFINITY,
            degree: 0,
            left: index,
            right: index,
            parent: None,
            child: None,
            marked: false,
            linked: false,
        }
    }
}

/// Fibonacci Heap over a fixed node arena
///
/// # Example
///
/// ```rust
/// use rust_sssp_heaps::fibonacci::FibonacciHeap;
/// use rust_sssp_heaps::IndexedHeap;
///
/// let mut heap: FibonacciHeap<u64> = FibonacciHeap::with_capacity(3);
/// heap.insert(0, 5).unwrap();
/// heap.insert(1, 9).unwrap();
/// heap.decrease_key(1, 1).unwrap();
/// assert_eq!(heap.peek(), Some((1, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciHeap<P> {
    nodes: Vec<Node<P>>,
    min: Option<usize>,
    len: usize,
    /// Degree table reused by every consolidation
    cons: Vec<Option<usize>>,
    /// Root buffer reused by every consolidation
    roots: Vec<usize>,
}

impl<P: Priority> IndexedHeap<P> for FibonacciHeap<P> {
    fn with_capacity(capacity: usize) -> Self {
        FibonacciHeap {
            nodes: (0..capacity).map(Node::reset).collect(),
            min: None,
            len: 0,
            cons: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    /// Splices the node into the root ring next to the minimum. O(1).
    fn insert(&mut self, element: usize, key: P) -> Result<(), HeapError> {
        check_range(element, self.capacity())?;
        if self.nodes[element].linked {
            return Err(HeapError::AlreadyInHeap { element });
        }

        self.nodes[element] = Node {
            key,
            linked: true,
            ..Node::reset(element)
        };
        match self.min {
            Some(min) => {
                self.add_before(element, min);
                if key < self.nodes[min].key {
                    self.min = Some(element);
                }
            }
            None => self.min = Some(element),
        }
        self.len += 1;
        Ok(())
    }

    fn peek(&self) -> Option<(P, usize)> {
        self.min.map(|min| (self.nodes[min].key, min))
    }

    /// Removes the minimum root
    ///
    /// **Algorithm**:
    /// 1. Move every child of the minimum into the root ring, clearing parent and mark
    /// 2. Unlink the minimum from the ring
    /// 3. Consolidate the remaining roots until all degrees are distinct
    fn extract_min(&mut self) -> Option<(P, usize)> {
        let min = self.min?;

        while let Some(child) = self.nodes[min].child {
            self.detach_child(child, min);
            self.add_before(child, min);
        }

        if self.nodes[min].right == min {
            self.min = None;
        } else {
            self.min = Some(self.nodes[min].right);
            self.unlink(min);
            self.consolidate();
        }

        let node = &mut self.nodes[min];
        node.degree = 0;
        node.linked = false;
        self.len -= 1;
        Some((node.key, min))
    }

    /// Decreases the key of an element
    ///
    /// If the new key breaks heap order against the parent, the node is cut
    /// into the root ring and the former parent is cascading-cut.
    fn decrease_key(&mut self, element: usize, key: P) -> Result<bool, HeapError> {
        self.check_linked(element)?;
        if key >= self.nodes[element].key {
            return Ok(false);
        }

        self.nodes[element].key = key;
        if let Some(parent) = self.nodes[element].parent {
            if key < self.nodes[parent].key {
                self.cut(element, parent);
                self.cascading_cut(parent);
            }
        }
        if let Some(min) = self.min {
            if key < self.nodes[min].key {
                self.min = Some(element);
            }
        }
        Ok(true)
    }

    fn contains(&self, element: usize) -> bool {
        element < self.capacity() && self.nodes[element].linked
    }

    fn key_of(&self, element: usize) -> Option<P> {
        if self.contains(element) {
            Some(self.nodes[element].key)
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

        for (index, node) in self.nodes.iter_mut().enumerate() {
            *node = Node::reset(index);
        }
        self.min = None;
        self.len = 0;

        for element in 0..len {
            self.insert(element, P::INFINITY)?;
        }
        Ok(())
    }

    fn check_invariants(&self) -> Result<(), HeapError> {
        let Some(min) = self.min else {
            if self.len != 0 {
                return Err(corrupt(format!("no minimum but len is {}", self.len)));
            }
            return Ok(());
        };

        let roots = self.ring(min)?;
        let mut seen = 0;
        for &root in &roots {
            if self.nodes[root].parent.is_some() {
                return Err(corrupt(format!("root {root} has a parent")));
            }
            if self.nodes[root].key < self.nodes[min].key {
                return Err(corrupt(format!("root {root} is below the cached minimum")));
            }
            seen += self.check_tree(root)?;
        }

        if seen != self.len {
            return Err(corrupt(format!(
                "forest holds {seen} nodes, len is {}",
                self.len
            )));
        }
        let flagged = self.nodes.iter().filter(|n| n.linked).count();
        if flagged != self.len {
            return Err(corrupt(format!(
                "{flagged} nodes flagged, len is {}",
                self.len
            )));
        }
        Ok(())
    }
}

impl<P: Priority> KeyedHeap<P> for FibonacciHeap<P> {
    /// Raises the key of an element
    ///
    /// All children move to the root ring (they may now be smaller), then the
    /// node itself is cut from its parent. A root that was the minimum forces
    /// a rescan of the ring.
    fn increase_key(&mut self, element: usize, key: P) -> Result<bool, HeapError> {
        self.check_linked(element)?;
        if key <= self.nodes[element].key {
            return Ok(false);
        }

        while let Some(child) = self.nodes[element].child {
            self.detach_child(child, element);
            self.add_to_roots(child);
        }
        self.nodes[element].key = key;

        if let Some(parent) = self.nodes[element].parent {
            self.cut(element, parent);
            self.cascading_cut(parent);
        } else if self.min == Some(element) {
            self.min = Some(self.ring_min(element));
        }
        Ok(true)
    }

    /// Removes an arbitrary element by promoting it to a virtual −∞ key
    /// (cut into the root ring, made the minimum) and extracting it.
    fn remove(&mut self, element: usize) -> Result<P, HeapError> {
        self.check_linked(element)?;
        if let Some(parent) = self.nodes[element].parent {
            self.cut(element, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(element);
        self.extract_min()
            .map(|(key, _)| key)
            .ok_or(HeapError::NotInHeap { element })
    }

    fn find_key(&self, key: P) -> Option<usize> {
        let mut stack: Vec<usize> = Vec::new();
        if let Some(min) = self.min {
            stack.extend(self.ring_members(min));
        }
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.key == key {
                return Some(index);
            }
            if node.key < key {
                if let Some(child) = node.child {
                    stack.extend(self.ring_members(child));
                }
            }
        }
        None
    }

    /// Melds `other` into this heap
    ///
    /// **Time Complexity**: O(n) to move the nodes, O(1) to meld
    ///
    /// Nodes are indexed by element and the element sets are disjoint, so
    /// `other`'s linked nodes land in free slots of this arena with their
    /// links intact. The two root rings are then spliced and the smaller
    /// minimum kept.
    fn merge(&mut self, other: Self) -> Result<(), HeapError> {
        let capacity = self.capacity();
        if other.capacity() != capacity {
            return Err(HeapError::CapacityMismatch {
                capacity,
                other: other.capacity(),
            });
        }
        let shared = |e: &usize| self.nodes[*e].linked && other.nodes[*e].linked;
        if let Some(element) = (0..capacity).find(shared) {
            return Err(HeapError::AlreadyInHeap { element });
        }

        let (other_min, other_len) = (other.min, other.len);
        for (element, node) in other.nodes.into_iter().enumerate() {
            if node.linked {
                self.nodes[element] = node;
            }
        }

        match (self.min, other_min) {
            (_, None) => {}
            (None, Some(b)) => self.min = Some(b),
            (Some(a), Some(b)) => {
                self.splice(a, b);
                if self.nodes[b].key < self.nodes[a].key {
                    self.min = Some(b);
                }
            }
        }
        self.len += other_len;
        Ok(())
    }
}

impl<P: Priority> FibonacciHeap<P> {
    /// Number of trees in the root ring
    pub fn root_count(&self) -> usize {
        self.min.map_or(0, |min| self.ring_members(min).len())
    }

    /// Whether `element` carries a mark bit
    pub fn is_marked(&self, element: usize) -> bool {
        element < self.capacity() && self.nodes[element].marked
    }

    /// Parent of `element` in its tree, if any
    pub fn parent_of(&self, element: usize) -> Option<usize> {
        self.nodes.get(element).and_then(|n| n.parent)
    }

    fn check_linked(&self, element: usize) -> Result<(), HeapError> {
        check_range(element, self.capacity())?;
        if !self.nodes[element].linked {
            return Err(HeapError::NotInHeap { element });
        }
        Ok(())
    }

    /// Inserts `node` to the left of `anchor` in anchor's ring
    fn add_before(&mut self, node: usize, anchor: usize) {
        let left = self.nodes[anchor].left;
        self.nodes[node].left = left;
        self.nodes[node].right = anchor;
        self.nodes[left].right = node;
        self.nodes[anchor].left = node;
    }

    /// Joins the rings through `a` and `b` into one ring
    fn splice(&mut self, a: usize, b: usize) {
        let a_right = self.nodes[a].right;
        let b_left = self.nodes[b].left;
        self.nodes[a].right = b;
        self.nodes[b].left = a;
        self.nodes[b_left].right = a_right;
        self.nodes[a_right].left = b_left;
    }

    fn add_to_roots(&mut self, node: usize) {
        match self.min {
            Some(min) => self.add_before(node, min),
            None => {
                self.nodes[node].left = node;
                self.nodes[node].right = node;
                self.min = Some(node);
            }
        }
    }

    /// Removes `node` from its ring, leaving it as a ring of one
    fn unlink(&mut self, node: usize) {
        let (left, right) = (self.nodes[node].left, self.nodes[node].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.nodes[node].left = node;
        self.nodes[node].right = node;
    }

    /// Removes `child` from `parent`'s child ring and clears its parent and mark
    fn detach_child(&mut self, child: usize, parent: usize) {
        let right = self.nodes[child].right;
        if right == child {
            self.nodes[parent].child = None;
        } else {
            if self.nodes[parent].child == Some(child) {
                self.nodes[parent].child = Some(right);
            }
            self.unlink(child);
        }
        self.nodes[parent].degree -= 1;
        self.nodes[child].parent = None;
        self.nodes[child].marked = false;
    }

    /// Makes the ring-of-one `node` a child of `root`
    fn make_child(&mut self, node: usize, root: usize) {
        match self.nodes[root].child {
            Some(child) => self.add_before(node, child),
            None => self.nodes[root].child = Some(node),
        }
        self.nodes[node].parent = Some(root);
        self.nodes[node].marked = false;
        self.nodes[root].degree += 1;
    }

    /// Links trees of equal degree until all root degrees are distinct
    ///
    /// The degree table starts at `floor(log2 n) + 2` slots and grows on
    /// demand, since Fibonacci tree degrees are bounded by log_φ n.
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };

        let wanted = (usize::BITS - self.len.leading_zeros()) as usize + 1;
        if self.cons.len() < wanted {
            self.cons.resize(wanted, None);
        }

        let mut roots = std::mem::take(&mut self.roots);
        roots.clear();
        let mut current = start;
        loop {
            roots.push(current);
            current = self.nodes[current].right;
            if current == start {
                break;
            }
        }
        for &root in &roots {
            self.nodes[root].left = root;
            self.nodes[root].right = root;
        }

        for &root in &roots {
            let mut x = root;
            let mut degree = self.nodes[x].degree;
            loop {
                if degree >= self.cons.len() {
                    self.cons.resize(degree + 1, None);
                }
                let Some(mut y) = self.cons[degree].take() else {
                    break;
                };
                if self.nodes[x].key > self.nodes[y].key {
                    std::mem::swap(&mut x, &mut y);
                }
                self.make_child(y, x);
                degree += 1;
            }
            self.cons[degree] = Some(x);
        }
        self.roots = roots;

        self.min = None;
        for degree in 0..self.cons.len() {
            if let Some(root) = self.cons[degree].take() {
                self.add_to_roots(root);
                if let Some(min) = self.min {
                    if self.nodes[root].key < self.nodes[min].key {
                        self.min = Some(root);
                    }
                }
            }
        }
    }

    /// Cuts `node` from `parent` and adds it to the root ring
    fn cut(&mut self, node: usize, parent: usize) {
        self.detach_child(node, parent);
        self.add_to_roots(node);
    }

    /// Marks unmarked ancestors, cutting marked ones, walking upward
    fn cascading_cut(&mut self, node: usize) {
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            if !self.nodes[current].marked {
                self.nodes[current].marked = true;
                return;
            }
            self.cut(current, parent);
            current = parent;
        }
    }

    fn ring_members(&self, start: usize) -> Vec<usize> {
        let mut members = vec![start];
        let mut current = self.nodes[start].right;
        while current != start {
            members.push(current);
            current = self.nodes[current].right;
        }
        members
    }

    fn ring_min(&self, start: usize) -> usize {
        self.ring_members(start)
            .into_iter()
            .min_by_key(|&index| self.nodes[index].key)
            .unwrap_or(start)
    }

    /// Walks a ring checking that it closes and that left/right agree
    fn ring(&self, start: usize) -> Result<Vec<usize>, HeapError> {
        let mut members = Vec::new();
        let mut current = start;
        loop {
            if members.len() > self.len {
                return Err(corrupt(format!("ring through {start} does not close")));
            }
            let right = self.nodes[current].right;
            if self.nodes[right].left != current {
                return Err(corrupt(format!("{current}.right.left is not {current}")));
            }
            members.push(current);
            current = right;
            if current == start {
                return Ok(members);
            }
        }
    }

    fn check_tree(&self, root: usize) -> Result<usize, HeapError> {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.linked {
                return Err(corrupt(format!("node {index} reachable but not linked")));
            }
            count += 1;

            let children = match node.child {
                Some(child) => self.ring(child)?,
                None => Vec::new(),
            };
            if children.len() != node.degree {
                return Err(corrupt(format!(
                    "node {index} has degree {} but {} children",
                    node.degree,
                    children.len()
                )));
            }
            for child in children {
                if self.nodes[child].parent != Some(index) {
                    return Err(corrupt(format!(
                        "node {child} does not point back at {index}"
                    )));
                }
                if self.nodes[child].key < node.key {
                    return Err(HeapError::HeapOrderViolated {
                        parent: index,
                        child,
                    });
                }
                stack.push(child);
            }
        }
        Ok(count)
    }
}

fn corrupt(detail: String) -> HeapError {
    HeapError::CorruptStructure(detail)
}
