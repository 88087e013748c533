//! Common traits for the indexed heap backends
//!
//! This module provides the contract every priority-queue backend implements:
//!
//! - [`IndexedHeap`]: the capability set the shortest-path driver is written
//!   against (insert, extract-min, decrease-key, membership, rebuild)
//! - [`KeyedHeap`]: general-purpose extras (increase-key, arbitrary removal,
//!   key search, merge) that both engines support but the driver never calls
//!
//! Unlike pointer-based heaps, these heaps own a fixed arena of nodes sized at
//! construction. Elements are dense indices `0..capacity` and double as
//! handles: element `i` always refers to the same logical entry, so callers
//! never have to hold on to an opaque handle type.

use std::fmt;
use thiserror::Error;

/// Key type stored in a heap.
///
/// `INFINITY` is the sentinel every node is reset to by [`IndexedHeap::rebuild`].
pub trait Priority: Ord + Copy + fmt::Debug {
    /// Largest representable key, used as the "unreached" sentinel
    const INFINITY: Self;
}

macro_rules! impl_priority {
    ($($t:ty),* $(,)?) => {
        $(
            impl Priority for $t {
                const INFINITY: Self = <$t>::MAX;
            }
        )*
    };
}

impl_priority!(u8, u16, u32, u64, u128, usize);
impl_priority!(i8, i16, i32, i64, i128, isize);

/// Error type for heap operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The element index does not name a node in the arena
    #[error("element {element} is outside the arena of {capacity} nodes")]
    ElementOutOfRange { element: usize, capacity: usize },
    /// A rebuild asked for more nodes than the arena holds
    #[error("cannot hold {requested} elements in an arena of {capacity} nodes")]
    CapacityExceeded { requested: usize, capacity: usize },
    /// Two heaps with different arena sizes cannot be merged
    #[error("cannot merge a heap of {other} nodes into one of {capacity} nodes")]
    CapacityMismatch { capacity: usize, other: usize },
    /// The element is not currently stored in the heap
    #[error("element {element} is not in the heap")]
    NotInHeap { element: usize },
    /// The element is already stored in the heap
    #[error("element {element} is already in the heap")]
    AlreadyInHeap { element: usize },
    /// A child carries a smaller key than its parent
    #[error("heap order violated: element {parent} is an ancestor of smaller element {child}")]
    HeapOrderViolated { parent: usize, child: usize },
    /// Links, degrees or counts disagree with each other
    #[error("corrupt heap structure: {0}")]
    CorruptStructure(String),
}

/// Capability set shared by every backend.
///
/// # Example
///
/// ```rust
/// use rust_sssp_heaps::fibonacci::FibonacciHeap;
/// use rust_sssp_heaps::IndexedHeap;
///
/// let mut heap: FibonacciHeap<u32> = FibonacciHeap::with_capacity(4);
/// heap.insert(0, 30).unwrap();
/// heap.insert(1, 10).unwrap();
/// assert!(heap.decrease_key(0, 5).unwrap());
/// assert_eq!(heap.extract_min(), Some((5, 0)));
/// ```
pub trait IndexedHeap<P: Priority> {
    /// Creates an empty heap whose arena can hold elements `0..capacity`
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Number of nodes in the arena
    fn capacity(&self) -> usize;

    /// Number of elements currently in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `element` with the given key
    ///
    /// # Errors
    /// `ElementOutOfRange` for an index outside the arena, `AlreadyInHeap`
    /// if the element is stored already.
    fn insert(&mut self, element: usize, key: P) -> Result<(), HeapError>;

    /// Returns the minimum key and its element without removing it
    fn peek(&self) -> Option<(P, usize)>;

    /// Removes and returns the minimum key and its element
    fn extract_min(&mut self) -> Option<(P, usize)>;

    /// Lowers the key of `element`.
    ///
    /// A request that does not lower the key is a no-op and returns
    /// `Ok(false)`; the heap is left untouched.
    fn decrease_key(&mut self, element: usize, key: P) -> Result<bool, HeapError>;

    /// Returns true if `element` is currently stored in the heap
    fn contains(&self, element: usize) -> bool;

    /// Current key of `element`, if it is stored in the heap
    fn key_of(&self, element: usize) -> Option<P>;

    /// Discards every tree, resets all nodes to the `INFINITY` sentinel with
    /// no links and re-inserts elements `0..len`.
    ///
    /// The node arena is reused; nothing is reallocated.
    fn rebuild(&mut self, len: usize) -> Result<(), HeapError>;

    /// Walks the whole structure and reports the first broken invariant
    fn check_invariants(&self) -> Result<(), HeapError>;
}

/// Arbitrary-mutation operations on top of [`IndexedHeap`].
pub trait KeyedHeap<P: Priority>: IndexedHeap<P> {
    /// Raises the key of `element`; `Ok(false)` if it would not increase
    fn increase_key(&mut self, element: usize, key: P) -> Result<bool, HeapError>;

    /// Removes `element` regardless of its key, returning the key it had
    fn remove(&mut self, element: usize) -> Result<P, HeapError>;

    /// Finds some element stored with exactly `key`
    fn find_key(&self, key: P) -> Option<usize>;

    /// Moves every element of `other` into this heap.
    ///
    /// Both heaps must share a capacity and hold disjoint element sets; on
    /// error neither heap is changed.
    ///
    /// # Errors
    /// `CapacityMismatch` for arenas of different sizes, `AlreadyInHeap` for
    /// the first element stored in both heaps.
    fn merge(&mut self, other: Self) -> Result<(), HeapError>
    where
        Self: Sized;

    /// Moves `element` to `key` in either direction
    fn update(&mut self, element: usize, key: P) -> Result<bool, HeapError> {
        let current = self
            .key_of(element)
            .ok_or(HeapError::NotInHeap { element })?;
        match key.cmp(&current) {
            std::cmp::Ordering::Less => self.decrease_key(element, key),
            std::cmp::Ordering::Greater => self.increase_key(element, key),
            std::cmp::Ordering::Equal => Ok(false),
        }
    }

    /// Returns true if some element is stored with exactly `key`
    fn contains_key(&self, key: P) -> bool {
        self.find_key(key).is_some()
    }

    /// Finds an element keyed `old` and moves it to `new`
    fn update_key(&mut self, old: P, new: P) -> Result<bool, HeapError> {
        match self.find_key(old) {
            Some(element) => self.update(element, new),
            None => Ok(false),
        }
    }

    /// Finds an element keyed `key` and removes it, returning the element
    fn remove_key(&mut self, key: P) -> Result<Option<usize>, HeapError> {
        match self.find_key(key) {
            Some(element) => self.remove(element).map(|_| Some(element)),
            None => Ok(None),
        }
    }
}

#[inline]
pub(crate) fn check_range(element: usize, capacity: usize) -> Result<(), HeapError> {
    if element < capacity {
        Ok(())
    } else {
        Err(HeapError::ElementOutOfRange { element, capacity })
    }
}
