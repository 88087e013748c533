//! Property-based tests using proptest
//!
//! Random operation sequences are replayed against each backend and a plain
//! element-to-key model. After every step the heap must agree with the model
//! and pass its own structural check.

use proptest::prelude::*;
use rust_sssp_heaps::binomial::BinomialHeap;
use rust_sssp_heaps::fibonacci::FibonacciHeap;
use rust_sssp_heaps::{IndexedHeap, KeyedHeap};

const CAPACITY: usize = 48;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize, u32),
    Extract,
    Decrease(usize, u32),
    Increase(usize, u32),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CAPACITY, 0u32..1000).prop_map(|(e, k)| Op::Insert(e, k)),
        3 => Just(Op::Extract),
        4 => (0..CAPACITY, 0u32..1000).prop_map(|(e, k)| Op::Decrease(e, k)),
        1 => (0..CAPACITY, 0u32..1000).prop_map(|(e, k)| Op::Increase(e, k)),
        1 => (0..CAPACITY).prop_map(Op::Remove),
    ]
}

/// Replays `ops`, checking the heap against a model after every step
fn test_matches_model<H: KeyedHeap<u32>>(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap = H::with_capacity(CAPACITY);
    let mut model: Vec<Option<u32>> = vec![None; CAPACITY];

    for op in ops {
        match op {
            Op::Insert(e, k) => {
                let result = heap.insert(e, k);
                prop_assert_eq!(result.is_ok(), model[e].is_none());
                if model[e].is_none() {
                    model[e] = Some(k);
                }
            }
            Op::Extract => {
                let expected = model.iter().flatten().min().copied();
                match heap.extract_min() {
                    Some((key, element)) => {
                        prop_assert_eq!(Some(key), expected);
                        prop_assert_eq!(model[element], Some(key));
                        model[element] = None;
                    }
                    None => prop_assert_eq!(expected, None),
                }
            }
            Op::Decrease(e, k) => match model[e] {
                Some(current) => {
                    let lowered = heap.decrease_key(e, k).unwrap();
                    prop_assert_eq!(lowered, k < current);
                    if lowered {
                        model[e] = Some(k);
                    }
                }
                None => prop_assert!(heap.decrease_key(e, k).is_err()),
            },
            Op::Increase(e, k) => {
                if let Some(current) = model[e] {
                    let raised = heap.increase_key(e, k).unwrap();
                    prop_assert_eq!(raised, k > current);
                    if raised {
                        model[e] = Some(k);
                    }
                }
            }
            Op::Remove(e) => match model[e].take() {
                Some(current) => prop_assert_eq!(heap.remove(e).unwrap(), current),
                None => prop_assert!(heap.remove(e).is_err()),
            },
        }

        let checked = heap.check_invariants();
        prop_assert!(checked.is_ok(), "{:?}", checked);
        prop_assert_eq!(heap.len(), model.iter().flatten().count());
        let min = model.iter().flatten().min().copied();
        prop_assert_eq!(heap.peek().map(|(k, _)| k), min);
    }
    Ok(())
}

/// Draining returns every key in non-decreasing order
fn test_sorted_extraction<H: IndexedHeap<u32>>(keys: Vec<u32>) -> Result<(), TestCaseError> {
    let mut heap = H::with_capacity(keys.len());
    for (element, &key) in keys.iter().enumerate() {
        heap.insert(element, key).unwrap();
    }
    let drained: Vec<u32> = std::iter::from_fn(|| heap.extract_min())
        .map(|(k, _)| k)
        .collect();
    let mut expected = keys;
    expected.sort_unstable();
    prop_assert_eq!(drained, expected);
    Ok(())
}

/// Rebuild gives the same observable state no matter what came before
fn test_rebuild_forgets_history<H: IndexedHeap<u64>>(
    keys: Vec<u64>,
    len: usize,
) -> Result<(), TestCaseError> {
    let mut heap = H::with_capacity(keys.len());
    for (element, &key) in keys.iter().enumerate() {
        heap.insert(element, key).unwrap();
    }
    heap.extract_min();

    let len = len % (keys.len() + 1);
    heap.rebuild(len).unwrap();
    prop_assert!(heap.check_invariants().is_ok());
    prop_assert_eq!(heap.len(), len);
    for element in 0..keys.len() {
        let expected = (element < len).then_some(u64::MAX);
        prop_assert_eq!(heap.key_of(element), expected);
    }
    Ok(())
}

/// Splits keys between two heaps, mutates both, merges and drains
fn test_merge_matches_model<H: KeyedHeap<u32>>(
    keys: Vec<(bool, u32)>,
    decreases: Vec<(usize, u32)>,
) -> Result<(), TestCaseError> {
    let capacity = keys.len();
    let mut left = H::with_capacity(capacity);
    let mut right = H::with_capacity(capacity);
    let mut model: Vec<Option<u32>> = vec![None; capacity];
    for (element, &(goes_left, key)) in keys.iter().enumerate() {
        let heap = if goes_left { &mut left } else { &mut right };
        heap.insert(element, key).unwrap();
        model[element] = Some(key);
    }

    // Give both sides consolidated trees before melding.
    for heap in [&mut left, &mut right] {
        if let Some((_, element)) = heap.extract_min() {
            model[element] = None;
        }
    }
    for (element, key) in decreases {
        let element = element % capacity;
        let heap = if left.contains(element) {
            &mut left
        } else {
            &mut right
        };
        if let Some(current) = model[element] {
            prop_assert_eq!(heap.decrease_key(element, key).unwrap(), key < current);
            model[element] = Some(key.min(current));
        }
    }

    left.merge(right).unwrap();
    let checked = left.check_invariants();
    prop_assert!(checked.is_ok(), "{:?}", checked);
    prop_assert_eq!(left.len(), model.iter().flatten().count());

    let mut last = 0;
    while let Some((key, element)) = left.extract_min() {
        prop_assert!(key >= last);
        prop_assert_eq!(model[element].take(), Some(key));
        last = key;
    }
    prop_assert!(model.iter().all(Option::is_none));
    Ok(())
}

proptest! {
    #[test]
    fn binomial_merge_matches_model(
        keys in prop::collection::vec((any::<bool>(), 0u32..500), 1..80),
        decreases in prop::collection::vec((any::<usize>(), 0u32..500), 0..40),
    ) {
        test_merge_matches_model::<BinomialHeap<u32>>(keys, decreases)?;
    }

    #[test]
    fn fibonacci_merge_matches_model(
        keys in prop::collection::vec((any::<bool>(), 0u32..500), 1..80),
        decreases in prop::collection::vec((any::<usize>(), 0u32..500), 0..40),
    ) {
        test_merge_matches_model::<FibonacciHeap<u32>>(keys, decreases)?;
    }

    #[test]
    fn binomial_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        test_matches_model::<BinomialHeap<u32>>(ops)?;
    }

    #[test]
    fn fibonacci_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        test_matches_model::<FibonacciHeap<u32>>(ops)?;
    }

    #[test]
    fn binomial_sorted_extraction(keys in prop::collection::vec(any::<u32>(), 0..150)) {
        test_sorted_extraction::<BinomialHeap<u32>>(keys)?;
    }

    #[test]
    fn fibonacci_sorted_extraction(keys in prop::collection::vec(any::<u32>(), 0..150)) {
        test_sorted_extraction::<FibonacciHeap<u32>>(keys)?;
    }

    #[test]
    fn binomial_rebuild_forgets_history(
        keys in prop::collection::vec(0u64..100, 1..60),
        len in any::<usize>(),
    ) {
        test_rebuild_forgets_history::<BinomialHeap<u64>>(keys, len)?;
    }

    #[test]
    fn fibonacci_rebuild_forgets_history(
        keys in prop::collection::vec(0u64..100, 1..60),
        len in any::<usize>(),
    ) {
        test_rebuild_forgets_history::<FibonacciHeap<u64>>(keys, len)?;
    }
}
