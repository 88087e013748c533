//! Tests for the shortest-path driver
//!
//! Tests cover:
//! - The same queries on both heap backends
//! - Edge cases (unreachable vertices, self loops, zero-length edges, isolated sources)
//! - Driver reuse across queries and early-exit queries
//! - Property-based comparison with a reference Dijkstra over `std::collections::BinaryHeap`

use rust_sssp_heaps::binomial::BinomialHeap;
use rust_sssp_heaps::fibonacci::FibonacciHeap;
use rust_sssp_heaps::{
    Backend, Dijkstra, Distance, Edge, Graph, IndexedHeap, QueryState, Solver, SolverConfig,
    SpError, UNREACHED,
};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

/// Four vertices where the indirect route 0→1→3→2 beats the direct edge 0→2
fn detour_graph() -> Arc<Graph> {
    let graph = Graph::from_parts(
        vec![0, 2, 3, 4],
        vec![
            Edge {
                length: 10,
                head: 1,
            },
            Edge {
                length: 60,
                head: 2,
            },
            Edge { length: 5, head: 3 },
            Edge {
                length: 200,
                head: 0,
            },
            Edge { length: 4, head: 2 },
        ],
    )
    .unwrap();
    Arc::new(graph)
}

/// Two components: {0, 1, 2} and {3, 4}
fn split_graph() -> Arc<Graph> {
    let triples = [(0, 1, 3), (1, 2, 3), (2, 0, 1), (3, 4, 2), (4, 3, 2)];
    Arc::new(Graph::from_edges(5, &triples).unwrap())
}

fn reference_distances(graph: &Graph, source: usize) -> Vec<Distance> {
    let mut dist = vec![UNREACHED; graph.vertex_count()];
    let mut queue = BinaryHeap::new();
    dist[source] = 0;
    queue.push(Reverse((0, source)));
    while let Some(Reverse((d, u))) = queue.pop() {
        if d > dist[u] {
            continue;
        }
        for edge in graph.edges(u) {
            let candidate = d + edge.length;
            if candidate < dist[edge.head] {
                dist[edge.head] = candidate;
                queue.push(Reverse((candidate, edge.head)));
            }
        }
    }
    dist
}

// ============================================================================
// Generic driver tests
// ============================================================================

fn test_detour_is_preferred<Q: IndexedHeap<Distance>>() {
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(detour_graph());
    dijkstra.run(0).unwrap();

    assert_eq!(dijkstra.distances(), vec![0, 10, 19, 15]);
    let parents: Vec<Option<usize>> = (0..4).map(|v| dijkstra.parent(v)).collect();
    assert_eq!(parents, vec![None, Some(0), Some(3), Some(1)]);
    assert_eq!(dijkstra.path_to(2), Some(vec![0, 1, 3, 2]));
    assert!(dijkstra.vertices().iter().all(|r| r.visited));
    dijkstra.verify(0).unwrap();

    let stats = dijkstra.stats();
    assert_eq!(stats.queries_run, 1);
    assert_eq!(stats.vertices_scanned, 4);
    assert_eq!(stats.keys_decreased, 4);
}

fn test_unreachable_vertices<Q: IndexedHeap<Distance>>() {
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(split_graph());
    dijkstra.run(0).unwrap();

    assert_eq!(dijkstra.distances(), vec![0, 3, 6, UNREACHED, UNREACHED]);
    assert_eq!(dijkstra.distance(3), None);
    assert_eq!(dijkstra.parent(4), None);
    assert_eq!(dijkstra.path_to(4), None);
    // Unreachable vertices are still drained from the queue.
    assert!(dijkstra.vertices()[4].visited);
    dijkstra.verify(0).unwrap();
}

fn test_repeated_queries_reset_state<Q: IndexedHeap<Distance>>() {
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(split_graph());
    dijkstra.run(0).unwrap();
    dijkstra.run(3).unwrap();
    assert_eq!(
        dijkstra.distances(),
        vec![UNREACHED, UNREACHED, UNREACHED, 0, 2]
    );
    assert_eq!(dijkstra.parent(1), None);

    dijkstra.run(0).unwrap();
    assert_eq!(dijkstra.distances(), vec![0, 3, 6, UNREACHED, UNREACHED]);
    assert_eq!(dijkstra.stats().queries_run, 3);
    assert_eq!(dijkstra.state(), QueryState::Done);
}

fn test_run_to_reports_reachability<Q: IndexedHeap<Distance>>() {
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(detour_graph());
    assert!(dijkstra.run_to(0, 3).unwrap());
    assert_eq!(dijkstra.distance(3), Some(15));
    assert!(!dijkstra.vertices()[2].visited);

    let mut split: Dijkstra<Q> = Dijkstra::new(split_graph());
    assert!(!split.run_to(0, 4).unwrap());
    assert!(split.run_to(4, 4).unwrap());
    assert_eq!(split.distance(4), Some(0));
    assert_eq!(
        split.run_to(0, 9),
        Err(SpError::VertexOutOfRange {
            vertex: 9,
            vertices: 5,
        })
    );
}

fn test_self_loops_and_zero_lengths<Q: IndexedHeap<Distance>>() {
    let triples = [
        (0, 0, 5),
        (0, 1, 0),
        (1, 2, 0),
        (2, 1, 0),
        (2, 3, 7),
        (1, 3, 9),
    ];
    let graph = Graph::from_edges(4, &triples).unwrap();
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(Arc::new(graph));
    dijkstra.run(0).unwrap();
    assert_eq!(dijkstra.distances(), vec![0, 0, 0, 7]);
    assert_eq!(dijkstra.path_to(3), Some(vec![0, 1, 2, 3]));
    dijkstra.verify(0).unwrap();
}

fn test_single_vertex<Q: IndexedHeap<Distance>>() {
    let graph = Graph::from_parts(vec![0], vec![]).unwrap();
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(Arc::new(graph));
    dijkstra.run(0).unwrap();
    assert_eq!(dijkstra.distances(), vec![0]);
    assert_eq!(dijkstra.path_to(0), Some(vec![0]));
    assert_eq!(dijkstra.stats().keys_decreased, 0);
}

fn test_huge_lengths_saturate<Q: IndexedHeap<Distance>>() {
    let big = Distance::MAX / 2 + 1;
    let graph = Graph::from_edges(3, &[(0, 1, big), (1, 2, big)]).unwrap();
    let mut dijkstra: Dijkstra<Q> = Dijkstra::new(Arc::new(graph));
    dijkstra.run(0).unwrap();
    assert_eq!(dijkstra.distance(1), Some(big));
    // big + big saturates to the sentinel, which never relaxes anything.
    assert_eq!(dijkstra.distance(2), None);
}

macro_rules! driver_tests {
    ($module:ident, $heap:ident) => {
        mod $module {
            use super::*;

            #[test]
            fn detour_is_preferred() {
                test_detour_is_preferred::<$heap<Distance>>();
            }

            #[test]
            fn unreachable_vertices() {
                test_unreachable_vertices::<$heap<Distance>>();
            }

            #[test]
            fn repeated_queries_reset_state() {
                test_repeated_queries_reset_state::<$heap<Distance>>();
            }

            #[test]
            fn run_to_reports_reachability() {
                test_run_to_reports_reachability::<$heap<Distance>>();
            }

            #[test]
            fn self_loops_and_zero_lengths() {
                test_self_loops_and_zero_lengths::<$heap<Distance>>();
            }

            #[test]
            fn single_vertex() {
                test_single_vertex::<$heap<Distance>>();
            }

            #[test]
            fn huge_lengths_saturate() {
                test_huge_lengths_saturate::<$heap<Distance>>();
            }
        }
    };
}

driver_tests!(binomial, BinomialHeap);
driver_tests!(fibonacci, FibonacciHeap);

// ============================================================================
// Solver and configuration
// ============================================================================

#[test]
fn test_solver_backends_agree() {
    let graph = detour_graph();
    let mut results = Vec::new();
    for backend in Backend::ALL {
        let config = SolverConfig::with_backend(backend);
        let mut solver = Solver::new(Arc::clone(&graph), &config).unwrap();
        assert_eq!(solver.backend(), backend);
        solver.run(0).unwrap();
        solver.verify(0).unwrap();
        results.push((solver.distances(), solver.path_to(2)));
    }
    assert_eq!(results[0], results[1]);
}

#[test]
fn test_solver_rejects_invalid_config() {
    let config = SolverConfig {
        levels: 0,
        ..SolverConfig::default()
    };
    assert!(matches!(
        Solver::new(detour_graph(), &config),
        Err(SpError::Config(_))
    ));
}

#[test]
fn test_config_round_trips_through_json() {
    let config: SolverConfig = serde_json::from_str(r#"{"backend": "binomial"}"#).unwrap();
    assert_eq!(config, SolverConfig::with_backend(Backend::Binomial));

    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_stats_accumulate_across_queries() {
    let mut solver = Solver::new(split_graph(), &SolverConfig::default()).unwrap();
    solver.run(0).unwrap();
    solver.run(3).unwrap();
    let stats = solver.stats();
    assert_eq!(stats.queries_run, 2);
    assert_eq!(stats.vertices_scanned, 10);
    assert_eq!(stats.keys_decreased, 3);
    assert_eq!(stats.scans_per_query(), 5.0);
}

#[test]
fn test_source_out_of_range() {
    let mut solver = Solver::new(detour_graph(), &SolverConfig::default()).unwrap();
    assert_eq!(
        solver.run(4),
        Err(SpError::VertexOutOfRange {
            vertex: 4,
            vertices: 4,
        })
    );
    assert_eq!(solver.state(), QueryState::Idle);
}

// ============================================================================
// Property-based tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, Distance)>)> {
        (1usize..40).prop_flat_map(|n| {
            let edge = (0..n, 0..n, 0u64..1000);
            (Just(n), prop::collection::vec(edge, 0..n * 4))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn both_backends_match_reference(
            (n, triples) in graph_strategy(),
            source_seed in any::<usize>(),
        ) {
            let graph = Arc::new(Graph::from_edges(n, &triples).unwrap());
            let source = source_seed % n;
            let expected = reference_distances(&graph, source);

            let mut binomial: Dijkstra<BinomialHeap<Distance>> =
                Dijkstra::new(Arc::clone(&graph));
            binomial.run(source).unwrap();
            prop_assert_eq!(binomial.distances(), expected.clone());
            prop_assert!(binomial.verify(source).is_ok());

            let mut fibonacci: Dijkstra<FibonacciHeap<Distance>> =
                Dijkstra::new(Arc::clone(&graph));
            fibonacci.run(source).unwrap();
            prop_assert_eq!(fibonacci.distances(), expected);
            prop_assert!(fibonacci.verify(source).is_ok());
        }

        #[test]
        fn reused_driver_matches_fresh_driver(
            (n, triples) in graph_strategy(),
            sources in prop::collection::vec(any::<usize>(), 1..6),
        ) {
            let graph = Arc::new(Graph::from_edges(n, &triples).unwrap());
            let mut reused: Dijkstra<FibonacciHeap<Distance>> = Dijkstra::new(Arc::clone(&graph));
            for seed in sources {
                let source = seed % n;
                reused.run(source).unwrap();
                let mut fresh: Dijkstra<BinomialHeap<Distance>> = Dijkstra::new(Arc::clone(&graph));
                fresh.run(source).unwrap();
                prop_assert_eq!(reused.distances(), fresh.distances());
            }
        }
    }
}
