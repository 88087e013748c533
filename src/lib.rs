//! Single-source shortest paths over indexed heaps
//!
//! This crate runs Dijkstra's algorithm over a static directed graph, with the
//! priority queue supplied by one of two interchangeable backends:
//!
//! - **Binomial Heap**: O(log n) insert, delete-min and decrease_key
//! - **Fibonacci Heap**: O(1) amortized insert and decrease_key; O(log n) amortized delete-min
//!
//! Both backends own a fixed node arena indexed by vertex number, so a vertex
//! id doubles as its heap handle and repeated queries reuse every allocation.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_sssp_heaps::{Backend, Graph, Solver, SolverConfig};
//!
//! let graph = Arc::new(Graph::from_edges(3, &[(0, 1, 2), (1, 2, 2), (0, 2, 7)]).unwrap());
//! let config = SolverConfig::with_backend(Backend::Binomial);
//! let mut solver = Solver::new(graph, &config).unwrap();
//! solver.run(0).unwrap();
//! assert_eq!(solver.distances(), vec![0, 2, 4]);
//! ```

pub mod arcs;
pub mod binomial;
pub mod config;
pub mod fibonacci;
pub mod graph;
pub mod pathfinding;
pub mod stats;
pub mod traits;

pub use config::{Backend, ConfigError, SolverConfig};
pub use graph::{Distance, Edge, Graph, GraphError, VertexRecord, UNREACHED};
pub use pathfinding::{Dijkstra, QueryState, Solver, SpError};
pub use stats::Stats;
pub use traits::{HeapError, IndexedHeap, KeyedHeap, Priority};
