//! Dijkstra's single-source shortest paths over a pluggable heap backend
//!
//! [`Dijkstra`] is written once against [`IndexedHeap`] and owns everything a
//! query touches: the vertex arena, the heap's node arena and a private copy
//! of the adjacency ([`ShadowArcs`]). All three are sized at construction and
//! reused by every query, so back-to-back queries never reallocate. One
//! driver runs one query at a time; `&mut self` on [`Dijkstra::run`] makes
//! the single-writer rule a compile-time property.
//!
//! [`Solver`] picks the backend from a [`SolverConfig`] at runtime.
//!
//! Edge lengths must be non-negative (they are unsigned). A vertex the source
//! cannot reach keeps the [`UNREACHED`] sentinel; that is not an error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_sssp_heaps::graph::Graph;
//! use rust_sssp_heaps::pathfinding::Dijkstra;
//! use rust_sssp_heaps::fibonacci::FibonacciHeap;
//!
//! let graph = Graph::from_edges(3, &[(0, 1, 4), (1, 2, 1), (0, 2, 9)]).unwrap();
//! let mut dijkstra: Dijkstra<FibonacciHeap<u64>> = Dijkstra::new(Arc::new(graph));
//! dijkstra.run(0).unwrap();
//! assert_eq!(dijkstra.distance(2), Some(5));
//! assert_eq!(dijkstra.path_to(2), Some(vec![0, 1, 2]));
//! ```

use crate::arcs::ShadowArcs;
use crate::binomial::BinomialHeap;
use crate::config::{Backend, ConfigError, SolverConfig};
use crate::fibonacci::FibonacciHeap;
use crate::graph::{Distance, Graph, GraphError, VertexRecord, UNREACHED};
use crate::stats::Stats;
use crate::traits::{HeapError, IndexedHeap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, debug_span, error, warn};

/// Errors surfaced by the driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("heap backend failed: {0}")]
    Heap(#[from] HeapError),
    #[error("vertex {vertex} is not in a graph of {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },
    #[error("node arena of {capacity} cannot hold {vertices} vertices")]
    ArenaTooSmall { capacity: usize, vertices: usize },
    /// A bug in a backend or the driver; the query's result would be wrong
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Lifecycle of the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No query has run yet
    Idle,
    /// Queue rebuilt, source keyed 0, nothing finalized yet
    Seeded,
    /// Relax loop in progress
    Scanning,
    /// Last query ran to completion
    Done,
    /// Last query aborted; the next `start` or `run` rebuilds everything
    Poisoned,
}

/// Shortest-path driver over one heap backend
pub struct Dijkstra<Q> {
    graph: Arc<Graph>,
    vertices: Vec<VertexRecord>,
    queue: Q,
    arcs: ShadowArcs,
    stats: Stats,
    generation: u32,
    state: QueryState,
}

impl<Q: IndexedHeap<Distance>> Dijkstra<Q> {
    /// Creates a driver whose arenas are sized exactly to `graph`
    pub fn new(graph: Arc<Graph>) -> Self {
        let queue = Q::with_capacity(graph.vertex_count());
        Self::assemble(graph, queue)
    }

    /// Creates a driver with a node arena of `capacity` nodes
    ///
    /// # Errors
    /// `ArenaTooSmall` if the arena cannot hold every vertex.
    pub fn with_capacity(graph: Arc<Graph>, capacity: usize) -> Result<Self, SpError> {
        let vertices = graph.vertex_count();
        if capacity < vertices {
            return Err(SpError::ArenaTooSmall { capacity, vertices });
        }
        Ok(Self::assemble(graph, Q::with_capacity(capacity)))
    }

    fn assemble(graph: Arc<Graph>, queue: Q) -> Self {
        let arcs = ShadowArcs::build(&graph);
        Dijkstra {
            vertices: vec![VertexRecord::default(); graph.vertex_count()],
            graph,
            queue,
            arcs,
            stats: Stats::default(),
            generation: 0,
            state: QueryState::Idle,
        }
    }

    /// Computes distances from `source` to every vertex.
    pub fn run(&mut self, source: usize) -> Result<(), SpError> {
        self.search(source, None).map(drop)
    }

    /// Runs until `target` is finalized.
    ///
    /// Returns whether `target` is reachable. Vertices finalized before the
    /// stop carry exact distances; the rest hold tentative values.
    pub fn run_to(&mut self, source: usize, target: usize) -> Result<bool, SpError> {
        self.check_vertex(target)?;
        self.search(source, Some(target))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Generation stamp of the most recent query
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    /// Final distance of `vertex`, `None` if unreached
    pub fn distance(&self, vertex: usize) -> Option<Distance> {
        self.vertices
            .get(vertex)
            .map(|record| record.distance)
            .filter(|&d| d != UNREACHED)
    }

    /// Distances of every vertex, [`UNREACHED`] for unreached ones
    pub fn distances(&self) -> Vec<Distance> {
        self.vertices.iter().map(|record| record.distance).collect()
    }

    /// Predecessor of `vertex` on the shortest-path tree
    pub fn parent(&self, vertex: usize) -> Option<usize> {
        self.vertices.get(vertex).and_then(|record| record.parent)
    }

    /// Follows parent links from `target` back to the source
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.distance(target)?;
        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = self.vertices[current].parent {
            path.push(parent);
            current = parent;
            if path.len() > self.vertices.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }

    /// Checks the last query's output is a shortest-path tree from `source`.
    ///
    /// Every reached edge must be relaxed (`d(v) <= d(u) + w`) and every
    /// parent link must be tight (`d(v) == d(parent) + w` for some edge).
    pub fn verify(&self, source: usize) -> Result<(), SpError> {
        self.check_vertex(source)?;
        if self.vertices[source].distance != 0 {
            return Err(SpError::Invariant(format!(
                "source {source} is not at distance 0"
            )));
        }
        for (u, record) in self.vertices.iter().enumerate() {
            if record.distance == UNREACHED {
                continue;
            }
            for edge in self.graph.edges(u) {
                let bound = record.distance.saturating_add(edge.length);
                if self.vertices[edge.head].distance > bound {
                    return Err(SpError::Invariant(format!(
                        "edge {u} -> {} not relaxed",
                        edge.head
                    )));
                }
            }
            if let Some(parent) = record.parent {
                let (pd, d) = (self.vertices[parent].distance, record.distance);
                let tight = self
                    .graph
                    .edges(parent)
                    .iter()
                    .any(|e| e.head == u && pd.saturating_add(e.length) == d);
                if !tight {
                    return Err(SpError::Invariant(format!(
                        "parent link {parent} -> {u} not tight"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_vertex(&self, vertex: usize) -> Result<(), SpError> {
        let vertices = self.vertices.len();
        if vertex < vertices {
            Ok(())
        } else {
            Err(SpError::VertexOutOfRange { vertex, vertices })
        }
    }

    /// Resets the arenas and seeds `source` with distance 0
    fn seed(&mut self, source: usize) -> Result<(), SpError> {
        self.generation = self.generation.wrapping_add(1).max(1);
        for record in &mut self.vertices {
            record.reset();
        }
        self.queue.rebuild(self.vertices.len())?;

        let record = &mut self.vertices[source];
        record.distance = 0;
        record.stamp = self.generation;
        self.queue.decrease_key(source, 0)?;
        self.state = QueryState::Seeded;
        Ok(())
    }

    /// Resets the arenas and seeds `source` with distance 0.
    ///
    /// Leaves the driver `Seeded`; [`step`](Self::step) then finalizes one
    /// vertex at a time. `run` and `run_to` do both.
    pub fn start(&mut self, source: usize) -> Result<(), SpError> {
        self.check_vertex(source)?;
        if self.state == QueryState::Poisoned {
            warn!("previous query aborted; rebuilding before reuse");
        }

        // Any early return below leaves the driver poisoned.
        self.state = QueryState::Poisoned;
        self.stats.queries_run += 1;
        self.seed(source)?;
        debug!(source, generation = self.generation, "query seeded");
        Ok(())
    }

    /// Finalizes the next vertex and relaxes its outgoing arcs.
    ///
    /// Returns the finalized vertex, or `None` once the queue is drained or
    /// when no query is in progress.
    pub fn step(&mut self) -> Result<Option<usize>, SpError> {
        match self.finalize_next()? {
            Some((key, u)) => {
                self.relax(key, u)?;
                Ok(Some(u))
            }
            None => Ok(None),
        }
    }

    fn search(&mut self, source: usize, target: Option<usize>) -> Result<bool, SpError> {
        self.start(source)?;
        let scanned_before = self.stats.vertices_scanned;
        let mut reached = false;

        while let Some((key, u)) = self.finalize_next()? {
            if target == Some(u) {
                reached = key != UNREACHED;
                self.state = QueryState::Done;
                break;
            }
            self.relax(key, u)?;
        }

        debug!(
            source,
            scanned = self.stats.vertices_scanned - scanned_before,
            "query finished"
        );
        Ok(reached)
    }

    /// Extracts the minimum and marks it visited after checking it against
    /// the vertex arena
    fn finalize_next(&mut self) -> Result<Option<(Distance, usize)>, SpError> {
        if !matches!(self.state, QueryState::Seeded | QueryState::Scanning) {
            return Ok(None);
        }
        self.state = QueryState::Poisoned;
        let Some((key, u)) = self.queue.extract_min() else {
            self.state = QueryState::Done;
            return Ok(None);
        };

        let VertexRecord { distance, stamp, .. } = self.vertices[u];
        if key != distance {
            return Err(self.violation(format!(
                "vertex {u} extracted with key {key}, arena holds {distance}"
            )));
        }
        if key != UNREACHED && stamp != self.generation {
            return Err(self.violation(format!(
                "vertex {u} reached with stamp {stamp}, query is {}",
                self.generation
            )));
        }
        self.vertices[u].visited = true;
        self.stats.vertices_scanned += 1;
        self.state = QueryState::Scanning;
        Ok(Some((key, u)))
    }

    fn relax(&mut self, key: Distance, u: usize) -> Result<(), SpError> {
        if key == UNREACHED {
            // Everything left is unreachable.
            return Ok(());
        }

        self.state = QueryState::Poisoned;
        for arc in self.arcs.neighbors(u) {
            let v = arc.head;
            let head = &mut self.vertices[v];
            if head.visited {
                continue;
            }
            let candidate = key.saturating_add(arc.length);
            if candidate < head.distance {
                if !self.queue.decrease_key(v, candidate)? {
                    error!(vertex = v, candidate, "queue refused a decreasing key");
                    return Err(SpError::Invariant(format!(
                        "queue refused to lower vertex {v} to {candidate}"
                    )));
                }
                head.distance = candidate;
                head.parent = Some(u);
                head.stamp = self.generation;
                self.stats.keys_decreased += 1;
            }
        }
        self.state = QueryState::Scanning;
        Ok(())
    }

    fn violation(&self, detail: String) -> SpError {
        error!(generation = self.generation, "{detail}");
        SpError::Invariant(detail)
    }
}

/// Driver with its backend chosen at runtime
pub enum Solver {
    Binomial(Dijkstra<BinomialHeap<Distance>>),
    Fibonacci(Dijkstra<FibonacciHeap<Distance>>),
}

macro_rules! dispatch {
    ($self:expr, $driver:ident => $body:expr) => {
        match $self {
            Solver::Binomial($driver) => $body,
            Solver::Fibonacci($driver) => $body,
        }
    };
}

impl Solver {
    /// Validates `config` and builds the configured backend over `graph`
    pub fn new(graph: Arc<Graph>, config: &SolverConfig) -> Result<Self, SpError> {
        config.validate()?;
        Ok(match config.backend {
            Backend::Binomial => Solver::Binomial(Dijkstra::new(graph)),
            Backend::Fibonacci => Solver::Fibonacci(Dijkstra::new(graph)),
        })
    }

    pub fn backend(&self) -> Backend {
        match self {
            Solver::Binomial(_) => Backend::Binomial,
            Solver::Fibonacci(_) => Backend::Fibonacci,
        }
    }

    pub fn run(&mut self, source: usize) -> Result<(), SpError> {
        let _span = debug_span!("query", backend = %self.backend(), source).entered();
        dispatch!(self, d => d.run(source))
    }

    pub fn run_to(&mut self, source: usize, target: usize) -> Result<bool, SpError> {
        let _span = debug_span!("query", backend = %self.backend(), source, target).entered();
        dispatch!(self, d => d.run_to(source, target))
    }

    pub fn start(&mut self, source: usize) -> Result<(), SpError> {
        dispatch!(self, d => d.start(source))
    }

    pub fn step(&mut self) -> Result<Option<usize>, SpError> {
        dispatch!(self, d => d.step())
    }

    pub fn distance(&self, vertex: usize) -> Option<Distance> {
        dispatch!(self, d => d.distance(vertex))
    }

    pub fn distances(&self) -> Vec<Distance> {
        dispatch!(self, d => d.distances())
    }

    pub fn parent(&self, vertex: usize) -> Option<usize> {
        dispatch!(self, d => d.parent(vertex))
    }

    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        dispatch!(self, d => d.path_to(target))
    }

    pub fn vertices(&self) -> &[VertexRecord] {
        dispatch!(self, d => d.vertices())
    }

    pub fn stats(&self) -> Stats {
        dispatch!(self, d => d.stats())
    }

    pub fn state(&self) -> QueryState {
        dispatch!(self, d => d.state())
    }

    pub fn verify(&self, source: usize) -> Result<(), SpError> {
        dispatch!(self, d => d.verify(source))
    }
}
