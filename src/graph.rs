//! Static directed graph shared by every backend
//!
//! The graph is a forward-star layout: one global edge arena sorted by tail
//! vertex, plus a per-vertex offset table. Vertex `v` owns
//! `edges[first[v]..first[v + 1]]`, and the last vertex's range ends at the
//! end of the arena. A graph is validated once at construction and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Edge weights and path lengths
pub type Distance = u64;

/// Sentinel distance of a vertex no query has reached
pub const UNREACHED: Distance = Distance::MAX;

/// Errors raised while assembling a [`Graph`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no vertices")]
    Empty,
    #[error("first vertex's edges start at offset {offset}, expected 0")]
    FirstOffsetNotZero { offset: usize },
    #[error("edge offset of vertex {vertex} is smaller than its predecessor's")]
    OffsetsNotSorted { vertex: usize },
    #[error("edge offset {offset} of vertex {vertex} exceeds the {edges} edges in the arena")]
    OffsetOutOfRange {
        vertex: usize,
        offset: usize,
        edges: usize,
    },
    #[error("edge {edge} points at vertex {head}, graph has {vertices} vertices")]
    HeadOutOfRange {
        edge: usize,
        head: usize,
        vertices: usize,
    },
    #[error("edge leaves vertex {tail}, graph has {vertices} vertices")]
    TailOutOfRange { tail: usize, vertices: usize },
}

/// Outgoing edge: a length and the vertex it ends at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub length: Distance,
    pub head: usize,
}

/// Immutable vertex/edge arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    first: Vec<usize>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Assembles a graph from the ingestion layer's offset table and edge arena.
    ///
    /// # Errors
    /// Any malformed offset or dangling head.
    pub fn from_parts(first: Vec<usize>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let vertices = first.len();
        if vertices == 0 {
            return Err(GraphError::Empty);
        }
        if first[0] != 0 {
            return Err(GraphError::FirstOffsetNotZero { offset: first[0] });
        }
        for (vertex, pair) in first.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(GraphError::OffsetsNotSorted { vertex: vertex + 1 });
            }
        }
        if let Some(vertex) = first.iter().position(|&o| o > edges.len()) {
            return Err(GraphError::OffsetOutOfRange {
                vertex,
                offset: first[vertex],
                edges: edges.len(),
            });
        }
        if let Some(edge) = edges.iter().position(|e| e.head >= vertices) {
            return Err(GraphError::HeadOutOfRange {
                edge,
                head: edges[edge].head,
                vertices,
            });
        }

        let graph = Graph { first, edges };
        // Sorted offsets from 0 with the last range closing at the arena end
        // tile the arena exactly.
        debug_assert_eq!(
            (0..vertices).map(|v| graph.range(v).len()).sum::<usize>(),
            graph.edges.len()
        );

        debug!(vertices, edges = graph.edges.len(), "graph assembled");
        Ok(graph)
    }

    /// Builds a graph from `(tail, head, length)` triples in any order.
    ///
    /// Edges are bucketed by tail with a stable counting sort, so edges of one
    /// vertex keep their input order.
    pub fn from_edges(
        vertices: usize,
        triples: &[(usize, usize, Distance)],
    ) -> Result<Self, GraphError> {
        if vertices == 0 {
            return Err(GraphError::Empty);
        }

        let mut first = vec![0usize; vertices + 1];
        for &(tail, _, _) in triples {
            if tail >= vertices {
                return Err(GraphError::TailOutOfRange { tail, vertices });
            }
            first[tail + 1] += 1;
        }
        for v in 0..vertices {
            first[v + 1] += first[v];
        }

        let mut cursor = first.clone();
        let mut edges = vec![Edge { length: 0, head: 0 }; triples.len()];
        for &(tail, head, length) in triples {
            edges[cursor[tail]] = Edge { length, head };
            cursor[tail] += 1;
        }

        first.pop();
        Self::from_parts(first, edges)
    }

    pub fn vertex_count(&self) -> usize {
        self.first.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `vertex`
    pub fn edges(&self, vertex: usize) -> &[Edge] {
        &self.edges[self.range(vertex)]
    }

    pub fn out_degree(&self, vertex: usize) -> usize {
        self.range(vertex).len()
    }

    /// Offset of `vertex`'s first edge in the arena
    pub fn first_edge(&self, vertex: usize) -> usize {
        self.first[vertex]
    }

    /// Shortest and longest edge length, `None` for an edgeless graph
    pub fn length_range(&self) -> Option<(Distance, Distance)> {
        let min = self.edges.iter().map(|e| e.length).min()?;
        let max = self.edges.iter().map(|e| e.length).max()?;
        Some((min, max))
    }

    fn range(&self, vertex: usize) -> std::ops::Range<usize> {
        let start = self.first[vertex];
        let end = self
            .first
            .get(vertex + 1)
            .copied()
            .unwrap_or(self.edges.len());
        start..end
    }
}

/// Per-vertex query state written by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Tentative distance, [`UNREACHED`] until relaxed
    pub distance: Distance,
    /// Predecessor on the shortest-path tree
    pub parent: Option<usize>,
    /// Set once the vertex is extracted; its distance is final
    pub visited: bool,
    /// Generation of the last query that touched this vertex
    pub stamp: u32,
}

impl Default for VertexRecord {
    fn default() -> Self {
        VertexRecord {
            distance: UNREACHED,
            parent: None,
            visited: false,
            stamp: 0,
        }
    }
}

impl VertexRecord {
    /// Clears query results, keeping the stamp of the last touching query
    pub fn reset(&mut self) {
        *self = VertexRecord {
            stamp: self.stamp,
            ..VertexRecord::default()
        };
    }
}
