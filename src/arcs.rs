//! Backend-local adjacency arena
//!
//! Each driver copies the graph's edges once into its own contiguous arena
//! whose heads are heap element indices. The relax loop walks this arena and
//! never touches the shared [`Graph`] again, so a backend can be torn down
//! (freeing the arena exactly once) without affecting any other backend.

use crate::graph::{Distance, Graph};

/// Edge record pointing at a heap element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapArc {
    pub length: Distance,
    pub head: usize,
}

/// Arc arena sized to the graph's edge count, with per-element offsets
#[derive(Debug, Clone)]
pub struct ShadowArcs {
    first: Vec<usize>,
    arcs: Vec<HeapArc>,
}

impl ShadowArcs {
    /// Mirrors every edge of `graph`; element `v` stands for vertex `v`
    pub fn build(graph: &Graph) -> Self {
        let mut first = Vec::with_capacity(graph.vertex_count() + 1);
        let mut arcs = Vec::with_capacity(graph.edge_count());
        for vertex in 0..graph.vertex_count() {
            first.push(arcs.len());
            arcs.extend(graph.edges(vertex).iter().map(|edge| HeapArc {
                length: edge.length,
                head: edge.head,
            }));
        }
        first.push(arcs.len());
        ShadowArcs { first, arcs }
    }

    /// Arcs leaving `element`
    #[inline]
    pub fn neighbors(&self, element: usize) -> &[HeapArc] {
        &self.arcs[self.first[element]..self.first[element + 1]]
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrors_graph_edges() {
        let graph = Graph::from_edges(3, &[(0, 1, 4), (0, 2, 1), (2, 0, 9)]).unwrap();
        let arcs = ShadowArcs::build(&graph);
        assert_eq!(arcs.len(), graph.edge_count());
        assert_eq!(
            arcs.neighbors(0),
            &[
                HeapArc { length: 4, head: 1 },
                HeapArc { length: 1, head: 2 },
            ]
        );
        assert!(arcs.neighbors(1).is_empty());
        assert_eq!(arcs.neighbors(2), &[HeapArc { length: 9, head: 0 }]);
    }
}
