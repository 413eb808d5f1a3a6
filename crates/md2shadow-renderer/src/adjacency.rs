// adjacency.rs — triangle edge graph
//
// Every unordered vertex pair used by some triangle becomes one edge. The
// first triangle to reach an edge is its primary owner, the next one its
// secondary owner. The graph is built once per model and never changes.

use std::collections::HashMap;

use log::warn;

use crate::error::Md2Error;
use crate::model::Triangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Endpoints in the order the primary owner lists them.
    pub vertices: [usize; 2],
    pub first: usize,
    /// `None` on an open boundary.
    pub second: Option<usize>,
}

impl Edge {
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.second.is_some()
    }

    /// Both owners, if the edge has two.
    #[inline]
    pub fn owners(&self) -> Option<(usize, usize)> {
        self.second.map(|s| (self.first, s))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    edges: Vec<Edge>,
    capacity: usize,
    non_manifold: usize,
}

impl AdjacencyGraph {
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Slots reserved for edges, `3 * num_triangles`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Times a third triangle claimed an already shared edge.
    pub fn non_manifold(&self) -> usize {
        self.non_manifold
    }

    /// Open boundary edges.
    pub fn boundary(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !e.is_shared())
    }
}

struct EdgeBuilder {
    edges: Vec<Edge>,
    lookup: HashMap<(usize, usize), usize>,
    capacity: usize,
    non_manifold: usize,
}

impl EdgeBuilder {
    fn with_capacity(capacity: usize) -> Result<Self, Md2Error> {
        let mut edges = Vec::new();
        edges.try_reserve_exact(capacity).map_err(Md2Error::resource("edges"))?;
        let mut lookup = HashMap::new();
        lookup.try_reserve(capacity).map_err(Md2Error::resource("edge lookup"))?;
        Ok(Self {
            edges,
            lookup,
            capacity,
            non_manifold: 0,
        })
    }

    fn add(&mut self, a: usize, b: usize, tri: usize) -> Result<(), Md2Error> {
        let key = if a < b { (a, b) } else { (b, a) };

        if let Some(&index) = self.lookup.get(&key) {
            let edge = &mut self.edges[index];
            if edge.second.is_some() {
                // a third triangle replaces the secondary owner
                self.non_manifold += 1;
            }
            edge.second = Some(tri);
            return Ok(());
        }

        if self.edges.len() >= self.capacity {
            return Err(Md2Error::EdgeOverflow {
                capacity: self.capacity,
            });
        }

        self.lookup.insert(key, self.edges.len());
        self.edges.push(Edge {
            vertices: [a, b],
            first: tri,
            second: None,
        });
        Ok(())
    }

    fn finish(self) -> AdjacencyGraph {
        AdjacencyGraph {
            edges: self.edges,
            capacity: self.capacity,
            non_manifold: self.non_manifold,
        }
    }
}

/// Build the edge graph for `triangles`, visiting each triangle's edges as
/// (v0,v1), (v1,v2), (v2,v0).
pub fn build_adjacency(triangles: &[Triangle]) -> Result<AdjacencyGraph, Md2Error> {
    let mut builder = EdgeBuilder::with_capacity(3 * triangles.len())?;

    for (i, tri) in triangles.iter().enumerate() {
        for (a, b) in tri.edges() {
            builder.add(a, b, i)?;
        }
    }

    let graph = builder.finish();
    if graph.non_manifold > 0 {
        warn!(
            "{} edges shared by more than two triangles; last owner kept",
            graph.non_manifold
        );
    }
    Ok(graph)
}
