use std::collections::{BTreeSet, HashMap, VecDeque};

use rand::Rng;

use crate::error::{Error, Result};
use crate::types::{CommID, Edge, Partition, VInt, Vertex};

/// Undirected simple graph stored as adjacency sets.
///
/// Vertices get dense ids in insertion order, names are kept in a side table.
/// Adjacency is always symmetric and never contains self-loops. `Clone` is a
/// deep copy, used to keep the input intact while an algorithm removes edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) adj_map: Vec<BTreeSet<VInt>>, // Neighbors, one set per vertex.
    vertices: Vec<Vertex>,                   // Vertex metadata, indexed by id.
    name_index: HashMap<String, VInt>,       // Name -> id lookup.
    pub(crate) e_size: u32,                  // Number of distinct undirected edges.
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Build a graph from name pairs, creating vertices as they appear.
    pub fn from_edges<'a>(edges_iter: impl IntoIterator<Item = (&'a str, &'a str)>) -> Graph {
        let mut graph = Graph::new();
        for (a, b) in edges_iter {
            graph.add_edge_by_name(a, b);
        }
        graph
    }

    /// Graph with `order` vertices named `"0"`, `"1"`, ... and no edges.
    pub fn null_graph(order: usize) -> Graph {
        let mut graph = Graph::new();
        for i in 0..order {
            graph.add_vertex(&i.to_string());
        }
        graph
    }

    /// Random graph after the Gilbert model G(n, p): every pair of distinct
    /// vertices is independently joined with probability `probability`.
    pub fn random_graph<R: Rng + ?Sized>(order: usize, probability: f64, rng: &mut R) -> Graph {
        let probability = probability.clamp(0.0, 1.0);
        let mut graph = Graph::null_graph(order);
        for u in 0..order as VInt {
            for v in (u + 1)..order as VInt {
                if rng.gen_bool(probability) {
                    graph.link(u, v);
                }
            }
        }
        graph
    }

    /// Add a vertex by name and return its id. Re-adding a name returns the existing id.
    pub fn add_vertex(&mut self, name: &str) -> VInt {
        if let Some(&vertex_id) = self.name_index.get(name) {
            return vertex_id;
        }
        let vertex_id = self.vertices.len() as VInt;
        self.vertices.push(Vertex::new(vertex_id, name));
        self.adj_map.push(BTreeSet::new());
        self.name_index.insert(name.to_string(), vertex_id);
        vertex_id
    }

    /// Add the edge `{a, b}` by vertex names, creating the vertices as needed.
    /// Returns whether the edge is new. Self-loops are ignored.
    pub fn add_edge_by_name(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let u = self.add_vertex(a);
        let v = self.add_vertex(b);
        self.link(u, v)
    }

    /// Add the edge `{u, v}` between existing vertices.
    /// Returns whether the edge is new. Self-loops are ignored.
    pub fn insert_edge(&mut self, u: VInt, v: VInt) -> Result<bool> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        if u == v {
            return Ok(false);
        }
        Ok(self.link(u, v))
    }

    /// Remove the edge `{u, v}`, returns whether it was present.
    pub fn remove_edge(&mut self, u: VInt, v: VInt) -> bool {
        if !self.has_edge(u, v) {
            return false;
        }
        self.adj_map[u as usize].remove(&v);
        self.adj_map[v as usize].remove(&u);
        self.e_size -= 1;
        true
    }

    fn link(&mut self, u: VInt, v: VInt) -> bool {
        // Undirected graph, so checking one direction is enough but both change.
        if !self.adj_map[u as usize].insert(v) {
            return false;
        }
        self.adj_map[v as usize].insert(u);
        self.e_size += 1;
        true
    }

    fn check_vertex(&self, vertex: VInt) -> Result<()> {
        if (vertex as usize) < self.vertices.len() {
            Ok(())
        } else {
            Err(Error::VertexOutOfBounds {
                order: self.vertices.len(),
                vertex,
            })
        }
    }

    pub fn has_edge(&self, u: VInt, v: VInt) -> bool {
        self.adj_map
            .get(u as usize)
            .map_or(false, |neighbors| neighbors.contains(&v))
    }

    /// Neighbors of `vertex`, empty for an unknown vertex.
    pub fn get_neighbor(&self, vertex: VInt) -> impl Iterator<Item = VInt> + '_ {
        self.adj_map
            .get(vertex as usize)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().copied())
    }

    pub fn degree(&self, vertex: VInt) -> usize {
        self.adj_map
            .get(vertex as usize)
            .map_or(0, |neighbors| neighbors.len())
    }

    pub fn get_vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn get_edge_count(&self) -> u32 {
        self.e_size
    }

    /// All vertex ids, ascending.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VInt> {
        0..self.vertices.len() as VInt
    }

    pub fn get_vertex(&self, vertex: VInt) -> Option<&Vertex> {
        self.vertices.get(vertex as usize)
    }

    pub fn vertex_name(&self, vertex: VInt) -> Option<&str> {
        self.get_vertex(vertex).map(|v| v.name.as_str())
    }

    pub fn vertex_id(&self, name: &str) -> Option<VInt> {
        self.name_index.get(name).copied()
    }

    /// Every undirected edge exactly once, ascending.
    pub fn edges(&self) -> Vec<Edge> {
        self.adj_map
            .iter()
            .enumerate()
            .flat_map(|(u, neighbors)| {
                let u = u as VInt;
                neighbors
                    .range((u + 1)..)
                    .map(move |&v| Edge { u, v })
            })
            .collect()
    }

    /// Pick a vertex uniformly at random.
    pub fn random_vertex<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<VInt> {
        if self.vertices.is_empty() {
            return Err(Error::EmptyGraph);
        }
        Ok(rng.gen_range(0..self.vertices.len()) as VInt)
    }

    /// Single source BFS, hop distance of every reachable vertex (source at 0).
    pub fn sssp(&self, vertex_id: VInt) -> HashMap<VInt, u32> {
        let mut distances: HashMap<VInt, u32> = HashMap::new();
        if (vertex_id as usize) >= self.vertices.len() {
            return distances;
        }
        let mut queue: VecDeque<VInt> = VecDeque::new();

        distances.insert(vertex_id, 0);
        queue.push_back(vertex_id);

        while let Some(current) = queue.pop_front() {
            let current_distance = distances[&current];
            for neighbor in self.get_neighbor(current) {
                distances.entry(neighbor).or_insert_with(|| {
                    queue.push_back(neighbor);
                    current_distance + 1
                });
            }
        }
        distances
    }

    /// Exact diameter, the largest BFS distance over all sources.
    /// 0 for graphs with fewer than two connected vertices. O(V * (V + E)).
    pub fn vertex_diameter(&self) -> u32 {
        self.vertex_ids()
            .filter_map(|source| self.sssp(source).into_values().max())
            .max()
            .unwrap_or(0)
    }

    /// Label connected components by BFS flood fill. Ids are handed out
    /// sequentially in the order unvisited seed vertices are met (ascending id).
    pub fn connected_components(&self) -> Partition {
        let mut labels: Vec<Option<CommID>> = vec![None; self.vertices.len()];
        let mut queue: VecDeque<VInt> = VecDeque::new();
        let mut next_id: CommID = 0;

        for seed in self.vertex_ids() {
            if labels[seed as usize].is_some() {
                continue;
            }
            labels[seed as usize] = Some(next_id);
            queue.push_back(seed);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.get_neighbor(current) {
                    if labels[neighbor as usize].is_none() {
                        labels[neighbor as usize] = Some(next_id);
                        queue.push_back(neighbor);
                    }
                }
            }
            next_id += 1;
        }

        labels
            .into_iter()
            .enumerate()
            .filter_map(|(vertex, label)| label.map(|c| (vertex as VInt, c)))
            .collect()
    }

    /// BFS shortest-path DAG rooted at `source`.
    pub fn shortest_path_dag(&self, source: VInt) -> ShortestPathDag {
        let mut dag = ShortestPathDag::with_order(self.vertices.len());
        self.fill_shortest_path_dag(source, &mut dag);
        dag
    }

    /// Rebuild `dag` for `source`, reusing its buffers. Only the entries the
    /// previous run touched are reset, so repeated calls cost O(V' + E') for
    /// the reached part of the graph.
    pub fn fill_shortest_path_dag(&self, source: VInt, dag: &mut ShortestPathDag) {
        dag.reset(self.vertices.len());
        if (source as usize) >= self.vertices.len() {
            return;
        }
        dag.source = source;
        dag.dist[source as usize] = 0;
        dag.sigma[source as usize] = 1.0;

        let mut queue: VecDeque<VInt> = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            dag.order.push(v);
            let next_distance = dag.dist[v as usize] + 1;
            for w in self.get_neighbor(v) {
                let w_index = w as usize;
                // Discover w.
                if dag.dist[w_index] < 0 {
                    dag.dist[w_index] = next_distance;
                    queue.push_back(w);
                }
                // v precedes w on a shortest path.
                if dag.dist[w_index] == next_distance {
                    dag.sigma[w_index] += dag.sigma[v as usize];
                    dag.preds[w_index].push(v);
                }
            }
        }
    }
}

/// Result of one BFS from a source: distances, shortest-path counts (sigma)
/// and predecessor lists for every reached vertex.
///
/// Sigma is kept as `f64` so that path counts on large graphs degrade in
/// precision rather than overflow.
#[derive(Debug, Clone, Default)]
pub struct ShortestPathDag {
    source: VInt,
    pub(crate) order: Vec<VInt>, // Reached vertices in BFS discovery order.
    pub(crate) dist: Vec<i64>,   // -1 for unreached.
    pub(crate) sigma: Vec<f64>,
    pub(crate) preds: Vec<Vec<VInt>>,
}

impl ShortestPathDag {
    pub fn with_order(order: usize) -> Self {
        ShortestPathDag {
            source: 0,
            order: Vec::with_capacity(order),
            dist: vec![-1; order],
            sigma: vec![0.0; order],
            preds: vec![Vec::new(); order],
        }
    }

    fn reset(&mut self, order: usize) {
        if self.dist.len() != order {
            *self = ShortestPathDag::with_order(order);
            return;
        }
        for &v in &self.order {
            let v = v as usize;
            self.dist[v] = -1;
            self.sigma[v] = 0.0;
            self.preds[v].clear();
        }
        self.order.clear();
    }

    pub fn source(&self) -> VInt {
        self.source
    }

    pub fn reaches(&self, vertex: VInt) -> bool {
        self.dist.get(vertex as usize).map_or(false, |&d| d >= 0)
    }

    pub fn distance(&self, vertex: VInt) -> Option<u32> {
        match self.dist.get(vertex as usize) {
            Some(&d) if d >= 0 => Some(d as u32),
            _ => None,
        }
    }

    /// Number of shortest paths from the source, 0 when unreached.
    pub fn sigma(&self, vertex: VInt) -> f64 {
        self.sigma.get(vertex as usize).copied().unwrap_or(0.0)
    }

    pub fn predecessors(&self, vertex: VInt) -> &[VInt] {
        self.preds
            .get(vertex as usize)
            .map_or(&[][..], |p| p.as_slice())
    }

    /// Reached vertices, nearest first.
    pub fn discovery_order(&self) -> &[VInt] {
        &self.order
    }
}
