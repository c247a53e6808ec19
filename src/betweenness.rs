//! Exact edge betweenness (Brandes) over an unweighted undirected [`Graph`].
//!
//! Scores are the raw pair counts: for every unordered pair of distinct
//! vertices `{s, t}` an edge receives the fraction of `s`-`t` shortest paths
//! through it. Sources are processed in ascending vertex id, which keeps the
//! floating point sums of the full and the incremental computation identical.

use std::collections::BTreeSet;

use log::debug;

use crate::graph::{Graph, ShortestPathDag};
use crate::types::{CommID, Edge, EdgeScores, Partition, VInt};

// Reusable per-source buffers.
struct BrandesState {
    dag: ShortestPathDag,
    delta: Vec<f64>,
}

impl BrandesState {
    fn new(order: usize) -> Self {
        BrandesState {
            dag: ShortestPathDag::with_order(order),
            delta: vec![0.0; order],
        }
    }

    // Run BFS from `source` and add its dependencies to `scores`.
    fn accumulate(&mut self, graph: &Graph, source: VInt, scores: &mut EdgeScores) {
        graph.fill_shortest_path_dag(source, &mut self.dag);
        let dag = &self.dag;

        // Pop the furthest vertices first.
        for &w in dag.order.iter().rev() {
            let w_index = w as usize;
            let sigma_w = dag.sigma[w_index];
            let delta_w = self.delta[w_index];
            for &v in &dag.preds[w_index] {
                let contribution = if sigma_w != 0.0 {
                    (dag.sigma[v as usize] / sigma_w) * (1.0 + delta_w)
                } else {
                    0.0
                };
                *scores.entry(Edge::new(v, w)).or_insert(0.0) += contribution;
                self.delta[v as usize] += contribution;
            }
        }

        for &v in &dag.order {
            self.delta[v as usize] = 0.0;
        }
    }
}

/// Exact edge betweenness of every edge, O(V * E).
pub fn edge_betweenness(graph: &Graph) -> EdgeScores {
    let mut scores: EdgeScores = graph.edges().into_iter().map(|e| (e, 0.0)).collect();
    let mut state = BrandesState::new(graph.get_vertex_count() as usize);
    for source in graph.vertex_ids() {
        state.accumulate(graph, source, &mut scores);
    }
    // Each path is counted once from each endpoint.
    for score in scores.values_mut() {
        *score /= 2.0;
    }
    scores
}

/// Vertices whose component changed when `removed` was taken out of the
/// graph: every vertex that shared a component with a removed edge's endpoint
/// in `before`, the partition taken just before the removal.
pub fn affected_vertices(before: &Partition, removed: &[Edge]) -> Vec<VInt> {
    let affected_components: BTreeSet<CommID> = removed
        .iter()
        .flat_map(|e| [e.u, e.v])
        .filter_map(|vertex| before.community_of(vertex))
        .collect();

    before
        .iter()
        .filter(|(_, community)| affected_components.contains(community))
        .map(|(vertex, _)| vertex)
        .collect()
}

/// Recompute edge betweenness after `removed` was taken out of `graph`.
///
/// `previous` must be the exact scores of the graph before the removal and
/// `before` its connected components. Only the components that lost an edge
/// are re-run: their edge scores are reset to zero, Brandes runs from each of
/// their vertices, and the halving is applied to those edges again. Scores of
/// untouched components are carried over. The result equals
/// [`edge_betweenness`] on the current graph.
pub fn recompute_edge_betweenness(
    graph: &Graph,
    previous: &EdgeScores,
    before: &Partition,
    removed: &[Edge],
) -> EdgeScores {
    let affected = affected_vertices(before, removed);
    debug!(
        "Incremental betweenness: {} of {} vertices affected",
        affected.len(),
        graph.get_vertex_count()
    );

    let mut scores: EdgeScores = previous
        .iter()
        .filter(|(e, _)| graph.has_edge(e.u, e.v))
        .map(|(&e, &score)| (e, score))
        .collect();

    // Reset every edge the restricted run will touch.
    let mut touched: BTreeSet<Edge> = BTreeSet::new();
    for &v in &affected {
        for w in graph.get_neighbor(v) {
            touched.insert(Edge::new(v, w));
        }
    }
    for &e in &touched {
        scores.insert(e, 0.0);
    }

    let mut state = BrandesState::new(graph.get_vertex_count() as usize);
    for &source in &affected {
        state.accumulate(graph, source, &mut scores);
    }
    for e in &touched {
        if let Some(score) = scores.get_mut(e) {
            *score /= 2.0;
        }
    }
    scores
}
