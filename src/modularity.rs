use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::types::Partition;

/// Modularity `Q = 1/2m * sum_{i,j same community} (A_ij - k_i k_j / 2m)`.
///
/// Only same-community pairs are visited, which gives the dense double loop's
/// value in O(sum of squared community sizes). Returns 0 for a graph without
/// edges. Fails with [`Error::PartitionCoverageMismatch`] if `partition` misses
/// a vertex of `graph`.
pub fn modularity(graph: &Graph, partition: &Partition) -> Result<f64> {
    if let Some(vertex) = graph
        .vertex_ids()
        .find(|&v| partition.community_of(v).is_none())
    {
        return Err(Error::PartitionCoverageMismatch { vertex });
    }

    let m = graph.get_edge_count() as f64;
    if m == 0.0 {
        return Ok(0.0);
    }
    let two_m = 2.0 * m;

    let mut q = 0.0f64;
    for members in partition.communities().values() {
        for &i in members {
            let k_i = graph.degree(i) as f64;
            for &j in members {
                let a_ij = if graph.has_edge(i, j) { 1.0 } else { 0.0 };
                q += a_ij - k_i * graph.degree(j) as f64 / two_m;
            }
        }
    }
    Ok(q / two_m)
}

/// The partition with the highest modularity and its score. The earliest one
/// wins a tie. `None` for an empty sequence.
pub fn best_partition<'a>(
    graph: &Graph,
    partitions: &'a [Partition],
) -> Result<Option<(&'a Partition, f64)>> {
    let mut best: Option<(&Partition, f64)> = None;
    for partition in partitions {
        let q = modularity(graph, partition)?;
        if best.map_or(true, |(_, best_q)| q > best_q) {
            best = Some((partition, q));
        }
    }
    Ok(best)
}

#[cfg(test)]
mod test_modularity {
    use crate::error::Error;
    use crate::graph::Graph;
    use crate::modularity::{best_partition, modularity};
    use crate::types::Partition;

    fn two_triangles() -> Graph {
        Graph::from_edges(vec![
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("d", "b"),
            ("d", "e"),
            ("e", "f"),
            ("f", "d"),
        ])
    }

    fn split(graph: &Graph, first: &[&str]) -> Partition {
        graph
            .vertex_ids()
            .map(|v| {
                let name = graph.vertex_name(v).unwrap();
                (v, if first.contains(&name) { 1 } else { 0 })
            })
            .collect()
    }

    // Dense double loop over all vertex pairs.
    fn dense_modularity(graph: &Graph, partition: &Partition) -> f64 {
        let m = graph.get_edge_count() as f64;
        let mut q = 0.0;
        for i in graph.vertex_ids() {
            for j in graph.vertex_ids() {
                if partition.community_of(i) != partition.community_of(j) {
                    continue;
                }
                let a_ij = if graph.has_edge(i, j) { 1.0 } else { 0.0 };
                q += a_ij - (graph.degree(i) * graph.degree(j)) as f64 / (2.0 * m);
            }
        }
        q / (2.0 * m)
    }

    #[test]
    fn test_known_value() {
        let g = two_triangles();
        let q = modularity(&g, &split(&g, &["a", "b", "c"])).unwrap();
        assert!((q - 0.3571428571428571).abs() < 1e-12, "q={}", q);
        assert!((q - dense_modularity(&g, &split(&g, &["a", "b", "c"]))).abs() < 1e-12);
    }

    #[test]
    fn test_single_community_is_zero() {
        let g = two_triangles();
        let all: Partition = g.vertex_ids().map(|v| (v, 0)).collect();
        assert!(modularity(&g, &all).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_components_beat_single_community() {
        let g = Graph::from_edges(vec![("a", "b"), ("c", "d")]);
        let components = g.connected_components();
        let all: Partition = g.vertex_ids().map(|v| (v, 7)).collect();
        let q_components = modularity(&g, &components).unwrap();
        let q_all = modularity(&g, &all).unwrap();
        assert!((q_components - 0.5).abs() < 1e-12);
        assert!(q_all <= q_components);
    }

    #[test]
    fn test_no_edges() {
        let g = Graph::null_graph(3);
        assert_eq!(modularity(&g, &g.connected_components()), Ok(0.0));
    }

    #[test]
    fn test_missing_vertex() {
        let g = two_triangles();
        let partial: Partition = vec![(0, 0), (1, 0)].into_iter().collect();
        assert_eq!(
            modularity(&g, &partial),
            Err(Error::PartitionCoverageMismatch { vertex: 2 })
        );
    }

    #[test]
    fn test_best_partition() {
        let g = two_triangles();
        let singletons: Partition = g.vertex_ids().map(|v| (v, v)).collect();
        let halves = split(&g, &["a", "b", "c"]);
        let all: Partition = g.vertex_ids().map(|v| (v, 0)).collect();
        let candidates = vec![all, halves.clone(), singletons];
        let (best, q) = best_partition(&g, &candidates).unwrap().unwrap();
        assert_eq!(best, &halves);
        assert!(q > 0.35);

        assert_eq!(best_partition(&g, &[]).unwrap(), None);
    }
}
