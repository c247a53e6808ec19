//! Approximate edge betweenness by sampling random shortest paths.
//!
//! Each trial picks a reachable pair of distinct vertices, draws one of their
//! shortest paths uniformly at random and adds `1 / r` to every edge on it.
//! The resulting score of an edge estimates the fraction of reachable pairs
//! whose shortest paths cross it. The number of trials `r` is derived from the
//! vertex diameter and the accuracy/confidence parameters.

use log::{info, trace};
use rand::Rng;
use serde::Deserialize;

use crate::config::{
    DEFAULT_C, DEFAULT_DELTA, DEFAULT_EPSILON, DEFAULT_RETRY_BUDGET, DEFAULT_VD_SAMPLES,
};
use crate::error::{Error, Result};
use crate::graph::{Graph, ShortestPathDag};
use crate::types::{CommID, Edge, EdgeScores, VInt};

/// Accuracy and sizing parameters of the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Accuracy, in (0, 1). Smaller is more accurate and costs more samples.
    pub epsilon: f64,
    /// Failure probability, in (0, 1).
    pub delta: f64,
    /// Scaling constant of the sample size bound, > 0.
    pub c: f64,
    /// Known vertex diameter. Estimated from the graph when absent.
    pub vertex_diameter: Option<u32>,
    /// Trials used by the diameter estimation.
    pub vd_samples: u32,
    /// How many times a trial redraws its target before it is skipped.
    pub retry_budget: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            epsilon: DEFAULT_EPSILON,
            delta: DEFAULT_DELTA,
            c: DEFAULT_C,
            vertex_diameter: None,
            vd_samples: DEFAULT_VD_SAMPLES,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl SamplingParams {
    /// Check the parameters that do not depend on the graph.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("epsilon", self.epsilon)?;
        check_unit_interval("delta", self.delta)?;
        check_scaling_constant(self.c)?;
        if self.vertex_diameter.is_none() && self.vd_samples == 0 {
            return Err(Error::InvalidParameter {
                name: "vd_samples",
                message: "at least one sample is needed to estimate the vertex diameter".to_string(),
            });
        }
        Ok(())
    }

    /// The supplied vertex diameter, or an estimate over `graph`.
    pub fn resolve_vertex_diameter<R: Rng + ?Sized>(&self, graph: &Graph, rng: &mut R) -> Result<u32> {
        match self.vertex_diameter {
            Some(vertex_diameter) => Ok(vertex_diameter),
            None => estimate_vertex_diameter(graph, self.vd_samples, rng),
        }
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            message: format!("must be in (0, 1), got {}", value),
        })
    }
}

fn check_scaling_constant(c: f64) -> Result<()> {
    if c > 0.0 && c.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "c",
            message: format!("must be a positive number, got {}", c),
        })
    }
}

/// Sample size `r = ceil(c / epsilon^2 * (floor(log2(VD - 2)) + 1 + ln(1 / delta)))`.
pub fn compute_sample_size(vertex_diameter: u32, epsilon: f64, delta: f64, c: f64) -> Result<usize> {
    if vertex_diameter <= 2 {
        return Err(Error::InvalidParameter {
            name: "vertex_diameter",
            message: format!("must be greater than 2, got {}", vertex_diameter),
        });
    }
    check_unit_interval("epsilon", epsilon)?;
    check_unit_interval("delta", delta)?;
    check_scaling_constant(c)?;

    let d = (vertex_diameter - 2).ilog2() as f64 + 1.0;
    let r = c / (epsilon * epsilon) * (d + (1.0 / delta).ln());
    Ok(r.ceil() as usize)
}

/// Estimate the vertex diameter: each trial takes a random vertex and sums its
/// two largest BFS distances, the trials are averaged and rounded up.
pub fn estimate_vertex_diameter<R: Rng + ?Sized>(graph: &Graph, samples: u32, rng: &mut R) -> Result<u32> {
    if samples == 0 {
        return Err(Error::InvalidParameter {
            name: "vd_samples",
            message: "must be positive".to_string(),
        });
    }
    let mut total = 0u64;
    for _ in 0..samples {
        let source = graph.random_vertex(rng)?;
        let mut distances: Vec<u32> = graph.sssp(source).into_values().collect();
        distances.sort_unstable_by(|a, b| b.cmp(a));
        // A vertex with a single reachable distance contributes only that one.
        let sample = distances.iter().take(2).sum::<u32>();
        total += sample as u64;
    }
    let samples = samples as u64;
    Ok(((total + samples - 1) / samples) as u32)
}

// Walk from `target` back to the source of `dag`, picking each predecessor
// with probability sigma[p] / sigma[current].
fn walk_random_predecessors<R: Rng + ?Sized>(
    dag: &ShortestPathDag,
    target: VInt,
    rng: &mut R,
    path: &mut Vec<Edge>,
) {
    let mut current = target;
    while current != dag.source() {
        let preds = dag.predecessors(current);
        // Tickets [0, sigma[current]), each predecessor holds sigma[p] consecutive ones.
        let winner = rng.gen::<f64>() * dag.sigma(current);
        let mut tickets = 0.0;
        let mut chosen = preds[preds.len() - 1];
        for &p in preds {
            tickets += dag.sigma(p);
            if winner < tickets {
                chosen = p;
                break;
            }
        }
        path.push(Edge::new(chosen, current));
        current = chosen;
    }
}

/// One shortest path from `source` to `target`, drawn uniformly among all of
/// them. Edges are listed from the target end. `None` when `target` is not
/// reachable from `source`.
pub fn random_shortest_path<R: Rng + ?Sized>(
    graph: &Graph,
    source: VInt,
    target: VInt,
    rng: &mut R,
) -> Option<Vec<Edge>> {
    let dag = graph.shortest_path_dag(source);
    if !dag.reaches(target) {
        return None;
    }
    let mut path = Vec::with_capacity(dag.distance(target).unwrap_or(0) as usize);
    walk_random_predecessors(&dag, target, rng, &mut path);
    Some(path)
}

/// Approximate edge betweenness from `sample_size` random shortest paths.
///
/// Pairs in different components are redrawn up to `retry_budget` times, then
/// the trial is skipped. Every present edge is in the result, 0 if no sampled
/// path used it.
pub fn sampled_edge_betweenness<R: Rng + ?Sized>(
    graph: &Graph,
    sample_size: usize,
    retry_budget: u32,
    rng: &mut R,
) -> EdgeScores {
    let mut scores: EdgeScores = graph.edges().into_iter().map(|e| (e, 0.0)).collect();
    let order = graph.get_vertex_count() as usize;
    if order < 2 || sample_size == 0 {
        return scores;
    }

    let components = graph.connected_components();
    let component_of: Vec<Option<CommID>> =
        graph.vertex_ids().map(|v| components.community_of(v)).collect();
    let weight = 1.0 / sample_size as f64;

    let mut dag = ShortestPathDag::with_order(order);
    let mut path: Vec<Edge> = Vec::new();
    let mut skipped = 0usize;

    for _ in 0..sample_size {
        let u = rng.gen_range(0..order) as VInt;
        let mut v = rng.gen_range(0..order) as VInt;
        let mut retries = 0u32;
        while v == u || component_of[u as usize] != component_of[v as usize] {
            if retries >= retry_budget {
                break;
            }
            v = rng.gen_range(0..order) as VInt;
            retries += 1;
        }
        if v == u || component_of[u as usize] != component_of[v as usize] {
            trace!("Skip sample from {}: no reachable partner after {} redraws", u, retries);
            skipped += 1;
            continue;
        }

        graph.fill_shortest_path_dag(u, &mut dag);
        if !dag.reaches(v) {
            skipped += 1;
            continue;
        }
        path.clear();
        walk_random_predecessors(&dag, v, rng, &mut path);
        for e in &path {
            *scores.entry(*e).or_insert(0.0) += weight;
        }
    }

    if skipped > 0 {
        info!("Skipped {} of {} samples", skipped, sample_size);
    }
    scores
}

/// Validate `params`, resolve the vertex diameter, derive the sample size and
/// run one sampling pass over `graph`.
pub fn run_sampling<R: Rng + ?Sized>(graph: &Graph, params: &SamplingParams, rng: &mut R) -> Result<EdgeScores> {
    params.validate()?;
    let vertex_diameter = params.resolve_vertex_diameter(graph, rng)?;
    info!("Vertex diameter VD(G): {}", vertex_diameter);
    let sample_size = compute_sample_size(vertex_diameter, params.epsilon, params.delta, params.c)?;
    info!("Sample size r: {}", sample_size);
    Ok(sampled_edge_betweenness(graph, sample_size, params.retry_budget, rng))
}

#[cfg(test)]
mod test_sampling {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::error::Error;
    use crate::graph::Graph;
    use crate::sampling::{
        compute_sample_size, estimate_vertex_diameter, random_shortest_path, run_sampling,
        sampled_edge_betweenness, SamplingParams,
    };
    use crate::types::Edge;

    fn path_of_three() -> Graph {
        Graph::from_edges(vec![("A", "B"), ("B", "C")])
    }

    #[test]
    fn test_compute_sample_size() {
        // d = floor(log2(8)) + 1 = 4, r = 1 / 0.01 * (4 + ln 2) = 469.3...
        assert_eq!(compute_sample_size(10, 0.1, 0.5, 1.0), Ok(470));
        assert_eq!(compute_sample_size(3, 0.5, 0.5, 1.0), Ok(7));
        let rejected = [
            (2, 0.1, 0.1),
            (0, 0.1, 0.1),
            (5, 0.0, 0.1),
            (5, 1.0, 0.1),
            (5, 0.1, 0.0),
            (5, 0.1, 1.5),
        ];
        for (vd, eps, delta) in rejected {
            assert!(
                matches!(compute_sample_size(vd, eps, delta, 1.0), Err(Error::InvalidParameter { .. })),
                "vd={} eps={} delta={}",
                vd,
                eps,
                delta
            );
        }
        for c in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    compute_sample_size(10, 0.1, 0.1, c),
                    Err(Error::InvalidParameter { name: "c", .. })
                ),
                "c={}",
                c
            );
        }
        for vd in 3..50 {
            assert!(compute_sample_size(vd, 0.3, 0.2, 0.5).unwrap() > 0);
        }
    }

    #[test]
    fn test_params_validate() {
        assert!(SamplingParams::default().validate().is_ok());
        let bad_c = SamplingParams { c: 0.0, ..Default::default() };
        assert!(matches!(bad_c.validate(), Err(Error::InvalidParameter { name: "c", .. })));
        let bad_samples = SamplingParams { vd_samples: 0, ..Default::default() };
        assert!(bad_samples.validate().is_err());
        let supplied = SamplingParams { vd_samples: 0, vertex_diameter: Some(4), ..Default::default() };
        assert!(supplied.validate().is_ok());
    }

    #[test]
    fn test_estimate_vertex_diameter() {
        let mut rng = StdRng::seed_from_u64(3);
        // On a path of 3 the ends give 2 + 1 and the middle 1 + 1.
        let vd = estimate_vertex_diameter(&path_of_three(), 20, &mut rng).unwrap();
        assert!(vd == 2 || vd == 3);

        let mut single = Graph::new();
        single.add_vertex("only");
        assert_eq!(estimate_vertex_diameter(&single, 5, &mut rng), Ok(0));
        assert_eq!(estimate_vertex_diameter(&Graph::new(), 5, &mut rng), Err(Error::EmptyGraph));

        // The estimate never exceeds twice the real diameter.
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        let path = Graph::from_edges(names.windows(2).map(|pair| (pair[0], pair[1])));
        let vd = estimate_vertex_diameter(&path, 10, &mut rng).unwrap();
        assert!(vd >= 5 && vd <= 2 * path.vertex_diameter(), "vd={}", vd);
    }

    #[test]
    fn test_vertex_diameter_rounds_up() {
        // Every vertex of a 5-cycle reaches two vertices at distance 2, so
        // each trial gives 4 and the exact average stays 4.
        let cycle = Graph::from_edges(vec![("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(estimate_vertex_diameter(&cycle, 7, &mut rng), Ok(4));

        // On a path of 3 the ends give 3 and the middle gives 2. Replay the
        // vertex picks of each seed to get the exact average.
        let g = path_of_three();
        let middle = g.vertex_id("B").unwrap();
        let mut fractional = 0;
        for seed in 0..40 {
            let mut replay = StdRng::seed_from_u64(seed);
            let total: u32 = (0..3)
                .map(|_| if g.random_vertex(&mut replay).unwrap() == middle { 2 } else { 3 })
                .sum();
            if total % 3 != 0 {
                fractional += 1;
            }
            let mut rng = StdRng::seed_from_u64(seed);
            let vd = estimate_vertex_diameter(&g, 3, &mut rng).unwrap();
            assert_eq!(vd, (total + 2) / 3, "seed={} total={}", seed, total);
        }
        assert!(fractional > 0);
    }

    #[test]
    fn test_random_shortest_path() {
        let mut rng = StdRng::seed_from_u64(11);
        // s - x - t, s - y - t, plus a far vertex.
        let mut g = Graph::from_edges(vec![("s", "x"), ("s", "y"), ("x", "t"), ("y", "t")]);
        let far = g.add_vertex("far");
        let s = g.vertex_id("s").unwrap();
        let t = g.vertex_id("t").unwrap();
        let x = g.vertex_id("x").unwrap();
        let y = g.vertex_id("y").unwrap();

        assert_eq!(random_shortest_path(&g, s, far, &mut rng), None);
        assert_eq!(random_shortest_path(&g, s, s, &mut rng), Some(vec![]));

        let mut counts: HashMap<Vec<Edge>, usize> = HashMap::new();
        for _ in 0..2000 {
            let path = random_shortest_path(&g, s, t, &mut rng).unwrap();
            assert_eq!(path.len(), 2);
            *counts.entry(path).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 2);
        let via_x = counts[&vec![Edge::new(x, t), Edge::new(s, x)]];
        let via_y = counts[&vec![Edge::new(y, t), Edge::new(s, y)]];
        assert!(via_x > 850 && via_y > 850, "x={} y={}", via_x, via_y);
    }

    #[test]
    fn test_path_weights_follow_sigma() {
        // t has predecessors p (sigma 2) and q (sigma 1).
        let g = Graph::from_edges(vec![
            ("s", "a"),
            ("s", "b"),
            ("a", "p"),
            ("b", "p"),
            ("s", "c"),
            ("c", "q"),
            ("p", "t"),
            ("q", "t"),
        ]);
        let s = g.vertex_id("s").unwrap();
        let t = g.vertex_id("t").unwrap();
        let p = g.vertex_id("p").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let through_p = (0..3000)
            .filter(|_| {
                let path = random_shortest_path(&g, s, t, &mut rng).unwrap();
                path[0] == Edge::new(p, t)
            })
            .count();
        // Expected 2000.
        assert!(through_p > 1850 && through_p < 2150, "through_p={}", through_p);
    }

    #[test]
    fn test_converges_on_path_of_three() {
        let g = path_of_three();
        let mut rng = StdRng::seed_from_u64(2024);
        let params = SamplingParams {
            epsilon: 0.02,
            delta: 0.1,
            vertex_diameter: Some(3),
            ..Default::default()
        };
        let scores = run_sampling(&g, &params, &mut rng).unwrap();
        assert_eq!(scores.len(), 2);
        // Four of the six ordered pairs cross each edge; the exact pair count
        // is 2 out of 3 reachable unordered pairs.
        for score in scores.values() {
            assert!((score - 2.0 / 3.0).abs() < 0.03, "score={}", score);
        }
    }

    #[test]
    fn test_disconnected_pairs_are_skipped() {
        let mut g = Graph::from_edges(vec![("a", "b")]);
        for name in ["x", "y", "z", "w"] {
            g.add_vertex(name);
        }
        let mut rng = StdRng::seed_from_u64(9);
        // Isolated vertices can never find a partner and must not stall the run.
        let scores = sampled_edge_betweenness(&g, 500, 3, &mut rng);
        assert_eq!(scores.len(), 1);
        let score = scores.values().next().copied().unwrap();
        assert!(score > 0.0 && score < 1.0);

        let empty = sampled_edge_betweenness(&Graph::null_graph(4), 100, 3, &mut rng);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_run_sampling_rejects_bad_params() {
        let g = path_of_three();
        let mut rng = StdRng::seed_from_u64(1);
        let bad = SamplingParams { epsilon: 1.0, ..Default::default() };
        assert!(run_sampling(&g, &bad, &mut rng).is_err());
        // A supplied diameter of 2 is rejected before any sampling.
        let small = SamplingParams { vertex_diameter: Some(2), ..Default::default() };
        assert!(matches!(
            run_sampling(&g, &small, &mut rng),
            Err(Error::InvalidParameter { name: "vertex_diameter", .. })
        ));
    }
}
