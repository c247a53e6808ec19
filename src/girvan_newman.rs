//! Girvan-Newman community detection: repeatedly remove the edges of highest
//! betweenness and record the connected components after every round.

use log::{debug, info};
use rand::Rng;

use crate::betweenness::{edge_betweenness, recompute_edge_betweenness};
use crate::error::Result;
use crate::graph::Graph;
use crate::sampling::{compute_sample_size, sampled_edge_betweenness, SamplingParams};
use crate::types::{Edge, EdgeScores, Partition};

/// What the previous round left behind, for strategies that reuse it.
#[derive(Debug, Clone, Copy)]
pub struct PreviousRound<'a> {
    /// Scores the previous round removed edges by.
    pub scores: &'a EdgeScores,
    /// Connected components right before the removal.
    pub partition: &'a Partition,
    /// Edges removed in the previous round.
    pub removed: &'a [Edge],
}

/// Edge scoring backend of the detector.
pub trait BetweennessStrategy {
    fn name(&self) -> &'static str;

    /// Score every edge of `graph`. `previous` is `None` in the first round.
    fn compute_betweenness(&mut self, graph: &Graph, previous: Option<PreviousRound<'_>>) -> EdgeScores;
}

/// Full Brandes recomputation every round.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactStrategy;

impl BetweennessStrategy for ExactStrategy {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn compute_betweenness(&mut self, graph: &Graph, _previous: Option<PreviousRound<'_>>) -> EdgeScores {
        edge_betweenness(graph)
    }
}

/// Brandes restricted to the components that lost an edge in the previous round.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncrementalStrategy;

impl BetweennessStrategy for IncrementalStrategy {
    fn name(&self) -> &'static str {
        "incremental"
    }

    fn compute_betweenness(&mut self, graph: &Graph, previous: Option<PreviousRound<'_>>) -> EdgeScores {
        match previous {
            Some(round) => recompute_edge_betweenness(graph, round.scores, round.partition, round.removed),
            None => edge_betweenness(graph),
        }
    }
}

/// Sampled betweenness. The vertex diameter and sample size are fixed when
/// the strategy is built and reused for every round.
#[derive(Debug)]
pub struct SamplingStrategy<R: Rng> {
    rng: R,
    sample_size: usize,
    retry_budget: u32,
}

impl<R: Rng> SamplingStrategy<R> {
    /// Validate `params` and size the sampler for `graph`, estimating the
    /// vertex diameter on it when none is supplied.
    pub fn new(graph: &Graph, params: &SamplingParams, mut rng: R) -> Result<Self> {
        params.validate()?;
        let vertex_diameter = params.resolve_vertex_diameter(graph, &mut rng)?;
        info!("Vertex diameter VD(G): {}", vertex_diameter);
        let sample_size = compute_sample_size(vertex_diameter, params.epsilon, params.delta, params.c)?;
        info!("Sample size r: {}", sample_size);
        Ok(SamplingStrategy {
            rng,
            sample_size,
            retry_budget: params.retry_budget,
        })
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl<R: Rng> BetweennessStrategy for SamplingStrategy<R> {
    fn name(&self) -> &'static str {
        "sampling"
    }

    fn compute_betweenness(&mut self, graph: &Graph, _previous: Option<PreviousRound<'_>>) -> EdgeScores {
        sampled_edge_betweenness(graph, self.sample_size, self.retry_budget, &mut self.rng)
    }
}

/// All edges whose score equals the maximum. Exact comparison: ties come
/// from symmetric structure and are removed together.
pub fn max_scoring_edges(scores: &EdgeScores) -> Vec<Edge> {
    let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    scores
        .iter()
        .filter(|(_, &score)| score == max)
        .map(|(&e, _)| e)
        .collect()
}

/// The edge removal loop, parameterized over the scoring strategy.
#[derive(Debug)]
pub struct GirvanNewman<S: BetweennessStrategy> {
    strategy: S,
    max_rounds: Option<usize>,
}

impl<S: BetweennessStrategy> GirvanNewman<S> {
    pub fn new(strategy: S) -> Self {
        GirvanNewman {
            strategy,
            max_rounds: None,
        }
    }

    /// Stop after `max_rounds` rounds even if edges remain.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Run on a copy of `input` and return one partition per round, from the
    /// first split down to all singletons. `input` is left untouched.
    pub fn run(&mut self, input: &Graph) -> Vec<Partition> {
        let mut graph = input.clone();
        let mut partitions: Vec<Partition> = Vec::new();

        let mut current = graph.connected_components();
        let mut before = current.clone();
        let mut scores: Option<EdgeScores> = None;
        let mut removed: Vec<Edge> = Vec::new();

        info!(
            "Girvan-Newman ({}) on {} vertices, {} edges",
            self.strategy.name(),
            graph.get_vertex_count(),
            graph.get_edge_count()
        );

        while graph.get_edge_count() > 0 {
            if self.max_rounds.map_or(false, |limit| partitions.len() >= limit) {
                info!("Stopped after {} rounds", partitions.len());
                break;
            }

            let previous = scores.as_ref().map(|scores| PreviousRound {
                scores,
                partition: &before,
                removed: &removed,
            });
            let next_scores = self.strategy.compute_betweenness(&graph, previous);

            let to_remove = max_scoring_edges(&next_scores);
            debug!(
                "Round {}: removing {} edge(s) with betweenness {:?}",
                partitions.len() + 1,
                to_remove.len(),
                to_remove.first().and_then(|e| next_scores.get(e))
            );
            for e in &to_remove {
                graph.remove_edge(e.u, e.v);
            }

            before = std::mem::replace(&mut current, graph.connected_components());
            debug!("Round {}: {} components", partitions.len() + 1, current.community_count());
            partitions.push(current.clone());
            scores = Some(next_scores);
            removed = to_remove;
        }

        info!("Girvan-Newman produced {} partitions", partitions.len());
        partitions
    }
}

/// Girvan-Newman with full recomputation.
pub fn run_exact(graph: &Graph) -> Vec<Partition> {
    GirvanNewman::new(ExactStrategy).run(graph)
}

/// Girvan-Newman with incremental recomputation; same partitions as [`run_exact`].
pub fn run_incremental(graph: &Graph) -> Vec<Partition> {
    GirvanNewman::new(IncrementalStrategy).run(graph)
}

/// Girvan-Newman over sampled betweenness.
pub fn run_sampling_detection<R: Rng>(graph: &Graph, params: &SamplingParams, rng: R) -> Result<Vec<Partition>> {
    let strategy = SamplingStrategy::new(graph, params, rng)?;
    Ok(GirvanNewman::new(strategy).run(graph))
}
