//! Community detection on undirected, unweighted simple graphs.
//!
//! The Girvan-Newman loop removes the edges of highest betweenness until no
//! edge is left and records the connected components after every round;
//! modularity then picks the best cut. Betweenness comes from Brandes'
//! algorithm (full or restricted to the components a removal changed) or from
//! random shortest path sampling.

pub mod betweenness;
pub mod config;
pub mod error;
pub mod girvan_newman;
pub mod graph;
pub mod loader;
pub mod logger;
pub mod modularity;
pub mod sampling;
pub mod types;

pub use betweenness::{edge_betweenness, recompute_edge_betweenness};
pub use error::{Error, Result};
pub use girvan_newman::{
    run_exact, run_incremental, run_sampling_detection, BetweennessStrategy, ExactStrategy,
    GirvanNewman, IncrementalStrategy, SamplingStrategy,
};
pub use graph::Graph;
pub use modularity::{best_partition, modularity};
pub use sampling::{compute_sample_size, run_sampling, SamplingParams};
pub use types::{Edge, EdgeScores, Partition, VInt, Vertex};
