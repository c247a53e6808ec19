use thiserror::Error;

use crate::types::VInt;

/// Result alias for the community detection library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the graph and community detection primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A sampling parameter or the vertex diameter is out of range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },
    /// A random vertex was requested from a graph without vertices.
    #[error("graph has no vertices")]
    EmptyGraph,
    /// A vertex handle does not belong to the graph.
    #[error("vertex out of bounds: the order is {order} but the vertex is {vertex}")]
    VertexOutOfBounds {
        /// Number of vertices in the graph.
        order: usize,
        /// The offending handle.
        vertex: VInt,
    },
    /// Modularity was requested for a partition that misses a vertex.
    #[error("partition does not cover vertex {vertex}")]
    PartitionCoverageMismatch {
        /// First vertex of the graph that the partition does not cover.
        vertex: VInt,
    },
}
