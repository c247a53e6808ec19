use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Dense vertex handle, assigned in insertion order starting from 0.
pub type VInt = u32;

/// Community label inside a [`Partition`].
pub type CommID = u32;

/// Edge betweenness scores, keyed by canonical edge.
pub type EdgeScores = BTreeMap<Edge, f64>;

// Define the Vertex struct, the id is the identity and the name is only metadata.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub vertex_id: VInt, // Vertex ID, unique and dense in one graph.
    pub name: String,    // Display name, as read from the edge list.
}

impl Vertex {
    pub fn new(vertex_id: VInt, name: impl Into<String>) -> Self {
        Vertex {
            vertex_id,
            name: name.into(),
        }
    }
}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertex_id.hash(state);
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.vertex_id == other.vertex_id
    }
}

impl Eq for Vertex {}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.vertex_id.cmp(&other.vertex_id)
    }
}

impl Display for Vertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "V{}({})", self.vertex_id, self.name)
    }
}

/// Undirected edge, stored with the lower vertex id first so that `{a, b}` and
/// `{b, a}` are the same map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub u: VInt,
    pub v: VInt,
}

impl Edge {
    pub fn new(a: VInt, b: VInt) -> Self {
        if a <= b {
            Edge { u: a, v: b }
        } else {
            Edge { u: b, v: a }
        }
    }
}

impl From<(VInt, VInt)> for Edge {
    fn from((a, b): (VInt, VInt)) -> Self {
        Edge::new(a, b)
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.u, self.v)
    }
}

/// A vertex to community assignment.
///
/// Partitions produced by [`crate::graph::Graph::connected_components`] cover
/// every vertex of the graph and number communities from 0 in the order their
/// first (lowest id) vertex appears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    community_map: BTreeMap<VInt, CommID>,
}

impl Partition {
    pub fn new() -> Self {
        Partition::default()
    }

    /// Assign `vertex` to `community`, replacing any earlier assignment.
    pub fn assign(&mut self, vertex: VInt, community: CommID) {
        self.community_map.insert(vertex, community);
    }

    /// Community of `vertex`, if the partition covers it.
    pub fn community_of(&self, vertex: VInt) -> Option<CommID> {
        self.community_map.get(&vertex).copied()
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.community_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.community_map.is_empty()
    }

    /// Number of distinct community ids in use.
    pub fn community_count(&self) -> usize {
        self.communities().len()
    }

    /// Members of every community, keyed by community id, members ascending.
    pub fn communities(&self) -> BTreeMap<CommID, Vec<VInt>> {
        self.community_map.iter().fold(
            BTreeMap::<CommID, Vec<VInt>>::new(),
            |mut acc, (&vertex, &community)| {
                acc.entry(community).or_default().push(vertex);
                acc
            },
        )
    }

    /// `(vertex, community)` pairs in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (VInt, CommID)> + '_ {
        self.community_map.iter().map(|(&v, &c)| (v, c))
    }
}

impl FromIterator<(VInt, CommID)> for Partition {
    fn from_iter<I: IntoIterator<Item = (VInt, CommID)>>(iter: I) -> Self {
        Partition {
            community_map: iter.into_iter().collect(),
        }
    }
}
