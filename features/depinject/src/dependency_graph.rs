use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use thiserror::Error;

/// Anything which can be placed in the [DependencyGraph]
pub trait Vertex: Clone {
    /// Key of the vertex, vertices with equal ids share a slot
    fn id(&self) -> &str;
}

/// Lifecycle of a [DependencyGraph]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Empty,
    Building,
    Sorted,
}

/// Directed acyclic graph of providers
///
/// An edge `from -> to` means `to` depends on an output of `from`.
/// Edges which would close a cycle are rejected before they are inserted,
/// so the graph is acyclic at all times.
#[derive(Debug, Clone)]
pub struct DependencyGraph<V: Vertex> {
    /// Vertices in insertion order.
    /// Without uniqueness, repeated ids are grouped in one slot and sorted together.
    vertices: IndexMap<String, Vec<V>>,
    edges: HashMap<String, Vec<String>>,
    in_degree: HashMap<String, usize>,
    total_vertices: usize,
    enforce_unique_vertices: bool,
    sorted: Option<Vec<V>>,
}

impl<V: Vertex> DependencyGraph<V> {
    pub fn new(enforce_unique_vertices: bool) -> Self {
        DependencyGraph {
            vertices: IndexMap::new(),
            edges: HashMap::new(),
            in_degree: HashMap::new(),
            total_vertices: 0,
            enforce_unique_vertices,
            sorted: None,
        }
    }

    pub fn state(&self) -> GraphState {
        match (self.total_vertices, &self.sorted) {
            (0, _) => GraphState::Empty,
            (_, Some(_)) => GraphState::Sorted,
            (_, None) => GraphState::Building,
        }
    }

    pub fn len(&self) -> usize {
        self.total_vertices
    }

    pub fn is_empty(&self) -> bool {
        self.total_vertices == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    /// All vertices in insertion order
    pub fn vertices(&self) -> Vec<V> {
        self.vertices.values().flatten().cloned().collect()
    }

    /// All edges as `(from, to)` id pairs
    pub fn edges(&self) -> Vec<(String, String)> {
        self.vertices
            .keys()
            .flat_map(|from| {
                self.edges
                    .get(from)
                    .into_iter()
                    .flatten()
                    .map(move |to| (from.clone(), to.clone()))
            })
            .collect()
    }

    pub fn add_vertex(&mut self, vertex: V) -> Result<(), GraphError> {
        let id = vertex.id().to_string();
        if self.enforce_unique_vertices && self.contains(&id) {
            return Err(GraphError::VertexExists(id));
        }

        self.in_degree.entry(id.clone()).or_insert(0);
        self.vertices.entry(id).or_default().push(vertex);
        self.total_vertices += 1;
        self.sorted = None;
        Ok(())
    }

    /// Adds the edge `from -> to`
    ///
    /// Fails without modifying the graph if the edge would close a cycle.
    pub fn add_edge(&mut self, from: &V, to: &V) -> Result<(), GraphError> {
        for vertex in [from, to] {
            if !self.contains(vertex.id()) {
                return Err(GraphError::VertexMissing(vertex.id().to_string()));
            }
        }

        if self.reaches(to.id(), from.id()) {
            return Err(GraphError::CycleDetected {
                from: from.id().to_string(),
                to: to.id().to_string(),
            });
        }

        self.edges
            .entry(from.id().to_string())
            .or_default()
            .push(to.id().to_string());
        *self.in_degree.entry(to.id().to_string()).or_insert(0) += 1;
        self.sorted = None;
        Ok(())
    }

    /// Removes every edge, keeping the vertices
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        for degree in self.in_degree.values_mut() {
            *degree = 0;
        }
        self.sorted = None;
    }

    /// Kahn's algorithm - ties are broken by insertion order
    pub fn topological_sort(&mut self) -> Result<Vec<V>, GraphError> {
        if let Some(sorted) = &self.sorted {
            return Ok(sorted.clone());
        }

        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<&String> = self
            .vertices
            .keys()
            .filter(|id| in_degree.get(*id).copied().unwrap_or_default() == 0)
            .collect();

        let mut sorted = Vec::with_capacity(self.total_vertices);
        while let Some(id) = queue.pop_front() {
            sorted.extend(self.vertices.get(id).into_iter().flatten().cloned());

            for neighbour in self.edges.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(neighbour) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        if sorted.len() != self.total_vertices {
            return Err(GraphError::IncompleteOrder {
                sorted: sorted.len(),
                total: self.total_vertices,
            });
        }

        tracing::trace!("Sorted {} vertices", sorted.len());
        self.sorted = Some(sorted.clone());
        Ok(sorted)
    }

    /// Depth first search for a path `start -> target`
    fn reaches(&self, start: &str, target: &str) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                self.edges
                    .get(current)
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            );
        }

        false
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("A vertex with id '{0}' already exists")]
    VertexExists(String),
    #[error("No vertex with id '{0}' exists")]
    VertexMissing(String),
    #[error("Adding '{from}' -> '{to}' would create a cycle")]
    CycleDetected { from: String, to: String },
    /// Consistency check of the sort, unreachable while `add_edge` rejects cycles
    #[error("Cycle detected: only {sorted} of {total} vertices could be ordered")]
    IncompleteOrder { sorted: usize, total: usize },
}
impl GraphError {
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            GraphError::CycleDetected { .. } | GraphError::IncompleteOrder { .. }
        )
    }
}
