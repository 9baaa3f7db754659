// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};

use crate::{planar_distance, Edge, GraphDescription, Node, RawGraph, TrackPoint};

/// Reasons why a [Graph] can't be constructed from a description.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("graph has no nodes")]
    Empty,

    #[error("duplicate node: {0}")]
    DuplicateNode(i64),

    #[error("node {0} has invalid coordinates")]
    InvalidCoordinates(i64),

    #[error("edge {u}-{v} references unknown node {missing}")]
    UnknownNode { u: i64, v: i64, missing: i64 },

    #[error("edge {u}-{v} has invalid weight: {weight}")]
    InvalidWeight { u: i64, v: i64, weight: f64 },
}

/// Represents a routing network as a set of [Nodes](Node)
/// and undirected connections between them.
///
/// Every connection is stored as a pair of [Edges](Edge), and every edge
/// is guaranteed to point at an existing node.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Creates a graph from any [GraphDescription].
    pub fn from_description(description: &GraphDescription) -> Result<Self, BuildError> {
        match description {
            GraphDescription::Explicit(raw) => Self::from_raw(raw),
            GraphDescription::PointChain(points) => Self::from_point_chain(points),
        }
    }

    /// Creates a graph from an explicit description of nodes and edges.
    ///
    /// Edges are undirected. Inserting the same pair of nodes twice overwrites the weight.
    pub fn from_raw(raw: &RawGraph) -> Result<Self, BuildError> {
        let mut g = Self::default();

        for n in &raw.nodes {
            g.add_node(Node {
                id: n.id,
                lat: n.lat,
                lon: n.lon,
                elevation: n.elevation.unwrap_or_default(),
            })?;
        }

        for e in &raw.edges {
            g.add_edge(e.u, e.v, e.weight)?;
        }

        if g.is_empty() {
            Err(BuildError::Empty)
        } else {
            Ok(g)
        }
    }

    /// Creates a graph out of a recorded trajectory.
    ///
    /// Every sample becomes a node identified by its index in `points`,
    /// and consecutive samples are connected. Edge weights are left unset,
    /// to be derived from the coordinates.
    pub fn from_point_chain(points: &[TrackPoint]) -> Result<Self, BuildError> {
        let mut g = Self::default();

        for (idx, p) in points.iter().enumerate() {
            g.add_node(Node {
                id: idx as i64,
                lat: p.lat,
                lon: p.lon,
                elevation: p.elevation,
            })?;

            if idx > 0 {
                g.add_edge(idx as i64 - 1, idx as i64, None)?;
            }
        }

        if g.is_empty() {
            Err(BuildError::Empty)
        } else {
            Ok(g)
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no nodes in the graph.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Adds a new [Node] to the graph.
    ///
    /// Node positions are immutable, so re-adding an existing id is an error.
    pub fn add_node(&mut self, node: Node) -> Result<(), BuildError> {
        if !node.lat.is_finite() || !node.lon.is_finite() || !node.elevation.is_finite() {
            return Err(BuildError::InvalidCoordinates(node.id));
        }

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
                Ok(())
            }
            Entry::Occupied(_) => Err(BuildError::DuplicateNode(node.id)),
        }
    }

    /// Connects two existing nodes in both directions.
    ///
    /// `weight` must be finite and non-negative; `None` means that the cost
    /// should be derived from the nodes' coordinates.
    pub fn add_edge(&mut self, u: i64, v: i64, weight: Option<f64>) -> Result<(), BuildError> {
        if let Some(weight) = weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(BuildError::InvalidWeight { u, v, weight });
            }
        }

        let u_node = self
            .get_node(u)
            .ok_or(BuildError::UnknownNode { u, v, missing: u })?;
        let v_node = self
            .get_node(v)
            .ok_or(BuildError::UnknownNode { u, v, missing: v })?;

        if let Some(weight) = weight {
            let crow_flies = u_node.distance_to(&v_node);
            if weight + 1e-6 < crow_flies {
                log::warn!(
                    "edge {u}-{v} weight {weight:.3} is below crow-flies distance {crow_flies:.3} - \
                     A* heuristics may overestimate"
                );
            }
        }

        self.set_edge(u, Edge { to: v, weight });
        self.set_edge(v, Edge { to: u, weight });
        Ok(())
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// Distances are approximated by treating lat-lon as a flat plane, which
    /// is only accurate for graphs spanning a small area. If multiple nodes
    /// are equally close, the one with the lowest id wins.
    ///
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.iter()
            .map(|nd| (planar_distance(lat, lon, nd.lat, nd.lon), nd))
            .fold(None, |best: Option<(f64, &Node)>, (dist, nd)| match best {
                Some((best_dist, _)) if best_dist <= dist => best,
                _ => Some((dist, nd)),
            })
            .map(|(_, &nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the [Edge] from one node to another, if such an edge exists.
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> Option<Edge> {
        self.get_edges(from_id)
            .iter()
            .find(|edge| edge.to == to_id)
            .copied()
    }

    fn set_edge(&mut self, from_id: i64, edge: Edge) {
        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                *candidate = edge;
            } else {
                edges.push(edge);
            }
        }
    }
}
