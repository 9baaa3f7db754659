// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::TrackPoint;

/// A node of a [RawGraph].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "ele", skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

/// An undirected connection of a [RawGraph], with its length in meters.
/// If the weight is missing, the crow-flies distance between `u` and `v` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub u: i64,
    pub v: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Explicit description of a graph, as nodes and edges:
///
/// ```json
/// {
///   "nodes": [{"id": 1, "lat": 52.23, "lon": 21.01}, {"id": 2, "lat": 52.24, "lon": 21.01}],
///   "edges": [{"u": 1, "v": 2, "weight": 1113.2}]
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

/// Anything a [Graph](crate::Graph) can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphDescription {
    /// Nodes and edges, given explicitly.
    Explicit(RawGraph),

    /// A recorded trajectory, where consecutive samples are connected.
    PointChain(Vec<TrackPoint>),
}
