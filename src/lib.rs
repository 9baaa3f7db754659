// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routing over graphs derived from recorded trajectories.
//!
//! A [Graph] is built either from an explicit node/edge description or from a chain of
//! [TrackPoints](TrackPoint) (e.g. a GPX track). Routes are found with a generic A* search,
//! [find_route], parametrized by a [CostModel](cost::CostModel). Three models are provided:
//! [shortest distance](cost::DistanceCost), [energy-aware](cost::EnergyCost) and
//! [least-turn](cost::LeastTurnCost).
//!
//! The [Router] ties it all together: it keeps the most recently loaded graph in a
//! [GraphStore], and answers [compute_route](Router::compute_route) queries.
//!
//! # Example
//!
//! ```no_run
//! let router = trackroute::Router::new(trackroute::FileSource::default());
//! let route = router
//!     .compute_route("path/to/track.gpx", 0, 120, trackroute::RouteMode::LeastTurn)
//!     .expect("failed to find route");
//!
//! println!("{} turns over {:.0} m", route.turn_count, route.total_physical_distance);
//! ```

mod astar;
pub mod cost;
mod distance;
mod error;
mod graph;
mod router;
pub mod source;
mod store;

pub use astar::{find_route, Route, SearchError, DEFAULT_STEP_LIMIT};
pub use distance::{earth_distance, initial_bearing, planar_distance, turn_angle};
pub use error::{Error, ErrorKind};
pub use graph::{BuildError, Graph};
pub use router::{RouteMode, RouteRequest, RouteResult, Router, RouterOptions};
pub use source::{FileFormat, FileSource, GraphDescription, GraphSource, RawEdge, RawGraph, RawNode};
pub use store::GraphStore;

/// Represents an element of the [Graph].
///
/// `elevation` is in meters and defaults to zero when the source doesn't provide it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

impl Node {
    #[inline]
    pub(crate) fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Great-circle distance to another node, in meters.
    #[inline]
    pub fn distance_to(&self, other: &Node) -> f64 {
        earth_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Represents an outgoing connection from a specific [Node].
///
/// Every undirected connection is stored as two edges, one in each direction,
/// with identical weights.
///
/// `weight` is the base traversal cost in meters. When absent, it is derived
/// from the crow-flies distance between the two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub weight: Option<f64>,
}

impl Edge {
    /// Returns the base traversal cost of this edge, starting at `from` and ending at `to`.
    #[inline]
    pub fn base_cost(&self, from: &Node, to: &Node) -> f64 {
        self.weight.unwrap_or_else(|| from.distance_to(to))
    }
}

/// A single sample of a recorded trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, elevation: f64) -> Self {
        Self {
            lat,
            lon,
            elevation,
        }
    }
}
