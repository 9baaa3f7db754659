// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Edge cost models used by [find_route](crate::find_route).
//!
//! A cost model decides how much it costs to traverse an [Edge] and provides
//! a heuristic estimate of the remaining cost to the goal. Some models need
//! more than the current node to price a step (e.g. the [LeastTurnCost] needs
//! to know where the route came from); such models carry the extra information
//! in their [Context](CostModel::Context), which becomes part of the search state.

use std::fmt::Debug;
use std::hash::Hash;

use crate::{Edge, Graph, Node};

mod distance;
mod energy;
mod least_turn;

pub use distance::DistanceCost;
pub use energy::{EnergyCost, EnergyPolicy, CLIMB_WEIGHT, ENERGY_PENALTY_FACTOR};
pub use least_turn::{LeastTurnCost, SHARP_TURN_THRESHOLD_DEG, TURN_PENALTY};

/// Outcome of traversing a single [Edge].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<C> {
    /// Non-negative cost of the traversal.
    pub cost: f64,

    /// Context of the search state after the traversal.
    pub context: C,

    /// Whether the traversal counts as a change of direction.
    pub turn: bool,
}

/// Describes how to price traversals of a [Graph].
pub trait CostModel {
    /// Bounded, per-state information beyond the node id.
    /// Models which only care about the current node use `()`.
    type Context: Copy + Eq + Hash + Debug;

    /// Context of the initial search state.
    fn initial_context(&self) -> Self::Context;

    /// Prices a traversal of `edge` from `from` (reached with `context`) to `to`.
    ///
    /// Returns `None` if the traversal is not allowed.
    fn step(
        &self,
        g: &Graph,
        from: &Node,
        context: Self::Context,
        edge: &Edge,
        to: &Node,
    ) -> Option<Step<Self::Context>>;

    /// Estimates the remaining cost from `node` to `goal`. Must be non-negative.
    fn heuristic(&self, node: &Node, goal: &Node) -> f64;

    /// Human-readable name of the unit in which costs are expressed.
    fn cost_units(&self) -> &'static str;
}
