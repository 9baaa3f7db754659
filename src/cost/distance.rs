// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{CostModel, Step};
use crate::{Edge, Graph, Node};

/// Prices every edge at its physical length.
///
/// The crow-flies heuristic never overestimates and satisfies the triangle
/// inequality, so routes found with this model are optimal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DistanceCost;

impl CostModel for DistanceCost {
    type Context = ();

    fn initial_context(&self) -> Self::Context {}

    fn step(&self, _: &Graph, from: &Node, _: (), edge: &Edge, to: &Node) -> Option<Step<()>> {
        Some(Step {
            cost: edge.base_cost(from, to),
            context: (),
            turn: false,
        })
    }

    #[inline]
    fn heuristic(&self, node: &Node, goal: &Node) -> f64 {
        node.distance_to(goal)
    }

    fn cost_units(&self) -> &'static str {
        "meters"
    }
}
