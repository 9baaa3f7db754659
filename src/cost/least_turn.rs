// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{CostModel, Step};
use crate::{turn_angle, Edge, Graph, Node};

/// Direction change (in degrees) above which a step counts as a turn.
pub const SHARP_TURN_THRESHOLD_DEG: f64 = 45.0;

/// Extra cost of a turn, in meters-equivalent.
pub const TURN_PENALTY: f64 = 50.0;

/// Prices edges by their length, plus a fixed penalty whenever the
/// heading changes by more than a threshold.
///
/// Because the cost of a step depends on the direction of arrival, the search
/// state has to include the predecessor node. Immediate turnarounds (A-B-A)
/// are not allowed.
///
/// The heuristic is the crow-flies distance. It doesn't look ahead at turns,
/// so the search is guided by distance only and explores more states than
/// an estimate aware of upcoming turns would.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeastTurnCost {
    /// Direction change, in degrees, above which a step counts as a turn.
    pub threshold_deg: f64,

    /// Extra cost added to every turn.
    pub penalty: f64,
}

impl Default for LeastTurnCost {
    fn default() -> Self {
        Self {
            threshold_deg: SHARP_TURN_THRESHOLD_DEG,
            penalty: TURN_PENALTY,
        }
    }
}

impl LeastTurnCost {
    fn is_turn(&self, before: &Node, at: &Node, after: &Node) -> bool {
        // Zero-length segments have no heading, and never count as turns
        turn_angle(before.position(), at.position(), after.position())
            .is_some_and(|angle| angle.to_degrees() > self.threshold_deg)
    }
}

impl CostModel for LeastTurnCost {
    /// Id of the node visited before the current one.
    type Context = Option<i64>;

    fn initial_context(&self) -> Self::Context {
        None
    }

    fn step(
        &self,
        g: &Graph,
        from: &Node,
        before: Option<i64>,
        edge: &Edge,
        to: &Node,
    ) -> Option<Step<Option<i64>>> {
        if before == Some(to.id) {
            return None;
        }

        let turn = before
            .and_then(|id| g.get_node(id))
            .is_some_and(|before| self.is_turn(&before, from, to));

        let mut cost = edge.base_cost(from, to);
        if turn {
            cost += self.penalty;
        }

        Some(Step {
            cost,
            context: Some(from.id),
            turn,
        })
    }

    #[inline]
    fn heuristic(&self, node: &Node, goal: &Node) -> f64 {
        node.distance_to(goal)
    }

    fn cost_units(&self) -> &'static str {
        "meters with turn penalties"
    }
}
