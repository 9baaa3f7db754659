// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{CostModel, Step};
use crate::{Edge, Graph, Node};

/// Default multiplier applied to distances by [EnergyPolicy::Uniform].
pub const ENERGY_PENALTY_FACTOR: f64 = 1.2;

/// Default weight of squared elevation gain in [EnergyPolicy::ClimbSensitive].
pub const CLIMB_WEIGHT: f64 = 1.0;

/// How "energy" is derived from an edge.
///
/// The two policies are not interchangeable: they generally prefer different routes,
/// and their costs are not comparable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyPolicy {
    /// Every meter costs `factor` (≥ 1) energy units, regardless of terrain.
    ///
    /// The heuristic is scaled by the same factor, so found routes are optimal.
    Uniform { factor: f64 },

    /// Every meter costs one unit, and every climb additionally costs
    /// `weight × (elevation gain)²`. Descents are free.
    ///
    /// The heuristic is the plain crow-flies distance, which does not account
    /// for climbs still ahead.
    ClimbSensitive { weight: f64 },
}

impl Default for EnergyPolicy {
    fn default() -> Self {
        Self::Uniform {
            factor: ENERGY_PENALTY_FACTOR,
        }
    }
}

/// Prices edges by the energy needed to traverse them, as per an [EnergyPolicy].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EnergyCost {
    pub policy: EnergyPolicy,
}

impl EnergyCost {
    pub fn new(policy: EnergyPolicy) -> Self {
        Self { policy }
    }
}

impl CostModel for EnergyCost {
    type Context = ();

    fn initial_context(&self) -> Self::Context {}

    fn step(&self, _: &Graph, from: &Node, _: (), edge: &Edge, to: &Node) -> Option<Step<()>> {
        let base = edge.base_cost(from, to);
        let cost = match self.policy {
            EnergyPolicy::Uniform { factor } => base * factor,
            EnergyPolicy::ClimbSensitive { weight } => {
                let gain = (to.elevation - from.elevation).max(0.0);
                base + weight * gain * gain
            }
        };

        Some(Step {
            cost,
            context: (),
            turn: false,
        })
    }

    fn heuristic(&self, node: &Node, goal: &Node) -> f64 {
        match self.policy {
            EnergyPolicy::Uniform { factor } => node.distance_to(goal) * factor,
            EnergyPolicy::ClimbSensitive { .. } => node.distance_to(goal),
        }
    }

    fn cost_units(&self) -> &'static str {
        "energy-weighted meters"
    }
}
