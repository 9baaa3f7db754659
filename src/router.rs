// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::cost::{CostModel, DistanceCost, EnergyCost, EnergyPolicy, LeastTurnCost};
use crate::{find_route, Error, Graph, GraphSource, GraphStore, Node, DEFAULT_STEP_LIMIT};

/// Selects the [CostModel] used to find a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Minimize distance, see [DistanceCost].
    Shortest,

    /// Minimize distance and the number of sharp turns, see [LeastTurnCost].
    LeastTurn,

    /// Minimize energy, see [EnergyCost].
    EnergyEfficient,
}

impl RouteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "shortest",
            Self::LeastTurn => "least_turn",
            Self::EnergyEfficient => "energy_efficient",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "shortest" => Ok(Self::Shortest),
            "least_turn" => Ok(Self::LeastTurn),
            "energy_efficient" | "energy" => Ok(Self::EnergyEfficient),
            _ => Err(Error::Validation(format!(
                "unknown mode {:?} - expected shortest, least_turn or energy_efficient",
                s
            ))),
        }
    }
}

/// Tunables of the [Router].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterOptions {
    /// Maximum number of states expanded by a single search.
    pub step_limit: usize,

    /// Policy of [RouteMode::EnergyEfficient] searches.
    pub energy: EnergyPolicy,

    /// Parameters of [RouteMode::LeastTurn] searches.
    pub least_turn: LeastTurnCost,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            energy: EnergyPolicy::default(),
            least_turn: LeastTurnCost::default(),
        }
    }
}

impl RouterOptions {
    /// Checks that all tunables keep step costs non-negative and penalties monotonic.
    pub fn validate(&self) -> Result<(), Error> {
        if self.step_limit == 0 {
            return Err(Error::Validation("step limit must be positive".to_string()));
        }

        match self.energy {
            EnergyPolicy::Uniform { factor } if !(factor.is_finite() && factor >= 1.0) => {
                return Err(Error::Validation(format!(
                    "energy factor must be at least 1, got {}",
                    factor
                )));
            }
            EnergyPolicy::ClimbSensitive { weight } if !(weight.is_finite() && weight >= 0.0) => {
                return Err(Error::Validation(format!(
                    "climb weight must be non-negative, got {}",
                    weight
                )));
            }
            _ => {}
        }

        let LeastTurnCost {
            threshold_deg,
            penalty,
        } = self.least_turn;
        if !(0.0..=180.0).contains(&threshold_deg) {
            return Err(Error::Validation(format!(
                "turn threshold must be within 0-180 degrees, got {}",
                threshold_deg
            )));
        }
        if !(penalty.is_finite() && penalty >= 0.0) {
            return Err(Error::Validation(format!(
                "turn penalty must be non-negative, got {}",
                penalty
            )));
        }

        Ok(())
    }
}

/// A validated routing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub descriptor: String,
    pub start: i64,
    pub end: i64,
    pub mode: RouteMode,
}

impl RouteRequest {
    /// Validates untyped routing parameters, e.g. coming from a query string.
    pub fn parse(
        descriptor: &str,
        start: Option<&str>,
        end: Option<&str>,
        mode: Option<&str>,
    ) -> Result<Self, Error> {
        if descriptor.trim().is_empty() {
            return Err(Error::Validation("missing graph source".to_string()));
        }

        Ok(Self {
            descriptor: descriptor.to_string(),
            start: parse_node_id("start", start)?,
            end: parse_node_id("end", end)?,
            mode: mode
                .ok_or_else(|| Error::Validation("missing mode".to_string()))?
                .parse()?,
        })
    }
}

fn parse_node_id(name: &str, value: Option<&str>) -> Result<i64, Error> {
    let value = value.ok_or_else(|| Error::Validation(format!("missing {} node", name)))?;
    value
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("{} node must be an integer, got {:?}", name, value)))
}

/// A route found by the [Router], with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub mode: RouteMode,

    /// Ids of nodes along the route, from start to end.
    pub path_node_ids: Vec<i64>,

    /// `[lat, lon]` of every node in [path_node_ids](RouteResult::path_node_ids).
    pub path_coordinates: Vec<[f64; 2]>,

    /// Cost of the route, in [cost_units](RouteResult::cost_units).
    pub total_cost: f64,

    /// Sum of great-circle distances between consecutive nodes, in meters,
    /// regardless of edge weights.
    pub total_physical_distance: f64,

    /// Number of sharp turns along the route. Always zero outside of [RouteMode::LeastTurn].
    pub turn_count: u32,

    pub cost_units: &'static str,
}

/// Answers routing queries over graphs fetched from a [GraphSource].
///
/// The most recently used graph is kept in a [GraphStore], so consecutive queries
/// against the same descriptor only fetch and build the graph once.
#[derive(Debug)]
pub struct Router<S: GraphSource> {
    store: GraphStore,
    source: S,
    options: RouterOptions,
}

impl<S: GraphSource> Router<S> {
    pub fn new(source: S) -> Self {
        Self {
            store: GraphStore::new(),
            source,
            options: RouterOptions::default(),
        }
    }

    /// Creates a router with custom tunables, rejecting them with
    /// [Error::Validation] if [RouterOptions::validate] fails.
    pub fn with_options(source: S, options: RouterOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            store: GraphStore::new(),
            source,
            options,
        })
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Finds a route between two nodes of the graph identified by `descriptor`.
    pub fn compute_route(
        &self,
        descriptor: &str,
        start_id: i64,
        end_id: i64,
        mode: RouteMode,
    ) -> Result<RouteResult, Error> {
        let g = self.store.load(descriptor, &self.source)?;
        match mode {
            RouteMode::Shortest => self.run(&g, &DistanceCost, start_id, end_id, mode),
            RouteMode::LeastTurn => self.run(&g, &self.options.least_turn, start_id, end_id, mode),
            RouteMode::EnergyEfficient => {
                let model = EnergyCost::new(self.options.energy);
                self.run(&g, &model, start_id, end_id, mode)
            }
        }
    }

    /// Same as [compute_route](Router::compute_route), but takes a [RouteRequest].
    pub fn compute(&self, request: &RouteRequest) -> Result<RouteResult, Error> {
        self.compute_route(&request.descriptor, request.start, request.end, request.mode)
    }

    /// Finds the node closest to the provided position in the graph identified by `descriptor`.
    pub fn nearest_node(&self, descriptor: &str, lat: f64, lon: f64) -> Result<Node, Error> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(Error::Validation(format!(
                "invalid position {}, {}",
                lat, lon
            )));
        }

        let g = self.store.load(descriptor, &self.source)?;
        g.find_nearest_node(lat, lon)
            .ok_or_else(|| Error::EmptyGraph(descriptor.to_string()))
    }

    fn run<M: CostModel>(
        &self,
        g: &Graph,
        model: &M,
        start_id: i64,
        end_id: i64,
        mode: RouteMode,
    ) -> Result<RouteResult, Error> {
        for id in [start_id, end_id] {
            if g.get_node(id).is_none() {
                return Err(Error::NodeNotFound(id));
            }
        }

        let route = find_route(g, model, start_id, end_id, self.options.step_limit)?.ok_or(
            Error::NoPath {
                start: start_id,
                end: end_id,
            },
        )?;

        let nodes = route
            .nodes
            .iter()
            .map(|&id| {
                g.get_node(id)
                    .ok_or_else(|| Error::Internal(format!("route references missing node {}", id)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_physical_distance: f64 = nodes.windows(2).map(|w| w[0].distance_to(&w[1])).sum();

        log::debug!(
            "{} route from {} to {}: {} nodes, cost {:.1} {}",
            mode,
            start_id,
            end_id,
            nodes.len(),
            route.cost,
            model.cost_units(),
        );

        Ok(RouteResult {
            mode,
            path_coordinates: nodes.iter().map(|n| [n.lat, n.lon]).collect(),
            path_node_ids: route.nodes,
            total_cost: route.cost,
            total_physical_distance,
            turn_count: route.turns,
            cost_units: model.cost_units(),
        })
    }
}
