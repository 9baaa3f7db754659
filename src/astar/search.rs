// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::cost::CostModel;
use crate::{Graph, SearchError};

/// A route found by [find_route].
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Ids of the nodes along the route, starting at the start node and ending at the goal.
    pub nodes: Vec<i64>,

    /// Total cost of the route, in [cost model units](CostModel::cost_units).
    pub cost: f64,

    /// Number of turns recorded for the goal node.
    pub turns: u32,
}

/// Search state: a node plus whatever context the cost model needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State<C> {
    node_id: i64,
    context: C,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem<C> {
    at: State<C>,
    cost: f64,
    score: f64,
    seq: u64,
}

impl<C> PartialEq for QueueItem<C> {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score).is_eq() && self.seq == other.seq
    }
}

impl<C> PartialOrd for QueueItem<C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Eq for QueueItem<C> {}

impl<C> Ord for QueueItem<C> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions among equal scores) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path<C: Copy + Eq + Hash>(
    came_from: &HashMap<State<C>, State<C>>,
    mut last: State<C>,
) -> Vec<i64> {
    let mut path = vec![last.node_id];

    while let Some(&state) = came_from.get(&last) {
        path.push(state.node_id);
        last = state;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the cheapest route between two nodes in the provided graph,
/// as priced by the provided [CostModel].
///
/// Returns `Ok(None)` if there is no route between the two nodes.
///
/// The search is over states, not nodes: a state is a node together with the
/// model's [Context](CostModel::Context). Thus, models whose costs depend on how
/// a node was reached (like [LeastTurnCost](crate::cost::LeastTurnCost)) may visit
/// a node multiple times.
///
/// Whenever a cheaper way to reach a node is recorded, the number of turns
/// along it is remembered. The count remembered for the goal is returned
/// as [Route::turns].
///
/// `step_limit` limits how many states may be expanded during the search
/// before returning [SearchError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all states accessible from the start, which may be very time-consuming.
/// The recommended value is [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route<M: CostModel>(
    g: &Graph,
    model: &M,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Option<Route>, SearchError> {
    let mut queue: BinaryHeap<QueueItem<M::Context>> = BinaryHeap::default();
    let mut came_from: HashMap<State<M::Context>, State<M::Context>> = HashMap::default();
    let mut known_costs: HashMap<State<M::Context>, f64> = HashMap::default();
    let mut best_per_node: HashMap<i64, (f64, u32)> = HashMap::default();
    let mut seq: u64 = 0;
    let mut steps: usize = 0;

    let to_node = g
        .get_node(to_id)
        .ok_or(SearchError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(SearchError::InvalidReference(from_id))?;

        let initial_at = State {
            node_id: from_id,
            context: model.initial_context(),
        };

        queue.push(QueueItem {
            at: initial_at,
            cost: 0.0,
            score: model.heuristic(&from_node, &to_node),
            seq,
        });
        known_costs.insert(initial_at, 0.0);
        best_per_node.insert(from_id, (0.0, 0));
    }

    while let Some(item) = queue.pop() {
        // The queue has no decrease-key, so it may contain outdated entries for the same state.
        match known_costs.get(&item.at) {
            Some(&known) if item.cost > known => continue,
            _ => {}
        }

        if item.at.node_id == to_id {
            let turns = best_per_node.get(&to_id).map_or(0, |&(_, turns)| turns);
            log::debug!(
                "route {} → {} found after {} expansions, cost {:.3}",
                from_id,
                to_id,
                steps,
                item.cost,
            );
            return Ok(Some(Route {
                nodes: reconstruct_path(&came_from, item.at),
                cost: item.cost,
                turns,
            }));
        }

        steps += 1;
        if steps > step_limit {
            return Err(SearchError::StepLimitExceeded(step_limit));
        }

        let Some(at_node) = g.get_node(item.at.node_id) else {
            continue;
        };
        let turns_so_far = best_per_node
            .get(&item.at.node_id)
            .map_or(0, |&(_, turns)| turns);

        for edge in g.get_edges(item.at.node_id) {
            let Some(neighbor) = g.get_node(edge.to) else {
                continue;
            };

            let Some(step) = model.step(g, &at_node, item.at.context, edge, &neighbor) else {
                continue;
            };

            let neighbor_at = State {
                node_id: edge.to,
                context: step.context,
            };

            // Check if this is the cheapest way to the neighbor state
            let neighbor_cost = item.cost + step.cost;
            match known_costs.get(&neighbor_at) {
                Some(&known) if known <= neighbor_cost => continue,
                _ => {}
            }

            // Remember the turn count along the cheapest known way to the neighbor node
            let improves_node = match best_per_node.get(&edge.to) {
                Some(&(best, _)) => neighbor_cost < best,
                None => true,
            };
            if improves_node {
                let turns = turns_so_far + u32::from(step.turn);
                best_per_node.insert(edge.to, (neighbor_cost, turns));
            }

            // Push the new item into the queue
            came_from.insert(neighbor_at, item.at);
            known_costs.insert(neighbor_at, neighbor_cost);
            seq += 1;
            queue.push(QueueItem {
                at: neighbor_at,
                cost: neighbor_cost,
                score: neighbor_cost + model.heuristic(&neighbor, &to_node),
                seq,
            });
        }
    }

    log::debug!(
        "no route {} → {} after {} expansions",
        from_id,
        to_id,
        steps
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{DistanceCost, EnergyCost, EnergyPolicy, LeastTurnCost, TURN_PENALTY};
    use crate::{Node, RawEdge, RawGraph, RawNode, TrackPoint, DEFAULT_STEP_LIMIT};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-6),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn path_distance(g: &Graph, nodes: &[i64]) -> f64 {
        nodes
            .windows(2)
            .map(|pair| {
                let a = g.get_node(pair[0]).unwrap();
                let b = g.get_node(pair[1]).unwrap();
                a.distance_to(&b)
            })
            .sum()
    }

    fn node(id: i64, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id,
            lat,
            lon,
            elevation: None,
        }
    }

    fn edge(u: i64, v: i64) -> RawEdge {
        RawEdge { u, v, weight: None }
    }

    /// A(0,0), B(0,0.001), C(0,0.002), D(0,0.003), linked A-B-C-D
    fn abcd() -> Graph {
        Graph::from_point_chain(&[
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.001, 0.0),
            TrackPoint::new(0.0, 0.002, 0.0),
            TrackPoint::new(0.0, 0.003, 0.0),
        ])
        .unwrap()
    }

    // 1 ── 2 ── 3 ── 4
    //      │         │
    //      5 ─────── 6
    fn ladder() -> Graph {
        Graph::from_raw(&RawGraph {
            nodes: vec![
                node(1, 0.0, 0.0),
                node(2, 0.0, 0.001),
                node(3, 0.0, 0.002),
                node(4, 0.0, 0.003),
                node(5, -0.001, 0.001),
                node(6, -0.001, 0.003),
            ],
            edges: vec![
                edge(1, 2),
                edge(2, 3),
                edge(3, 4),
                edge(2, 5),
                edge(5, 6),
                edge(6, 4),
            ],
        })
        .unwrap()
    }

    #[test]
    fn shortest_on_chain() {
        let g = abcd();
        let route = find_route(&g, &DistanceCost, 0, 3, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(route.nodes, vec![0, 1, 2, 3]);
        assert_almost_eq!(route.cost, path_distance(&g, &[0, 1, 2, 3]));
        assert_eq!(route.turns, 0);
    }

    #[test]
    fn shortest_on_chain_backwards() {
        let g = abcd();
        let route = find_route(&g, &DistanceCost, 3, 0, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(route.nodes, vec![3, 2, 1, 0]);
    }

    #[test]
    fn least_turn_on_straight_chain() {
        let g = abcd();
        let route = find_route(&g, &LeastTurnCost::default(), 0, 3, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(route.nodes, vec![0, 1, 2, 3]);
        assert_eq!(route.turns, 0);
        assert_almost_eq!(route.cost, path_distance(&g, &[0, 1, 2, 3]));
    }

    #[test]
    fn least_turn_counts_a_single_sharp_turn() {
        // Same segment lengths as abcd(), but turning right at the third node
        let g = Graph::from_point_chain(&[
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.001, 0.0),
            TrackPoint::new(0.0, 0.002, 0.0),
            TrackPoint::new(-0.001, 0.002, 0.0),
        ])
        .unwrap();
        let straight = abcd();

        let turned = find_route(&g, &LeastTurnCost::default(), 0, 3, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        let baseline = find_route(&straight, &LeastTurnCost::default(), 0, 3, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();

        assert_eq!(turned.nodes, vec![0, 1, 2, 3]);
        assert_eq!(turned.turns, baseline.turns + 1);
        assert_almost_eq!(
            turned.cost - path_distance(&g, &turned.nodes),
            TURN_PENALTY
        );
        assert_almost_eq!(
            turned.cost - baseline.cost,
            TURN_PENALTY + path_distance(&g, &turned.nodes) - path_distance(&straight, &baseline.nodes)
        );
    }

    #[test]
    fn least_turn_trades_distance_for_fewer_turns() {
        //        2
        //      ╱   ╲
        //    1       5
        //     ╲     ╱
        //      3 ─ 4
        // 1-2-5 is shorter, but has a sharp bend at 2.
        // 1-3-4-5 only bends by ~40° at 3 and 4.
        let g = Graph::from_raw(&RawGraph {
            nodes: vec![
                node(1, 0.0, 0.0),
                node(2, 0.0005, 0.001),
                node(3, -0.00064, 0.00077),
                node(4, -0.00064, 0.00123),
                node(5, 0.0, 0.002),
            ],
            edges: vec![edge(1, 2), edge(2, 5), edge(1, 3), edge(3, 4), edge(4, 5)],
        })
        .unwrap();

        let shortest = find_route(&g, &DistanceCost, 1, 5, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(shortest.nodes, vec![1, 2, 5]);

        let least_turn = find_route(&g, &LeastTurnCost::default(), 1, 5, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(least_turn.nodes, vec![1, 3, 4, 5]);
        assert_eq!(least_turn.turns, 0);
        assert_almost_eq!(least_turn.cost, path_distance(&g, &least_turn.nodes));
        assert!(least_turn.cost < shortest.cost + TURN_PENALTY);
    }

    #[test]
    fn least_turn_keeps_costlier_arrival_with_better_heading() {
        //              5
        //              │
        //    1 ─────── 4
        //     ╲       ╱
        //      2 ─ 3
        // The direct 1-4 arrival is cheapest at 4, but heads east, so 4-5 bends by ~80°.
        // The 1-2-3-4 arrival is ~26 m longer and only bends by ~40° at 2, 3 and 4.
        // Both arrivals at 4 must be kept apart for the second one to win.
        let g = Graph::from_raw(&RawGraph {
            nodes: vec![
                node(1, 0.0, 0.0),
                node(2, -0.00025, 0.000433),
                node(3, -0.000163, 0.000925),
                node(4, 0.00022, 0.001247),
                node(5, 0.00072, 0.001247),
            ],
            edges: vec![edge(1, 2), edge(2, 3), edge(3, 4), edge(1, 4), edge(4, 5)],
        })
        .unwrap();

        let shortest = find_route(&g, &DistanceCost, 1, 5, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(shortest.nodes, vec![1, 4, 5]);

        let least_turn = find_route(&g, &LeastTurnCost::default(), 1, 5, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(least_turn.nodes, vec![1, 2, 3, 4, 5]);
        assert_eq!(least_turn.turns, 0);
        assert_almost_eq!(least_turn.cost, path_distance(&g, &least_turn.nodes));
        assert!(least_turn.cost > shortest.cost);
        assert!(least_turn.cost < shortest.cost + TURN_PENALTY);
    }

    #[test]
    fn outdated_queue_entries_are_not_expanded() {
        // 1 ─ 2 ─ 3 ═ 4, with an expensive shortcut 1-3 and a very expensive 3-4.
        // 3 is queued via the shortcut first, then improved via 2. The outdated
        // entry is popped before the goal, and must neither count as a step
        // nor affect the result.
        let g = Graph::from_raw(&RawGraph {
            nodes: vec![
                node(1, 0.0, 0.0),
                node(2, 0.0, 0.001),
                node(3, 0.0, 0.002),
                node(4, 0.0, 0.003),
            ],
            edges: vec![
                edge(1, 2),
                edge(2, 3),
                RawEdge {
                    u: 1,
                    v: 3,
                    weight: Some(300.0),
                },
                RawEdge {
                    u: 3,
                    v: 4,
                    weight: Some(1000.0),
                },
            ],
        })
        .unwrap();

        let route = find_route(&g, &DistanceCost, 1, 4, 3).unwrap().unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3, 4]);
        assert_almost_eq!(route.cost, path_distance(&g, &[1, 2, 3]) + 1000.0);

        assert_eq!(
            find_route(&g, &DistanceCost, 1, 4, 2),
            Err(SearchError::StepLimitExceeded(2))
        );
    }

    #[test]
    fn shortest_picks_cheaper_branch() {
        let g = ladder();
        let route = find_route(&g, &DistanceCost, 1, 4, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3, 4]);
        assert_almost_eq!(route.cost, path_distance(&g, &route.nodes));
    }

    #[test]
    fn explicit_weights_are_respected() {
        // Make the straight 2-3 connection very expensive
        let mut g = ladder();
        let crow_flies = g.get_node(2).unwrap().distance_to(&g.get_node(3).unwrap());
        g.add_edge(2, 3, Some(crow_flies * 10.0)).unwrap();

        let route = find_route(&g, &DistanceCost, 1, 4, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes, vec![1, 2, 5, 6, 4]);
    }

    #[test]
    fn energy_is_never_cheaper_than_distance() {
        let g = ladder();
        for (from, to) in [(1, 4), (4, 1), (5, 3), (1, 5)] {
            let shortest = find_route(&g, &DistanceCost, from, to, DEFAULT_STEP_LIMIT)
                .unwrap()
                .unwrap();
            let energy = find_route(&g, &EnergyCost::default(), from, to, DEFAULT_STEP_LIMIT)
                .unwrap()
                .unwrap();

            assert_eq!(energy.nodes, shortest.nodes);
            assert!(energy.cost >= shortest.cost);
            assert_almost_eq!(energy.cost, shortest.cost * 1.2);
        }
    }

    #[test]
    fn climb_sensitive_energy_avoids_hills() {
        // Both branches have the same length, but the upper one climbs a hill.
        let g = Graph::from_raw(&RawGraph {
            nodes: vec![
                node(1, 0.0, 0.0),
                RawNode {
                    id: 2,
                    lat: 0.001,
                    lon: 0.001,
                    elevation: Some(30.0),
                },
                node(3, -0.001, 0.001),
                node(4, 0.0, 0.002),
            ],
            edges: vec![edge(1, 2), edge(2, 4), edge(1, 3), edge(3, 4)],
        })
        .unwrap();

        let model = EnergyCost::new(EnergyPolicy::ClimbSensitive { weight: 1.0 });
        let route = find_route(&g, &model, 1, 4, DEFAULT_STEP_LIMIT)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes, vec![1, 3, 4]);
        assert_almost_eq!(route.cost, path_distance(&g, &route.nodes));
    }

    #[test]
    fn start_is_goal() {
        let g = abcd();
        let route = find_route(&g, &LeastTurnCost::default(), 2, 2, 0)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes, vec![2]);
        assert_eq!(route.cost, 0.0);
        assert_eq!(route.turns, 0);
    }

    #[test]
    fn disconnected() {
        let mut g = abcd();
        g.add_node(Node {
            id: 10,
            lat: 1.0,
            lon: 1.0,
            elevation: 0.0,
        })
        .unwrap();

        assert_eq!(
            find_route(&g, &DistanceCost, 0, 10, DEFAULT_STEP_LIMIT),
            Ok(None)
        );
        assert_eq!(
            find_route(&g, &LeastTurnCost::default(), 10, 0, DEFAULT_STEP_LIMIT),
            Ok(None)
        );
    }

    #[test]
    fn invalid_reference() {
        let g = abcd();
        assert_eq!(
            find_route(&g, &DistanceCost, 0, 42, DEFAULT_STEP_LIMIT),
            Err(SearchError::InvalidReference(42))
        );
        assert_eq!(
            find_route(&g, &DistanceCost, -1, 3, DEFAULT_STEP_LIMIT),
            Err(SearchError::InvalidReference(-1))
        );
    }

    #[test]
    fn step_limit() {
        let g = abcd();
        assert_eq!(
            find_route(&g, &DistanceCost, 0, 3, 2),
            Err(SearchError::StepLimitExceeded(2))
        );
        assert!(find_route(&g, &DistanceCost, 0, 3, 3).unwrap().is_some());
    }

    #[test]
    fn equal_scores_are_expanded_in_insertion_order() {
        let a = QueueItem {
            at: State {
                node_id: 7,
                context: (),
            },
            cost: 1.0,
            score: 5.0,
            seq: 2,
        };
        let b = QueueItem {
            at: State {
                node_id: 3,
                context: (),
            },
            cost: 2.0,
            score: 5.0,
            seq: 1,
        };
        let c = QueueItem {
            at: State {
                node_id: 1,
                context: (),
            },
            cost: 0.0,
            score: 4.0,
            seq: 3,
        };

        let mut queue = BinaryHeap::from([a, b, c]);
        assert_eq!(queue.pop().unwrap().at.node_id, 1);
        assert_eq!(queue.pop().unwrap().at.node_id, 3);
        assert_eq!(queue.pop().unwrap().at.node_id, 7);
    }
}
