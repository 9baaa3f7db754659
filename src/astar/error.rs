// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Number of `(node, context)` states [find_route](crate::find_route) may expand
/// unless told otherwise. Least-turn searches expand one state per arrival direction,
/// so they reach the limit sooner than distance searches on the same graph.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Failures of [find_route](crate::find_route).
///
/// A search which completes without reaching the goal is not an error;
/// it returns `Ok(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// The start or goal id has no node in the graph.
    InvalidReference(i64),

    /// More states than the carried limit were expanded before the goal was reached.
    StepLimitExceeded(usize),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(node_id) => write!(f, "no such node: {}", node_id),
            Self::StepLimitExceeded(limit) => {
                write!(f, "gave up after expanding {} search states", limit)
            }
        }
    }
}

impl std::error::Error for SearchError {}
