// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::source::BoxError;
use crate::{BuildError, SearchError};

/// Errors surfaced by the [Router](crate::Router) and the [GraphStore](crate::GraphStore).
///
/// Use [Error::kind] to branch on the cause, rather than on the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The graph source failed, or returned a malformed description.
    #[error("failed to load graph from {descriptor:?}: {cause}")]
    GraphLoad {
        descriptor: String,
        #[source]
        cause: BoxError,
    },

    /// The graph source returned a description without any nodes.
    #[error("graph from {0:?} has no nodes")]
    EmptyGraph(String),

    /// The request is malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The start or end node doesn't exist in the graph.
    #[error("node {0} does not exist in the graph")]
    NodeNotFound(i64),

    /// There is no route between the start and end nodes.
    #[error("no path from {start} to {end}")]
    NoPath { start: i64, end: i64 },

    /// Route search gave up after expanding too many states.
    #[error("route search exceeded the limit of {0} steps")]
    BoundedSearchExceeded(usize),

    /// Any other failure. The message is safe to show to users.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable category of an [Error].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    GraphLoad,
    EmptyGraph,
    Validation,
    NodeNotFound,
    NoPath,
    BoundedSearchExceeded,
    Internal,
}

impl ErrorKind {
    /// Returns a symbolic code of this kind, which never changes between releases.
    pub fn code(self) -> &'static str {
        match self {
            Self::GraphLoad => "graph_load_error",
            Self::EmptyGraph => "empty_graph",
            Self::Validation => "validation_error",
            Self::NodeNotFound => "node_not_found",
            Self::NoPath => "no_path",
            Self::BoundedSearchExceeded => "bounded_search_exceeded",
            Self::Internal => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GraphLoad { .. } => ErrorKind::GraphLoad,
            Self::EmptyGraph(_) => ErrorKind::EmptyGraph,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NodeNotFound(_) => ErrorKind::NodeNotFound,
            Self::NoPath { .. } => ErrorKind::NoPath,
            Self::BoundedSearchExceeded(_) => ErrorKind::BoundedSearchExceeded,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn from_build(descriptor: &str, e: BuildError) -> Self {
        match e {
            BuildError::Empty => Self::EmptyGraph(descriptor.to_string()),
            other => Self::GraphLoad {
                descriptor: descriptor.to_string(),
                cause: Box::new(other),
            },
        }
    }
}

impl From<SearchError> for Error {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidReference(id) => Self::NodeNotFound(id),
            SearchError::StepLimitExceeded(limit) => Self::BoundedSearchExceeded(limit),
        }
    }
}
