//! Engine-level error types.

use thiserror::Error;

/// Errors produced while parsing or validating workflow data.
///
/// The eligibility evaluator itself never fails; these only surface from
/// graph validation and status parsing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: {0}")]
    DuplicateNodeId(i64),

    /// A trigger or join references a node ID that doesn't exist in the workflow.
    #[error("node {node_id} references unknown node {missing} ({relation})")]
    UnknownNodeReference {
        node_id: i64,
        missing: i64,
        relation: &'static str,
    },

    /// A trigger's ids disagree with the nodes it links.
    #[error("trigger {parent} -> {child} does not match the nodes it links")]
    InconsistentTrigger { parent: i64, child: i64 },

    /// Topological sort detected a cycle.
    #[error("workflow graph contains a cycle")]
    CycleDetected,

    /// A status string outside the closed run-status set.
    #[error("unknown run status '{0}'")]
    UnknownStatus(String),
}
