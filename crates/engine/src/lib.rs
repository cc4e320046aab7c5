//! `engine` crate — workflow and run models, graph helpers, and the re-run
//! eligibility decision used by the console.

pub mod models;
pub mod error;
pub mod dag;
pub mod eligibility;

pub use models::{
    NodeRunMap, NodeType, Permissions, Project, RunStatus, WNode, Workflow, WorkflowData,
    WorkflowNodeRun, WorkflowRun,
};
pub use error::EngineError;
pub use dag::{get_node_by_id, get_parent_node_ids, validate_graph};
pub use eligibility::{can_be_run, is_runnable, Selection};
