//! Re-run eligibility.
//!
//! Decides whether the "run" action of a node menu is enabled, given what
//! the console currently has selected.  Pure: nothing here mutates its
//! inputs or holds state between calls.

use tracing::{debug, instrument};

use crate::dag::{get_node_by_id, get_parent_node_ids};
use crate::models::{WNode, Workflow, WorkflowNodeRun, WorkflowRun};

/// The four inputs the decision reads, borrowed from one store snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    /// Workflow on screen; `None` when nothing is loaded yet.
    pub workflow: Option<&'a Workflow>,
    /// Run being viewed, if any.
    pub workflow_run: Option<&'a WorkflowRun>,
    /// Node selected in the graph.
    pub node: Option<&'a WNode>,
    /// Specific past execution of that node.
    pub node_run: Option<&'a WorkflowNodeRun>,
}

impl<'a> Selection<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        Self {
            workflow: Some(workflow),
            ..Self::default()
        }
    }

    pub fn with_run(mut self, workflow_run: &'a WorkflowRun) -> Self {
        self.workflow_run = Some(workflow_run);
        self
    }

    pub fn with_node(mut self, node: &'a WNode) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_node_run(mut self, node_run: &'a WorkflowNodeRun) -> Self {
        self.node_run = Some(node_run);
        self
    }
}

/// Whether the selected node may be run.
///
/// Returns `None` when no workflow is loaded; callers must then keep the
/// action disabled.
#[instrument(
    level = "debug",
    skip_all,
    fields(
        node_id = selection.node.map(|n| n.id),
        node_run_id = selection.node_run.map(|r| r.id),
    )
)]
pub fn can_be_run(selection: Selection<'_>) -> Option<bool> {
    let Selection {
        workflow,
        workflow_run,
        node,
        node_run,
    } = selection;

    let workflow = workflow?;

    if !workflow.permissions.executable {
        debug!("workflow is not executable by the viewer");
        return Some(false);
    }

    // Inside a run with a specific node run selected, the API has already
    // decided for that attempt.
    if let (Some(node_run), Some(nodes)) = (node_run, workflow_run.and_then(|r| r.nodes.as_ref())) {
        let verdict = nodes
            .get(&node_run.workflow_node_id)
            .and_then(|runs| runs.iter().find(|r| r.id == node_run.id))
            .map(|r| r.can_be_run)
            .unwrap_or(false);
        debug!(verdict, "using the API verdict for the selected node run");
        return Some(verdict);
    }

    let run_is_finished = workflow_run.is_some_and(|r| !r.status.is_active());
    if run_is_finished && node_run.is_some() {
        debug!("run is finished and a node run is selected");
        return Some(true);
    }

    if let (Some(node), Some(run)) = (node, workflow_run) {
        let root_id = run.workflow.root_node_id();

        if run_is_finished && node_run.is_none() && node.id == root_id {
            debug!("root node of a finished run");
            return Some(true);
        }

        if root_id > 0 {
            return parents_allow_run(run, node.id);
        }
    }

    Some(true)
}

/// Same as [`can_be_run`], with "no workflow" read as disabled.
pub fn is_runnable(selection: Selection<'_>) -> bool {
    can_be_run(selection).unwrap_or(false)
}

/// Walk the parents of `node_id` against the latest attempt of every node
/// that ran.  Returns early on an active parent (`false`) or on a node run
/// whose node has since been removed from the definition (`true`).
fn parents_allow_run(run: &WorkflowRun, node_id: i64) -> Option<bool> {
    let parent_ids = get_parent_node_ids(run, node_id);
    let mut found = 0usize;

    for &parent_id in &parent_ids {
        let latest_runs = run
            .nodes
            .iter()
            .flat_map(|nodes| nodes.values())
            .filter_map(|runs| runs.first());

        for latest in latest_runs {
            if latest.workflow_node_id == parent_id {
                if latest.status.is_active() {
                    debug!(parent_id, status = %latest.status, "parent is still running");
                    return Some(false);
                }
                found += 1;
            } else if get_node_by_id(latest.workflow_node_id, &run.workflow).is_none() {
                debug!(
                    stale_node_id = latest.workflow_node_id,
                    "workflow changed since the run, allowing"
                );
                return Some(true);
            }
        }
    }

    if found != parent_ids.len() {
        debug!(found, expected = parent_ids.len(), "a parent never ran");
        return Some(false);
    }

    Some(true)
}
