//! In-memory console store.
//!
//! Holds the project and workflow the operator is looking at, plus the run,
//! node and node run currently selected.  Readers never see a live
//! reference: [`SnapshotProvider`] hands out owned copies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use engine::{Project, Selection, WNode, Workflow, WorkflowNodeRun, WorkflowRun};

/// Everything the workflow screens read from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowState {
    pub project: Option<Project>,
    pub workflow: Option<Workflow>,
    pub workflow_run: Option<WorkflowRun>,
    pub workflow_node_run: Option<WorkflowNodeRun>,
    pub node: Option<WNode>,
    pub can_edit: bool,
}

impl WorkflowState {
    /// Borrow the fields the eligibility decision reads.
    pub fn selection(&self) -> Selection<'_> {
        Selection {
            workflow: self.workflow.as_ref(),
            workflow_run: self.workflow_run.as_ref(),
            node: self.node.as_ref(),
            node_run: self.workflow_node_run.as_ref(),
        }
    }
}

/// Synchronous read access to the current store contents.
pub trait SnapshotProvider {
    fn project_snapshot(&self) -> Option<Project>;

    fn workflow_state(&self) -> WorkflowState;
}

/// Store backing the console screens.  Every setter replaces the entity
/// wholesale.
#[derive(Debug, Default)]
pub struct ConsoleStore {
    state: WorkflowState,
}

impl ConsoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project(&mut self, project: Project) {
        debug!(project = %project.key, "project loaded");
        self.state.project = Some(project);
    }

    /// Load a workflow; previous run and selections no longer apply.
    pub fn set_workflow(&mut self, workflow: Workflow) {
        debug!(workflow = %workflow.name, "workflow loaded");
        self.state.can_edit = workflow.permissions.writable;
        self.state.workflow = Some(workflow);
        self.state.workflow_run = None;
        self.state.workflow_node_run = None;
        self.state.node = None;
    }

    /// Replace the run being viewed.  A node run selected from another run
    /// is dropped.
    pub fn set_workflow_run(&mut self, workflow_run: Option<WorkflowRun>) {
        let same_run = matches!(
            (&self.state.workflow_run, &workflow_run),
            (Some(old), Some(new)) if old.id == new.id
        );
        if !same_run {
            self.state.workflow_node_run = None;
        }
        self.state.workflow_run = workflow_run;
    }

    pub fn select_node(&mut self, node: Option<WNode>) {
        debug!(node_id = node.as_ref().map(|n| n.id), "node selected");
        self.state.node = node;
    }

    /// Select a node run; its node is selected too when the run's
    /// definition still has it.
    pub fn select_node_run(&mut self, node_run: Option<WorkflowNodeRun>) {
        if let (Some(node_run), Some(run)) = (&node_run, &self.state.workflow_run) {
            if let Some(node) = run.workflow.node_by_id(node_run.workflow_node_id) {
                self.state.node = Some(node.clone());
            }
        }
        debug!(node_run_id = node_run.as_ref().map(|r| r.id), "node run selected");
        self.state.workflow_node_run = node_run;
    }

    pub fn set_can_edit(&mut self, can_edit: bool) {
        self.state.can_edit = can_edit;
    }
}

impl SnapshotProvider for ConsoleStore {
    fn project_snapshot(&self) -> Option<Project> {
        self.state.project.clone()
    }

    fn workflow_state(&self) -> WorkflowState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Permissions, RunStatus};

    fn workflow() -> Workflow {
        let root = WNode::new(1, "build").with_child(WNode::new(2, "deploy"));
        Workflow::new("app", root, vec![])
    }

    #[test]
    fn loading_a_workflow_resets_selections() {
        let mut store = ConsoleStore::new();
        let wf = workflow();
        store.set_workflow(wf.clone());
        store.set_workflow_run(Some(WorkflowRun::new(wf.clone(), RunStatus::Success)));
        store.select_node(wf.node_by_id(2).cloned());

        store.set_workflow(wf);
        let state = store.workflow_state();
        assert!(state.workflow_run.is_none());
        assert!(state.node.is_none());
        assert!(state.can_edit);
    }

    #[test]
    fn read_only_workflow_is_not_editable() {
        let mut store = ConsoleStore::new();
        let mut wf = workflow();
        wf.permissions = Permissions {
            readable: true,
            writable: false,
            executable: true,
        };
        store.set_workflow(wf);
        assert!(!store.workflow_state().can_edit);
    }

    #[test]
    fn selecting_node_run_selects_its_node() {
        let mut store = ConsoleStore::new();
        let wf = workflow();
        store.set_workflow(wf.clone());
        store.set_workflow_run(Some(WorkflowRun::new(wf, RunStatus::Fail)));
        store.select_node_run(Some(WorkflowNodeRun::new(9, 2, RunStatus::Fail)));

        let state = store.workflow_state();
        assert_eq!(state.node.map(|n| n.id), Some(2));
        assert_eq!(state.workflow_node_run.map(|r| r.id), Some(9));
    }

    #[test]
    fn switching_runs_drops_node_run() {
        let mut store = ConsoleStore::new();
        let wf = workflow();
        store.set_workflow(wf.clone());
        store.set_workflow_run(Some(WorkflowRun::new(wf.clone(), RunStatus::Fail)));
        store.select_node_run(Some(WorkflowNodeRun::new(9, 2, RunStatus::Fail)));

        let mut next = WorkflowRun::new(wf, RunStatus::Building);
        next.id = 2;
        store.set_workflow_run(Some(next));
        assert!(store.workflow_state().workflow_node_run.is_none());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut store = ConsoleStore::new();
        store.set_workflow(workflow());
        let before = store.workflow_state();
        store.set_can_edit(false);
        assert!(before.can_edit);
        assert!(!store.workflow_state().can_edit);
    }

    #[test]
    fn state_deserialises_with_missing_fields() {
        let state: WorkflowState = serde_json::from_str(r#"{ "can_edit": true }"#).unwrap();
        assert!(state.workflow.is_none());
        assert!(state.can_edit);
        assert!(state.selection().workflow.is_none());
    }
}
