//! Context menu shown when a node of the workflow graph is clicked.

use tracing::{debug, instrument};

use engine::{is_runnable, Project};

use crate::{EventSink, Popup, SnapshotProvider, WorkflowState};

/// State of an open node menu.
///
/// Computed once from a store snapshot when the menu opens; reopening the
/// menu recomputes from a fresh snapshot.
pub struct NodeMenu<P, S> {
    popup: P,
    sink: S,
    project: Option<Project>,
    state: WorkflowState,
    runnable: bool,
    readonly: bool,
}

impl<P, S> NodeMenu<P, S>
where
    P: Popup,
    S: EventSink<String>,
{
    #[instrument(skip_all)]
    pub fn open(provider: &impl SnapshotProvider, popup: P, sink: S) -> Self {
        let project = provider.project_snapshot();
        let state = provider.workflow_state();
        let runnable = is_runnable(state.selection());
        let readonly = !state.can_edit;
        debug!(runnable, readonly, "node menu opened");

        Self {
            popup,
            sink,
            project,
            state,
            runnable,
            readonly,
        }
    }

    /// Whether the "run" entry is enabled.
    pub fn runnable(&self) -> bool {
        self.runnable
    }

    /// Whether edit entries are hidden.
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Close the popup, then forward `event` to the parent.
    pub fn send_event(&mut self, event: impl Into<String>) {
        self.popup.close();
        self.sink.emit(event.into());
    }

    pub fn into_parts(self) -> (P, S) {
        (self.popup, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{call_log, RecordingPopup, RecordingSink};
    use crate::ConsoleStore;
    use engine::{RunStatus, WNode, Workflow, WorkflowNodeRun, WorkflowRun};

    fn store_with_run(run_status: RunStatus) -> ConsoleStore {
        let root = WNode::new(1, "build").with_child(WNode::new(2, "deploy"));
        let wf = Workflow::new("app", root, vec![]);
        let mut store = ConsoleStore::new();
        store.set_project(Project {
            key: "PRJ".into(),
            name: "Project".into(),
        });
        store.set_workflow(wf.clone());
        store.set_workflow_run(Some(WorkflowRun::new(wf, run_status)));
        store
    }

    #[test]
    fn send_event_closes_popup_before_emitting() {
        let store = store_with_run(RunStatus::Success);
        let log = call_log();
        let mut menu = NodeMenu::open(
            &store,
            RecordingPopup::new(log.clone()),
            RecordingSink::<String>::new(log.clone()),
        );

        menu.send_event("run");

        assert_eq!(*log.lock().unwrap(), vec!["close", "emit:\"run\""]);
        let (_, sink) = menu.into_parts();
        assert_eq!(sink.events, vec!["run".to_string()]);
    }

    #[test]
    fn menu_reads_project_and_edit_rights() {
        let mut store = store_with_run(RunStatus::Success);
        store.set_can_edit(false);
        let log = call_log();
        let menu = NodeMenu::open(
            &store,
            RecordingPopup::new(log.clone()),
            RecordingSink::<String>::new(log),
        );
        assert!(menu.readonly());
        assert_eq!(menu.project().map(|p| p.key.as_str()), Some("PRJ"));
    }

    #[test]
    fn node_with_running_parent_is_not_runnable() {
        let mut store = store_with_run(RunStatus::Building);
        let mut run = store.workflow_state().workflow_run.unwrap();
        run.push_node_run(WorkflowNodeRun::new(10, 1, RunStatus::Building));
        let deploy = run.workflow.node_by_id(2).cloned();
        store.set_workflow_run(Some(run));
        store.select_node(deploy);

        let log = call_log();
        let menu = NodeMenu::open(
            &store,
            RecordingPopup::new(log.clone()),
            RecordingSink::<String>::new(log),
        );
        assert!(!menu.runnable());
    }

    #[test]
    fn empty_store_is_not_runnable() {
        let store = ConsoleStore::new();
        let log = call_log();
        let menu = NodeMenu::open(
            &store,
            RecordingPopup::new(log.clone()),
            RecordingSink::<String>::new(log),
        );
        assert!(!menu.runnable());
        assert!(menu.readonly());
    }
}
