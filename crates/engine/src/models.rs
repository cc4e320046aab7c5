//! Core domain models shared by the console.
//!
//! These types mirror the JSON the platform API returns for workflows and
//! workflow runs.  The console never mutates them: a fetch replaces the
//! whole value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::EngineError;

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Execution state of a workflow run or of a single node run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Waiting,
    Checking,
    Building,
    Success,
    Fail,
    Disabled,
    Skipped,
    Stopped,
    Stopping,
    #[serde(rename = "Never Built")]
    NeverBuilt,
}

impl RunStatus {
    pub const ALL: [RunStatus; 11] = [
        RunStatus::Pending,
        RunStatus::Waiting,
        RunStatus::Checking,
        RunStatus::Building,
        RunStatus::Success,
        RunStatus::Fail,
        RunStatus::Disabled,
        RunStatus::Skipped,
        RunStatus::Stopped,
        RunStatus::Stopping,
        RunStatus::NeverBuilt,
    ];

    /// `true` while work is still queued or in progress.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RunStatus::Pending | RunStatus::Waiting | RunStatus::Checking | RunStatus::Building
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Pending => "Pending",
            RunStatus::Waiting => "Waiting",
            RunStatus::Checking => "Checking",
            RunStatus::Building => "Building",
            RunStatus::Success => "Success",
            RunStatus::Fail => "Fail",
            RunStatus::Disabled => "Disabled",
            RunStatus::Skipped => "Skipped",
            RunStatus::Stopped => "Stopped",
            RunStatus::Stopping => "Stopping",
            RunStatus::NeverBuilt => "Never Built",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EngineError::UnknownStatus(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// WNode
// ---------------------------------------------------------------------------

/// Kind of a node in the workflow graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Pipeline,
    Join,
    Fork,
    #[serde(rename = "outgoinghook")]
    OutgoingHook,
}

/// A single stage of the workflow graph.
///
/// Children hang off `triggers`; a join node lists the nodes it waits for
/// in `parents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WNode {
    pub id: i64,
    #[serde(rename = "ref", default)]
    pub reference: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub triggers: Vec<WNodeTrigger>,
    #[serde(default)]
    pub parents: Vec<WNodeJoinParent>,
}

impl WNode {
    /// Convenience constructor for a pipeline node without children.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            reference: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Convenience constructor for a join waiting on `parent_ids`.
    pub fn join(id: i64, parent_ids: &[i64]) -> Self {
        Self {
            id,
            node_type: NodeType::Join,
            parents: parent_ids
                .iter()
                .map(|&parent_id| WNodeJoinParent {
                    parent_id,
                    parent_name: String::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Attach `child` below this node.
    pub fn with_child(mut self, child: WNode) -> Self {
        self.triggers.push(WNodeTrigger {
            parent_node_id: self.id,
            child_node_id: child.id,
            child_node: child,
        });
        self
    }
}

/// Edge from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WNodeTrigger {
    pub parent_node_id: i64,
    pub child_node_id: i64,
    pub child_node: WNode,
}

/// A node a join is waiting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WNodeJoinParent {
    pub parent_id: i64,
    #[serde(default)]
    pub parent_name: String,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// What the current user may do with a workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub executable: bool,
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            readable: true,
            writable: true,
            executable: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    pub node: WNode,
    #[serde(default)]
    pub joins: Vec<WNode>,
}

/// A workflow definition: a graph of nodes rooted at `workflow_data.node`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(default)]
    pub permissions: Permissions,
    pub workflow_data: WorkflowData,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Workflow {
    /// Convenience constructor for testing.
    pub fn new(name: impl Into<String>, root: WNode, joins: Vec<WNode>) -> Self {
        Self {
            id: 1,
            name: name.into(),
            project_key: String::new(),
            permissions: Permissions::all(),
            workflow_data: WorkflowData { node: root, joins },
            last_modified: None,
        }
    }

    pub fn root_node_id(&self) -> i64 {
        self.workflow_data.node.id
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Node runs of a workflow run, keyed by node id, most recent attempt first.
pub type NodeRunMap = BTreeMap<i64, Vec<WorkflowNodeRun>>;

/// One execution of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub num: i64,
    pub status: RunStatus,
    /// The workflow definition as it was when the run started.
    pub workflow: Workflow,
    #[serde(default, deserialize_with = "deserialize_node_runs")]
    pub nodes: Option<NodeRunMap>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Convenience constructor for testing.
    pub fn new(workflow: Workflow, status: RunStatus) -> Self {
        Self {
            id: 1,
            num: 1,
            status,
            workflow,
            nodes: Some(NodeRunMap::new()),
            start: None,
            last_modified: None,
        }
    }

    /// Record `node_run` as the latest attempt of its node.
    pub fn push_node_run(&mut self, node_run: WorkflowNodeRun) {
        self.nodes
            .get_or_insert_with(NodeRunMap::new)
            .entry(node_run.workflow_node_id)
            .or_default()
            .insert(0, node_run);
    }

    /// Latest attempt for `node_id`, if the node ran at all.
    pub fn latest_node_run(&self, node_id: i64) -> Option<&WorkflowNodeRun> {
        self.nodes.as_ref()?.get(&node_id)?.first()
    }
}

/// One execution of one node inside a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNodeRun {
    pub id: i64,
    pub workflow_node_id: i64,
    #[serde(default)]
    pub workflow_run_id: i64,
    #[serde(default)]
    pub num: i64,
    #[serde(default)]
    pub subnumber: i64,
    pub status: RunStatus,
    /// Computed by the API: whether this exact attempt may be restarted.
    #[serde(default)]
    pub can_be_run: bool,
    #[serde(default)]
    pub uuid: Option<Uuid>,
}

impl WorkflowNodeRun {
    /// Convenience constructor for testing.
    pub fn new(id: i64, workflow_node_id: i64, status: RunStatus) -> Self {
        Self {
            id,
            workflow_node_id,
            workflow_run_id: 0,
            num: 1,
            subnumber: 0,
            status,
            can_be_run: false,
            uuid: None,
        }
    }
}

/// The API sends `null` for nodes that have not run yet.
fn deserialize_node_runs<'de, D>(deserializer: D) -> Result<Option<NodeRunMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<i64, Option<Vec<WorkflowNodeRun>>>> =
        Option::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .map(|(node_id, runs)| (node_id, runs.unwrap_or_default()))
            .collect()
    }))
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// The project that owns the workflow on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn active_statuses_are_the_in_flight_ones() {
        let active: Vec<RunStatus> = RunStatus::ALL
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        assert_eq!(
            active,
            vec![
                RunStatus::Pending,
                RunStatus::Waiting,
                RunStatus::Checking,
                RunStatus::Building
            ]
        );
        assert!(RunStatus::Stopping.is_terminal());
    }

    #[test]
    fn status_parses_platform_strings() {
        assert_eq!("Never Built".parse::<RunStatus>().unwrap(), RunStatus::NeverBuilt);
        assert_eq!(RunStatus::Fail.to_string(), "Fail");
        assert!(matches!(
            "Exploded".parse::<RunStatus>(),
            Err(EngineError::UnknownStatus(s)) if s == "Exploded"
        ));
    }

    #[test]
    fn workflow_run_accepts_null_node_entries() {
        let run: WorkflowRun = serde_json::from_value(json!({
            "id": 4,
            "num": 12,
            "status": "Success",
            "workflow": {
                "name": "build",
                "permissions": { "executable": true },
                "workflow_data": { "node": { "id": 1, "name": "root" } }
            },
            "nodes": {
                "1": [{ "id": 10, "workflow_node_id": 1, "status": "Success", "can_be_run": true }],
                "2": null
            }
        }))
        .expect("valid run json");

        let nodes = run.nodes.as_ref().expect("nodes present");
        assert_eq!(nodes[&1].len(), 1);
        assert!(nodes[&2].is_empty());
        assert_eq!(run.latest_node_run(1).map(|r| r.id), Some(10));
        assert!(run.latest_node_run(2).is_none());
    }

    #[test]
    fn node_type_uses_api_names() {
        let node: WNode = serde_json::from_value(json!({
            "id": 3, "ref": "deploy", "name": "deploy", "type": "outgoinghook"
        }))
        .unwrap();
        assert_eq!(node.node_type, NodeType::OutgoingHook);
        assert_eq!(node.reference, "deploy");
    }

    #[test]
    fn push_node_run_keeps_latest_first() {
        let wf = Workflow::new("wf", WNode::new(1, "root"), vec![]);
        let mut run = WorkflowRun::new(wf, RunStatus::Building);
        run.push_node_run(WorkflowNodeRun::new(10, 1, RunStatus::Fail));
        run.push_node_run(WorkflowNodeRun::new(11, 1, RunStatus::Building));
        assert_eq!(run.latest_node_run(1).map(|r| r.id), Some(11));
    }
}
