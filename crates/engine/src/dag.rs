//! Graph helpers over a workflow definition.
//!
//! A workflow is stored as a tree: the root node and its `triggers`, plus a
//! list of join nodes each owning its own subtree.  Joins point back to the
//! nodes they wait for through `parents`, which is what turns the tree into
//! a DAG.
//!
//! [`validate_graph`] checks the rules below and returns node ids in
//! topological order:
//! 1. Node IDs must be unique within the workflow.
//! 2. Triggers must agree with the nodes they link.
//! 3. Join parents must reference existing nodes.
//! 4. The directed graph must be acyclic.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::models::{NodeType, WNode, Workflow, WorkflowRun};
use crate::EngineError;

impl Workflow {
    /// Every node of the workflow: the root subtree first (depth-first),
    /// then each join subtree.
    pub fn all_nodes(&self) -> Vec<&WNode> {
        let mut out = Vec::new();
        collect_subtree(&self.workflow_data.node, &mut out);
        for join in &self.workflow_data.joins {
            collect_subtree(join, &mut out);
        }
        out
    }

    pub fn node_by_id(&self, node_id: i64) -> Option<&WNode> {
        self.all_nodes().into_iter().find(|n| n.id == node_id)
    }

    /// Direct predecessors of `node_id`, ascending and deduplicated.
    pub fn parent_node_ids(&self, node_id: i64) -> Vec<i64> {
        let mut parents = BTreeSet::new();
        for node in self.all_nodes() {
            if node.triggers.iter().any(|t| t.child_node.id == node_id) {
                parents.insert(node.id);
            }
            if node.id == node_id && node.node_type == NodeType::Join {
                parents.extend(node.parents.iter().map(|p| p.parent_id));
            }
        }
        parents.into_iter().collect()
    }
}

fn collect_subtree<'a>(node: &'a WNode, out: &mut Vec<&'a WNode>) {
    out.push(node);
    for trigger in &node.triggers {
        collect_subtree(&trigger.child_node, out);
    }
}

/// Look a node up in `workflow`; `None` when the definition no longer has it.
pub fn get_node_by_id(node_id: i64, workflow: &Workflow) -> Option<&WNode> {
    workflow.node_by_id(node_id)
}

/// Parents of `node_id` in the definition the run was started from.
pub fn get_parent_node_ids(workflow_run: &WorkflowRun, node_id: i64) -> Vec<i64> {
    workflow_run.workflow.parent_node_ids(node_id)
}

/// Validate the workflow graph and return node ids in topological order.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::InconsistentTrigger`] if a trigger's ids disagree with its nodes.
/// - [`EngineError::UnknownNodeReference`] if a join waits on a missing node.
/// - [`EngineError::CycleDetected`] if the graph is not acyclic.
pub fn validate_graph(workflow: &Workflow) -> Result<Vec<i64>, EngineError> {
    let nodes = workflow.all_nodes();

    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<i64> = HashSet::new();
    for node in &nodes {
        if !seen_ids.insert(node.id) {
            return Err(EngineError::DuplicateNodeId(node.id));
        }
    }

    // -----------------------------------------------------------------------
    // 2 & 3. Collect edges, checking triggers and join parents
    // -----------------------------------------------------------------------
    let mut edges: Vec<(i64, i64)> = Vec::new();
    for node in &nodes {
        for trigger in &node.triggers {
            if trigger.parent_node_id != node.id || trigger.child_node_id != trigger.child_node.id {
                return Err(EngineError::InconsistentTrigger {
                    parent: trigger.parent_node_id,
                    child: trigger.child_node_id,
                });
            }
            edges.push((node.id, trigger.child_node.id));
        }
        for parent in &node.parents {
            if !seen_ids.contains(&parent.parent_id) {
                return Err(EngineError::UnknownNodeReference {
                    node_id: node.id,
                    missing: parent.parent_id,
                    relation: "join parent",
                });
            }
            edges.push((parent.parent_id, node.id));
        }
    }

    // -----------------------------------------------------------------------
    // 4. Topological sort (Kahn's algorithm)
    // -----------------------------------------------------------------------
    let mut adjacency: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut in_degree: HashMap<i64, usize> = HashMap::new();

    for node in &nodes {
        adjacency.entry(node.id).or_default();
        in_degree.entry(node.id).or_insert(0);
    }

    for (from, to) in &edges {
        adjacency.entry(*from).or_default().push(*to);
        *in_degree.entry(*to).or_insert(0) += 1;
    }

    // Seed in definition order so the result is stable.
    let mut queue: VecDeque<i64> = nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut sorted: Vec<i64> = Vec::with_capacity(nodes.len());

    while let Some(node_id) = queue.pop_front() {
        sorted.push(node_id);

        if let Some(neighbours) = adjacency.get(&node_id) {
            for &neighbour in neighbours {
                let deg = in_degree.entry(neighbour).or_insert(0);
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    if sorted.len() != nodes.len() {
        return Err(EngineError::CycleDetected);
    }

    Ok(sorted)
}
