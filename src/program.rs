//! Per-compilation accumulator of every operation node created during evaluation.

use crate::graph;
use crate::operation::{NodeHandle, OperationNode};
use crate::spec::Spec;

/// Arena of operation nodes in creation order.
///
/// A node can only name parents that already exist, so creation order is
/// always a valid topological order of the program.
#[derive(Debug, Default)]
pub struct Program {
    nodes: Vec<OperationNode>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: OperationNode) -> NodeHandle {
        debug_assert!(
            node.parents().iter().all(|p| p.0 < self.nodes.len()),
            "parent handle does not belong to this program"
        );
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(node);
        handle
    }

    /// Look up a node.
    ///
    /// Panics if `handle` was not issued by this program.
    pub fn node(&self, handle: NodeHandle) -> &OperationNode {
        &self.nodes[handle.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handles in creation order.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        (0..self.nodes.len()).map(NodeHandle)
    }

    /// Export every node of the program (forest export).
    pub fn to_spec(&self) -> Spec {
        graph::export_program(self)
    }

    /// Export `handle` and its transitive ancestors.
    pub fn ancestors_spec(&self, handle: NodeHandle) -> Spec {
        graph::export_ancestors(self, handle)
    }
}
