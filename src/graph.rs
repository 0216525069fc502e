//! Graph compiler: turns a [`Program`] into a [`Spec`].
//!
//! Both entry points share one depth-first, post-order walk:
//! - a node is emitted only after all of its parents,
//! - a node is emitted at most once per export call,
//! - every (parent, child) pair produces exactly one edge.
//!
//! The walk uses an explicit stack so very deep pipelines cannot overflow the
//! call stack.

use crate::ider::Ider;
use crate::operation::{NodeHandle, OperationId};
use crate::program::Program;
use crate::spec::{Edge, Operation, Spec};
use std::collections::HashSet;
use tracing::trace;

/// Export every node created during one compilation, in creation order.
pub fn export_program(program: &Program) -> Spec {
    let mut builder = SpecBuilder::new(program);
    for handle in program.handles() {
        builder.visit(handle);
    }
    builder.finish()
}

/// Export one node plus its full transitive ancestor set.
pub fn export_ancestors(program: &Program, handle: NodeHandle) -> Spec {
    let mut builder = SpecBuilder::new(program);
    builder.visit(handle);
    builder.finish()
}

struct Frame {
    handle: NodeHandle,
    id: OperationId,
    next_parent: usize,
}

struct SpecBuilder<'a> {
    program: &'a Program,
    ider: Ider,
    visited: HashSet<OperationId>,
    operations: Vec<Operation>,
    edges: Vec<Edge>,
}

impl<'a> SpecBuilder<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            ider: Ider::new(),
            visited: HashSet::new(),
            operations: Vec::with_capacity(program.len()),
            edges: Vec::new(),
        }
    }

    fn id(&mut self, handle: NodeHandle) -> OperationId {
        let kind = self.program.node(handle).kind();
        self.ider.id(handle, kind)
    }

    fn visit(&mut self, root: NodeHandle) {
        let root_id = self.id(root);
        if self.visited.contains(&root_id) {
            return;
        }

        let program = self.program;
        let mut stack = vec![Frame {
            handle: root,
            id: root_id,
            next_parent: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let parents = program.node(frame.handle).parents();
            if let Some(&parent) = parents.get(frame.next_parent) {
                frame.next_parent += 1;
                let child_id = frame.id.clone();
                let parent_id = self.id(parent);
                if self.visited.contains(&parent_id) {
                    self.edges.push(Edge::new(parent_id, child_id));
                } else {
                    // Parents always precede children in the arena, so the
                    // parent cannot already be on the stack.
                    stack.push(Frame {
                        handle: parent,
                        id: parent_id,
                        next_parent: 0,
                    });
                }
                continue;
            }

            // All parents are emitted; emit this node and link it to the
            // child that is waiting on it.
            let Some(done) = stack.pop() else { break };
            let node = program.node(done.handle);
            trace!(id = %done.id, parents = node.parents().len(), "emit operation");
            self.visited.insert(done.id.clone());
            self.operations.push(Operation::new(done.id.clone(), node.spec().clone()));
            if let Some(waiting) = stack.last() {
                self.edges.push(Edge::new(done.id, waiting.id.clone()));
            }
        }
    }

    fn finish(self) -> Spec {
        Spec::new(self.operations, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{OperationKind, OperationNode, OperationSpec};
    use serde::Serialize;
    use std::sync::Arc;

    #[derive(Debug, Serialize)]
    struct Op(&'static str);

    impl OperationSpec for Op {
        fn kind(&self) -> OperationKind {
            OperationKind::from(self.0)
        }
    }

    fn add(program: &mut Program, kind: &'static str, parents: &[NodeHandle]) -> NodeHandle {
        program.push(OperationNode::new(Arc::new(Op(kind)), parents.to_vec()))
    }

    fn ids(spec: &Spec) -> Vec<&str> {
        spec.operations.iter().map(|o| o.id.as_str()).collect()
    }

    fn edges(spec: &Spec) -> Vec<(&str, &str)> {
        spec.edges
            .iter()
            .map(|e| (e.parent.as_str(), e.child.as_str()))
            .collect()
    }

    fn diamond() -> (Program, NodeHandle) {
        let mut p = Program::new();
        let a = add(&mut p, "from", &[]);
        let b = add(&mut p, "filter", &[a]);
        let c = add(&mut p, "count", &[a]);
        let d = add(&mut p, "join", &[b, c]);
        (p, d)
    }

    #[test]
    fn forest_export_of_diamond() {
        let (p, _) = diamond();
        let spec = export_program(&p);
        assert_eq!(ids(&spec), ["from1", "filter2", "count3", "join4"]);
        assert_eq!(
            edges(&spec),
            [
                ("from1", "filter2"),
                ("from1", "count3"),
                ("filter2", "join4"),
                ("count3", "join4"),
            ]
        );
    }

    #[test]
    fn ancestor_export_allocates_ids_on_first_visit() {
        let (p, d) = diamond();
        let spec = export_ancestors(&p, d);
        assert_eq!(ids(&spec), ["from3", "filter2", "count4", "join1"]);
        assert_eq!(
            edges(&spec),
            [
                ("from3", "filter2"),
                ("filter2", "join1"),
                ("from3", "count4"),
                ("count4", "join1"),
            ]
        );
        spec.validate().unwrap();
    }

    #[test]
    fn ancestor_export_skips_unrelated_nodes() {
        let mut p = Program::new();
        let a = add(&mut p, "from", &[]);
        let _other = add(&mut p, "from", &[]);
        let b = add(&mut p, "filter", &[a]);
        let _sibling = add(&mut p, "count", &[a]);

        let spec = export_ancestors(&p, b);
        assert_eq!(ids(&spec), ["from2", "filter1"]);
        assert_eq!(edges(&spec), [("from2", "filter1")]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut p = Program::new();
        let mut last = add(&mut p, "from", &[]);
        for _ in 0..200_000 {
            last = add(&mut p, "map", &[last]);
        }
        let spec = export_ancestors(&p, last);
        assert_eq!(spec.operations.len(), 200_001);
        assert_eq!(spec.edges.len(), 200_000);
        assert_eq!(spec.operations[0].spec.kind().as_str(), "from");
    }

    #[test]
    fn empty_program_exports_empty_spec() {
        let spec = export_program(&Program::new());
        assert!(spec.operations.is_empty());
        assert!(spec.edges.is_empty());
    }
}
