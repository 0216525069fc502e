//! The compiled operation graph handed to the execution engine.
//!
//! JSON shape:
//! {
//!   "operations": [
//!     { "kind": "from", "id": "from1", "spec": { "bucket": "telegraf" } },
//!     { "kind": "filter", "id": "filter2", "spec": { "fn": "r._value > 0" } }
//!   ],
//!   "edges": [
//!     { "parent": "from1", "child": "filter2" }
//!   ]
//! }

use crate::error::{Error, Result};
use crate::operation::{OperationId, OperationKind, OperationSpec};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// An exported node: its id and configuration, parents externalized as edges.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,
    pub spec: Arc<dyn OperationSpec>,
}

impl Operation {
    pub fn new(id: OperationId, spec: Arc<dyn OperationSpec>) -> Self {
        Self { id, spec }
    }

    pub fn kind(&self) -> OperationKind {
        self.spec.kind()
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let spec = self.spec.to_json().map_err(serde::ser::Error::custom)?;
        let mut s = serializer.serialize_struct("Operation", 3)?;
        s.serialize_field("kind", &self.spec.kind())?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("spec", &spec)?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: OperationId,
    pub child: OperationId,
}

impl Edge {
    pub fn new(parent: OperationId, child: OperationId) -> Self {
        Self { parent, child }
    }
}

/// Output rendering for [`Spec::formatted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Text,
}

/// Immutable operation graph: operations in topological order plus edges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Spec {
    pub operations: Vec<Operation>,
    pub edges: Vec<Edge>,
}

impl Spec {
    pub fn new(operations: Vec<Operation>, edges: Vec<Edge>) -> Self {
        Self { operations, edges }
    }

    pub fn operation(&self, id: &OperationId) -> Option<&Operation> {
        self.operations.iter().find(|o| &o.id == id)
    }

    /// Parents of `id`, in edge order.
    pub fn parents_of(&self, id: &OperationId) -> Vec<&OperationId> {
        self.edges
            .iter()
            .filter(|e| &e.child == id)
            .map(|e| &e.parent)
            .collect()
    }

    /// Children of `id`, in edge order.
    pub fn children_of(&self, id: &OperationId) -> Vec<&OperationId> {
        self.edges
            .iter()
            .filter(|e| &e.parent == id)
            .map(|e| &e.child)
            .collect()
    }

    /// Operations without incoming edges, in operation order.
    pub fn roots(&self) -> Vec<&OperationId> {
        let children: BTreeSet<&OperationId> = self.edges.iter().map(|e| &e.child).collect();
        self.operations
            .iter()
            .map(|o| &o.id)
            .filter(|id| !children.contains(id))
            .collect()
    }

    /// Operations without outgoing edges, in operation order.
    pub fn sinks(&self) -> Vec<&OperationId> {
        let parents: BTreeSet<&OperationId> = self.edges.iter().map(|e| &e.parent).collect();
        self.operations
            .iter()
            .map(|o| &o.id)
            .filter(|id| !parents.contains(id))
            .collect()
    }

    /// Check the structural invariants:
    /// - operation ids are unique
    /// - every edge endpoint is a known operation
    /// - every edge points forward in `operations`
    /// - no (parent, child) pair is repeated
    pub fn validate(&self) -> Result<()> {
        let mut position: HashMap<&OperationId, usize> = HashMap::new();
        for (i, op) in self.operations.iter().enumerate() {
            if position.insert(&op.id, i).is_some() {
                return Err(Error::InvalidSpec(format!("duplicate operation id {}", op.id)));
            }
        }

        let mut seen = BTreeSet::new();
        for edge in &self.edges {
            let parent = position.get(&edge.parent).ok_or_else(|| {
                Error::InvalidSpec(format!("edge references unknown parent {}", edge.parent))
            })?;
            let child = position.get(&edge.child).ok_or_else(|| {
                Error::InvalidSpec(format!("edge references unknown child {}", edge.child))
            })?;
            if parent >= child {
                return Err(Error::InvalidSpec(format!(
                    "edge {} -> {} is not in topological order",
                    edge.parent, edge.child
                )));
            }
            if !seen.insert((&edge.parent, &edge.child)) {
                return Err(Error::InvalidSpec(format!(
                    "duplicate edge {} -> {}",
                    edge.parent, edge.child
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn formatted(&self, format: Format) -> Result<String> {
        match format {
            Format::Json => self.to_json(),
            Format::Text => self.to_text(),
        }
    }

    fn to_text(&self) -> Result<String> {
        let mut out = String::new();
        let width = self
            .operations
            .iter()
            .map(|o| o.id.as_str().len())
            .max()
            .unwrap_or(0);

        out.push_str("operations:\n");
        for op in &self.operations {
            let spec = serde_json::to_string(&op.spec.to_json()?)?;
            out.push_str(&format!("  {:<width$}  {}\n", op.id.as_str(), spec, width = width));
        }
        out.push_str("edges:\n");
        for edge in &self.edges {
            out.push_str(&format!("  {} -> {}\n", edge.parent, edge.child));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Serialize)]
    struct Dummy {
        n: u32,
    }

    impl OperationSpec for Dummy {
        fn kind(&self) -> OperationKind {
            OperationKind::from("dummy")
        }
    }

    fn op(id: &str) -> Operation {
        Operation::new(OperationId::from(id), Arc::new(Dummy { n: 1 }))
    }

    fn edge(p: &str, c: &str) -> Edge {
        Edge::new(OperationId::from(p), OperationId::from(c))
    }

    #[test]
    fn validate_accepts_diamond() {
        let spec = Spec::new(
            vec![op("a"), op("b"), op("c"), op("d")],
            vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")],
        );
        spec.validate().unwrap();
        assert_eq!(spec.roots(), [&OperationId::from("a")]);
        assert_eq!(spec.sinks(), [&OperationId::from("d")]);
        assert_eq!(spec.children_of(&OperationId::from("a")).len(), 2);
        assert_eq!(spec.parents_of(&OperationId::from("d")).len(), 2);
        let c = spec.operation(&OperationId::from("c")).unwrap();
        assert_eq!(c.kind().as_str(), "dummy");
        assert!(spec.operation(&OperationId::from("zz")).is_none());
    }

    #[test]
    fn validate_rejects_broken_specs() {
        let dangling = Spec::new(vec![op("a")], vec![edge("a", "zz")]);
        assert!(matches!(dangling.validate(), Err(Error::InvalidSpec(_))));

        let duplicate = Spec::new(vec![op("a"), op("a")], vec![]);
        assert!(matches!(duplicate.validate(), Err(Error::InvalidSpec(_))));

        let backwards = Spec::new(vec![op("a"), op("b")], vec![edge("b", "a")]);
        assert!(matches!(backwards.validate(), Err(Error::InvalidSpec(_))));

        let repeated = Spec::new(vec![op("a"), op("b")], vec![edge("a", "b"), edge("a", "b")]);
        assert!(matches!(repeated.validate(), Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn json_shape() {
        let spec = Spec::new(vec![op("dummy1"), op("dummy2")], vec![edge("dummy1", "dummy2")]);
        let value: serde_json::Value = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "operations": [
                    { "kind": "dummy", "id": "dummy1", "spec": { "n": 1 } },
                    { "kind": "dummy", "id": "dummy2", "spec": { "n": 1 } }
                ],
                "edges": [ { "parent": "dummy1", "child": "dummy2" } ]
            })
        );
    }

    #[test]
    fn text_listing() {
        let spec = Spec::new(vec![op("a"), op("bb")], vec![edge("a", "bb")]);
        let text = spec.formatted(Format::Text).unwrap();
        assert_eq!(
            text,
            "operations:\n  a   {\"n\":1}\n  bb  {\"n\":1}\nedges:\n  a -> bb\n"
        );
    }
}
