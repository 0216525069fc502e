//! Operation identity, kinds, operator configuration and graph nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of one operation inside a single exported [`Spec`](crate::Spec).
///
/// Formatted `<kind><counter>`. Ids are only meaningful within the Spec that
/// produced them; two exports of the same program may number nodes differently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Operator family tag, e.g. `"alert.format"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKind(String);

impl OperationKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Object-safe bridge from any `Serialize` config to JSON.
pub trait SpecValue {
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T: Serialize> SpecValue for T {
    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Operator-specific configuration produced by a constructor.
///
/// The graph compiler only ever asks for the kind; the payload is carried
/// through to the Spec untouched.
pub trait OperationSpec: SpecValue + fmt::Debug + Send + Sync {
    fn kind(&self) -> OperationKind;
}

/// Stable handle of a node inside one [`Program`](crate::Program) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One operator instance plus its upstream dependencies.
#[derive(Debug, Clone)]
pub struct OperationNode {
    kind: OperationKind,
    spec: Arc<dyn OperationSpec>,
    parents: Vec<NodeHandle>,
}

impl OperationNode {
    pub(crate) fn new(spec: Arc<dyn OperationSpec>, parents: Vec<NodeHandle>) -> Self {
        Self {
            kind: spec.kind(),
            spec,
            parents,
        }
    }

    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    pub fn spec(&self) -> &Arc<dyn OperationSpec> {
        &self.spec
    }

    /// Parents in the order the constructor declared them, without duplicates.
    pub fn parents(&self) -> &[NodeHandle] {
        &self.parents
    }
}
