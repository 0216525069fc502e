//! Operation id allocation for one export call.

use crate::operation::{NodeHandle, OperationId, OperationKind};
use std::collections::HashMap;

/// Hands out `<kind><counter>` ids the first time a node is seen.
///
/// The counter is shared by all kinds and starts at 1.
#[derive(Debug, Default)]
pub struct Ider {
    counter: usize,
    lookup: HashMap<NodeHandle, OperationId>,
}

impl Ider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&mut self, handle: NodeHandle, kind: &OperationKind) -> OperationId {
        if let Some(id) = self.lookup.get(&handle) {
            return id.clone();
        }
        self.counter += 1;
        let id = OperationId::new(format!("{}{}", kind, self.counter));
        self.lookup.insert(handle, id.clone());
        id
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&OperationId> {
        self.lookup.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_lazy_and_stable() {
        let mut ider = Ider::new();
        let from = OperationKind::from("from");
        let filter = OperationKind::from("filter");

        assert_eq!(ider.id(NodeHandle(4), &filter).as_str(), "filter1");
        assert_eq!(ider.id(NodeHandle(0), &from).as_str(), "from2");
        assert_eq!(ider.id(NodeHandle(4), &filter).as_str(), "filter1");
        assert_eq!(ider.len(), 2);
        assert!(ider.get(NodeHandle(1)).is_none());
    }
}
