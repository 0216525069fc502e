//! Per-call record of the upstream nodes a new operation depends on.

use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::NodeHandle;
use crate::values::{TABLE_PARAMETER, Value};

/// Handed to every constructor call. Declaring a parent here is the only way
/// an operation gets an incoming edge; a constructor that declares none
/// produces a root.
#[derive(Debug, Default)]
pub struct Administration {
    parents: Vec<NodeHandle>,
}

impl Administration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `parent` unless the same node is already a parent.
    ///
    /// Deduplication is by node identity: two nodes with equal configuration
    /// are still distinct parents.
    pub fn add_parent(&mut self, parent: NodeHandle) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    /// Read the table passed as keyword `name` and add it as a parent.
    ///
    /// An absent argument is a type error, same as one that is not a table.
    pub fn add_parent_from_argument(&mut self, args: &Arguments, name: &str) -> Result<()> {
        let parent = match args.get(name) {
            Some(Value::Table(handle)) => *handle,
            Some(other) => {
                return Err(Error::type_error(format!(
                    "argument \"{}\" is not a table object: got {}",
                    name,
                    other.type_of()
                )));
            }
            None => {
                return Err(Error::type_error(format!(
                    "argument \"{}\" is missing: expected a table object",
                    name
                )));
            }
        };
        self.add_parent(parent);
        Ok(())
    }

    /// Same as [`add_parent_from_argument`](Self::add_parent_from_argument)
    /// for the conventional `table` parameter.
    pub fn add_parent_from_args(&mut self, args: &Arguments) -> Result<()> {
        self.add_parent_from_argument(args, TABLE_PARAMETER)
    }

    /// Parents in first-added-first order.
    pub fn parents(&self) -> &[NodeHandle] {
        &self.parents
    }

    pub(crate) fn into_parents(self) -> Vec<NodeHandle> {
        self.parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_by_identity_and_keeps_insertion_order() {
        let mut a = Administration::new();
        a.add_parent(NodeHandle(3));
        a.add_parent(NodeHandle(1));
        a.add_parent(NodeHandle(3));
        a.add_parent(NodeHandle(2));
        assert_eq!(a.parents(), [NodeHandle(3), NodeHandle(1), NodeHandle(2)]);
    }

    #[test]
    fn parent_from_arguments() {
        let args: Arguments = [("table", Value::Table(NodeHandle(0))), ("other", Value::Int(1))]
            .into_iter()
            .collect();
        let mut a = Administration::new();
        a.add_parent_from_args(&args).unwrap();
        assert_eq!(a.parents(), [NodeHandle(0)]);

        let err = a.add_parent_from_argument(&args, "left").unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: argument \"left\" is missing: expected a table object"
        );

        let err = a.add_parent_from_argument(&args, "other").unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }
}
