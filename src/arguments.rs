//! Keyword arguments of one function call, with typed accessors.

use crate::error::{Error, Result};
use crate::operation::NodeHandle;
use crate::values::{Duration, Type, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Keyword arguments passed to a constructor.
///
/// Every accessor marks the argument as consumed; arguments nobody asked for
/// are reported back to the caller as unused.
#[derive(Debug, Default)]
pub struct Arguments {
    values: BTreeMap<String, Value>,
    used: RefCell<BTreeSet<String>>,
}

impl Arguments {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self {
            values,
            used: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let value = self.values.get(name)?;
        self.used.borrow_mut().insert(name.to_string());
        Some(value)
    }

    pub fn get_required(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(name, Type::String, other)),
        }
    }

    pub fn get_required_string(&self, name: &str) -> Result<String> {
        self.get_string(name)?
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(mismatch(name, Type::Int, other)),
        }
    }

    pub fn get_duration(&self, name: &str) -> Result<Option<Duration>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Duration(d)) => Ok(Some(*d)),
            Some(other) => Err(mismatch(name, Type::Duration, other)),
        }
    }

    pub fn get_required_duration(&self, name: &str) -> Result<Duration> {
        self.get_duration(name)?
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    pub fn get_array(&self, name: &str) -> Result<Option<&[Value]>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(name, Type::array(Type::Any), other)),
        }
    }

    pub fn get_required_array(&self, name: &str) -> Result<&[Value]> {
        self.get_array(name)?
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    pub fn get_required_table(&self, name: &str) -> Result<NodeHandle> {
        match self.get_required(name)? {
            Value::Table(handle) => Ok(*handle),
            other => Err(Error::type_error(format!(
                "argument \"{}\" is not a table object: got {}",
                name,
                other.type_of()
            ))),
        }
    }

    /// Names of arguments that were passed but never read.
    pub fn unused(&self) -> Vec<String> {
        let used = self.used.borrow();
        self.values
            .keys()
            .filter(|k| !used.contains(*k))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn mismatch(name: &str, expected: Type, got: &Value) -> Error {
    Error::type_error(format!(
        "keyword argument \"{}\" has type {}, expected {}",
        name,
        got.type_of(),
        expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_track_usage() {
        let args: Arguments = [("bucket", Value::from("telegraf")), ("limit", Value::Int(3))]
            .into_iter()
            .collect();

        assert_eq!(args.get_required_string("bucket").unwrap(), "telegraf");
        assert_eq!(args.unused(), ["limit"]);
        assert_eq!(args.get_int("limit").unwrap(), Some(3));
        assert!(args.unused().is_empty());
    }

    #[test]
    fn missing_and_mistyped() {
        let args: Arguments = [("n", Value::Int(1))].into_iter().collect();

        let err = args.get_required_string("bucket").unwrap_err();
        assert_eq!(err.to_string(), "missing required keyword argument \"bucket\"");

        let err = args.get_string("n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: keyword argument \"n\" has type int, expected string"
        );

        let err = args.get_required_table("n").unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }
}
