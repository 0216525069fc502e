//! Evaluation scope of one compilation.

use crate::arguments::Arguments;
use crate::error::Result;
use crate::function::Function;
use crate::program::Program;
use crate::values::Value;
use std::collections::BTreeMap;

/// Name bindings plus the program that collects every node created while
/// evaluating against them.
///
/// A scope is never shared between compilations, which is what keeps their
/// programs apart.
#[derive(Debug, Default)]
pub struct Scope {
    values: BTreeMap<String, Value>,
    program: Program,
}

impl Scope {
    pub(crate) fn with_values(values: BTreeMap<String, Value>) -> Self {
        Self {
            values,
            program: Program::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Invoke `function`, recording the node it creates in this scope's program.
    pub fn call(&mut self, function: &Function, args: Arguments) -> Result<Value> {
        function.call(args, &mut self.program)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}
