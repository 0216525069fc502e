//! Callable wrapper around an operator constructor.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::{OperationNode, OperationSpec};
use crate::program::Program;
use crate::values::{FunctionSignature, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Constructor contract: read arguments, declare parents, return the config.
pub type CreateOperationSpec =
    dyn Fn(&Arguments, &mut Administration) -> Result<Arc<dyn OperationSpec>> + Send + Sync;

struct FunctionDef {
    name: String,
    signature: FunctionSignature,
    create: Box<CreateOperationSpec>,
    side_effect: bool,
}

/// A builtin function value.
///
/// Function values carry no per-compilation state: the node a call creates
/// goes into whichever [`Program`] the caller passes in, so one sealed
/// registry can serve any number of concurrent compilations.
#[derive(Clone)]
pub struct Function(Arc<FunctionDef>);

impl Function {
    pub fn new<F>(name: &str, signature: FunctionSignature, side_effect: bool, create: F) -> Self
    where
        F: Fn(&Arguments, &mut Administration) -> Result<Arc<dyn OperationSpec>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(FunctionDef {
            name: name.to_string(),
            signature,
            create: Box::new(create),
            side_effect,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.0.signature
    }

    /// True for terminal functions such as `yield`, whose calls matter even
    /// when nothing consumes their result.
    pub fn has_side_effect(&self) -> bool {
        self.0.side_effect
    }

    /// Run the constructor and record the resulting node in `program`.
    ///
    /// Returns the new node as a table value so later calls can use it as a
    /// parent. Any error is attributed to this function and no node is added.
    pub fn call(&self, args: Arguments, program: &mut Program) -> Result<Value> {
        let mut administration = Administration::new();
        let spec = (self.0.create)(&args, &mut administration).map_err(|e| self.call_error(e))?;

        if let Some(name) = args.unused().into_iter().next() {
            return Err(self.call_error(Error::UnusedArgument(name)));
        }

        let parents = administration.into_parents();
        let kind = spec.kind();
        let handle = program.push(OperationNode::new(spec, parents));
        debug!(
            function = %self.0.name,
            kind = %kind,
            node = handle.index(),
            parents = program.node(handle).parents().len(),
            "created operation"
        );
        Ok(Value::Table(handle))
    }

    fn call_error(&self, source: Error) -> Error {
        Error::Call {
            function: self.0.name.clone(),
            position: None,
            source: Box::new(source),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.0.name)
            .field("signature", &self.0.signature)
            .field("side_effect", &self.0.side_effect)
            .finish()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
