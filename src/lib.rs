//! Compile query scripts into an immutable graph of operations.
//!
//! Evaluating a script calls builtin operator constructors; every call adds a
//! node to the compilation's [`Program`]. The graph compiler then exports the
//! program as a [`Spec`]: operations in topological order plus parent to
//! child edges.
//!
//! ```no_run
//! use qspec::{CompileOptions, ScriptEvaluator, compile, functions};
//!
//! let registry = functions::standard_registry()?;
//! let spec = compile(
//!     &registry,
//!     &ScriptEvaluator,
//!     "from(bucket: \"telegraf\") |> range(start: -1h) |> yield()",
//!     &CompileOptions::default(),
//! )?;
//! assert_eq!(spec.operations.len(), 3);
//! # Ok::<(), qspec::Error>(())
//! ```

pub mod administration;
pub mod arguments;
pub mod compile;
pub mod diagnostics;
pub mod error;
pub mod function;
pub mod functions;
pub mod graph;
pub mod ider;
pub mod operation;
pub mod program;
pub mod registry;
pub mod scope;
pub mod script;
pub mod spec;
pub mod values;

pub use administration::Administration;
pub use arguments::Arguments;
pub use compile::{CompileOptions, Evaluator, compile, compile_value};
pub use error::{Error, Result};
pub use function::Function;
pub use ider::Ider;
pub use operation::{NodeHandle, OperationId, OperationKind, OperationNode, OperationSpec};
pub use program::Program;
pub use registry::{Declarations, Registry};
pub use scope::Scope;
pub use script::ScriptEvaluator;
pub use spec::{Edge, Format, Operation, Spec};
pub use values::{Duration, FunctionSignature, TABLE_PARAMETER, Type, Value, default_signature};
