//! `yield(name?)`: mark a table as a named query result.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::Result;
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{Type, default_signature};
use serde::Serialize;
use std::sync::Arc;

pub const YIELD_KIND: &str = "yield";
pub const DEFAULT_RESULT_NAME: &str = "_result";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldOpSpec {
    pub name: String,
}

impl OperationSpec for YieldOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(YIELD_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = default_signature().param("name", Type::String);
    registry.register_function_with_side_effect("yield", create_yield_op_spec, signature)
}

fn create_yield_op_spec(args: &Arguments, a: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    a.add_parent_from_args(args)?;

    let name = args
        .get_string("name")?
        .unwrap_or_else(|| DEFAULT_RESULT_NAME.to_string());
    Ok(Arc::new(YieldOpSpec { name }))
}
