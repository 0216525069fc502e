//! `count(column?)`: number of non-null values per table.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::Result;
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{Type, default_signature};
use serde::Serialize;
use std::sync::Arc;

pub const COUNT_KIND: &str = "count";
pub const DEFAULT_VALUE_COLUMN: &str = "_value";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountOpSpec {
    pub column: String,
}

impl OperationSpec for CountOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(COUNT_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = default_signature().param("column", Type::String);
    registry.register_function("count", create_count_op_spec, signature)
}

fn create_count_op_spec(args: &Arguments, a: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    a.add_parent_from_args(args)?;

    let column = args
        .get_string("column")?
        .unwrap_or_else(|| DEFAULT_VALUE_COLUMN.to_string());
    Ok(Arc::new(CountOpSpec { column }))
}
