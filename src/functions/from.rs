//! `from(bucket)`: source of raw series; always a root.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::Result;
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{FunctionSignature, Type};
use serde::Serialize;
use std::sync::Arc;

pub const FROM_KIND: &str = "from";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromOpSpec {
    pub bucket: String,
}

impl OperationSpec for FromOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(FROM_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = FunctionSignature::new(Type::Table).required_param("bucket", Type::String);
    registry.register_function("from", create_from_op_spec, signature)
}

fn create_from_op_spec(args: &Arguments, _: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    let bucket = args.get_required_string("bucket")?;
    Ok(Arc::new(FromOpSpec { bucket }))
}
