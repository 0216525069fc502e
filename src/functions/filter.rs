//! `filter(fn)`: keep rows matching a predicate.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{Type, default_signature};
use serde::Serialize;
use std::sync::Arc;

pub const FILTER_KIND: &str = "filter";

/// The predicate is kept as source text for the execution engine to compile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOpSpec {
    #[serde(rename = "fn")]
    pub predicate: String,
}

impl OperationSpec for FilterOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(FILTER_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = default_signature().required_param("fn", Type::String);
    registry.register_function("filter", create_filter_op_spec, signature)
}

fn create_filter_op_spec(args: &Arguments, a: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    a.add_parent_from_args(args)?;

    let predicate = args.get_required_string("fn")?;
    if predicate.trim().is_empty() {
        return Err(Error::invalid_argument("filter: fn cannot be empty"));
    }
    Ok(Arc::new(FilterOpSpec { predicate }))
}
