//! `range(start, stop?)`: restrict rows to a time window relative to now.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{Duration, Type, default_signature};
use serde::Serialize;
use std::sync::Arc;

pub const RANGE_KIND: &str = "range";

/// Bounds are offsets from query time in nanoseconds; `stop` defaults to now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeOpSpec {
    pub start: Duration,
    pub stop: Duration,
}

impl OperationSpec for RangeOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(RANGE_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = default_signature()
        .required_param("start", Type::Duration)
        .param("stop", Type::Duration);
    registry.register_function("range", create_range_op_spec, signature)
}

fn create_range_op_spec(args: &Arguments, a: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    a.add_parent_from_args(args)?;

    let start = args.get_required_duration("start")?;
    let stop = args.get_duration("stop")?.unwrap_or_default();
    if start >= stop {
        return Err(Error::invalid_argument(
            "range: start must be earlier than stop",
        ));
    }
    Ok(Arc::new(RangeOpSpec { start, stop }))
}
