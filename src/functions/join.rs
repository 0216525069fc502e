//! `join(left, right, on?, method?)`: merge two upstream tables on key columns.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{FunctionSignature, Type, Value};
use serde::Serialize;
use std::sync::Arc;

pub const JOIN_KIND: &str = "join";
pub const DEFAULT_JOIN_COLUMN: &str = "_time";
const METHODS: [&str; 3] = ["inner", "left", "outer"];

/// `tables[i]` names the i-th parent of the operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinOpSpec {
    pub tables: Vec<String>,
    pub on: Vec<String>,
    pub method: String,
}

impl OperationSpec for JoinOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(JOIN_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = FunctionSignature::new(Type::Table)
        .required_param("left", Type::Table)
        .required_param("right", Type::Table)
        .param("on", Type::array(Type::String))
        .param("method", Type::String);
    registry.register_function("join", create_join_op_spec, signature)
}

fn create_join_op_spec(args: &Arguments, a: &mut Administration) -> Result<Arc<dyn OperationSpec>> {
    let left = args.get_required_table("left")?;
    let right = args.get_required_table("right")?;
    if left == right {
        return Err(Error::invalid_argument(
            "join: left and right must be different tables",
        ));
    }
    a.add_parent(left);
    a.add_parent(right);

    let on = match args.get_array("on")? {
        None => vec![DEFAULT_JOIN_COLUMN.to_string()],
        Some(items) => columns(items)?,
    };
    let method = args.get_string("method")?.unwrap_or_else(|| "inner".to_string());
    if !METHODS.contains(&method.as_str()) {
        return Err(Error::invalid_argument(format!(
            "join: unknown method {:?}, expected one of {}",
            method,
            METHODS.join(", ")
        )));
    }

    Ok(Arc::new(JoinOpSpec {
        tables: vec!["left".to_string(), "right".to_string()],
        on,
        method,
    }))
}

fn columns(items: &[Value]) -> Result<Vec<String>> {
    if items.is_empty() {
        return Err(Error::invalid_argument("join: on must name at least one column"));
    }
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::type_error(format!("join: on expects strings, got {}", v.type_of())))
        })
        .collect()
}
