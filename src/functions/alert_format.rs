//! `alertFormat(reduce)`: label each row with the first matching alert state.
//!
//! `reduce` is an ordered list of `{name, fn}` objects. A row gets the `name`
//! of the first element whose predicate passes; the last element may omit
//! `fn` and then matches every remaining row.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::operation::{OperationKind, OperationSpec};
use crate::registry::Registry;
use crate::values::{Type, Value, default_signature};
use serde::Serialize;
use std::sync::Arc;

pub const ALERT_FORMAT_KIND: &str = "alert.format";

/// Column the execution engine writes the state name to.
pub const ALERT_STATE_KEY: &str = "_state";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFormatReduceElement {
    pub name: String,
    #[serde(rename = "fn", skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFormatOpSpec {
    pub reduce: Vec<AlertFormatReduceElement>,
}

impl OperationSpec for AlertFormatOpSpec {
    fn kind(&self) -> OperationKind {
        OperationKind::from(ALERT_FORMAT_KIND)
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    let signature = default_signature().required_param("reduce", Type::array(Type::Object));
    registry.register_function("alertFormat", create_alert_format_op_spec, signature)
}

fn create_alert_format_op_spec(
    args: &Arguments,
    a: &mut Administration,
) -> Result<Arc<dyn OperationSpec>> {
    a.add_parent_from_args(args)?;

    let items = args.get_required_array("reduce")?;
    if items.is_empty() {
        return Err(Error::invalid_argument(
            "alert.format: reduce property must have at least one element",
        ));
    }

    let last = items.len() - 1;
    let mut reduce = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(Error::invalid_argument(
                "alert.format: invalid type in reduce array",
            ));
        };

        let name = match fields.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(Error::type_error(format!(
                    "alert.format: reduce element at index {} has name of type {}, expected string",
                    i,
                    other.type_of()
                )));
            }
            None => {
                return Err(Error::invalid_argument(format!(
                    "alert.format: reduce element at index {} missing required property 'name'",
                    i
                )));
            }
        };

        let predicate = match fields.get("fn") {
            Some(Value::String(f)) => Some(f.clone()),
            Some(other) => {
                return Err(Error::type_error(format!(
                    "alert.format: reduce element at index {} has fn of type {}, expected string",
                    i,
                    other.type_of()
                )));
            }
            None if i == last => None,
            None => {
                return Err(Error::invalid_argument(format!(
                    "alert.format: reduce element at index {} missing required property 'fn'",
                    i
                )));
            }
        };

        if let Some(extra) = fields.keys().find(|k| *k != "name" && *k != "fn") {
            return Err(Error::invalid_argument(format!(
                "alert.format: reduce element at index {} has unknown property '{}'",
                i, extra
            )));
        }

        reduce.push(AlertFormatReduceElement { name, predicate });
    }

    Ok(Arc::new(AlertFormatOpSpec { reduce }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::NodeHandle;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn element(pairs: &[(&str, &str)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn create(reduce: Vec<Value>) -> Result<Arc<dyn OperationSpec>> {
        let args: Arguments = [
            ("table", Value::Table(NodeHandle(0))),
            ("reduce", Value::Array(reduce)),
        ]
        .into_iter()
        .collect();
        create_alert_format_op_spec(&args, &mut Administration::new())
    }

    #[test]
    fn last_element_may_omit_fn() {
        let spec = create(vec![
            element(&[("name", "too_cold"), ("fn", "r._value <= 32")]),
            element(&[("name", "too_hot"), ("fn", "r._value >= 212")]),
            element(&[("name", "just_right")]),
        ])
        .unwrap();

        assert_eq!(spec.kind().as_str(), ALERT_FORMAT_KIND);
        assert_eq!(
            spec.to_json().unwrap(),
            serde_json::json!({
                "reduce": [
                    { "name": "too_cold", "fn": "r._value <= 32" },
                    { "name": "too_hot", "fn": "r._value >= 212" },
                    { "name": "just_right" }
                ]
            })
        );
    }

    #[test]
    fn validation_errors() {
        let err = create(vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "alert.format: reduce property must have at least one element"
        );

        let err = create(vec![element(&[("name", "a")]), element(&[("name", "b")])]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "alert.format: reduce element at index 0 missing required property 'fn'"
        );

        let err = create(vec![element(&[("fn", "true")])]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "alert.format: reduce element at index 0 missing required property 'name'"
        );

        let err = create(vec![Value::Int(1)]).unwrap_err();
        assert_eq!(err.to_string(), "alert.format: invalid type in reduce array");
    }
}
