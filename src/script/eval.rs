//! Tree-walking evaluation of checked statements against a [`Scope`].

use crate::arguments::Arguments;
use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::script::lexer::Position;
use crate::script::parser::{Expr, ExprKind, Property, Statement};
use crate::values::Value;
use std::collections::BTreeMap;

pub fn evaluate(statements: &[Statement], scope: &mut Scope) -> Result<Option<Value>> {
    let mut last = None;
    for statement in statements {
        last = Some(match statement {
            Statement::Assign { name, value, .. } => {
                let value = eval(value, scope)?;
                scope.set(name.clone(), value.clone());
                value
            }
            Statement::Expr(expr) => eval(expr, scope)?,
        });
    }
    Ok(last)
}

fn eval(expr: &Expr, scope: &mut Scope) -> Result<Value> {
    match &expr.kind {
        ExprKind::String(s) => Ok(Value::String(s.clone())),
        ExprKind::Int(n) => Ok(Value::Int(*n)),
        ExprKind::Float(x) => Ok(Value::Float(*x)),
        ExprKind::Bool(b) => Ok(Value::Bool(*b)),
        ExprKind::Duration(d) => Ok(Value::Duration(*d)),
        ExprKind::Ident(name) => scope
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedIdentifier(name.clone())),
        ExprKind::Array(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        ExprKind::Object(props) => Ok(Value::Object(eval_properties(props, scope)?)),
        ExprKind::Call { callee, args } => call(callee, args, None, expr.pos, scope),
        ExprKind::Pipeline { head, stages } => {
            let mut value = eval(head, scope)?;
            for stage in stages {
                value = call(&stage.callee, &stage.args, Some(value), stage.pos, scope)?;
            }
            Ok(value)
        }
    }
}

fn call(
    callee: &str,
    args: &[Property],
    piped: Option<Value>,
    pos: Position,
    scope: &mut Scope,
) -> Result<Value> {
    let function = match scope.lookup(callee) {
        Some(Value::Function(f)) => f.clone(),
        Some(other) => {
            return Err(Error::type_error(format!(
                "\"{}\" is not a function: got {}",
                callee,
                other.type_of()
            )));
        }
        None => return Err(Error::UndefinedIdentifier(callee.to_string())),
    };

    let mut values = eval_properties(args, scope)?;
    if let Some(input) = piped {
        let pipe = function.signature().pipe_argument.clone().ok_or_else(|| {
            Error::type_error(format!("function \"{}\" does not accept piped input", callee))
        })?;
        values.insert(pipe, input);
    }
    scope
        .call(&function, Arguments::new(values))
        .map_err(|e| e.at(pos.line, pos.column))
}

fn eval_properties(props: &[Property], scope: &mut Scope) -> Result<BTreeMap<String, Value>> {
    let mut values = BTreeMap::new();
    for prop in props {
        let value = eval(&prop.value, scope)?;
        values.insert(prop.key.clone(), value);
    }
    Ok(values)
}
