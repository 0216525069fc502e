//! Semantic analysis: names, callees, keyword parameters and argument types.
//!
//! Required parameters are not enforced here; constructors report missing
//! arguments themselves when the call runs.

use crate::error::{Error, Result};
use crate::registry::Declarations;
use crate::script::lexer::Position;
use crate::script::parser::{Expr, ExprKind, Property, Statement};
use crate::values::{FunctionSignature, Type};
use std::collections::{BTreeMap, BTreeSet};

pub fn check(statements: &[Statement], declarations: &Declarations) -> Result<()> {
    let mut env: BTreeMap<String, Type> = declarations.clone();
    for statement in statements {
        match statement {
            Statement::Assign { name, value, .. } => {
                let ty = infer(value, &env)?;
                env.insert(name.clone(), ty);
            }
            Statement::Expr(expr) => {
                infer(expr, &env)?;
            }
        }
    }
    Ok(())
}

fn infer(expr: &Expr, env: &BTreeMap<String, Type>) -> Result<Type> {
    let pos = expr.pos;
    match &expr.kind {
        ExprKind::String(_) => Ok(Type::String),
        ExprKind::Int(_) => Ok(Type::Int),
        ExprKind::Float(_) => Ok(Type::Float),
        ExprKind::Bool(_) => Ok(Type::Bool),
        ExprKind::Duration(_) => Ok(Type::Duration),
        ExprKind::Ident(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| error(pos, format!("undefined identifier \"{}\"", name))),
        ExprKind::Array(items) => {
            let mut element = None;
            for item in items {
                let ty = infer(item, env)?;
                element.get_or_insert(ty);
            }
            Ok(Type::array(element.unwrap_or(Type::Any)))
        }
        ExprKind::Object(props) => {
            check_unique(props)?;
            for prop in props {
                infer(&prop.value, env)?;
            }
            Ok(Type::Object)
        }
        ExprKind::Call { callee, args } => check_call(callee, args, None, pos, env),
        ExprKind::Pipeline { head, stages } => {
            let mut ty = infer(head, env)?;
            for stage in stages {
                ty = check_call(&stage.callee, &stage.args, Some(ty), stage.pos, env)?;
            }
            Ok(ty)
        }
    }
}

fn check_call(
    callee: &str,
    args: &[Property],
    piped: Option<Type>,
    pos: Position,
    env: &BTreeMap<String, Type>,
) -> Result<Type> {
    let signature: &FunctionSignature = match env.get(callee) {
        Some(Type::Function(sig)) => sig,
        Some(other) => {
            return Err(error(
                pos,
                format!("\"{}\" is not a function: got {}", callee, other),
            ));
        }
        None => return Err(error(pos, format!("undefined identifier \"{}\"", callee))),
    };

    check_unique(args)?;
    for arg in args {
        let Some(expected) = signature.params.get(&arg.key) else {
            return Err(error(
                arg.pos,
                format!("function \"{}\" has no parameter \"{}\"", callee, arg.key),
            ));
        };
        let got = infer(&arg.value, env)?;
        if !expected.accepts(&got) {
            return Err(error(
                arg.value.pos,
                format!(
                    "argument \"{}\" of \"{}\" has type {}, expected {}",
                    arg.key, callee, got, expected
                ),
            ));
        }
    }

    if let Some(input) = piped {
        let Some(pipe) = &signature.pipe_argument else {
            return Err(error(
                pos,
                format!("function \"{}\" does not accept piped input", callee),
            ));
        };
        if args.iter().any(|a| &a.key == pipe) {
            return Err(error(
                pos,
                format!("argument \"{}\" of \"{}\" is both piped and passed", pipe, callee),
            ));
        }
        let expected = signature.params.get(pipe).unwrap_or(&Type::Any);
        if !expected.accepts(&input) {
            return Err(error(
                pos,
                format!("cannot pipe {} into \"{}\", expected {}", input, callee, expected),
            ));
        }
    }

    Ok(signature.return_type.clone())
}

fn check_unique(props: &[Property]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for prop in props {
        if !seen.insert(prop.key.as_str()) {
            return Err(error(prop.pos, format!("duplicate property \"{}\"", prop.key)));
        }
    }
    Ok(())
}

fn error(pos: Position, message: String) -> Error {
    Error::semantic(pos.line, pos.column, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{lexer, parser};
    use crate::values::default_signature;

    fn declarations() -> Declarations {
        let mut d = Declarations::new();
        d.insert(
            "from".into(),
            Type::Function(Box::new(
                FunctionSignature::new(Type::Table).required_param("bucket", Type::String),
            )),
        );
        d.insert(
            "count".into(),
            Type::Function(Box::new(default_signature().param("column", Type::String))),
        );
        d.insert("limit".into(), Type::Int);
        d
    }

    fn run(source: &str) -> Result<()> {
        let statements = parser::parse(lexer::tokenize(source)?)?;
        check(&statements, &declarations())
    }

    fn message(source: &str) -> String {
        match run(source).unwrap_err() {
            Error::Semantic { message, .. } => message,
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn well_formed_programs_pass() {
        run("a = from(bucket: \"x\")\nb = count(table: a)\na |> count(column: \"v\")").unwrap();
    }

    #[test]
    fn rejects_bad_programs() {
        assert_eq!(message("b = count(table: nope)"), "undefined identifier \"nope\"");
        assert_eq!(message("limit()"), "\"limit\" is not a function: got int");
        assert_eq!(
            message("from(bucket: \"x\", org: \"y\")"),
            "function \"from\" has no parameter \"org\""
        );
        assert_eq!(
            message("from(bucket: 3)"),
            "argument \"bucket\" of \"from\" has type int, expected string"
        );
        assert_eq!(
            message("a = from(bucket: \"x\")\na |> from(bucket: \"y\")"),
            "function \"from\" does not accept piped input"
        );
        assert_eq!(
            message("a = from(bucket: \"x\")\na |> count(table: a)"),
            "argument \"table\" of \"count\" is both piped and passed"
        );
        assert_eq!(
            message("from(bucket: \"x\", bucket: \"y\")"),
            "duplicate property \"bucket\""
        );
    }

    #[test]
    fn assigned_names_are_typed() {
        assert_eq!(
            message("n = 3\nn |> count()"),
            "cannot pipe int into \"count\", expected table"
        );
    }
}
