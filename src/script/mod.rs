//! Line-oriented script dialect used as the default front end.
//!
//! ```text
//! // comments run to the end of the line
//! a = from(bucket: "telegraf")
//! b = a |> range(start: -1h) |> filter(fn: "r._value > 0")
//! b |> yield(name: "out")
//! ```
//!
//! Statements are separated by newlines or `;`. Values are strings, integers,
//! floats, booleans, durations, arrays and objects; the only operations are
//! calls and `|>`, which passes its left side as the callee's pipe parameter.

pub mod check;
pub mod eval;
pub mod lexer;
pub mod parser;

use crate::compile::Evaluator;
use crate::error::Result;
use crate::registry::Declarations;
use crate::scope::Scope;
use crate::values::Value;
use parser::Statement;

/// Analyzed script, ready to evaluate.
#[derive(Debug, Clone)]
pub struct ScriptProgram {
    statements: Vec<Statement>,
}

impl ScriptProgram {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEvaluator;

impl Evaluator for ScriptEvaluator {
    type Analyzed = ScriptProgram;

    fn analyze(&self, source: &str, declarations: &Declarations) -> Result<ScriptProgram> {
        let statements = parser::parse(lexer::tokenize(source)?)?;
        check::check(&statements, declarations)?;
        Ok(ScriptProgram { statements })
    }

    fn evaluate(&self, program: &ScriptProgram, scope: &mut Scope) -> Result<Option<Value>> {
        eval::evaluate(&program.statements, scope)
    }
}
