//! Compile entry points: script text in, [`Spec`] out.

use crate::error::{Error, Result};
use crate::registry::{Declarations, Registry};
use crate::scope::Scope;
use crate::spec::{Format, Spec};
use crate::values::Value;
use tracing::{debug, info, info_span};

/// Front end seam: parsing, semantic analysis and evaluation.
///
/// `analyze` turns source text into a checked program using the registry's
/// declaration table; `evaluate` runs it against a scope. Operator calls made
/// during evaluation go through [`Scope::call`], which is how nodes end up in
/// the compilation's program.
pub trait Evaluator {
    type Analyzed;

    fn analyze(&self, source: &str, declarations: &Declarations) -> Result<Self::Analyzed>;

    /// Returns the value of the last expression, if any.
    fn evaluate(&self, program: &Self::Analyzed, scope: &mut Scope) -> Result<Option<Value>>;
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Log the resulting Spec at info level.
    pub verbose: bool,
}

impl CompileOptions {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Evaluate `source` and export every operation it created.
pub fn compile<E: Evaluator>(
    registry: &Registry,
    evaluator: &E,
    source: &str,
    options: &CompileOptions,
) -> Result<Spec> {
    let scope = evaluate_source(registry, evaluator, source)?;
    let spec = scope.program().to_spec();
    finish(spec, options)
}

/// Evaluate `source` and export only the table bound to `name` plus its
/// ancestors.
pub fn compile_value<E: Evaluator>(
    registry: &Registry,
    evaluator: &E,
    source: &str,
    name: &str,
    options: &CompileOptions,
) -> Result<Spec> {
    let scope = evaluate_source(registry, evaluator, source)?;
    let handle = match scope.lookup(name) {
        Some(Value::Table(handle)) => *handle,
        Some(other) => {
            return Err(Error::type_error(format!(
                "\"{}\" is not a table object: got {}",
                name,
                other.type_of()
            )));
        }
        None => return Err(Error::UndefinedIdentifier(name.to_string())),
    };
    let spec = scope.program().ancestors_spec(handle);
    finish(spec, options)
}

fn evaluate_source<E: Evaluator>(registry: &Registry, evaluator: &E, source: &str) -> Result<Scope> {
    let analyzed = {
        let _span = info_span!("parse").entered();
        evaluator.analyze(source, registry.declarations())?
    };

    let _span = info_span!("compile").entered();
    let mut scope = registry.scope(evaluator)?;
    evaluator.evaluate(&analyzed, &mut scope)?;
    debug!(operations = scope.program().len(), "script evaluated");
    Ok(scope)
}

fn finish(spec: Spec, options: &CompileOptions) -> Result<Spec> {
    if options.verbose {
        info!("query spec:\n{}", spec.formatted(Format::Json)?);
    }
    Ok(spec)
}
