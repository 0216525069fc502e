//! Builtin function registry.
//!
//! The registry is filled once at start-up by every operator family, then
//! sealed. After sealing it is read-only and is shared by reference between
//! concurrent compilations; each compilation gets its own [`Scope`] copy.

use crate::administration::Administration;
use crate::arguments::Arguments;
use crate::compile::Evaluator;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::operation::OperationSpec;
use crate::scope::Scope;
use crate::values::{FunctionSignature, Type, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Name to type table used by semantic analysis.
pub type Declarations = BTreeMap<String, Type>;

#[derive(Debug, Default)]
pub struct Registry {
    values: BTreeMap<String, Value>,
    declarations: Declarations,
    scripts: BTreeMap<String, String>,
    sealed: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a builtin operator constructor.
    pub fn register_function<F>(
        &mut self,
        name: &str,
        create: F,
        signature: FunctionSignature,
    ) -> Result<()>
    where
        F: Fn(&Arguments, &mut Administration) -> Result<Arc<dyn OperationSpec>>
            + Send
            + Sync
            + 'static,
    {
        self.register_value(
            name,
            Value::Function(Function::new(name, signature, false, create)),
        )
    }

    /// Add a builtin constructor whose calls produce side effects, such as
    /// `yield`.
    pub fn register_function_with_side_effect<F>(
        &mut self,
        name: &str,
        create: F,
        signature: FunctionSignature,
    ) -> Result<()>
    where
        F: Fn(&Arguments, &mut Administration) -> Result<Arc<dyn OperationSpec>>
            + Send
            + Sync
            + 'static,
    {
        self.register_value(
            name,
            Value::Function(Function::new(name, signature, true, create)),
        )
    }

    /// Add a builtin value to every scope.
    pub fn register_value(&mut self, name: &str, value: Value) -> Result<()> {
        self.ensure_open(name)?;
        if let Value::Table(_) = value {
            return Err(Error::registration(format!(
                "builtin \"{}\" cannot be a table: tables only exist inside one compilation",
                name
            )));
        }
        if self.values.contains_key(name) {
            return Err(Error::registration(format!(
                "duplicate registration for builtin \"{}\"",
                name
            )));
        }
        debug!(builtin = name, ty = %value.type_of(), "registered builtin");
        self.declarations.insert(name.to_string(), value.type_of());
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Stage a script whose bindings become builtins. Scripts are checked
    /// when the registry is sealed, in name order.
    pub fn register_script(&mut self, name: &str, source: &str) -> Result<()> {
        self.ensure_open(name)?;
        if self.scripts.contains_key(name) {
            return Err(Error::registration(format!(
                "duplicate registration for builtin script \"{}\"",
                name
            )));
        }
        self.scripts.insert(name.to_string(), source.to_string());
        Ok(())
    }

    /// Freeze the registry.
    ///
    /// Every staged script is analyzed and evaluated against the full scope so
    /// that broken builtins are reported at start-up. Sealing twice is a no-op.
    /// On failure the registry stays open.
    pub fn seal<E: Evaluator>(&mut self, evaluator: &E) -> Result<()> {
        if self.sealed {
            return Ok(());
        }

        let mut declarations = self.declarations.clone();
        let mut scope = Scope::with_values(self.values.clone());
        for (name, source) in &self.scripts {
            let analyzed = evaluator
                .analyze(source, &declarations)
                .map_err(|e| script_error(name, e))?;
            evaluator
                .evaluate(&analyzed, &mut scope)
                .map_err(|e| script_error(name, e))?;
            for (binding, value) in scope.bindings() {
                declarations.insert(binding.to_string(), value.type_of());
            }
        }

        self.declarations = declarations;
        self.sealed = true;
        info!(
            builtins = self.values.len(),
            scripts = self.scripts.len(),
            "builtin registry sealed"
        );
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Fresh scope for one compilation, with builtin scripts evaluated into it.
    pub fn scope<E: Evaluator>(&self, evaluator: &E) -> Result<Scope> {
        if !self.sealed {
            return Err(Error::registration("builtins are not sealed"));
        }
        let mut scope = Scope::with_values(self.values.clone());
        for source in self.scripts.values() {
            let analyzed = evaluator.analyze(source, &self.declarations)?;
            evaluator.evaluate(&analyzed, &mut scope)?;
        }
        Ok(scope)
    }

    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Registered functions in name order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.values.values().filter_map(Value::as_function)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn ensure_open(&self, name: &str) -> Result<()> {
        if self.sealed {
            return Err(Error::registration(format!(
                "already sealed, cannot register builtin \"{}\"",
                name
            )));
        }
        Ok(())
    }
}

fn script_error(name: &str, err: Error) -> Error {
    Error::registration(format!("builtin script \"{}\": {}", name, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use crate::script::ScriptEvaluator;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct Source;

    impl OperationSpec for Source {
        fn kind(&self) -> OperationKind {
            OperationKind::from("source")
        }
    }

    fn registry() -> Registry {
        let mut r = Registry::new();
        r.register_function(
            "source",
            |_, _| Ok(Arc::new(Source)),
            FunctionSignature::new(Type::Table),
        )
        .unwrap();
        r
    }

    #[test]
    fn duplicate_names_fail_before_seal() {
        let mut r = registry();
        let err = r.register_value("source", Value::Int(1)).unwrap_err();
        assert!(matches!(err, Error::Registration(_)));

        r.register_script("defaults", "x = 1").unwrap();
        assert!(r.register_script("defaults", "y = 2").is_err());
    }

    #[test]
    fn registration_after_seal_fails() {
        let mut r = registry();
        r.seal(&ScriptEvaluator).unwrap();
        assert!(r.is_sealed());
        assert_eq!(r.len(), 1);

        assert!(matches!(
            r.register_value("late", Value::Int(1)),
            Err(Error::Registration(_))
        ));
        assert!(matches!(
            r.register_function("late", |_, _| Ok(Arc::new(Source)), FunctionSignature::new(Type::Table)),
            Err(Error::Registration(_))
        ));
        assert!(matches!(
            r.register_script("late", "x = 1"),
            Err(Error::Registration(_))
        ));
    }

    #[test]
    fn seal_is_idempotent() {
        let mut r = registry();
        r.seal(&ScriptEvaluator).unwrap();
        r.seal(&ScriptEvaluator).unwrap();
        assert!(r.is_sealed());
    }

    #[test]
    fn scope_requires_seal() {
        let r = registry();
        assert!(matches!(r.scope(&ScriptEvaluator), Err(Error::Registration(_))));
    }

    #[test]
    fn tables_cannot_be_builtins() {
        let mut r = Registry::new();
        assert!(r.is_empty());
        let err = r
            .register_value("t", Value::Table(crate::operation::NodeHandle(0)))
            .unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
    }

    #[test]
    fn broken_script_fails_seal() {
        let mut r = registry();
        r.register_script("broken", "x = nowhere").unwrap();
        let err = r.seal(&ScriptEvaluator).unwrap_err();
        assert!(err.to_string().contains("builtin script \"broken\""), "{err}");
        assert!(!r.is_sealed());
    }

    #[test]
    fn script_bindings_become_declarations() {
        let mut r = registry();
        r.register_script("defaults", "defaultBucket = \"telegraf\"\nroot = source()")
            .unwrap();
        r.seal(&ScriptEvaluator).unwrap();

        assert_eq!(r.declarations().get("defaultBucket"), Some(&Type::String));
        assert_eq!(r.declarations().get("root"), Some(&Type::Table));

        let scope = r.scope(&ScriptEvaluator).unwrap();
        assert_eq!(scope.lookup("defaultBucket").and_then(Value::as_str), Some("telegraf"));
        assert_eq!(scope.program().len(), 1);
    }

    #[test]
    fn scopes_are_independent() {
        let mut r = registry();
        r.seal(&ScriptEvaluator).unwrap();

        let mut first = r.scope(&ScriptEvaluator).unwrap();
        let second = r.scope(&ScriptEvaluator).unwrap();
        let source = first.lookup("source").and_then(Value::as_function).cloned().unwrap();
        first.call(&source, Arguments::default()).unwrap();
        first.set("mine", Value::Int(1));

        assert_eq!(first.program().len(), 1);
        assert!(second.program().is_empty());
        assert!(!second.contains("mine"));
    }
}
