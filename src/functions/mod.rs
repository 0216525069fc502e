//! Operator families exposed as builtin functions.
//!
//! Each family module has a `register` function adding its constructors to a
//! [`Registry`]; [`register_all`] is the start-up routine that runs them all.

pub mod alert_format;
pub mod count;
pub mod filter;
pub mod from;
pub mod join;
pub mod range;
pub mod yield_;

use crate::error::Result;
use crate::registry::Registry;
use crate::script::ScriptEvaluator;

pub fn register_all(registry: &mut Registry) -> Result<()> {
    from::register(registry)?;
    range::register(registry)?;
    filter::register(registry)?;
    count::register(registry)?;
    join::register(registry)?;
    yield_::register(registry)?;
    alert_format::register(registry)?;
    Ok(())
}

/// Registry with every operator family registered and sealed, using the
/// script dialect to check builtin scripts.
pub fn standard_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    register_all(&mut registry)?;
    registry.seal(&ScriptEvaluator)?;
    Ok(registry)
}
