//! Signature gate for the compiled engine.

use super::core::{Kwargs, TransformFunction};
use super::engine::Engine;
use crate::core::error::{Error, Result};

/// Positional parameters a compiled transform must declare: `(values, index)`
pub const COMPILED_ARITY: usize = 2;

/// Check that `function` can run on `engine` with the given call-site keywords.
///
/// Only the compiled engine is restricted. Keyword capture is checked before
/// arity, so `f(x, **kwargs)` called with keywords reports the keyword problem.
pub fn validate(function: &TransformFunction, engine: Engine, kwargs: &Kwargs) -> Result<()> {
    if engine != Engine::Compiled {
        return Ok(());
    }

    let signature = function.signature();

    if !kwargs.is_empty() {
        let names: Vec<&str> = kwargs.keys().map(String::as_str).collect();
        return Err(Error::UnsupportedKeyword(format!(
            "`{}` was called with keyword arguments [{}]",
            signature.name,
            names.join(", ")
        )));
    }

    if signature.var_keyword {
        return Err(Error::UnsupportedKeyword(format!(
            "`{}` captures variadic keyword arguments",
            signature.name
        )));
    }

    if signature.arity() != COMPILED_ARITY {
        return Err(Error::Arity {
            function: signature.name.clone(),
            expected: COMPILED_ARITY,
            found: signature.arity(),
        });
    }

    Ok(())
}
