//! Wrapper emission.
//!
//! Turns one [`Signature`] into two text fragments: a declaration for the
//! facade header and a definition for the facade source. The definition
//! acquires the recursive lock, forwards every argument positionally to the
//! unwrapped function, releases the lock, and returns the captured value
//! after release.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::assemble::{AssembleError, TemplateEngine};
use crate::parser::Signature;

/// How wrapper and callee names relate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingScheme {
    /// The wrapper keeps the toolkit name; the unwrapped symbol is reached
    /// through `real_prefix` (linker-wrap convention). Callers relink
    /// against the facade with zero source changes.
    Interpose {
        /// Prefix of the real symbol, typically `__real_`.
        real_prefix: String,
    },

    /// The wrapper carries a prefix (`safe_lvgl_set_x`) and calls the
    /// toolkit symbol directly.
    Prefix {
        /// Prefix of the wrapper name, typically `safe_`.
        prefix: String,
    },
}

impl Default for NamingScheme {
    fn default() -> Self {
        NamingScheme::Interpose {
            real_prefix: "__real_".to_string(),
        }
    }
}

impl NamingScheme {
    /// Name the emitted wrapper carries.
    pub fn wrapper_name(&self, original: &str) -> String {
        match self {
            NamingScheme::Interpose { .. } => original.to_string(),
            NamingScheme::Prefix { prefix } => format!("{}{}", prefix, original),
        }
    }

    /// Name the wrapper body calls.
    pub fn callee_name(&self, original: &str) -> String {
        match self {
            NamingScheme::Interpose { real_prefix } => format!("{}{}", real_prefix, original),
            NamingScheme::Prefix { .. } => original.to_string(),
        }
    }

    /// Whether the callee needs its own extern declaration in the source.
    fn declares_callee(&self) -> bool {
        matches!(self, NamingScheme::Interpose { .. })
    }
}

/// A construct the emitter cannot safely forward.
#[derive(Debug, Error, Diagnostic)]
#[error("cannot safely forward `{name}`: {reason}")]
#[diagnostic(
    code(safelvgl::emit::unsupported_signature),
    help("write this wrapper by hand and keep it beside the generated files")
)]
pub struct UnsupportedSignature {
    /// Function name.
    pub name: String,
    /// Why forwarding would be wrong.
    pub reason: String,
}

/// Emission failures.
#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    /// Skippable: the signature is excluded with a diagnostic.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Unsupported(#[from] UnsupportedSignature),

    /// Fatal: a wrapper template is broken.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] AssembleError),
}

/// Rendering context for the per-function templates.
#[derive(Serialize)]
struct WrapperContext {
    func_decl: String,
    real_decl: String,
    func_call: String,
    func_ret: String,
}

/// Emits wrapper fragments for one signature at a time.
///
/// Emission is deterministic: the same signature always yields the same
/// bytes, so generated files diff cleanly across runs.
pub struct WrapperEmitter<'e> {
    engine: &'e TemplateEngine,
    naming: NamingScheme,
}

impl<'e> WrapperEmitter<'e> {
    /// Create an emitter over a template engine.
    pub fn new(engine: &'e TemplateEngine, naming: NamingScheme) -> Self {
        WrapperEmitter { engine, naming }
    }

    /// Emit the facade-header declaration fragment.
    pub fn emit_decl(&self, sig: &Signature) -> Result<String, EmitError> {
        self.check_supported(sig)?;
        let ctx = self.context(sig);
        Ok(self.engine.render("wrapper_decl", &ctx)?.trim_end().to_string())
    }

    /// Emit the facade-source definition fragment.
    pub fn emit_def(&self, sig: &Signature) -> Result<String, EmitError> {
        self.check_supported(sig)?;
        let ctx = self.context(sig);
        Ok(self.engine.render("wrapper_def", &ctx)?.trim_end().to_string())
    }

    fn check_supported(&self, sig: &Signature) -> Result<(), UnsupportedSignature> {
        if sig.variadic {
            return Err(UnsupportedSignature {
                name: sig.name.clone(),
                reason: "variadic argument lists cannot be forwarded".to_string(),
            });
        }
        Ok(())
    }

    fn context(&self, sig: &Signature) -> WrapperContext {
        let wrapper = self.naming.wrapper_name(&sig.name);
        let callee = self.naming.callee_name(&sig.name);
        let call = sig.forward_call(&callee);

        let func_call = if sig.return_type.is_void() {
            format!("{};", call)
        } else {
            format!("{} ret = {};", sig.return_type, call)
        };
        let func_ret = if sig.return_type.is_void() {
            String::new()
        } else {
            "return ret;".to_string()
        };
        let real_decl = if self.naming.declares_callee() {
            format!("extern {};", sig.declaration(&callee))
        } else {
            String::new()
        };

        WrapperContext {
            func_decl: sig.declaration(&wrapper),
            real_decl,
            func_call,
            func_ret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Param, TypeRef};

    fn engine() -> TemplateEngine {
        TemplateEngine::new().unwrap()
    }

    fn setter() -> Signature {
        Signature::new("widget_set_x", TypeRef::Void)
            .with_param(Param::new("w", TypeRef::parse("widget_t *")))
            .with_param(Param::new("x", TypeRef::parse("int")))
    }

    fn getter() -> Signature {
        Signature::new("widget_get_x", TypeRef::parse("int"))
            .with_param(Param::new("w", TypeRef::parse("widget_t *")))
    }

    #[test]
    fn test_interpose_decl_is_structurally_identical() {
        let engine = engine();
        let emitter = WrapperEmitter::new(&engine, NamingScheme::default());

        assert_eq!(
            emitter.emit_decl(&setter()).unwrap(),
            "void widget_set_x(widget_t * w, int x);"
        );
    }

    #[test]
    fn test_interpose_def_locks_forwards_unlocks() {
        let engine = engine();
        let emitter = WrapperEmitter::new(&engine, NamingScheme::default());

        let def = emitter.emit_def(&setter()).unwrap();
        assert_eq!(
            def,
            "extern void __real_widget_set_x(widget_t * w, int x);\n\
             void widget_set_x(widget_t * w, int x)\n\
             {\n\
             \x20   lv_recursive_lock();\n\
             \x20   __real_widget_set_x(w, x);\n\
             \x20   lv_recursive_unlock();\n\
             }"
        );
    }

    #[test]
    fn test_return_value_is_captured_before_unlock() {
        let engine = engine();
        let emitter = WrapperEmitter::new(&engine, NamingScheme::default());

        let def = emitter.emit_def(&getter()).unwrap();
        let capture = def.find("int ret = __real_widget_get_x(w);").unwrap();
        let unlock = def.find("lv_recursive_unlock();").unwrap();
        let ret = def.find("return ret;").unwrap();
        assert!(capture < unlock && unlock < ret);
    }

    #[test]
    fn test_prefix_scheme_matches_original_tool() {
        let engine = engine();
        let emitter = WrapperEmitter::new(
            &engine,
            NamingScheme::Prefix {
                prefix: "safe_".to_string(),
            },
        );

        assert_eq!(
            emitter.emit_decl(&setter()).unwrap(),
            "void safe_widget_set_x(widget_t * w, int x);"
        );

        let def = emitter.emit_def(&getter()).unwrap();
        assert!(def.starts_with("int safe_widget_get_x(widget_t * w)"));
        assert!(def.contains("int ret = widget_get_x(w);"));
        assert!(!def.contains("extern"));
    }

    #[test]
    fn test_variadic_is_unsupported_not_wrong() {
        let engine = engine();
        let emitter = WrapperEmitter::new(&engine, NamingScheme::default());

        let mut sig = setter();
        sig.variadic = true;

        match emitter.emit_def(&sig) {
            Err(EmitError::Unsupported(e)) => {
                assert_eq!(e.name, "widget_set_x");
                assert!(e.reason.contains("variadic"));
            }
            other => panic!("expected UnsupportedSignature, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_emission_is_deterministic() {
        let engine = engine();
        let emitter = WrapperEmitter::new(&engine, NamingScheme::default());

        assert_eq!(
            emitter.emit_def(&getter()).unwrap(),
            emitter.emit_def(&getter()).unwrap()
        );
    }
}
