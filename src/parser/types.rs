//! Model types for parsed C declarations.
//!
//! These types carry exactly what wrapper generation needs: the function
//! name, its return type, and its ordered parameter list. Type text is
//! reproduced verbatim; the generator never interprets type semantics.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A textual C type reference.
///
/// Qualifiers, base name, and pointer levels are kept as written in the
/// source declaration, so emitted wrappers are ABI-faithful by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    /// The `void` sentinel (no value to capture or forward).
    Void,

    /// An ordinary type expression: `const lv_obj_t *`, `unsigned int`,
    /// `struct _lv_area_t **`, ...
    Named {
        /// Leading qualifiers (`const`, `volatile`), in source order.
        qualifiers: Vec<String>,
        /// Base type name, possibly multi-word (`unsigned int`, `struct foo`).
        base: String,
        /// Pointer indirection levels.
        pointers: u8,
    },

    /// A function-pointer declarator, carried verbatim including the
    /// embedded parameter name: `void (*cb)(lv_event_t *)`.
    FunctionPointer {
        /// The full declarator text, whitespace-normalized.
        text: String,
    },
}

impl TypeRef {
    /// Parse a type expression. The input must not contain a declarator
    /// name; function pointers are handled at the parameter level.
    pub fn parse(s: &str) -> TypeRef {
        let s = s.trim();
        if s == "void" {
            return TypeRef::Void;
        }

        let mut pointers: u8 = 0;
        let mut rest = s;
        while let Some(stripped) = rest.trim_end().strip_suffix('*') {
            pointers += 1;
            rest = stripped;
        }

        let mut words: Vec<&str> = rest.split_whitespace().collect();
        let mut qualifiers = Vec::new();
        while let Some(first) = words.first() {
            if matches!(*first, "const" | "volatile") {
                qualifiers.push(words.remove(0).to_string());
            } else {
                break;
            }
        }

        TypeRef::Named {
            qualifiers,
            base: words.join(" "),
            pointers,
        }
    }

    /// True for the `void` sentinel.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Named {
                qualifiers,
                base,
                pointers,
            } => {
                for q in qualifiers {
                    write!(f, "{} ", q)?;
                }
                write!(f, "{}", base)?;
                if *pointers > 0 {
                    write!(f, " {}", "*".repeat(*pointers as usize))?;
                }
                Ok(())
            }
            TypeRef::FunctionPointer { text } => write!(f, "{}", text),
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name. Unnamed C parameters get a synthetic `argN` name at
    /// parse time so the wrapper can forward them.
    pub name: String,

    /// Parameter type.
    pub ty: TypeRef,
}

impl Param {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }

    /// Render the parameter as it appears inside a declaration.
    pub fn render(&self) -> String {
        match &self.ty {
            // The name is embedded in the verbatim declarator.
            TypeRef::FunctionPointer { text } => text.clone(),
            ty => format!("{} {}", ty, self.name),
        }
    }
}

/// A decomposed function declaration: the unit of wrapper generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Function name, unique within a run.
    pub name: String,

    /// Return type; `TypeRef::Void` when there is nothing to capture.
    pub return_type: TypeRef,

    /// Ordered parameter list.
    pub params: Vec<Param>,

    /// Whether the declaration ends in a `...` parameter.
    pub variadic: bool,
}

impl Signature {
    /// Create a new signature with no parameters.
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Signature {
            name: name.into(),
            return_type,
            params: Vec::new(),
            variadic: false,
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Render a declaration head (no trailing semicolon) with the given
    /// function name, e.g. `void widget_set_x(widget_t * w, int x)`.
    pub fn declaration(&self, name: &str) -> String {
        let params = if self.params.is_empty() && !self.variadic {
            "void".to_string()
        } else {
            let mut rendered: Vec<String> = self.params.iter().map(Param::render).collect();
            if self.variadic {
                rendered.push("...".to_string());
            }
            rendered.join(", ")
        };
        format!("{} {}({})", self.return_type, name, params)
    }

    /// Render a forwarding call to `callee` with every parameter passed
    /// positionally: `callee(w, x)`.
    pub fn forward_call(&self, callee: &str) -> String {
        let args: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        format!("{}({})", callee, args.join(", "))
    }
}

/// Why a declaration was left out of the facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Name matched a blocklist pattern.
    Blocklisted { pattern: String },

    /// A declaration with this name was already collected.
    Duplicate,

    /// The declaration could not be decomposed into return type / name /
    /// parameter list.
    Malformed { detail: String },

    /// The emitter cannot safely forward this construct.
    Unsupported { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blocklisted { pattern } => {
                write!(f, "name matches blocklist pattern `{}`", pattern)
            }
            SkipReason::Duplicate => write!(f, "duplicate declaration"),
            SkipReason::Malformed { detail } => write!(f, "malformed declaration: {}", detail),
            SkipReason::Unsupported { detail } => write!(f, "unsupported: {}", detail),
        }
    }
}

/// A skipped declaration, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skip {
    /// Function name when known, otherwise a truncated source snippet.
    pub name: String,

    /// Why it was skipped.
    pub reason: SkipReason,
}

impl Skip {
    /// Create a new skip record.
    pub fn new(name: impl Into<String>, reason: SkipReason) -> Self {
        Skip {
            name: name.into(),
            reason,
        }
    }
}

/// The parsed function surface of one header, in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSurface {
    /// Source file path.
    pub source: PathBuf,

    /// Wrappable function signatures, in source order.
    pub functions: Vec<Signature>,

    /// Declarations left out, with reasons.
    pub skipped: Vec<Skip>,
}

impl ParsedSurface {
    /// Create a new empty surface for a source path.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        ParsedSurface {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Merge another surface into this one, preserving order.
    pub fn merge(&mut self, other: ParsedSurface) {
        self.functions.extend(other.functions);
        self.skipped.extend(other.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typeref_parse_plain() {
        assert_eq!(TypeRef::parse("void"), TypeRef::Void);
        assert_eq!(
            TypeRef::parse("int"),
            TypeRef::Named {
                qualifiers: vec![],
                base: "int".to_string(),
                pointers: 0,
            }
        );
        assert_eq!(
            TypeRef::parse("unsigned int"),
            TypeRef::Named {
                qualifiers: vec![],
                base: "unsigned int".to_string(),
                pointers: 0,
            }
        );
    }

    #[test]
    fn test_typeref_parse_pointers_and_qualifiers() {
        assert_eq!(
            TypeRef::parse("const char *"),
            TypeRef::Named {
                qualifiers: vec!["const".to_string()],
                base: "char".to_string(),
                pointers: 1,
            }
        );
        assert_eq!(
            TypeRef::parse("lv_obj_t **"),
            TypeRef::Named {
                qualifiers: vec![],
                base: "lv_obj_t".to_string(),
                pointers: 2,
            }
        );
    }

    #[test]
    fn test_typeref_display_roundtrip() {
        assert_eq!(TypeRef::parse("const char *").to_string(), "const char *");
        assert_eq!(TypeRef::parse("widget_t*").to_string(), "widget_t *");
        assert_eq!(TypeRef::parse("struct foo **").to_string(), "struct foo **");
        assert_eq!(TypeRef::parse("void").to_string(), "void");
    }

    #[test]
    fn test_declaration_rendering() {
        let sig = Signature::new("widget_set_x", TypeRef::Void)
            .with_param(Param::new("w", TypeRef::parse("widget_t *")))
            .with_param(Param::new("x", TypeRef::parse("int")));

        assert_eq!(
            sig.declaration("widget_set_x"),
            "void widget_set_x(widget_t * w, int x)"
        );
        assert_eq!(sig.forward_call("widget_set_x"), "widget_set_x(w, x)");
    }

    #[test]
    fn test_declaration_no_params_renders_void() {
        let sig = Signature::new("lv_task_handler", TypeRef::Void);
        assert_eq!(
            sig.declaration("lv_task_handler"),
            "void lv_task_handler(void)"
        );
        assert_eq!(sig.forward_call("lv_task_handler"), "lv_task_handler()");
    }

    #[test]
    fn test_variadic_declaration_keeps_ellipsis() {
        let mut sig = Signature::new("lv_label_set_text_fmt", TypeRef::Void)
            .with_param(Param::new("label", TypeRef::parse("lv_obj_t *")))
            .with_param(Param::new("fmt", TypeRef::parse("const char *")));
        sig.variadic = true;

        assert_eq!(
            sig.declaration("lv_label_set_text_fmt"),
            "void lv_label_set_text_fmt(lv_obj_t * label, const char * fmt, ...)"
        );
    }

    #[test]
    fn test_function_pointer_param_renders_verbatim() {
        let sig = Signature::new("lv_obj_set_event_cb", TypeRef::Void)
            .with_param(Param::new("obj", TypeRef::parse("lv_obj_t *")))
            .with_param(Param::new(
                "cb",
                TypeRef::FunctionPointer {
                    text: "void (*cb)(lv_event_t *)".to_string(),
                },
            ));

        assert_eq!(
            sig.declaration("lv_obj_set_event_cb"),
            "void lv_obj_set_event_cb(lv_obj_t * obj, void (*cb)(lv_event_t *))"
        );
        assert_eq!(
            sig.forward_call("lv_obj_set_event_cb"),
            "lv_obj_set_event_cb(obj, cb)"
        );
    }

    #[test]
    fn test_surface_merge_preserves_order() {
        let mut a = ParsedSurface::new("a.h");
        a.functions.push(Signature::new("f1", TypeRef::Void));
        let mut b = ParsedSurface::new("b.h");
        b.functions.push(Signature::new("f2", TypeRef::Void));

        a.merge(b);
        let names: Vec<&str> = a.functions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["f1", "f2"]);
    }
}
