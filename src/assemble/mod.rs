//! Facade file assembly.
//!
//! Joins the emitted wrapper fragments with the two boilerplate templates
//! and substitutes the generation metadata. Rendering is typed: templates
//! run in strict mode against a serialized context, so a placeholder with
//! no supplied value is a fatal [`AssembleError::IncompleteTemplate`] and
//! no output file is ever written with a hole in it.

use handlebars::Handlebars;
use miette::Diagnostic;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Default facade header template.
pub const HEADER_TEMPLATE: &str = include_str!("../../templates/safe_header.h.hbs");
/// Default facade source template.
pub const SOURCE_TEMPLATE: &str = include_str!("../../templates/safe_source.c.hbs");
/// Default per-function declaration template.
pub const WRAPPER_DECL_TEMPLATE: &str = include_str!("../../templates/wrapper_decl.h.hbs");
/// Default per-function definition template.
pub const WRAPPER_DEF_TEMPLATE: &str = include_str!("../../templates/wrapper_def.c.hbs");

/// Name of the emitted facade header.
pub const OUTPUT_HEADER: &str = "safe_lvgl.h";
/// Name of the emitted facade source.
pub const OUTPUT_SOURCE: &str = "safe_lvgl.c";

/// Assembly failures. All of these abort the run before any file write.
#[derive(Debug, Error, Diagnostic)]
pub enum AssembleError {
    #[error("template `{name}` is invalid: {detail}")]
    #[diagnostic(code(safelvgl::assemble::bad_template))]
    BadTemplate { name: String, detail: String },

    #[error("template `{name}` left placeholders unresolved: {detail}")]
    #[diagnostic(
        code(safelvgl::assemble::incomplete_template),
        help("custom templates may only reference filename, lvgl_version, date, time and contents_here")
    )]
    IncompleteTemplate { name: String, detail: String },
}

/// Immutable per-run metadata substituted into every emitted file banner.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationContext {
    /// Toolkit version, `major.minor.patch`.
    pub lvgl_version: String,
    /// Generation date, `%Y/%m/%d`.
    pub date: String,
    /// Generation time, `%H:%M:%S`.
    pub time: String,
}

impl GenerationContext {
    /// Context stamped with the current local time.
    pub fn new(lvgl_version: impl Into<String>) -> Self {
        let now = chrono::Local::now();
        GenerationContext {
            lvgl_version: lvgl_version.into(),
            date: now.format("%Y/%m/%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        }
    }

    /// Context with a fixed timestamp.
    pub fn with_timestamp(
        lvgl_version: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        GenerationContext {
            lvgl_version: lvgl_version.into(),
            date: date.into(),
            time: time.into(),
        }
    }
}

/// Rendering context for one output file.
#[derive(Serialize)]
struct FileContext<'a> {
    filename: &'a str,
    lvgl_version: &'a str,
    date: &'a str,
    time: &'a str,
    contents_here: &'a str,
}

/// Strict-mode template registry shared by the emitter and the assembler.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Engine with the four built-in templates registered.
    pub fn new() -> Result<Self, AssembleError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let mut engine = TemplateEngine { handlebars };
        engine.register("header", HEADER_TEMPLATE)?;
        engine.register("source", SOURCE_TEMPLATE)?;
        engine.register("wrapper_decl", WRAPPER_DECL_TEMPLATE)?;
        engine.register("wrapper_def", WRAPPER_DEF_TEMPLATE)?;
        Ok(engine)
    }

    fn register(&mut self, name: &str, text: &str) -> Result<(), AssembleError> {
        self.handlebars
            .register_template_string(name, text)
            .map_err(|e| AssembleError::BadTemplate {
                name: name.to_string(),
                detail: e.to_string(),
            })
    }

    /// Replace a built-in template. File templates must still carry the
    /// `contents_here` placeholder or the wrapper set would be dropped.
    pub fn override_template(&mut self, name: &str, text: &str) -> Result<(), AssembleError> {
        if matches!(name, "header" | "source") && !text.contains("contents_here") {
            return Err(AssembleError::BadTemplate {
                name: name.to_string(),
                detail: "missing the contents_here placeholder".to_string(),
            });
        }
        self.register(name, text)
    }

    /// Render a registered template against a typed context.
    ///
    /// Strict mode turns any reference to an unsupplied field into
    /// [`AssembleError::IncompleteTemplate`]; a legacy `${...}` token left
    /// in the rendered text is rejected the same way.
    pub fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String, AssembleError> {
        let rendered =
            self.handlebars
                .render(name, ctx)
                .map_err(|e| AssembleError::IncompleteTemplate {
                    name: name.to_string(),
                    detail: e.to_string(),
                })?;

        let leftover = Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap();
        if let Some(m) = leftover.find(&rendered) {
            return Err(AssembleError::IncompleteTemplate {
                name: name.to_string(),
                detail: format!("unreplaced placeholder {}", m.as_str()),
            });
        }

        Ok(rendered)
    }
}

/// Combines wrapper fragments with the file templates.
pub struct Assembler<'e> {
    engine: &'e TemplateEngine,
    ctx: GenerationContext,
}

impl<'e> Assembler<'e> {
    /// Create an assembler over an engine and the run's metadata.
    pub fn new(engine: &'e TemplateEngine, ctx: GenerationContext) -> Self {
        Assembler { engine, ctx }
    }

    /// Assemble the facade header from declaration fragments.
    pub fn assemble_header(&self, fragments: &[String]) -> Result<String, AssembleError> {
        self.assemble("header", OUTPUT_HEADER, fragments)
    }

    /// Assemble the facade source from definition fragments.
    pub fn assemble_source(&self, fragments: &[String]) -> Result<String, AssembleError> {
        self.assemble("source", OUTPUT_SOURCE, fragments)
    }

    fn assemble(
        &self,
        template: &str,
        filename: &str,
        fragments: &[String],
    ) -> Result<String, AssembleError> {
        let contents = fragments.join("\n\n");
        let ctx = FileContext {
            filename,
            lvgl_version: &self.ctx.lvgl_version,
            date: &self.ctx.date,
            time: &self.ctx.time,
            contents_here: &contents,
        };
        self.engine.render(template, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GenerationContext {
        GenerationContext::with_timestamp("9.9.9", "2026/01/01", "12:00:00")
    }

    #[test]
    fn test_header_substitutes_all_placeholders() {
        let engine = TemplateEngine::new().unwrap();
        let assembler = Assembler::new(&engine, ctx());

        let out = assembler
            .assemble_header(&["void lv_init(void);".to_string()])
            .unwrap();

        assert!(out.contains("@file: safe_lvgl.h"));
        assert!(out.contains("lvgl version 9.9.9"));
        assert!(out.contains("@date: 2026/01/01"));
        assert!(out.contains("@time: 12:00:00"));
        assert!(out.contains("void lv_init(void);"));
        assert!(!out.contains("{{"));
        assert!(!out.contains("${"));
    }

    #[test]
    fn test_header_has_guard_and_include() {
        let engine = TemplateEngine::new().unwrap();
        let out = Assembler::new(&engine, ctx()).assemble_header(&[]).unwrap();

        assert!(out.contains("#ifndef __SAFE_LVGL_H__"));
        assert!(out.contains("#define __SAFE_LVGL_H__"));
        assert!(out.contains("#include \"lvgl.h\""));
        assert!(out.contains("#endif"));
        assert!(out.contains("void safe_lvgl_init(void);"));
    }

    #[test]
    fn test_source_has_lock_lifecycle() {
        let engine = TemplateEngine::new().unwrap();
        let out = Assembler::new(&engine, ctx()).assemble_source(&[]).unwrap();

        assert!(out.contains("void safe_lvgl_init(void)"));
        assert!(out.contains("lv_mutex_init();"));
        assert!(out.contains("static inline void lv_recursive_lock(void)"));
        assert!(out.contains("static inline void lv_recursive_unlock(void)"));
    }

    #[test]
    fn test_fragments_keep_parser_order() {
        let engine = TemplateEngine::new().unwrap();
        let out = Assembler::new(&engine, ctx())
            .assemble_header(&["void b(void);".to_string(), "void a(void);".to_string()])
            .unwrap();

        let b = out.find("void b(void);").unwrap();
        let a = out.find("void a(void);").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_unknown_field_is_incomplete_template() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .override_template("header", "// {{mystery_field}}\n{{{contents_here}}}\n")
            .unwrap();

        let err = Assembler::new(&engine, ctx())
            .assemble_header(&[])
            .unwrap_err();
        assert!(matches!(err, AssembleError::IncompleteTemplate { .. }));
    }

    #[test]
    fn test_legacy_placeholder_is_incomplete_template() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .override_template("header", "// ${lvgl_version}\n{{{contents_here}}}\n")
            .unwrap();

        let err = Assembler::new(&engine, ctx())
            .assemble_header(&[])
            .unwrap_err();
        assert!(matches!(
            err,
            AssembleError::IncompleteTemplate { ref detail, .. } if detail.contains("${lvgl_version}")
        ));
    }

    #[test]
    fn test_file_template_without_contents_is_rejected() {
        let mut engine = TemplateEngine::new().unwrap();
        let err = engine
            .override_template("header", "// nothing to see\n")
            .unwrap_err();
        assert!(matches!(err, AssembleError::BadTemplate { .. }));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let engine = TemplateEngine::new().unwrap();
        let assembler = Assembler::new(&engine, ctx());
        let fragments = vec!["void lv_init(void);".to_string()];

        let first = assembler.assemble_header(&fragments).unwrap();
        let second = assembler.assemble_header(&fragments).unwrap();
        assert_eq!(first, second);
    }
}
