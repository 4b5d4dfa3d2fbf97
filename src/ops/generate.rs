//! End-to-end facade generation.
//!
//! Probes the toolkit version, parses the public surface, emits wrapper
//! fragments, assembles both output documents in memory, and only then
//! writes the two files. A fatal assembly error therefore never publishes a
//! half-formed wrapper set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::assemble::{Assembler, GenerationContext, TemplateEngine, OUTPUT_HEADER, OUTPUT_SOURCE};
use crate::emit::{EmitError, NamingScheme, WrapperEmitter};
use crate::parser::{HeaderParser, ParsedSurface, Skip, SkipReason};
use crate::util::fs as sfs;
use crate::util::version::ToolkitVersion;

/// The canonical header the surface is discovered from.
pub const ENTRY_HEADER: &str = "lvgl.h";

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// LVGL source tree root.
    pub lvgl_root: PathBuf,

    /// Directory the two facade files are written to.
    pub output_dir: PathBuf,

    /// Wrapper/callee naming scheme.
    pub naming: NamingScheme,

    /// Blocklist regexes for function names.
    pub block: Vec<String>,

    /// Toolkit version override; probed from the entry header when absent.
    pub version: Option<String>,

    /// Additional header glob patterns relative to the toolkit root.
    pub extra_headers: Vec<String>,

    /// Template override paths, keyed like the engine registry.
    pub template_overrides: Vec<(String, PathBuf)>,

    /// Parse and report without writing files.
    pub dry_run: bool,
}

impl GenerateOptions {
    /// Create options for a toolkit root and an output directory.
    pub fn new(lvgl_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            lvgl_root: lvgl_root.into(),
            output_dir: output_dir.into(),
            naming: NamingScheme::default(),
            block: Vec::new(),
            version: None,
            extra_headers: Vec::new(),
            template_overrides: Vec::new(),
            dry_run: false,
        }
    }

    /// Set the naming scheme.
    pub fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }

    /// Set the blocklist.
    pub fn with_block(mut self, block: Vec<String>) -> Self {
        self.block = block;
        self
    }

    /// Set the toolkit version override.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Add a template override.
    pub fn with_template_override(mut self, name: &str, path: impl AsRef<Path>) -> Self {
        self.template_overrides
            .push((name.to_string(), path.as_ref().to_path_buf()));
        self
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Path of the written facade header.
    pub header_path: PathBuf,

    /// Path of the written facade source.
    pub source_path: PathBuf,

    /// Toolkit version stamped into the banners.
    pub lvgl_version: String,

    /// Number of functions wrapped.
    pub wrapped: usize,

    /// Declarations excluded from the facade, with reasons.
    pub skipped: Vec<Skip>,
}

/// Parse the toolkit surface for a run. Shared with `safelvgl list`.
pub fn parse_surface(
    lvgl_root: &Path,
    block: &[String],
    extra_headers: &[String],
) -> Result<(ParsedSurface, String)> {
    let entry = sfs::find_entry_header(lvgl_root, ENTRY_HEADER)?;
    let content = sfs::read_to_string(&entry)?;

    let version = match ToolkitVersion::probe(&content) {
        Some(v) => v.to_string(),
        None => {
            tracing::warn!("no version defines in {}; using 0.0.0", entry.display());
            ToolkitVersion::default().to_string()
        }
    };

    let parser = HeaderParser::new().with_block_regexes(block)?;
    let mut surface = parser.parse_content(&content, &entry);

    for extra in sfs::glob_files(lvgl_root, extra_headers)? {
        if extra == entry {
            continue;
        }
        tracing::debug!("parsing additional header {}", extra.display());
        surface.merge(parser.parse_file(&extra)?);
    }

    tracing::info!(
        "found {} functions in {} ({} skipped)",
        surface.functions.len(),
        entry.display(),
        surface.skipped.len()
    );

    Ok((surface, version))
}

/// Generate the facade files.
pub fn generate_facade(opts: &GenerateOptions) -> Result<GenerateResult> {
    let (surface, probed_version) =
        parse_surface(&opts.lvgl_root, &opts.block, &opts.extra_headers)?;
    let version = opts.version.clone().unwrap_or(probed_version);

    let mut engine = TemplateEngine::new()?;
    for (name, path) in &opts.template_overrides {
        let text = sfs::read_to_string(path)?;
        engine
            .override_template(name, &text)
            .with_context(|| format!("invalid template override: {}", path.display()))?;
    }

    let emitter = WrapperEmitter::new(&engine, opts.naming.clone());

    let mut decls = Vec::new();
    let mut defs = Vec::new();
    let mut skipped = surface.skipped.clone();

    for sig in &surface.functions {
        match (emitter.emit_decl(sig), emitter.emit_def(sig)) {
            (Ok(decl), Ok(def)) => {
                decls.push(decl);
                defs.push(def);
            }
            (Err(EmitError::Unsupported(e)), _) | (_, Err(EmitError::Unsupported(e))) => {
                tracing::debug!("skipping `{}`: {}", e.name, e.reason);
                skipped.push(Skip::new(
                    e.name.clone(),
                    SkipReason::Unsupported { detail: e.reason },
                ));
            }
            (Err(EmitError::Template(e)), _) | (_, Err(EmitError::Template(e))) => {
                return Err(e).context("wrapper emission failed");
            }
        }
    }

    // Assemble both documents before writing anything.
    let ctx = GenerationContext::new(version.as_str());
    let assembler = Assembler::new(&engine, ctx);
    let header_text = assembler.assemble_header(&decls)?;
    let source_text = assembler.assemble_source(&defs)?;

    let header_path = opts.output_dir.join(OUTPUT_HEADER);
    let source_path = opts.output_dir.join(OUTPUT_SOURCE);

    if !opts.dry_run {
        sfs::write_atomic(&header_path, &header_text)?;
        sfs::write_atomic(&source_path, &source_text)?;
    }

    Ok(GenerateResult {
        header_path,
        source_path,
        lvgl_version: version,
        wrapped: decls.len(),
        skipped,
    })
}
