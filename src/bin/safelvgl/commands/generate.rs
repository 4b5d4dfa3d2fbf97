//! `safelvgl generate` command
//!
//! Parses the toolkit surface and writes the facade header and source.

use anyhow::Result;

use crate::cli::GenerateArgs;
use safelvgl::emit::NamingScheme;
use safelvgl::ops::{generate_facade, GenerateOptions};
use safelvgl::parser::SkipReason;
use safelvgl::util::config::{Config, NamingMode, DEFAULT_BLOCK};
use safelvgl::util::diagnostic::{emit, suggestions, Diagnostic};

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    // Project config, overridden field by field from the command line.
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?.unwrap_or_default();

    let naming = resolve_naming(&args, &config);
    let block = resolve_block(&args.block_regex, &config);
    let version = args
        .toolkit_version
        .clone()
        .or_else(|| config.generator.version.clone());

    let mut opts = GenerateOptions::new(&args.lvgl, &args.output)
        .with_naming(naming)
        .with_block(block)
        .with_version(version)
        .with_dry_run(args.dry_run);
    opts.extra_headers = config.generator.headers.clone();

    for (name, path) in [
        ("header", args.header.as_ref().or(config.templates.header.as_ref())),
        ("source", args.source.as_ref().or(config.templates.source.as_ref())),
        (
            "wrapper_decl",
            args.func_decl.as_ref().or(config.templates.func_decl.as_ref()),
        ),
        (
            "wrapper_def",
            args.func_def.as_ref().or(config.templates.func_def.as_ref()),
        ),
    ] {
        if let Some(path) = path {
            opts = opts.with_template_override(name, path);
        }
    }

    println!("Generating thread-safe facade...");
    println!("  LVGL:    {}", args.lvgl.display());
    println!("  Output:  {}", args.output.display());
    println!();

    let result = generate_facade(&opts)?;

    for skip in &result.skipped {
        let mut diag = Diagnostic::warning(format!("skipped `{}`", skip.name))
            .with_context(skip.reason.to_string());
        match skip.reason {
            SkipReason::Unsupported { .. } => diag = diag.with_suggestion(suggestions::VARIADIC),
            SkipReason::Malformed { .. } => diag = diag.with_suggestion(suggestions::MALFORMED),
            _ => {}
        }
        emit(&diag, color);
    }
    if !result.skipped.is_empty() {
        println!();
    }

    println!(
        "Wrapped {} functions of lvgl {} ({} skipped)",
        result.wrapped,
        result.lvgl_version,
        result.skipped.len()
    );

    if args.dry_run {
        println!("[dry-run] Would write:");
    } else {
        println!("Facade written:");
    }
    println!("  {}", result.header_path.display());
    println!("  {}", result.source_path.display());

    if !args.dry_run {
        println!();
        println!("Call safe_lvgl_init() once before any other facade function.");
    }

    Ok(())
}

/// Pick the naming scheme: an explicit --prefix wins, then the config.
fn resolve_naming(args: &GenerateArgs, config: &Config) -> NamingScheme {
    if let Some(ref prefix) = args.prefix {
        return NamingScheme::Prefix {
            prefix: prefix.clone(),
        };
    }

    match config.generator.naming {
        NamingMode::Prefix => NamingScheme::Prefix {
            prefix: config
                .generator
                .prefix
                .clone()
                .unwrap_or_else(|| "safe_".to_string()),
        },
        NamingMode::Interpose => NamingScheme::Interpose {
            real_prefix: args
                .real_prefix
                .clone()
                .or_else(|| config.generator.real_prefix.clone())
                .unwrap_or_else(|| "__real_".to_string()),
        },
    }
}

/// Merge blocklists: CLI patterns extend the config; the `^_lv` default
/// applies when neither says anything.
fn resolve_block(cli: &[String], config: &Config) -> Vec<String> {
    let mut block = config.generator.block.clone();
    block.extend(cli.iter().cloned());
    if block.is_empty() {
        block.push(DEFAULT_BLOCK.to_string());
    }
    block
}
