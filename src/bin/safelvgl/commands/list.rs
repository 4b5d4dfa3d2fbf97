//! `safelvgl list` command
//!
//! Prints the function surface the generator would wrap, or the
//! declarations it would skip.

use anyhow::Result;

use crate::cli::{ListArgs, OutputFormat};
use safelvgl::ops::parse_surface;
use safelvgl::util::config::{Config, DEFAULT_BLOCK};

pub fn execute(args: ListArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?.unwrap_or_default();

    let mut block = config.generator.block.clone();
    block.extend(args.block_regex.iter().cloned());
    if block.is_empty() {
        block.push(DEFAULT_BLOCK.to_string());
    }

    let (surface, version) = parse_surface(&args.lvgl, &block, &config.generator.headers)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&surface)?);
        }
        OutputFormat::Text if args.skipped => {
            println!("Skipped declarations (lvgl {}):", version);
            for skip in &surface.skipped {
                println!("  {} ({})", skip.name, skip.reason);
            }
            println!();
            println!("{} declarations skipped", surface.skipped.len());
        }
        OutputFormat::Text => {
            println!("Wrappable functions (lvgl {}):", version);
            for sig in &surface.functions {
                println!("  {};", sig.declaration(&sig.name));
            }
            println!();
            println!(
                "{} functions ({} skipped; use --skipped to see why)",
                surface.functions.len(),
                surface.skipped.len()
            );
        }
    }

    Ok(())
}
