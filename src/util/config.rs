//! Project configuration.
//!
//! A `safelvgl.toml` next to the invocation directory carries the options a
//! team wants pinned across runs; command-line flags override it field by
//! field.
//!
//! ```toml
//! [generator]
//! naming = "interpose"
//! real_prefix = "__real_"
//! block = ["^_lv"]
//!
//! [templates]
//! header = "templates/safe_header.h"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "safelvgl.toml";

/// Default blocklist: LVGL's internal `_lv`-prefixed functions.
pub const DEFAULT_BLOCK: &str = "^_lv";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Generation options.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Template override paths.
    #[serde(default)]
    pub templates: TemplateConfig,
}

/// How wrappers are named and which functions are excluded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Naming scheme selector.
    #[serde(default)]
    pub naming: NamingMode,

    /// Wrapper prefix for `naming = "prefix"`.
    pub prefix: Option<String>,

    /// Real-symbol prefix for `naming = "interpose"`.
    pub real_prefix: Option<String>,

    /// Regexes of function names excluded from the facade.
    #[serde(default)]
    pub block: Vec<String>,

    /// Toolkit version override; skips probing `lvgl.h`.
    pub version: Option<String>,

    /// Additional header glob patterns, relative to the toolkit root,
    /// parsed on top of the entry header.
    #[serde(default)]
    pub headers: Vec<String>,
}

/// Naming scheme selector mirroring [`crate::emit::NamingScheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// Wrappers keep the toolkit names; real symbols are reached via a
    /// `__real_`-style prefix.
    #[default]
    Interpose,
    /// Wrappers carry a `safe_`-style prefix.
    Prefix,
}

/// Paths of custom template files.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub header: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub func_decl: Option<PathBuf>,
    pub func_def: Option<PathBuf>,
}

impl Config {
    /// Load `safelvgl.toml` from a directory, if present.
    pub fn load(dir: &Path) -> Result<Option<Config>> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(Some(config))
    }
}
