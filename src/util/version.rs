//! Toolkit version probing.
//!
//! LVGL publishes its version as `LVGL_VERSION_MAJOR/MINOR/PATCH` defines
//! in `lvgl.h`; the probed value ends up in every generated file banner.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A probed `major.minor.patch` toolkit version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolkitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolkitVersion {
    /// Scan raw header text for the version defines.
    ///
    /// Returns `None` when no component is present; a partially defined
    /// version keeps zeros for the missing parts (the original converter
    /// behaved the same way).
    pub fn probe(content: &str) -> Option<ToolkitVersion> {
        let major = probe_component(content, "LVGL_VERSION_MAJOR");
        let minor = probe_component(content, "LVGL_VERSION_MINOR");
        let patch = probe_component(content, "LVGL_VERSION_PATCH");

        if major.is_none() && minor.is_none() && patch.is_none() {
            return None;
        }

        Some(ToolkitVersion {
            major: major.unwrap_or(0),
            minor: minor.unwrap_or(0),
            patch: patch.unwrap_or(0),
        })
    }
}

fn probe_component(content: &str, name: &str) -> Option<u32> {
    let re = Regex::new(&format!(r"(?m)^[ \t]*#define[ \t]+{}[ \t]+([0-9]+)", name)).unwrap();
    re.captures(content)
        .and_then(|c| c.get(1).unwrap().as_str().parse().ok())
}

impl fmt::Display for ToolkitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_full_version() {
        let content = "\
#define LVGL_VERSION_MAJOR 9
#define LVGL_VERSION_MINOR 2
#define LVGL_VERSION_PATCH 1
";
        let v = ToolkitVersion::probe(content).unwrap();
        assert_eq!(v.to_string(), "9.2.1");
    }

    #[test]
    fn test_probe_ignores_commented_out_defines() {
        // Line anchoring keeps the commented form from matching.
        let content = "/* #define LVGL_VERSION_MAJOR 8 */\n  #define LVGL_VERSION_MAJOR 9\n";
        let v = ToolkitVersion::probe(content).unwrap();
        assert_eq!(v.major, 9);
    }

    #[test]
    fn test_probe_missing_defines() {
        assert_eq!(ToolkitVersion::probe("void lv_init(void);"), None);
    }

    #[test]
    fn test_probe_partial_version_keeps_zeros() {
        let v = ToolkitVersion::probe("#define LVGL_VERSION_MAJOR 9\n").unwrap();
        assert_eq!(v.to_string(), "9.0.0");
    }
}
