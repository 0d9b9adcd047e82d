//! Configuration: `.depthmap.toml` at the project root, memoised per
//! process. CLI flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

pub const CONFIG_FILE: &str = ".depthmap.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthmapConfig {
    /// Extra glob patterns excluded from enumeration.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Default depth bound for impact queries.
    #[serde(default = "default_impact_depth")]
    pub impact_depth: usize,

    /// Emit compact (signature-only) module views by default.
    #[serde(default)]
    pub compact: bool,
}

fn default_impact_depth() -> usize {
    3
}

impl Default for DepthmapConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            impact_depth: default_impact_depth(),
            compact: false,
        }
    }
}

impl DepthmapConfig {
    /// Load from `<root>/.depthmap.toml`, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "invalid config; using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no config file; using defaults");
                Self::default()
            }
        }
    }
}

/// Process-wide config, loaded once for the invocation's root.
pub fn config_for(root: &Path) -> &'static DepthmapConfig {
    static CONFIG: OnceLock<DepthmapConfig> = OnceLock::new();
    CONFIG.get_or_init(|| DepthmapConfig::load(root))
}
