//! Entry defaults and binding behaviour, loadable from TOML
//!
//! ```toml
//! file_mode = 0o644
//! dir_mode = 0o755
//! strip_cwd_prefix = false
//! ```

use crate::archive::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::error::{Result, TarError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session and binding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TarConfig {
    /// Permission bits for `write_file_header`
    pub file_mode: u32,

    /// Permission bits for `write_dir_header`
    pub dir_mode: u32,

    /// Strip a leading `./` from names returned by the binding's `read_header`
    pub strip_cwd_prefix: bool,
}

impl Default for TarConfig {
    fn default() -> Self {
        Self {
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
            strip_cwd_prefix: true,
        }
    }
}

impl TarConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: TarConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TarError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        // Permission bits only; anything wider would not survive the mode field
        for (field, mode) in [("file_mode", self.file_mode), ("dir_mode", self.dir_mode)] {
            if mode > 0o7777 {
                return Err(TarError::Config(format!(
                    "{} {:o} is not a permission mask",
                    field, mode
                )));
            }
        }
        Ok(())
    }
}
