use std::io::Write;
use std::path::{Path, PathBuf};

use shell_logging::{shell_error, shell_info, shell_warn};
use tempfile::NamedTempFile;

use super::config::{ConfigError, ShellConfig};

/// Writes `config` to `path` through a temp file in the same directory, then
/// renames it into place.
pub(crate) fn save_config(path: &Path, config: &ShellConfig) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.as_file_mut().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

/// Destination for preference changes. A file that exists but failed to load
/// is never overwritten.
#[derive(Debug)]
pub(crate) struct ConfigStore {
    path: PathBuf,
    writable: bool,
}

impl ConfigStore {
    pub(crate) fn new(path: PathBuf, load_error: Option<&ConfigError>) -> Self {
        Self {
            path,
            writable: load_error.is_none(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Saves and logs the outcome; preference changes are never fatal.
    pub(crate) fn persist(&self, config: &ShellConfig) {
        if !self.writable {
            shell_warn!(
                "Not saving preferences, {:?} failed to load and is left untouched",
                self.path
            );
            return;
        }
        match save_config(&self.path, config) {
            Ok(()) => shell_info!("Saved preferences to {:?}", self.path),
            Err(err) => shell_error!("Failed to save preferences: {}", err),
        }
    }
}
