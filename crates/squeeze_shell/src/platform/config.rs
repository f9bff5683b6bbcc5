use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use squeeze_core::{PostJobAction, Preferences};
use squeeze_engine::EngineSettings;

use super::logging::LogDestination;

const CONFIG_FILENAME: &str = "squeeze.ron";
const CONFIG_PATH_VAR: &str = "SQUEEZE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("could not write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Everything the shell reads from `squeeze.ron`. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub engine_program: String,
    pub engine_args: Vec<String>,
    pub threads: usize,
    pub auto_preview: bool,
    pub prompt_before_exit: bool,
    pub skip_confirmations: bool,
    /// One of `none`, `close_app`, `sleep`, `shutdown`, `open_output_folder`.
    pub post_job_action: String,
    pub output_folder: Option<String>,
    /// Forwarded to the engine untouched with `compress` and `preview`.
    pub compression_options: Value,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            engine_program: engine.program,
            engine_args: engine.args,
            threads: default_threads(),
            auto_preview: true,
            prompt_before_exit: false,
            skip_confirmations: false,
            post_job_action: PostJobAction::None.to_string(),
            output_folder: None,
            compression_options: default_compression_options(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            program: self.engine_program.clone(),
            args: self.engine_args.clone(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        shell_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            auto_preview: self.auto_preview,
            threads: self.threads.max(1),
            post_job_action: PostJobAction::parse(&self.post_job_action).unwrap_or_default(),
            prompt_before_exit: self.prompt_before_exit,
            skip_confirmations: self.skip_confirmations,
        }
    }

    pub fn apply_preferences(&mut self, preferences: &Preferences) {
        self.auto_preview = preferences.auto_preview;
        self.threads = preferences.threads;
        self.post_job_action = preferences.post_job_action.to_string();
        self.prompt_before_exit = preferences.prompt_before_exit;
        self.skip_confirmations = preferences.skip_confirmations;
    }

    /// Options sent with `compress` and `preview`. A configured output folder
    /// overrides the one inside the options.
    pub fn compression_payload(&self) -> Value {
        let mut payload = self.compression_options.clone();
        if let Some(folder) = &self.output_folder {
            if let Some(output) = payload
                .get_mut("output_options")
                .and_then(Value::as_object_mut)
            {
                output.insert("output_folder".to_string(), Value::String(folder.clone()));
            }
        }
        payload
    }
}

/// `$SQUEEZE_CONFIG`, or `squeeze.ron` in the working directory.
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

/// Loads the config at `path`. A missing file yields defaults silently; any
/// other problem yields defaults plus the error, for the caller to report once
/// logging is up.
pub fn load_or_default(path: &Path) -> (ShellConfig, Option<ConfigError>) {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return (ShellConfig::default(), None);
        }
        Err(source) => {
            let err = ConfigError::Read {
                path: path.to_path_buf(),
                source,
            };
            return (ShellConfig::default(), Some(err));
        }
    };

    match ron::from_str::<ShellConfig>(&content) {
        Ok(config) => (config, None),
        Err(source) => {
            let err = ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            };
            (ShellConfig::default(), Some(err))
        }
    }
}

fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

fn default_compression_options() -> Value {
    json!({
        "compression_options": {
            "jpeg": { "quality": 80, "chroma_subsampling": "auto", "progressive": true },
            "png": { "quality": 80, "optimization_level": 3 },
            "webp": { "quality": 60 },
            "tiff": { "method": "lzw", "deflate_level": 6 },
            "compression_mode": 0,
            "keep_metadata": true,
            "lossless": false,
            "max_size_value": 100,
            "max_size_unit": 0
        },
        "resize_options": {
            "resize_enabled": false,
            "resize_mode": "dimensions",
            "keep_aspect_ratio": true,
            "do_not_enlarge": true,
            "width": 0,
            "height": 0,
            "width_percentage": 100,
            "height_percentage": 100,
            "long_edge": 0,
            "short_edge": 0
        },
        "output_options": {
            "output_folder": "",
            "same_folder_as_input": false,
            "keep_folder_structure": true,
            "skip_if_output_is_bigger": true,
            "move_original_file_enabled": false,
            "move_original_file_mode": "trash",
            "keep_file_dates_enabled": false,
            "keep_creation_date": false,
            "keep_last_modified_date": false,
            "keep_last_access_date": false,
            "output_format": "original",
            "suffix": ""
        }
    })
}
