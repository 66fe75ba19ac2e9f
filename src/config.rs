use std::fs;
use std::io::Write;
use std::path::PathBuf;

use dirs_next as dirs;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_LARGE_INPUT_THRESHOLD: usize = 50_000;
pub const DEFAULT_CHUNK_SIZE: usize = 5_000;
pub const DEFAULT_SLICE_SIZE: usize = 100;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan automatically whenever the input changes and is cheap enough.
    pub auto_extract: bool,
    /// Copy the combined result to the clipboard when a scan completes.
    pub auto_copy: bool,
    /// Inputs longer than this many bytes are scanned on a worker thread.
    pub large_input_threshold: usize,
    /// Bytes per worker chunk.
    pub chunk_size: usize,
    /// Candidates per slice on the small-input route.
    pub slice_size: usize,
    /// Input files above this size are refused.
    pub max_file_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_extract: true,
            auto_copy: true,
            large_input_threshold: DEFAULT_LARGE_INPUT_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            slice_size: DEFAULT_SLICE_SIZE,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let path = config_file_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.validate()?;
        let path = config_file_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(path)?;
        let contents = toml::to_string_pretty(self)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunk_size == 0 {
            return Err(AppError::config("chunk_size must be greater than zero"));
        }
        if self.slice_size == 0 {
            return Err(AppError::config("slice_size must be greater than zero"));
        }
        if self.max_file_bytes == 0 {
            return Err(AppError::config("max_file_bytes must be greater than zero"));
        }
        Ok(())
    }
}

pub fn config_file_path() -> Result<PathBuf, AppError> {
    let config_root = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .ok_or_else(|| {
            AppError::config("Unable to determine configuration directory for this platform")
        })?;
    Ok(config_root.join("mailsift").join("config.toml"))
}

pub fn ensure_config_file() -> Result<PathBuf, AppError> {
    let path = config_file_path()?;
    if !path.exists() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let default = Config::default();
        let contents = toml::to_string_pretty(&default)?;
        fs::write(&path, contents)?;
    }
    Ok(path)
}
