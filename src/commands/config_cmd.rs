use std::path::Path;
use std::process::Command;

use crate::config::{Config, config_file_path, ensure_config_file};
use crate::error::AppError;
use crate::utils::{display_path, format_bytes};

pub struct ConfigOptions {
    pub show_path: bool,
    pub edit: bool,
    pub auto_extract: Option<bool>,
    pub auto_copy: Option<bool>,
}

pub fn execute_config(options: ConfigOptions) -> Result<(), AppError> {
    if options.show_path {
        let path = config_file_path()?;
        println!("Configuration file: {}", display_path(&path));
    }

    let updating = options.auto_extract.is_some() || options.auto_copy.is_some();
    if updating {
        let mut config = Config::load()?;
        if let Some(enabled) = options.auto_extract {
            config.auto_extract = enabled;
            println!("Auto extract {}.", on_off(enabled));
        }
        if let Some(enabled) = options.auto_copy {
            config.auto_copy = enabled;
            println!("Auto copy {}.", on_off(enabled));
        }
        config.save()?;
    }

    if options.edit {
        let path = ensure_config_file()?;
        open_editor(&path)?;
    }

    if !options.show_path && !updating && !options.edit {
        let path = config_file_path()?;
        let config = Config::load()?;
        println!("Configuration file: {}", display_path(&path));
        println!("  auto_extract          {}", config.auto_extract);
        println!("  auto_copy             {}", config.auto_copy);
        println!("  large_input_threshold {}", format_bytes(config.large_input_threshold as u64));
        println!("  chunk_size            {}", format_bytes(config.chunk_size as u64));
        println!("  slice_size            {}", config.slice_size);
        println!("  max_file_bytes        {}", format_bytes(config.max_file_bytes));
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn open_editor(path: &Path) -> Result<(), AppError> {
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "nano".to_string());

    let status = Command::new(&editor)
        .arg(path)
        .status()
        .map_err(|err| AppError::Editor(err.to_string()))?;

    if status.success() {
        Ok(())
    } else {
        Err(AppError::Editor(format!("Editor exited with status {}", status)))
    }
}
