//! Config command handlers

use anyhow::{bail, Result};
use std::path::PathBuf;

use wallet_core::Config;

use crate::output::Output;

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file: {}", Config::config_file_path().display());
    println!();
    println!("data_dir   = {}", config.data_dir.display());
    println!(
        "project_id = {}",
        config.project_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "api_key    = {}",
        if config.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!(
        "base_url   = {}",
        config.base_url.as_deref().unwrap_or("(default)")
    );
    println!(
        "log_file   = {}",
        config
            .log_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(default)".to_string())
    );

    if config.remote().is_none() {
        println!();
        println!("Sync is disabled. Set project_id and api_key to enable it.");
    }

    Ok(())
}

/// Set a configuration value. An empty value clears optional fields.
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load()?;

    let cleared = value.is_empty();
    match key.as_str() {
        "data_dir" => {
            if cleared {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = PathBuf::from(&value);
        }
        "project_id" => config.project_id = (!cleared).then(|| value.clone()),
        "api_key" => config.api_key = (!cleared).then(|| value.clone()),
        "base_url" => config.base_url = (!cleared).then(|| value.clone()),
        "log_file" => config.log_file = (!cleared).then(|| PathBuf::from(&value)),
        _ => bail!(
            "Unknown configuration key '{}'. \
             Valid keys: data_dir, project_id, api_key, base_url, log_file",
            key
        ),
    }

    config.save()?;

    if cleared {
        output.success(&format!("Cleared {}", key));
    } else {
        output.success(&format!("Set {}", key));
    }
    Ok(())
}
