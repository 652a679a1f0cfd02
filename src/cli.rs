//! Command-line interface definitions using clap

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::config::StaticConfig;

/// 默认的示例配置输出路径
pub const DEFAULT_SAMPLE_CONFIG_PATH: &str = "config.example.toml";

/// linktrack - link redirection and conversion attribution tracker
#[derive(Parser, Debug)]
#[command(name = "linktrack")]
#[command(version)]
#[command(about = "Link redirection and conversion attribution tracker", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml, `-` for stdout)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// 写出默认配置，返回实际写入的路径；`-` 输出到 stdout
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<String> {
    let path = output_path.unwrap_or(DEFAULT_SAMPLE_CONFIG_PATH);

    if path == "-" {
        print!("{}", StaticConfig::generate_sample_config());
        return Ok(path.to_string());
    }

    if Path::new(path).exists() && !force {
        bail!("{} already exists, use --force to overwrite", path);
    }

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Failed to write sample config to {}", path))?;

    Ok(path.to_string())
}
