/*
 *  config.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::i2c::I2cIoStrategy;

pub const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Effective configuration. Unset fields fall back to the accessors' defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // error | warn | info | debug | trace
    /// I2C bus number, /dev/i2c-N
    pub bus: Option<u8>,
    /// absent means detect from the adapter functionality
    pub io_strategy: Option<I2cIoStrategy>,
    pub force_slave_address: Option<bool>,
    /// searched before the standard feature definition directories
    pub feature_dirs: Option<Vec<PathBuf>>,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn force_slave_address(&self) -> bool {
        self.force_slave_address.unwrap_or(false)
    }

    pub fn feature_dirs(&self) -> &[PathBuf] {
        self.feature_dirs.as_deref().unwrap_or(&[])
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "ddcio", about = "DDC/CI over I2C diagnostics", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// I2C bus number
    #[arg(short, long)]
    pub bus: Option<u8>,
    /// fileio or ioctl; detected when omitted
    #[arg(long)]
    pub io_strategy: Option<I2cIoStrategy>,
    /// bind the DDC address even if a kernel driver holds it
    #[arg(long, action = ArgAction::SetTrue)]
    pub force_slave_address: bool,
    /// extra feature definition directory, may repeat
    #[arg(long = "feature-dir", value_hint = ValueHint::DirPath)]
    pub feature_dirs: Vec<PathBuf>,

    /// open the bus and report the transport it supports
    #[arg(long, action = ArgAction::SetTrue)]
    pub detect: bool,
    /// 3 character EDID manufacturer id
    #[arg(long, requires_all = ["model", "product_code"])]
    pub mfg: Option<String>,
    /// EDID model name
    #[arg(long, requires = "mfg")]
    pub model: Option<String>,
    /// EDID product code
    #[arg(long, requires = "mfg")]
    pub product_code: Option<u16>,
    /// report the system environment
    #[arg(long, action = ArgAction::SetTrue)]
    pub env: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/ddcio/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/ddcio/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/ddcio.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["ddcio.yaml", "config/ddcio.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()           { dst.log_level = src.log_level; }
    if src.bus.is_some()                 { dst.bus = src.bus; }
    if src.io_strategy.is_some()         { dst.io_strategy = src.io_strategy; }
    if src.force_slave_address.is_some() { dst.force_slave_address = src.force_slave_address; }
    if src.feature_dirs.is_some()        { dst.feature_dirs = src.feature_dirs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()   { cfg.log_level = cli.log_level.clone(); }
    if cli.bus.is_some()         { cfg.bus = cli.bus; }
    if cli.io_strategy.is_some() { cfg.io_strategy = cli.io_strategy; }
    if cli.force_slave_address   { cfg.force_slave_address = Some(true); }

    // command line directories are searched ahead of configured ones
    if !cli.feature_dirs.is_empty() {
        let mut dirs = cli.feature_dirs.clone();
        dirs.extend(cfg.feature_dirs.take().unwrap_or_default());
        cfg.feature_dirs = Some(dirs);
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "log_level must be one of {}, got '{}'", LOG_LEVELS.join("|"), level
            )));
        }
    }
    if cfg.feature_dirs().iter().any(|d| d.as_os_str().is_empty()) {
        return Err(ConfigError::Validation("feature_dirs entries must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let cfg = parse_yaml("log_level: debug\nbus: 4\nio_strategy: ioctl\nfeature_dirs: [/opt/mccs]\n").unwrap();
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.bus, Some(4));
        assert_eq!(cfg.io_strategy, Some(I2cIoStrategy::Ioctl));
        assert_eq!(cfg.feature_dirs(), &[PathBuf::from("/opt/mccs")]);
        assert!(!cfg.force_slave_address());

        assert!(parse_yaml("io_strategy: smbus\n").is_err());
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml("bus: 4\nio_strategy: ioctl\nfeature_dirs: [/opt/mccs]\n").unwrap();
        let cli = Cli::parse_from([
            "ddcio", "--bus", "7", "--io-strategy", "fileio",
            "--feature-dir", "/tmp/defs", "--force-slave-address",
        ]);
        apply_cli_overrides(&mut cfg, &cli);

        assert_eq!(cfg.bus, Some(7));
        assert_eq!(cfg.io_strategy, Some(I2cIoStrategy::FileIo));
        assert!(cfg.force_slave_address());
        assert_eq!(cfg.feature_dirs(), &[PathBuf::from("/tmp/defs"), PathBuf::from("/opt/mccs")]);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut cfg = parse_yaml("bus: 2\nlog_level: warn\n").unwrap();
        merge(&mut cfg, parse_yaml("bus: 3\n").unwrap());
        assert_eq!(cfg.bus, Some(3));
        assert_eq!(cfg.log_level(), "warn");
    }

    #[test]
    fn test_validate() {
        assert!(validate(&Config::default()).is_ok());
        let bad = Config { log_level: Some("loud".into()), ..Default::default() };
        assert!(matches!(validate(&bad), Err(ConfigError::Validation(_))));
        let empty_dir = Config { feature_dirs: Some(vec![PathBuf::new()]), ..Default::default() };
        assert!(validate(&empty_dir).is_err());
    }

    #[test]
    fn test_model_args_go_together() {
        assert!(Cli::try_parse_from(["ddcio", "--mfg", "DEL"]).is_err());
        let cli = Cli::try_parse_from([
            "ddcio", "--mfg", "DEL", "--model", "DELL U2415", "--product-code", "41060",
        ]).unwrap();
        assert_eq!(cli.product_code, Some(41060));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let cli = Cli::parse_from(["ddcio", "--config", "/nonexistent/ddcio.yaml"]);
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }
}
