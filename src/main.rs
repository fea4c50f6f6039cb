/*
 *  main.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Diagnostic front end: bus check, feature definitions, environment
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

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use env_logger::Env;
use log::{info, warn};

use ddcio::config::{self, Cli, Config};
use ddcio::features::{FeatureDefinitionLoader, FeatureRegistry};
use ddcio::i2c::{I2cBus, I2cSession};
use ddcio::model_key::MonitorModelKey;
use ddcio::sysenv::EnvAccumulator;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", cfg.to_yaml()?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {} for {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_TARGET);

    let mut did_something = false;

    if cli.env {
        let env = EnvAccumulator::collect();
        print!("{}", env.summary());
        if !env.has_known_video_driver() {
            warn!("No known video driver found bound to an I2C adapter");
        }
        did_something = true;
    }

    if cli.detect {
        detect(&cfg)?;
        did_something = true;
    }

    if let (Some(mfg), Some(model), Some(code)) = (&cli.mfg, &cli.model, cli.product_code) {
        show_features(&cfg, mfg, model, code)?;
        did_something = true;
    }

    if !did_something {
        Cli::command().print_help()?;
        println!();
    }

    Ok(())
}

fn detect(cfg: &Config) -> Result<()> {
    let Some(busno) = cfg.bus else {
        bail!("--detect needs a bus number (--bus N or 'bus:' in the config file)");
    };

    let bus = I2cBus::open(busno)
        .with_context(|| format!("opening {}", I2cBus::device_path(busno).display()))?;

    match bus.functionality() {
        Ok(funcs) => println!("{}: functionality {:?}", bus.path().display(), funcs),
        Err(e) => warn!("{}: I2C_FUNCS failed: {}", bus.path().display(), e),
    }

    let session = I2cSession::open(bus, cfg.io_strategy, cfg.force_slave_address())
        .with_context(|| format!("binding DDC/CI session on bus {}", busno))?;
    println!("{}: using {} transport", session.handle().path().display(), session.strategy());
    Ok(())
}

fn show_features(cfg: &Config, mfg: &str, model: &str, product_code: u16) -> Result<()> {
    let key = MonitorModelKey::new(mfg, model, product_code).context("building monitor model key")?;
    let loader = FeatureDefinitionLoader::with_default_dirs(cfg.feature_dirs());
    let mut registry = FeatureRegistry::new();

    let created = loader
        .load_into(&mut registry, &key)
        .with_context(|| format!("loading feature definition for {}", key))?;

    if created.record.is_not_found() {
        println!("No feature definition for {} (searched {:?})", key, loader.search_dirs());
    }
    print!("{}", created.record.report(0));
    for diag in &created.diagnostics {
        warn!("{}: {}", created.record.source().unwrap_or("definition"), diag);
    }
    Ok(())
}
