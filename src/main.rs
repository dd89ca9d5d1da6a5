/*
 * This file is part of switchinfo.
 *
 * Copyright (C) 2025 switchinfo contributors
 *
 * switchinfo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * switchinfo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with switchinfo. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use sw_core::{MlxregTool, SmpQuery};
use sw_error::SwitchInfoError;
use tracing::debug;

use switchinfo::cli::Cli;
use switchinfo::config::load_settings;
use switchinfo::system::{parse_device, require_root};
use switchinfo::{logger, runner};

async fn run(cli: &Cli) -> anyhow::Result<String> {
    cli.validate()?;
    require_root()?;

    let settings = load_settings(cli.config.as_deref())?;
    let target = parse_device(&cli.device)?;
    let timeout = cli.timeout.or(settings.fetch_timeout_secs).map(Duration::from_secs);
    debug!("Settings: {:?}, timeout {:?}", settings, timeout);

    let tool = Arc::new(MlxregTool::new(settings.mlxreg_path.clone(), target.name.clone()));
    let ports = Arc::new(SmpQuery::new(settings.smpquery_path.clone(), target.lid));
    let output = runner::execute(cli.action(&settings), tool, ports, timeout).await?;
    Ok(output)
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SwitchInfoError>().map(|e| e.exit_code()).unwrap_or(1)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the report
    let log_level = match cli.log_level() {
        Some(level) => level.to_string(),
        None => std::env::var("SWITCHINFO_LOG").unwrap_or_else(|_| "warn".to_string()),
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(&log_level)
        .init();

    if cli.logging {
        logger::init_logging();
        logger::log_event("startup", json!({ "args": std::env::args().collect::<Vec<_>>() }));
    }

    match run(&cli).await {
        Ok(output) => print!("{}", output),
        Err(e) => {
            let code = exit_code(&e);
            debug!("Fatal: {:?}", e);
            eprintln!("-E- {}", e);
            logger::log_event("fatal_error", json!({ "error": e.to_string(), "code": code }));
            std::process::exit(code);
        }
    }
}
