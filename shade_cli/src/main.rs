#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `shade`: drive a time-simulated window covering from the command line.

mod cli;
mod error_fmt;
mod logging;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use shade_core::error::ShadeError;

use crate::cli::{Cli, Commands, JSON_MODE};

fn load_config(cli: &Cli) -> eyre::Result<shade_config::Config> {
    shade_config::load_file(&cli.config)
        .wrap_err_with(|| ShadeError::Config(cli.config.display().to_string()))
}

fn execute(cli: &Cli, cfg: &shade_config::Config) -> eyre::Result<()> {
    let json = cli.json;
    match &cli.cmd {
        Commands::Move { percent, from } => {
            run::run_move(cfg, *percent, *from, cli.virtual_time)?.print(json);
        }
        Commands::Sequence { steps, from } => {
            run::run_sequence(cfg, steps, *from, cli.virtual_time)?.print(json);
        }
        Commands::Plan { percent, from } => run::plan(cfg, *percent, *from, json)?,
        Commands::Listen => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;
            run::listen(cfg, cli.virtual_time, shutdown)?.print(json);
        }
        Commands::SelfCheck => run::self_check(cfg, json)?,
    }
    Ok(())
}

fn report_error(err: &eyre::Report) -> i32 {
    if JSON_MODE.get().copied().unwrap_or(false) {
        println!("{}", error_fmt::format_error_json(err));
    } else {
        eprintln!("{}", error_fmt::humanize(err));
        tracing::debug!(error = ?err, "full error report");
    }
    error_fmt::exit_code_for_error(err)
}

fn main() {
    // Pretty panic/error reports; ignore if something already installed one.
    let _ = color_eyre::install();

    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => std::process::exit(report_error(&e)),
    };

    if let Err(e) = logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    if let Err(e) = execute(&cli, &cfg) {
        std::process::exit(report_error(&e));
    }
}
