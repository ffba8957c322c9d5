#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `hydrate`: watch, inspect and chart a smart water bottle.

mod cli;
mod commands;
mod error_fmt;
mod logging;
mod player;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use eyre::WrapErr;

/// Log a failed panic/report hook install. Returns whether the hook is active.
fn note_hook_install(result: eyre::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "color-eyre hook not installed; using plain error reports");
            false
        }
    }
}

fn run(cli: &Cli, hook: eyre::Result<()>) -> eyre::Result<()> {
    // `advise` is pure arithmetic and must work without a config file.
    let cfg = match cli.cmd {
        Commands::Advise { .. } => hydrate_config::Config::default(),
        _ => commands::load_config(cli)?,
    };
    let _guard = logging::init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    note_hook_install(hook);
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("start async runtime")?;
    rt.block_on(commands::dispatch(cli, &cfg))
}

fn main() {
    // Reported once tracing is up; errors before that still print through `humanize`.
    let hook = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match run(&cli, hook) {
        Ok(()) => 0,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            error_fmt::exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}
