//! edgepack - asset bundler for edge workers.
//!
//! Inlines HTML/CSS/JS templates, embeds an icon, stamps the version and
//! bundles the worker with esbuild.

mod build;
mod bundler;
mod cli;
mod config;
mod context;
mod metadata;
mod milestone;
mod pages;
mod sanitize;
mod utils;

use anyhow::{Context, Result, bail};
use build::{assemble, build_worker};
use bundler::esbuild::EsbuildCli;
use clap::Parser;
use cli::{Cli, Commands};
use config::PackConfig;
use context::BuildContext;
use milestone::{LogObserver, Milestone};
use std::{io::Write, process::ExitCode};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log!("error"; "build failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config = load_config(cli)?;
    let ctx = BuildContext::from_config(&config)?;

    match &cli.command {
        Commands::Build { .. } => run_build(&ctx, &config),
        Commands::Pages { key, .. } => print_pages(&ctx, key.as_deref()),
    }
}

/// Load and validate configuration from CLI arguments.
fn load_config(cli: &'static Cli) -> Result<PackConfig> {
    let config = PackConfig::load(cli)?;
    config.validate()?;
    Ok(config)
}

/// Full pipeline with log output.
fn run_build(ctx: &BuildContext, config: &PackConfig) -> Result<()> {
    let esbuild = EsbuildCli::new(config.bundle.command.clone());
    match esbuild.version(&ctx.root) {
        Ok(version) => log!("esbuild"; "v{version}, worker version {}", ctx.version),
        Err(err) => log!("esbuild"; "unknown version: {err}"),
    }

    let report = build_worker(ctx, &esbuild, &mut LogObserver)?;
    log!("build"; "done, {} output(s) up to date", report.outputs.len());
    Ok(())
}

/// `edgepack pages`: print assembled pages as JSON on stdout.
///
/// Milestones are not logged, stdout carries only the JSON.
fn print_pages(ctx: &BuildContext, key: Option<&str>) -> Result<()> {
    let pages = assemble(ctx, &mut |_: &Milestone| {})?;

    let text = match key {
        Some(key) => match pages.get(key) {
            Some(literal) => literal.to_owned(),
            None => bail!(
                "No page `{key}` under `{}` (found: {})",
                ctx.assets.display(),
                pages.keys().collect::<Vec<_>>().join(", ")
            ),
        },
        None if pages.is_empty() => "{}".to_owned(),
        None => serde_json::to_string_pretty(&pages.to_json_object()?)?,
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("Failed to write to stdout")?;
    Ok(())
}
