//! killdupes - find and kill empty files, incomplete copies and duplicates.
//!
//! Files are compared incrementally, chunk by chunk, so a file is only read
//! as far as needed to tell it apart from every other candidate. The
//! [`engine`] module holds the comparison engine; the rest is the command
//! line tool around it.

pub mod actions;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::actions::{ask_selection, confirm_permanent, delete_batch, DeleteConfig, KillPlan, Selection};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::engine::{BucketEngine, EngineConfig, EngineReport};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the candidates cannot be
/// enumerated, or writing the report fails. Unreadable candidate files are
/// not errors; they turn the exit code into [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(Some(path.as_path()))
            .with_context(|| format!("Cannot load configuration from {}", path.display()))?,
        None => Config::load(),
    }
    .merge_cli(&cli);
    config.validate()?;

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let candidates = collect_candidates(&cli)?;
    log::debug!("{} candidate file(s)", candidates.len());

    let report = classify(&config, candidates)?;
    let exit_code = ExitCode::for_run(!report.classification.is_empty(), report.has_warnings());

    let sizes = report.sizes();
    let plan = KillPlan::build(&report.classification, |p| sizes.get(p).copied())
        .excluding(&report.classification, &report.warned_paths());

    write_report(&cli, &report, &plan, exit_code)?;

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let selection = match cli.kill {
        Some(selection) => selection,
        None if cli.output == OutputFormat::Text && !cli.quiet && interactive && !plan.is_empty() => {
            ask_selection(&mut stdin.lock(), &mut io::stdout())?
        }
        None => Selection::NONE,
    };

    let targets = plan.select(selection);
    if targets.is_empty() {
        return Ok(exit_code);
    }

    if config.permanent && !cli.yes {
        if !interactive {
            bail!("Refusing to delete permanently without --yes when stdin is not a terminal");
        }
        if !confirm_permanent(&mut stdin.lock(), &mut io::stdout(), targets.len())? {
            log::info!("Nothing killed");
            return Ok(exit_code);
        }
    }

    let delete_config = if config.permanent {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    };
    let result = delete_batch(&targets, &delete_config);
    if !cli.quiet && cli.output == OutputFormat::Text {
        println!("{}", result.summary());
    }

    if result.all_succeeded() {
        Ok(exit_code)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}

fn collect_candidates(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    match &cli.file {
        Some(list) if list.as_os_str() == "-" => {
            let stdin = io::stdin();
            candidates::from_list(stdin.lock()).context("Cannot read file list from stdin")
        }
        Some(list) => Ok(candidates::from_list_file(list)?),
        None => Ok(candidates::from_pattern(&cli.pattern)?),
    }
}

fn classify(config: &Config, candidates: Vec<PathBuf>) -> anyhow::Result<EngineReport> {
    let chunk_size = usize::try_from(config.chunk_size)
        .with_context(|| format!("chunk_size {} is too large for this platform", config.chunk_size))?;
    let mut engine_config = EngineConfig::default().with_chunk_size(chunk_size);
    if config.progress && io::stderr().is_terminal() {
        engine_config = engine_config.with_progress_callback(Arc::new(Progress::new()));
    }
    Ok(BucketEngine::new(engine_config).classify(candidates))
}

fn write_report(
    cli: &Cli,
    report: &EngineReport,
    plan: &KillPlan,
    exit_code: ExitCode,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            let color = !cli.no_color && io::stdout().is_terminal();
            TextOutput::new(&report.classification, plan)
                .with_color(color)
                .write_to(&mut out)?;
        }
        OutputFormat::Json => JsonOutput::new(report, plan, exit_code).write_to(&mut out, true)?,
        OutputFormat::Csv => CsvOutput::new(report, plan).write_to(&mut out)?,
    }
    out.flush()?;
    Ok(())
}
