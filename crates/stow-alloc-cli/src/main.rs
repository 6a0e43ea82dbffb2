// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use stow_alloc_model::prelude::{
    LoadError, Phase2Settings, load_phase2_settings, load_problem,
};
use stow_alloc_solver::prelude::{LoadPlanner, SolveError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "stow-alloc",
    about = "3D container loading via a two-phase CP pipeline with ALNS refinement",
    version
)]
struct Cli {
    /// Path to the input JSON document.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Path the final solution JSON is written to.
    #[arg(long, value_name = "PATH")]
    output: PathBuf,

    /// Skip the ALNS refinement step and go straight from Phase 1 to
    /// Phase 2.
    #[arg(long)]
    no_alns: bool,

    /// Enable detailed logging throughout the process.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug)]
enum AppError {
    Load(LoadError),
    Solve(SolveError),
    Output(std::io::Error),
}

impl AppError {
    fn exit_code(&self) -> u8 {
        match self {
            AppError::Load(_) => 1,
            AppError::Solve(SolveError::AssignmentInfeasible(_)) => 2,
            AppError::Solve(SolveError::Internal(_)) | AppError::Output(_) => 3,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Load(e) => e.fmt(f),
            AppError::Solve(e) => e.fmt(f),
            AppError::Output(e) => write!(f, "Failed to write the solution: {e}"),
        }
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        AppError::Load(e)
    }
}

impl From<SolveError> for AppError {
    fn from(e: SolveError) -> Self {
        AppError::Solve(e)
    }
}

fn enable_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// A relative settings path is taken relative to the input document.
fn resolve_settings_path(input: &Path, settings: &Path) -> PathBuf {
    if settings.is_absolute() {
        settings.to_path_buf()
    } else {
        input
            .parent()
            .map(|dir| dir.join(settings))
            .unwrap_or_else(|| settings.to_path_buf())
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let (problem, settings) = load_problem(&cli.input)?;
    tracing::info!(
        input = %cli.input.display(),
        items = problem.len(),
        container = %problem.spec(),
        "Input loaded"
    );

    let phase2 = match &settings.step2_settings_file {
        Some(path) => {
            let resolved = resolve_settings_path(&cli.input, path);
            tracing::debug!(settings = %resolved.display(), "Loading Phase 2 settings");
            load_phase2_settings(&resolved)?
        }
        None => {
            tracing::warn!("No step2_settings_file given; using Phase 2 defaults");
            Phase2Settings::default()
        }
    };

    let mut planner = LoadPlanner::new(&problem, settings, phase2);
    if cli.no_alns {
        planner = planner.without_alns();
    }

    let start_ts = Utc::now();
    let t0 = Instant::now();
    let plan = planner.solve()?;
    let runtime = t0.elapsed();
    tracing::info!(
        start = %start_ts,
        end = %Utc::now(),
        runtime_ms = runtime.as_millis(),
        "Solve finished"
    );

    if let Some(dir) = cli.output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(AppError::Output)?;
        }
    }
    let output = plan.to_output(&problem);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| AppError::Output(std::io::Error::other(e)))?;
    std::fs::write(&cli.output, json).map_err(AppError::Output)?;
    tracing::info!(output = %cli.output.display(), "Solution written");

    if !plan.is_fully_feasible() {
        tracing::warn!("One or more containers could not be feasibly packed");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    enable_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
