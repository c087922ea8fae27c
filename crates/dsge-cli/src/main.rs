//! DSGE fiscal impact engine CLI binary.
//!
//! Provides the offline tooling subcommands (`build-linear-system`,
//! `run-determinacy-irf`, `steady-state-contract`) plus `simulate`, the
//! CLI-local stand-in for an eventual HTTP surface.

mod io;

use clap::{Parser, Subcommand};
use dsge_equations::EquationLibrary;
use dsge_fiscal::{run, DsgePath, DEFAULT_TIMEOUT};
use dsge_model::FiscalShock;
use dsge_solve::{gensys, impulse_responses, linearize, solve_steady_state};
use indicatif::{ProgressBar, ProgressStyle};
use io::{default_model_dir, load_allowlist, load_equation_library, load_parameter_set};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dsge")]
#[command(about = "Linear rational-expectations DSGE solver and fiscal impact engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory containing `parameters_nonfiscal_calibrated.yaml`,
    /// `parameters_fiscal_calibrated.yaml`, and `parameters_estimated.yaml`.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the linear system for an equation file and print its shape.
    BuildLinearSystem {
        /// Path to the JSON equation file.
        equations: PathBuf,

        /// Equation id allowed to drop out of the linear system if its
        /// Jacobian row comes out non-finite. Repeatable.
        #[arg(long = "skip")]
        skip: Vec<String>,
    },

    /// Run the full Gensys/IRF pipeline and print determinacy plus impulse
    /// responses.
    RunDeterminacyIrf {
        /// Path to the JSON equation file.
        equations: PathBuf,

        /// Horizon, in model periods.
        #[arg(long, default_value_t = dsge_solve::DEFAULT_HORIZON)]
        horizon: usize,

        /// Equation id allowed to drop out of the linear system if its
        /// Jacobian row comes out non-finite. Repeatable.
        #[arg(long = "skip")]
        skip: Vec<String>,
    },

    /// Solve the steady state and check its residuals against the
    /// allowlist's tolerance.
    SteadyStateContract {
        /// Path to `steady_state_allowlist.yaml`. Defaults to
        /// `<model-dir>/steady_state_allowlist.yaml`.
        #[arg(long)]
        allowlist: Option<PathBuf>,
    },

    /// Run a fiscal shock through the Simulation Orchestrator and print the
    /// resulting `SimulationResult` as pretty JSON.
    Simulate {
        /// Path to a JSON-encoded `FiscalShock`.
        shock: PathBuf,

        /// Equation file for the structural DSGE path. When omitted, only
        /// the reduced-form Fiscal Impact Engine runs.
        #[arg(long)]
        equations: Option<PathBuf>,

        /// Shock symbol in `equations` the dominant nonzero `FiscalShock`
        /// field is absorbed by. Required when `--equations` is given.
        #[arg(long)]
        shock_symbol: Option<String>,

        /// Output variable whose impulse response stands in for GDP
        /// deviations. Required when `--equations` is given.
        #[arg(long)]
        output_variable: Option<String>,

        /// Model periods per policy-relevant year.
        #[arg(long, default_value_t = 4)]
        periods_per_year: usize,

        /// Time budget for the run, in seconds.
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,

        /// Equation id allowed to drop out of the structural DSGE path's
        /// linear system if its Jacobian row comes out non-finite.
        /// Repeatable.
        #[arg(long = "skip")]
        skip: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let model_dir = cli.model_dir.unwrap_or_else(default_model_dir);

    match cli.command {
        Commands::BuildLinearSystem { equations, skip } => {
            build_linear_system(&model_dir, &equations, &skip)
        }
        Commands::RunDeterminacyIrf { equations, horizon, skip } => {
            run_determinacy_irf(&model_dir, &equations, horizon, &skip)
        }
        Commands::SteadyStateContract { allowlist } => {
            steady_state_contract(&model_dir, allowlist.as_deref())
        }
        Commands::Simulate {
            shock,
            equations,
            shock_symbol,
            output_variable,
            periods_per_year,
            timeout_secs,
            skip,
        } => simulate(
            &model_dir,
            &shock,
            equations.as_deref(),
            shock_symbol,
            output_variable,
            periods_per_year,
            Duration::from_secs(timeout_secs),
            skip,
        ),
    }
}

fn load_model_params(model_dir: &std::path::Path) -> Result<(dsge_model::ParameterSet, String), Box<dyn std::error::Error>> {
    let (params, hash) = load_parameter_set(
        &model_dir.join("parameters_nonfiscal_calibrated.yaml"),
        &model_dir.join("parameters_fiscal_calibrated.yaml"),
        &model_dir.join("parameters_estimated.yaml"),
    )?;
    Ok((params, hash))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn build_linear_system(
    model_dir: &std::path::Path,
    equations_path: &std::path::Path,
    skip: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let (params, _hash) = load_model_params(model_dir)?;
    let lib = load_equation_library(equations_path)?;

    let pb = spinner("Solving steady state...");
    let steady_state = solve_steady_state(&params)?;
    pb.finish_with_message("Steady state solved");

    let system = linearize(&lib, &params, &steady_state.levels(), skip)?;

    let consumed = lib.consumed_parameters(&params);
    let issues = dsge_params::build_param_issues(&consumed, &params);

    let report = json!({
        "variables": system.variables,
        "shocks": system.shocks,
        "forward_variables": system.forward_variables,
        "dropped_equations": system.dropped_equations,
        "skipped_equations": system.skipped_equations,
        "g0_shape": [system.g0.nrows(), system.g0.ncols()],
        "g1_shape": [system.g1.nrows(), system.g1.ncols()],
        "parameter_issues": issues,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_determinacy_irf(
    model_dir: &std::path::Path,
    equations_path: &std::path::Path,
    horizon: usize,
    skip: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let (params, _hash) = load_model_params(model_dir)?;
    let lib = load_equation_library(equations_path)?;

    let steady_state = solve_steady_state(&params)?;
    let system = linearize(&lib, &params, &steady_state.levels(), skip)?;
    let solution = gensys(&system.g0, &system.g1, &system.c, &system.psi, &system.pi, None)?;

    let pb = spinner("Computing impulse responses...");
    let responses = impulse_responses(&system, &solution, horizon)?;
    pb.finish_with_message("Impulse responses computed");

    let report = json!({
        "determinacy": {"exists": solution.eu.0, "unique": solution.eu.1},
        "responses": responses.iter().map(|r| json!({
            "shock": r.shock,
            "horizon": r.horizon,
            "paths": r.paths,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn steady_state_contract(
    model_dir: &std::path::Path,
    allowlist_path: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (params, _hash) = load_model_params(model_dir)?;
    let default_allowlist_path = model_dir.join("steady_state_allowlist.yaml");
    let allowlist = load_allowlist(allowlist_path.unwrap_or(&default_allowlist_path))?;

    let steady_state = solve_steady_state(&params)?;
    let (max_residual, name) = steady_state.max_residual(&allowlist.exempt_residuals);

    let report = json!({
        "max_residual": max_residual,
        "max_residual_name": name,
        "tolerance": allowlist.tolerance,
        "within_tolerance": max_residual <= allowlist.tolerance,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if max_residual > allowlist.tolerance {
        return Err(format!(
            "steady-state contract violated: |{name}| = {max_residual} exceeds tolerance {}",
            allowlist.tolerance
        )
        .into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    model_dir: &std::path::Path,
    shock_path: &std::path::Path,
    equations_path: Option<&std::path::Path>,
    shock_symbol: Option<String>,
    output_variable: Option<String>,
    periods_per_year: usize,
    timeout: Duration,
    skip: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (params, hash) = load_model_params(model_dir)?;
    let shock_text = std::fs::read_to_string(shock_path)?;
    let shock: FiscalShock = serde_json::from_str(&shock_text)?;

    let equations: Option<EquationLibrary> = equations_path.map(load_equation_library).transpose()?;
    let dsge_path = match (&equations, shock_symbol, output_variable) {
        (Some(equations), Some(shock_symbol), Some(output_variable)) => Some(DsgePath {
            equations,
            shock_symbol,
            output_variable,
            periods_per_year,
            skip_allowlist: skip,
        }),
        (Some(_), _, _) => {
            return Err("--shock-symbol and --output-variable are required with --equations".into());
        }
        (None, _, _) => None,
    };

    let scenario_id = shock_path.file_stem().and_then(|s| s.to_str()).unwrap_or("scenario").to_string();

    let sim_run = run(shock, &params, hash, scenario_id, dsge_path.as_ref(), timeout)?;
    println!("{}", serde_json::to_string_pretty(&sim_run)?);
    Ok(())
}
