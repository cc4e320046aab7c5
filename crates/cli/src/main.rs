//! `wfconsole` CLI entry-point.
//!
//! Available sub-commands:
//! - `can-run`   — evaluate the run action for a store snapshot file.
//! - `run-nodes` — evaluate the run action for every node of a workflow run.
//! - `validate`  — validate a workflow JSON file.
//! - `variable`  — check a new variable and print its creation event.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::{VariableForm, WorkflowState};
use engine::{can_be_run, Selection, Workflow, WorkflowRun};

const DEFAULT_VARIABLE_TYPES: &str = "string,password,key,ssh-key,pgp-key,text,boolean,number,repository";

#[derive(Parser)]
#[command(
    name = "wfconsole",
    about = "Workflow console tooling: run eligibility, graph validation, variables",
    version
)]
struct Cli {
    /// Log filter, e.g. `debug` or `engine=debug`.
    #[arg(long, global = true, env = "WFCONSOLE_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decide whether the run action is enabled for a store snapshot.
    CanRun {
        /// Path to a JSON snapshot (`workflow`, `workflow_run`, `node`, ...).
        path: PathBuf,
    },
    /// List every node of a workflow run with its run-action state.
    RunNodes {
        /// Path to the workflow run JSON file.
        path: PathBuf,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Check a new variable and print the creation event.
    Variable {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        var_type: String,
        #[arg(long)]
        value: String,
        /// Comma-separated list of accepted variable types.
        #[arg(long, default_value = DEFAULT_VARIABLE_TYPES)]
        types: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).context("invalid log filter")?)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::CanRun { path } => {
            let state: WorkflowState = read_json(&path)?;
            let verdict = match can_be_run(state.selection()) {
                Some(true) => "runnable",
                Some(false) => "not runnable",
                None => "not applicable",
            };
            println!("{verdict}");
        }
        Command::RunNodes { path } => {
            let run: WorkflowRun = read_json(&path)?;
            info!(run = run.num, status = %run.status, "evaluating run nodes");
            for node in run.workflow.all_nodes() {
                let selection = Selection::new(&run.workflow).with_run(&run).with_node(node);
                let status = run
                    .latest_node_run(node.id)
                    .map(|r| r.status.to_string())
                    .unwrap_or_else(|| "-".into());
                let runnable = can_be_run(selection).unwrap_or(false);
                println!("{:>6}  {:<24} {:<12} {}", node.id, node.name, status, runnable);
            }
        }
        Command::Validate { path } => {
            let workflow: Workflow = read_json(&path)?;
            match engine::validate_graph(&workflow) {
                Ok(order) => {
                    println!("Workflow is valid. Node order: {order:?}");
                }
                Err(e) => {
                    eprintln!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Variable {
            name,
            var_type,
            value,
            types,
        } => {
            let types = types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            let mut form = VariableForm::with_types(types);
            form.set_name(name);
            form.set_type(var_type);
            form.set_value(value);
            match form.submit() {
                Ok(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                Err(e) => {
                    eprintln!("Invalid variable: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}
