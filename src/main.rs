// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use scriptwood::backends::script::{ComponentRegistry, ScriptAdapter, ScriptComponent, ScriptLoader};
use scriptwood::config::load_and_validate_config;
use scriptwood::context::MapBroker;
use scriptwood::engine::RuleRunner;
use scriptwood::observability::init_tracing;

const USAGE: &str = "Usage: scriptwood <config.yaml> [module ...]";

/// Load the configured scripts, evaluate them against the configured inputs
/// and print the evaluations as JSON.
///
/// With module names only those modules are evaluated, in the order given.
async fn run(config_file: &str, modules: &[String]) -> anyhow::Result<()> {
    let config = load_and_validate_config(config_file)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("Failed to load {}", config_file))?;

    let catalog = config.catalog();
    let broker = MapBroker::from_inputs(&config.inputs, &catalog)?;

    let adapter = ScriptAdapter::new(catalog, ComponentRegistry::global(), config.execution.options());
    let loader = ScriptLoader::with_adapter(&config.scripts.directory, config.scripts.package.clone(), adapter)?;

    let components: Vec<Arc<ScriptComponent>> = if modules.is_empty() {
        loader.load_all()
    } else {
        modules
            .iter()
            .map(|module| loader.component(module))
            .collect::<Result<_, _>>()?
    };

    let evaluations = RuleRunner::new().evaluate(&components, &broker).await;
    println!("{}", serde_json::to_string_pretty(&evaluations)?);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing("info") {
        eprintln!("Failed to initialize tracing: {}", e);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((config_file, modules)) = args.split_first() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    if config_file == "-h" || config_file == "--help" {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(config_file, modules).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
