//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads fitted parameters into the registry (files, env, or synthetic)
//! - loads or generates the customer population
//! - runs scoring + ranking
//! - prints reports
//! - writes optional exports

use std::sync::Arc;

use clap::Parser;

use crate::cli::{Command, CompareArgs, GenArgs, InputArgs, RankArgs};
use crate::data::SyntheticSpec;
use crate::domain::{CustomerHistory, ModelId, RankRequest};
use crate::error::RequestError;
use crate::io::export::{
    RankingExport, write_population_csv, write_ranking_csv, write_ranking_json,
};
use crate::io::ingest::{RowError, load_population_csv};
use crate::io::params::write_params_json;
use crate::registry::ModelRegistry;

pub mod pipeline;

/// Entry point for the `ipr` binary.
pub fn run() -> Result<(), RequestError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Rank(args) => handle_rank(args),
        Command::Compare(args) => handle_compare(args),
        Command::Gen(args) => handle_gen(args),
    }
}

fn handle_rank(args: RankArgs) -> Result<(), RequestError> {
    let registry = load_registry(&args.input)?;
    let (population, row_errors) = load_population(&args.input)?;

    let request = RankRequest {
        model: args.model,
        top_k: args.top_k,
        horizon_days: args.horizon_days,
    };
    let outcome = pipeline::run_rank(&registry, &population, &request, args.tie_epsilon)?;

    print!(
        "{}",
        crate::report::format_run_summary(&request, population.len(), &outcome)
    );
    print!("{}", crate::report::format_row_errors(&row_errors));
    print!("{}", crate::report::format_ranking(&outcome.entries));
    print!("{}", crate::report::format_exclusions(&outcome));

    if let Some(path) = &args.export {
        write_ranking_csv(path, &outcome.entries)?;
    }
    if let Some(path) = &args.export_json {
        let export =
            RankingExport::new(request.model, request.top_k, &outcome.entries, &outcome.excluded);
        write_ranking_json(path, &export)?;
    }

    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), RequestError> {
    let registry = load_registry(&args.input)?;
    let (population, row_errors) = load_population(&args.input)?;

    let rankings = pipeline::run_compare(
        &registry,
        &population,
        args.top_k,
        args.horizon_days,
        args.tie_epsilon,
    )?;

    print!("{}", crate::report::format_row_errors(&row_errors));
    let tables: Vec<_> = rankings
        .iter()
        .map(|(model, outcome)| (*model, outcome.entries.clone()))
        .collect();
    print!("{}", crate::report::format_compare(&tables));

    if args.horizon_days.is_none()
        && registry.loaded().contains(&ModelId::Survival)
    {
        println!("[survival] skipped: no --horizon-days given");
    }

    for (model, outcome) in &rankings {
        if !outcome.excluded.is_empty() {
            println!("[{model}] excluded {} customer(s)", outcome.excluded.len());
        }
    }

    Ok(())
}

fn handle_gen(args: GenArgs) -> Result<(), RequestError> {
    let spec = SyntheticSpec {
        seed: args.seed,
        customers: args.customers,
        n_features: args.features,
        snapshots: args.snapshots,
    };

    std::fs::create_dir_all(&args.out).map_err(|e| {
        RequestError::Io(format!(
            "Failed to create output directory '{}': {e}",
            args.out.display()
        ))
    })?;

    for params in crate::data::generate_params(&spec)? {
        let path = args.out.join(format!("{}.json", params.model_id().file_stem()));
        write_params_json(&path, &params)?;
        println!("Wrote {}", path.display());
    }

    let population = crate::data::generate_population(&spec)?;
    let csv_path = args.out.join("population.csv");
    write_population_csv(&csv_path, &population, spec.n_features)?;
    println!("Wrote {}", csv_path.display());

    Ok(())
}

fn load_registry(input: &InputArgs) -> Result<ModelRegistry, RequestError> {
    if let Some(dir) = &input.models {
        return ModelRegistry::from_dir(dir);
    }
    if input.synthetic {
        let registry = ModelRegistry::new();
        for params in crate::data::generate_params(&synthetic_spec(input))? {
            registry.load(Arc::from(params.into_scorer()?));
        }
        return Ok(registry);
    }
    ModelRegistry::from_env()
}

fn load_population(
    input: &InputArgs,
) -> Result<(Vec<CustomerHistory>, Vec<RowError>), RequestError> {
    if let Some(path) = &input.population {
        let ingest = load_population_csv(path)?;
        return Ok((ingest.population, ingest.row_errors));
    }
    if input.synthetic {
        let population = crate::data::generate_population(&synthetic_spec(input))?;
        return Ok((population, Vec::new()));
    }
    Err(RequestError::Config(
        "Provide --population <CSV> or --synthetic.".to_string(),
    ))
}

fn synthetic_spec(input: &InputArgs) -> SyntheticSpec {
    SyntheticSpec {
        seed: input.seed,
        customers: input.customers,
        n_features: input.features,
        snapshots: input.snapshots,
    }
}
