pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod nulls;
pub mod preview;
pub mod report;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    aggregate::{AggregateRequest, SortOrder},
    classify::classify,
    cli::{Cli, Commands, InputArgs, OutputFormat},
    config::ProfileConfig,
    dataset::Table,
    report::Selection,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("registry_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Schema(args) => handle_schema(&args.input, args.format),
        Commands::Roles(args) => handle_roles(&args.input, args.format),
        Commands::Nulls(args) => handle_nulls(&args.input, args.format),
        Commands::Top(args) => handle_top(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Report(args) => handle_report(&args),
        Commands::InitConfig(args) => handle_init_config(&args),
    }
}

/// Resolves the profile (file plus command-line overrides) and ingests the input.
pub(crate) fn load_input(args: &InputArgs) -> Result<(ProfileConfig, Table)> {
    let mut config = ProfileConfig::load_or_default(args.config.as_deref())?;
    if let Some(encoding) = &args.input_encoding {
        config.encoding = encoding.clone();
    }
    if !args.null_tokens.is_empty() {
        config.null_tokens = args.null_tokens.clone();
    }
    if let Some(rows) = args.infer_rows {
        config.infer_rows = rows;
    }
    config.allow_ragged |= args.allow_ragged;

    let mut options = config.ingest_options()?;
    if args.delimiter.is_some() {
        options.delimiter = args.delimiter;
    }
    debug!(
        "Ingesting {:?} as {} (type sample: {} row(s))",
        args.input,
        options.encoding.name(),
        options.max_type_inference_rows
    );
    let table = ingest::ingest(&args.input, &options)
        .with_context(|| format!("Ingesting {:?}", args.input))?;
    info!(
        "Loaded {} row(s) across {} column(s) from {:?}",
        table.row_count(),
        table.column_count(),
        args.input
    );
    Ok((config, table))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing output")?;
    println!("{rendered}");
    Ok(())
}

fn handle_schema(args: &InputArgs, format: OutputFormat) -> Result<()> {
    let (_, table) = load_input(args)?;
    let descriptors = schema::describe(&table);
    match format {
        OutputFormat::Json => print_json(&descriptors)?,
        OutputFormat::Table => print!("{}", report::render_schema(&descriptors)),
    }
    info!("Described {} column(s)", descriptors.len());
    Ok(())
}

fn handle_roles(args: &InputArgs, format: OutputFormat) -> Result<()> {
    let (config, table) = load_input(args)?;
    let descriptors = schema::describe(&table);
    let roles = classify(&descriptors, &config.roles);
    match format {
        OutputFormat::Json => print_json(&roles)?,
        OutputFormat::Table => print!("{}", report::render_roles(&roles)),
    }
    info!(
        "{} of {} column(s) matched no role",
        roles.unclassified(&descriptors).len(),
        descriptors.len()
    );
    Ok(())
}

fn handle_nulls(args: &InputArgs, format: OutputFormat) -> Result<()> {
    let (_, table) = load_input(args)?;
    let stats = nulls::profile_nulls(&table);
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => print!("{}", report::render_nulls(&stats)),
    }
    info!(
        "Profiled nulls for {} column(s); {} null cell(s) in total",
        stats.len(),
        table.null_cell_count()
    );
    Ok(())
}

fn handle_top(args: &cli::TopArgs) -> Result<()> {
    let (_, table) = load_input(&args.input)?;
    let request = AggregateRequest {
        group_column: args.column.clone(),
        top_n: args.top,
        order: SortOrder {
            by: args.sort_by,
            direction: args.order,
        },
        exclude_nulls: args.exclude_nulls,
        require_rows: args.require_rows,
    };
    let result = aggregate::aggregate(&table, &request)?;
    match args.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print!("{}", report::render_aggregation(&result)),
    }
    info!(
        "Showing {} of {} group(s) for '{}'",
        result.len(),
        result.distinct_groups,
        args.column
    );
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let (config, table) = load_input(&args.input)?;
    let mut report_config = config.report.clone();
    if let Some(rows) = args.preview_rows {
        report_config.preview_rows = rows;
    }
    let selection = Selection {
        activity: args.activity.clone(),
        location: args.location.clone(),
        size: args.size.clone(),
        preview_columns: args.preview_columns.clone(),
    };
    let report = report::build_report(&table, &report_config, &config.roles, &selection)?;
    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print!("{}", report::render_text(&report)),
    }
    info!("Report built for {} row(s)", report.row_count);
    Ok(())
}

fn handle_init_config(args: &cli::InitConfigArgs) -> Result<()> {
    ProfileConfig::default()
        .save(&args.output)
        .with_context(|| format!("Writing profile to {:?}", args.output))?;
    info!("Default profile written to {:?}", args.output);
    Ok(())
}
