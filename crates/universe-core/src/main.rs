//! Scale-Loop Universe Simulation
//!
//! Runs a seeded universe for a fixed number of ticks and prints what the
//! observers made of it.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use universe_core::events::InteractionLogger;
use universe_core::output::{write_stats, GroupStats, SimulationStats, StatsCollector};
use universe_core::{SimConfig, Universe};
use universe_events::PatternReport;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "universe_sim")]
#[command(about = "A scale-loop universe simulation with observer entities")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Number of entities created at initialization
    #[arg(long, default_value_t = 50)]
    population: usize,

    /// TOML configuration file (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interval between tick summaries (0 disables them)
    #[arg(long, default_value_t = 10)]
    report_interval: u64,

    /// Write every interaction to this JSONL file
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Write run statistics to this JSON file
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Write the default configuration to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Final report printed with `--json`
#[derive(Serialize)]
struct FinalReport {
    seed: u64,
    stats: SimulationStats,
    observers: Vec<PatternReport>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        let toml = SimConfig::default().to_toml()?;
        std::fs::write(path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };

    let mut universe = Universe::initialize(args.population, args.seed, config)?;

    if !args.json {
        let config = universe.config();
        println!("Scale-Loop Universe Simulation");
        println!("==============================");
        println!("Seed: {}", args.seed);
        println!("Ticks: {}", args.ticks);
        println!("Population: {}", universe.population());
        println!(
            "Interactions per tick: {} (+{} gravity)",
            config.interactions_per_tick, config.effects.gravity_per_tick
        );
        println!("Group threshold: {}", config.interaction_threshold);
        println!("Observers: {}", universe.observer_ids().len());
        println!();
    }
    let mut logger = match &args.events_out {
        Some(path) => InteractionLogger::new(path)
            .with_context(|| format!("opening interaction log {}", path.display()))?,
        None => InteractionLogger::null(),
    };
    let mut collector = StatsCollector::new();

    for _ in 0..args.ticks {
        let report = universe.run_tick()?;
        logger.log_batch(&report.interactions)?;
        collector.record_tick(&report);

        if !args.json && args.report_interval > 0 && (report.tick_index + 1) % args.report_interval == 0 {
            println!(
                "Tick {:>5}: {} interactions, {} groups",
                report.tick_index,
                report.interactions.len(),
                universe.groups().count()
            );
        }
    }
    logger.flush()?;

    let stats = collector.generate_stats(universe.tick(), GroupStats::from_groups(universe.groups()));
    if let Some(path) = &args.stats_out {
        write_stats(&stats, path).with_context(|| format!("writing stats to {}", path.display()))?;
    }

    let observers = universe
        .observer_ids()
        .into_iter()
        .map(|id| universe.observer_report(id))
        .collect::<universe_core::Result<Vec<_>>>()?;

    if args.json {
        let report = FinalReport {
            seed: args.seed,
            stats,
            observers,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Simulation complete: {} ticks", stats.total_ticks);
    println!("  Interactions: {}", stats.total_interactions);
    for (interaction_type, count) in &stats.interactions_by_type {
        println!("    {:<13} {}", interaction_type.as_str(), count);
    }
    println!(
        "  Groups: {} ({} entities grouped)",
        stats.groups.group_count, stats.groups.grouped_entities
    );
    if let Some(largest) = stats.groups.largest_group {
        println!("  Largest group: {} ({} members)", largest, stats.groups.largest_group_size);
    }

    for report in &observers {
        print_patterns(report);
    }

    Ok(())
}

fn print_patterns(report: &PatternReport) {
    println!();
    println!("Observer {}", report.observer_id);
    println!("  Perceived entities: {}", report.num_perceived_entities);
    println!("  Perceived relationships: {}", report.num_perceived_relationships);
    println!("  Clusters: {}", report.num_perceived_clusters);
    for entry in &report.most_frequent_interaction_types {
        println!("    {:<13} {}", entry.interaction_type.as_str(), entry.count);
    }
    for hub in &report.highly_connected_entities {
        println!(
            "  Hub {} degree {} centrality {:.2}",
            hub.entity_id, hub.degree, hub.centrality
        );
    }
    for (group, members) in &report.perceived_groups {
        println!("  Group {}: {} perceived members", group, members);
    }
}
