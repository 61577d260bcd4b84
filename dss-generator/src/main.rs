//! SS-BGP distributed simulation generator: builds one simulation per
//! topology/destination pair and queues them all at one priority.
//!
//! Usage:
//!   dss-generator <topologies> <destinations> <priority> [--reportnodes]
//!                 [--c N] [--min N] [--max N] [--th N] [--db PATH] [--dry-run]

mod config;
mod input;

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sim_queue::{
    SimulationQueue, Store, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, DEFAULT_REPETITIONS,
    DEFAULT_THRESHOLD, SCHEMA,
};

use crate::input::{generate_jobs, read_destinations, read_topologies, JobParams};

#[derive(Parser, Debug)]
#[command(name = "dss-generator", version)]
#[command(about = "Generate SS-BGP simulations and add them to the simulation queue")]
struct Args {
    /// File with one `name|stubs_file` topology per line
    topologies: PathBuf,
    /// File with one destination node id per line
    destinations: PathBuf,
    /// Queue priority for every generated simulation (higher runs first)
    #[arg(allow_negative_numbers = true)]
    priority: i64,
    /// Enable per-node report data
    #[arg(long)]
    reportnodes: bool,
    /// Number of repetitions
    #[arg(long = "c", value_name = "REPETITIONS", default_value_t = DEFAULT_REPETITIONS,
          value_parser = clap::value_parser!(u32).range(1..))]
    repetitions: u32,
    /// Minimum message delay
    #[arg(long = "min", value_name = "MIN_DELAY", default_value_t = DEFAULT_MIN_DELAY)]
    min_delay: u32,
    /// Maximum message delay
    #[arg(long = "max", value_name = "MAX_DELAY", default_value_t = DEFAULT_MAX_DELAY)]
    max_delay: u32,
    /// Threshold value
    #[arg(long = "th", value_name = "THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: i64,
    /// Path to the DB file [default: $SIM_QUEUE_DB or simulations.db]
    #[arg(long = "db", value_name = "DB_PATH")]
    db: Option<PathBuf>,
    /// Print the generated simulations as JSON lines instead of queueing them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let topologies = read_topologies(&args.topologies)?;
    let destinations = read_destinations(&args.destinations)?;
    println!(
        "Found {} topologies and {} destinations",
        topologies.len(),
        destinations.len()
    );

    if args.min_delay > args.max_delay {
        tracing::warn!(
            min_delay = args.min_delay,
            max_delay = args.max_delay,
            "minimum delay is greater than maximum delay"
        );
    }

    println!("Generating simulations...");
    let jobs = generate_jobs(
        &topologies,
        &destinations,
        JobParams {
            repetitions: args.repetitions,
            min_delay: args.min_delay,
            max_delay: args.max_delay,
            threshold: args.threshold,
            report_nodes_enabled: args.reportnodes,
        },
    );

    if args.dry_run {
        let mut out = std::io::stdout().lock();
        for job in &jobs {
            serde_json::to_writer(&mut out, job).context("failed to encode simulation")?;
            writeln!(out)?;
        }
        return Ok(());
    }

    let db_path = args.db.unwrap_or_else(config::default_db_path);
    let store = Store::open_with(&db_path, config::store_config(), SCHEMA)
        .with_context(|| format!("failed to open simulation store {}", db_path.display()))?;
    let queue = SimulationQueue::new(store);
    tracing::info!(path = %queue.store().path().display(), jobs = jobs.len(), "queueing simulations");

    let added = queue
        .add_all(&jobs, args.priority)
        .context("failed to queue simulations")?;
    println!(
        "Done! {added} simulations were added with priority {}",
        args.priority
    );

    let counts = queue
        .store()
        .with_connection(|conn| conn.counts())
        .context("failed to read queue counts")?;
    println!(
        "Store now holds {} simulations: {} queued, {} running, {} complete",
        counts.jobs, counts.queued, counts.running, counts.complete
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_docopt_style_flags() {
        let args = Args::try_parse_from([
            "dss-generator",
            "topologies.txt",
            "destinations.txt",
            "-2",
            "--reportnodes",
            "--c",
            "10",
            "--min",
            "5",
            "--max",
            "50",
            "--th=100",
            "--db",
            "queue.db",
        ])
        .unwrap();

        assert_eq!(args.priority, -2);
        assert!(args.reportnodes);
        assert_eq!(args.repetitions, 10);
        assert_eq!(args.min_delay, 5);
        assert_eq!(args.max_delay, 50);
        assert_eq!(args.threshold, 100);
        assert_eq!(args.db, Some(PathBuf::from("queue.db")));
        assert!(!args.dry_run);
    }

    #[test]
    fn defaults_match_the_job_defaults() {
        let args =
            Args::try_parse_from(["dss-generator", "t.txt", "d.txt", "1"]).unwrap();
        assert_eq!(args.repetitions, DEFAULT_REPETITIONS);
        assert_eq!(args.min_delay, DEFAULT_MIN_DELAY);
        assert_eq!(args.max_delay, DEFAULT_MAX_DELAY);
        assert_eq!(args.threshold, DEFAULT_THRESHOLD);
        assert!(args.db.is_none());
    }

    #[test]
    fn zero_repetitions_is_rejected() {
        assert!(Args::try_parse_from(["dss-generator", "t.txt", "d.txt", "1", "--c", "0"]).is_err());
    }
}
