use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use sim_queue::Job;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Topology {
    pub(crate) name: String,
    pub(crate) stubs_file: String,
}

/// Simulator parameters shared by every generated job.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JobParams {
    pub(crate) repetitions: u32,
    pub(crate) min_delay: u32,
    pub(crate) max_delay: u32,
    pub(crate) threshold: i64,
    pub(crate) report_nodes_enabled: bool,
}

/// Read a topologies file: one `name|stubs_file` entry per line.
pub(crate) fn read_topologies(path: &Path) -> Result<Vec<Topology>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read topologies: {}", path.display()))?;
    parse_topologies(&text).with_context(|| format!("invalid topologies file {}", path.display()))
}

/// Read a destinations file: one node identifier per line.
pub(crate) fn read_destinations(path: &Path) -> Result<Vec<i64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read destinations: {}", path.display()))?;
    parse_destinations(&text)
        .with_context(|| format!("invalid destinations file {}", path.display()))
}

fn parse_topologies(text: &str) -> Result<Vec<Topology>> {
    non_blank_lines(text)
        .map(|(number, line)| {
            let (name, stubs_file) = line
                .split_once('|')
                .ok_or_else(|| anyhow!("line {number}: expected `name|stubs_file`, got `{line}`"))?;
            let (name, stubs_file) = (name.trim(), stubs_file.trim());
            if name.is_empty() || stubs_file.is_empty() || stubs_file.contains('|') {
                bail!("line {number}: expected `name|stubs_file`, got `{line}`");
            }
            Ok(Topology {
                name: name.to_string(),
                stubs_file: stubs_file.to_string(),
            })
        })
        .collect()
}

fn parse_destinations(text: &str) -> Result<Vec<i64>> {
    non_blank_lines(text)
        .map(|(number, line)| {
            line.parse::<i64>()
                .with_context(|| format!("line {number}: `{line}` is not a node id"))
        })
        .collect()
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// One job per topology and destination pair, each with a fresh id and no seed.
pub(crate) fn generate_jobs(
    topologies: &[Topology],
    destinations: &[i64],
    params: JobParams,
) -> Vec<Job> {
    topologies
        .iter()
        .flat_map(|topology| {
            destinations.iter().map(move |&destination| {
                let mut job = Job::new(&topology.name, destination, &topology.stubs_file);
                job.repetitions = params.repetitions;
                job.min_delay = params.min_delay;
                job.max_delay = params.max_delay;
                job.threshold = params.threshold;
                job.report_nodes_enabled = params.report_nodes_enabled;
                job
            })
        })
        .collect()
}
