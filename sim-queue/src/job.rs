use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_REPETITIONS: u32 = 100;
pub const DEFAULT_MIN_DELAY: u32 = 10;
pub const DEFAULT_MAX_DELAY: u32 = 1000;
pub const DEFAULT_THRESHOLD: i64 = 2_000_000;

/// One simulation to run: a topology, a destination node and the simulator
/// parameters.
///
/// A job is immutable once inserted. `id` is generated by the producer and is
/// unique for the lifetime of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub topology: String,
    pub destination: i64,
    pub repetitions: u32,
    pub min_delay: u32,
    pub max_delay: u32,
    pub threshold: i64,
    pub stubs_file: String,
    /// `None` lets the simulator pick its own seed.
    pub seed: Option<i64>,
    pub report_nodes_enabled: bool,
}

impl Job {
    /// Build a job with a fresh id and the default simulator parameters.
    pub fn new(topology: impl Into<String>, destination: i64, stubs_file: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topology: topology.into(),
            destination,
            repetitions: DEFAULT_REPETITIONS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            threshold: DEFAULT_THRESHOLD,
            stubs_file: stubs_file.into(),
            seed: None,
            report_nodes_enabled: false,
        }
    }
}
