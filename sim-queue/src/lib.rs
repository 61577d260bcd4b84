//! Persistent work queue for SS-BGP distributed simulations.
//!
//! Jobs ([`Job`]) move through three stages, each backed by its own SQLite
//! table: `queue` (waiting, with a priority), `running` (assigned to a
//! simulator) and `complete` (finished, with a finish time). A job belongs to
//! at most one stage at a time; that rule is kept by callers moving jobs with
//! the [`Connection`] primitives, while the store enforces uniqueness and
//! referential integrity per table.
//!
//! ```no_run
//! use sim_queue::{Job, SimulationQueue, Store};
//!
//! # fn main() -> Result<(), sim_queue::StoreError> {
//! let queue = SimulationQueue::new(Store::open("simulations.db")?);
//! queue.add(&Job::new("tiny", 7, "tiny.stubs"), 5)?;
//!
//! queue.store().with_connection(|conn| {
//!     conn.insert_executor("sim-1")?;
//!     if let Some(job) = conn.next_job()? {
//!         conn.delete_from_queue(&job.id)?;
//!         conn.insert_into_running(&job.id, "sim-1")?;
//!     }
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

mod error;
mod job;
mod queue;
mod store;
pub mod timestamp;

pub use error::{Result, StoreError};
pub use job::{
    Job, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, DEFAULT_REPETITIONS, DEFAULT_THRESHOLD,
};
pub use queue::SimulationQueue;
pub use store::{
    CompletedJob, Connection, Listing, QueuedJob, RunningJob, StageCounts, Store, StoreConfig,
    DEFAULT_BUSY_TIMEOUT_MS, SCHEMA,
};
