use std::borrow::Borrow;

use crate::{Job, Result, Store};

/// Producer-facing entry point: every enqueue goes through here.
///
/// Moving a job between stages afterwards is done with the
/// [`crate::Connection`] primitives.
#[derive(Debug, Clone)]
pub struct SimulationQueue {
    store: Store,
}

impl SimulationQueue {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Store `job` and queue it with `priority` in one transaction.
    ///
    /// If the job id already exists this fails with `EntryExists` and nothing
    /// is committed.
    pub fn add(&self, job: &Job, priority: i64) -> Result<()> {
        self.store.with_connection(|conn| {
            conn.insert_job(job)?;
            conn.insert_into_queue(&job.id, priority)
        })?;
        tracing::debug!(job_id = %job.id, priority, "queued simulation");
        Ok(())
    }

    /// Store and queue every job with the same `priority`, all in a single
    /// transaction. Either all jobs are queued or none are. Returns the number
    /// of jobs queued.
    pub fn add_all<I>(&self, jobs: I, priority: i64) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Borrow<Job>,
    {
        let added = self.store.with_connection(|conn| {
            let mut added = 0;
            for job in jobs {
                let job = job.borrow();
                conn.insert_job(job)?;
                conn.insert_into_queue(&job.id, priority)?;
                added += 1;
            }
            Ok(added)
        })?;
        tracing::info!(added, priority, "queued simulations");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use tempfile::TempDir;

    fn test_queue() -> (SimulationQueue, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("simulations.db")).unwrap();
        (SimulationQueue::new(store), dir)
    }

    fn queued_ids(queue: &SimulationQueue) -> Vec<String> {
        queue
            .store()
            .with_connection(|conn| conn.list_queued()?.collect_all())
            .unwrap()
            .into_iter()
            .map(|q| q.job.id)
            .collect()
    }

    #[test]
    fn add_stores_and_queues_the_job() {
        let (queue, _dir) = test_queue();
        let job = Job::new("tiny", 3, "tiny.stubs");
        queue.add(&job, 4).unwrap();

        let queued = queue
            .store()
            .with_connection(|conn| conn.list_queued()?.collect_all())
            .unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].job, job);
        assert_eq!(queued[0].priority, 4);
    }

    #[test]
    fn add_duplicate_fails_and_leaves_original_queued_once() {
        let (queue, _dir) = test_queue();
        let job = Job::new("tiny", 3, "tiny.stubs");
        queue.add(&job, 4).unwrap();

        let err = queue.add(&job, 9).unwrap_err();
        assert!(matches!(err, StoreError::EntryExists { table: "simulation" }));

        let queued = queue
            .store()
            .with_connection(|conn| conn.list_queued()?.collect_all())
            .unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].priority, 4);
    }

    #[test]
    fn add_all_queues_every_job() {
        let (queue, _dir) = test_queue();
        let jobs: Vec<Job> = (0..5).map(|d| Job::new("tiny", d, "tiny.stubs")).collect();

        assert_eq!(queue.add_all(&jobs, 2).unwrap(), 5);

        let mut ids = queued_ids(&queue);
        ids.sort();
        let mut expected: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn add_all_is_atomic_across_the_batch() {
        let (queue, _dir) = test_queue();
        let existing = Job::new("tiny", 1, "tiny.stubs");
        queue.add(&existing, 1).unwrap();

        let fresh = Job::new("tiny", 2, "tiny.stubs");
        let err = queue.add_all([fresh.clone(), existing.clone()], 3).unwrap_err();
        assert!(matches!(err, StoreError::EntryExists { .. }));

        assert_eq!(queued_ids(&queue), vec![existing.id.clone()]);
        let stored = queue
            .store()
            .with_connection(|conn| conn.list_jobs()?.collect_all())
            .unwrap();
        assert!(stored.iter().all(|j| j.id != fresh.id));
    }

    #[test]
    fn add_all_with_no_jobs_is_a_no_op() {
        let (queue, _dir) = test_queue();
        assert_eq!(queue.add_all(Vec::<Job>::new(), 1).unwrap(), 0);
        assert!(queued_ids(&queue).is_empty());
    }
}
