use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Params};

use super::{Connection, TABLES};
use crate::{timestamp::format_finish_time, Job, Result, StoreError};

/// Row counts of the job table and each stage table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageCounts {
    pub jobs: usize,
    pub queued: usize,
    pub running: usize,
    pub complete: usize,
}

impl Connection {
    /// Insert the full job row.
    ///
    /// Fails with `EntryExists` if a job with the same id is already stored.
    pub fn insert_job(&self, job: &Job) -> Result<()> {
        self.insert(
            "simulation",
            "INSERT INTO simulation (
                id, topology, destination, repetitions, min_delay, max_delay,
                threshold, stubs_file, seed, reportnodes
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                job.id,
                job.topology,
                job.destination,
                job.repetitions,
                job.min_delay,
                job.max_delay,
                job.threshold,
                job.stubs_file,
                job.seed,
                job.report_nodes_enabled,
            ],
        )
    }

    pub fn insert_executor(&self, executor_id: &str) -> Result<()> {
        self.insert(
            "simulator",
            "INSERT INTO simulator (id) VALUES (?1)",
            params![executor_id],
        )
    }

    /// Put a stored job in the queue with `priority` (higher runs first).
    ///
    /// Fails with `EntryNotFound` for an unknown job and `EntryExists` if the
    /// job is already queued.
    pub fn insert_into_queue(&self, job_id: &str, priority: i64) -> Result<()> {
        self.insert(
            "queue",
            "INSERT INTO queue (id, priority) VALUES (?1, ?2)",
            params![job_id, priority],
        )
    }

    /// Assign a job to an executor. Both must already exist.
    pub fn insert_into_running(&self, job_id: &str, executor_id: &str) -> Result<()> {
        self.insert(
            "running",
            "INSERT INTO running (id, simulator_id) VALUES (?1, ?2)",
            params![job_id, executor_id],
        )
    }

    /// Record that `executor_id` finished the job at `finish_time`.
    ///
    /// The time is stored as `YYYY-MM-DD_HH:MM:SS`; sub-second precision is
    /// lost.
    pub fn insert_into_complete(
        &self,
        job_id: &str,
        executor_id: &str,
        finish_time: &NaiveDateTime,
    ) -> Result<()> {
        self.insert(
            "complete",
            "INSERT INTO complete (id, simulator_id, finish_datetime) VALUES (?1, ?2, ?3)",
            params![job_id, executor_id, format_finish_time(finish_time)],
        )
    }

    /// Delete a job and, through the cascade, every stage row it has.
    /// Returns true if the job existed.
    pub fn delete_job(&self, job_id: &str) -> Result<bool> {
        self.delete("DELETE FROM simulation WHERE id = ?1", job_id)
    }

    pub fn delete_from_queue(&self, job_id: &str) -> Result<bool> {
        self.delete("DELETE FROM queue WHERE id = ?1", job_id)
    }

    pub fn delete_from_running(&self, job_id: &str) -> Result<bool> {
        self.delete("DELETE FROM running WHERE id = ?1", job_id)
    }

    /// Run a multi-statement script, e.g. the schema.
    pub fn execute_script(&self, script: &str) -> Result<()> {
        self.conn.execute_batch(script)?;
        Ok(())
    }

    pub fn counts(&self) -> Result<StageCounts> {
        let counts = self.conn.query_row(
            "SELECT
                 (SELECT COUNT(*) FROM simulation),
                 (SELECT COUNT(*) FROM queue),
                 (SELECT COUNT(*) FROM running),
                 (SELECT COUNT(*) FROM complete)",
            [],
            |row| {
                Ok(StageCounts {
                    jobs: row.get::<_, i64>(0)? as usize,
                    queued: row.get::<_, i64>(1)? as usize,
                    running: row.get::<_, i64>(2)? as usize,
                    complete: row.get::<_, i64>(3)? as usize,
                })
            },
        )?;
        Ok(counts)
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Persist everything written since the last commit or rollback.
    pub fn commit(&self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT;")?;
            tracing::debug!("committed store transaction");
        }
        Ok(())
    }

    /// Discard everything written since the last commit or rollback.
    pub fn rollback(&self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK;")?;
            tracing::debug!("rolled back store transaction");
        }
        Ok(())
    }

    /// Commit pending work and release the handle.
    pub fn close(self) -> Result<()> {
        self.commit()?;
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    pub(super) fn has_schema(&self) -> Result<bool> {
        let found: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN (?1, ?2, ?3, ?4, ?5)",
            params_from_iter(TABLES),
            |row| row.get(0),
        )?;
        Ok(found as usize == TABLES.len())
    }

    fn begin_if_needed(&self) -> Result<()> {
        if !self.in_transaction() {
            self.conn.execute_batch("BEGIN DEFERRED;")?;
        }
        Ok(())
    }

    fn insert(&self, table: &'static str, sql: &str, params: impl Params) -> Result<()> {
        self.begin_if_needed()?;
        self.conn
            .execute(sql, params)
            .map_err(|e| StoreError::from_insert(table, e))?;
        Ok(())
    }

    fn delete(&self, sql: &str, job_id: &str) -> Result<bool> {
        self.begin_if_needed()?;
        let deleted = self.conn.execute(sql, params![job_id])?;
        Ok(deleted > 0)
    }
}
