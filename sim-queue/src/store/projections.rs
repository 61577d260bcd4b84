//! Read-only views joining `simulation` with each stage table.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    rows::{executor_from_row, job_from_row, FinishTime, Listing, JOB_COLUMNS},
    Connection,
};
use crate::{Job, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub job: Job,
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningJob {
    pub job: Job,
    pub executor_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub job: Job,
    pub executor_id: String,
    pub finish_time: NaiveDateTime,
}

impl Connection {
    pub fn list_executors(&self) -> Result<Listing<'_, String>> {
        let stmt = self.conn.prepare("SELECT id FROM simulator")?;
        Ok(Listing::new(stmt, executor_from_row))
    }

    /// Every stored job, whatever its stage.
    pub fn list_jobs(&self) -> Result<Listing<'_, Job>> {
        let stmt = self
            .conn
            .prepare(&format!("SELECT {JOB_COLUMNS} FROM simulation s"))?;
        Ok(Listing::new(stmt, job_from_row))
    }

    /// Queued jobs, highest priority first. Order among equal priorities is
    /// unspecified.
    pub fn list_queued(&self) -> Result<Listing<'_, QueuedJob>> {
        let stmt = self.conn.prepare(&format!(
            "SELECT {JOB_COLUMNS}, q.priority AS priority
             FROM queue q JOIN simulation s ON s.id = q.id
             ORDER BY q.priority DESC"
        ))?;
        Ok(Listing::new(stmt, queued_from_row))
    }

    pub fn list_running(&self) -> Result<Listing<'_, RunningJob>> {
        let stmt = self.conn.prepare(&format!(
            "SELECT {JOB_COLUMNS}, r.simulator_id AS simulator_id
             FROM running r JOIN simulation s ON s.id = r.id"
        ))?;
        Ok(Listing::new(stmt, running_from_row))
    }

    pub fn list_complete(&self) -> Result<Listing<'_, CompletedJob>> {
        let stmt = self.conn.prepare(&format!(
            "SELECT {JOB_COLUMNS}, c.simulator_id AS simulator_id,
                    c.finish_datetime AS finish_datetime
             FROM complete c JOIN simulation s ON s.id = c.id"
        ))?;
        Ok(Listing::new(stmt, completed_from_row))
    }

    /// The queued job with the highest priority, if any. Ties are broken
    /// arbitrarily.
    pub fn next_job(&self) -> Result<Option<Job>> {
        let job = self
            .conn
            .query_row(
                &format!(
                    "SELECT {JOB_COLUMNS}
                     FROM queue q JOIN simulation s ON s.id = q.id
                     ORDER BY q.priority DESC
                     LIMIT 1"
                ),
                [],
                job_from_row,
            )
            .optional()?;
        Ok(job)
    }

    /// The job currently assigned to `executor_id`, if any.
    pub fn job_running_on(&self, executor_id: &str) -> Result<Option<Job>> {
        let job = self
            .conn
            .query_row(
                &format!(
                    "SELECT {JOB_COLUMNS}
                     FROM running r JOIN simulation s ON s.id = r.id
                     WHERE r.simulator_id = ?1
                     LIMIT 1"
                ),
                params![executor_id],
                job_from_row,
            )
            .optional()?;
        Ok(job)
    }
}

fn queued_from_row(row: &Row<'_>) -> rusqlite::Result<QueuedJob> {
    Ok(QueuedJob {
        job: job_from_row(row)?,
        priority: row.get("priority")?,
    })
}

fn running_from_row(row: &Row<'_>) -> rusqlite::Result<RunningJob> {
    Ok(RunningJob {
        job: job_from_row(row)?,
        executor_id: row.get("simulator_id")?,
    })
}

fn completed_from_row(row: &Row<'_>) -> rusqlite::Result<CompletedJob> {
    Ok(CompletedJob {
        job: job_from_row(row)?,
        executor_id: row.get("simulator_id")?,
        finish_time: row.get::<_, FinishTime>("finish_datetime")?.0,
    })
}
