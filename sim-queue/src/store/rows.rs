use chrono::NaiveDateTime;
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ValueRef},
    Row, Statement,
};

use crate::{timestamp::parse_finish_time, Job, Result, StoreError};

pub(super) type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// Job columns of `simulation s`, aliased to their bare names so rows can be
/// read by name whatever table they are joined with.
pub(super) const JOB_COLUMNS: &str = "s.id AS id, s.topology AS topology,
    s.destination AS destination, s.repetitions AS repetitions,
    s.min_delay AS min_delay, s.max_delay AS max_delay, s.threshold AS threshold,
    s.stubs_file AS stubs_file, s.seed AS seed, s.reportnodes AS reportnodes";

/// A prepared query whose rows are read lazily from the SQLite cursor.
///
/// Each call to [`Listing::rows`] runs the query once; the returned iterator
/// is finite and cannot be rewound.
pub struct Listing<'conn, T> {
    stmt: Statement<'conn>,
    map: RowMapper<T>,
}

impl<'conn, T> Listing<'conn, T> {
    pub(super) fn new(stmt: Statement<'conn>, map: RowMapper<T>) -> Self {
        Self { stmt, map }
    }

    pub fn rows(&mut self) -> Result<impl Iterator<Item = Result<T>> + '_> {
        let rows = self.stmt.query_map([], self.map)?;
        Ok(rows.map(|row| row.map_err(StoreError::from)))
    }

    /// Read every row into memory.
    pub fn collect_all(mut self) -> Result<Vec<T>> {
        let rows = self.rows()?.collect::<Result<Vec<_>>>();
        rows
    }
}

/// Map a row carrying [`JOB_COLUMNS`] to a [`Job`].
///
/// A missing column or a value of the wrong type is an error, never a default.
pub(super) fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get("id")?,
        topology: row.get("topology")?,
        destination: row.get("destination")?,
        repetitions: row.get("repetitions")?,
        min_delay: row.get("min_delay")?,
        max_delay: row.get("max_delay")?,
        threshold: row.get("threshold")?,
        stubs_file: row.get("stubs_file")?,
        seed: row.get("seed")?,
        report_nodes_enabled: row.get("reportnodes")?,
    })
}

pub(super) fn executor_from_row(row: &Row<'_>) -> rusqlite::Result<String> {
    row.get("id")
}

/// `finish_datetime` column value.
pub(super) struct FinishTime(pub(super) NaiveDateTime);

impl FromSql for FinishTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        parse_finish_time(raw)
            .map(FinishTime)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
