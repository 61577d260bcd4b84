use rusqlite::ffi;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors raised by the simulation store.
///
/// Constraint failures are reclassified at the [`crate::Connection`]
/// boundary into `EntryExists`/`EntryNotFound`. `Sqlite` and `Io` are storage
/// faults and are never reclassified.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert violated a uniqueness constraint.
    #[error("entry already exists in `{table}`")]
    EntryExists { table: &'static str },
    /// An insert referenced a simulation or simulator that does not exist.
    #[error("insert into `{table}` references a simulation or simulator that does not exist")]
    EntryNotFound { table: &'static str },
    /// A delete was refused by caller policy (e.g. removing a completed job).
    #[error("cannot delete simulation {job_id}: {reason}")]
    DeleteError { job_id: String, reason: String },
    #[error("sqlite store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("sqlite store io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn delete_refused(job_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeleteError {
            job_id: job_id.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that are not constraint or policy violations.
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, Self::Sqlite(_) | Self::Io(_))
    }

    /// Reclassify a failed insert into `table` by its extended result code.
    pub(crate) fn from_insert(table: &'static str, err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return Self::EntryExists { table };
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::EntryNotFound { table },
                _ => {}
            }
        }
        Self::Sqlite(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), None)
    }

    #[test]
    fn unique_and_primary_key_violations_become_entry_exists() {
        for code in [ffi::SQLITE_CONSTRAINT_PRIMARYKEY, ffi::SQLITE_CONSTRAINT_UNIQUE] {
            let err = StoreError::from_insert("queue", failure(code));
            assert!(matches!(err, StoreError::EntryExists { table: "queue" }));
        }
    }

    #[test]
    fn foreign_key_violation_becomes_entry_not_found() {
        let err = StoreError::from_insert("running", failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY));
        assert!(matches!(err, StoreError::EntryNotFound { table: "running" }));
        assert!(!err.is_storage_fault());
    }

    #[test]
    fn other_failures_propagate_unchanged() {
        let err = StoreError::from_insert("simulation", failure(ffi::SQLITE_CONSTRAINT_NOTNULL));
        assert!(err.is_storage_fault());

        let err = StoreError::from_insert("simulation", rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(
            err,
            StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        ));
    }

    #[test]
    fn delete_refused_names_the_job() {
        let err = StoreError::delete_refused("abc", "simulation already complete");
        assert_eq!(
            err.to_string(),
            "cannot delete simulation abc: simulation already complete"
        );
        assert!(!err.is_storage_fault());
    }
}
