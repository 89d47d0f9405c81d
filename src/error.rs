use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("name is not valid")]
    InvalidName,
    #[error("username is not valid")]
    InvalidUsername,
    #[error("email is not valid")]
    InvalidEmail,
    #[error("table name is not valid")]
    InvalidTableName,
    #[error("record ID is invalid")]
    InvalidId,
    #[error("record already exists")]
    Duplicate,
    #[error("record does not exist")]
    NotFound,
    #[error("record could not be updated")]
    UpdateFailed,
    #[error("record could not be deleted")]
    DeleteFailed,
    #[error("table already exists")]
    TableExists,
    #[error("table does not exist")]
    TableDoesNotExist,
    #[error("this table cannot be deleted")]
    TableCannotBeDeleted,
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl RepoError {
    /// Maps a storage error to `Duplicate` when it is a UNIQUE constraint
    /// violation, and passes every other error through untouched.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        if is_unique_violation(&err) {
            RepoError::Duplicate
        } else {
            RepoError::Storage(err)
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(extended_code), None)
    }

    #[test]
    fn unique_violation_becomes_duplicate() {
        let err = RepoError::from_write(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(matches!(err, RepoError::Duplicate));
    }

    #[test]
    fn other_constraint_violations_pass_through() {
        let err = RepoError::from_write(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL));
        assert!(matches!(err, RepoError::Storage(_)));
    }

    #[test]
    fn non_sqlite_failures_pass_through() {
        let err = RepoError::from_write(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(
            err,
            RepoError::Storage(rusqlite::Error::QueryReturnedNoRows)
        ));
    }

    #[test]
    fn messages_are_short_and_human_readable() {
        assert_eq!(RepoError::Duplicate.to_string(), "record already exists");
        assert_eq!(
            RepoError::TableCannotBeDeleted.to_string(),
            "this table cannot be deleted"
        );
    }
}
