use std::io::Read;

use thiserror::Error;

use crate::entry::Entry;
use crate::error::RepoError;
use crate::repository::SqliteRepository;
use crate::validate::Patterns;

const HEADER: [&str; 3] = ["name", "username", "email"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file has no header")]
    MissingHeader,
    #[error("invalid header")]
    InvalidHeader,
    #[error("invalid header length")]
    InvalidHeaderLength,
    #[error("invalid row length on line {0}")]
    InvalidRowLength(u64),
    #[error("no rows in file")]
    NoRowsInFile,
    #[error("{source} on line {line}")]
    InvalidRow { line: u64, source: RepoError },
    #[error("entry on line {0} already exists")]
    DuplicateRow(u64),
    #[error("{source} (line {line})")]
    Insert { line: u64, source: RepoError },
    #[error("cannot read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A validated row and the 1-based line it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedRow {
    pub line: u64,
    pub entry: Entry,
}

fn check_header(header: &csv::StringRecord) -> Result<(), ImportError> {
    if header.len() != HEADER.len() {
        return Err(ImportError::InvalidHeaderLength);
    }
    if header
        .iter()
        .zip(HEADER)
        .all(|(got, want)| got.trim().eq_ignore_ascii_case(want))
    {
        Ok(())
    } else {
        Err(ImportError::InvalidHeader)
    }
}

fn row_to_entry(record: &csv::StringRecord, line: u64, patterns: &Patterns) -> Result<Entry, ImportError> {
    if record.len() != HEADER.len() {
        return Err(ImportError::InvalidRowLength(line));
    }
    let entry = Entry::new(&record[0], &record[1], &record[2]);
    patterns
        .validate_entry(&entry)
        .map_err(|source| ImportError::InvalidRow { line, source })?;
    Ok(entry)
}

/// Parses `name,username,email` CSV and validates every row, stopping at
/// the first bad one.
pub fn read_entries<R: Read>(rd: R, patterns: &Patterns) -> Result<Vec<ImportedRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rd);
    let mut records = reader.records();

    let header = records.next().ok_or(ImportError::MissingHeader)??;
    check_header(&header)?;

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        let entry = row_to_entry(&record, line, patterns)?;
        rows.push(ImportedRow { line, entry });
    }

    if rows.is_empty() {
        return Err(ImportError::NoRowsInFile);
    }
    Ok(rows)
}

/// Imports CSV into the repository's current table. Either every row is
/// inserted or none is.
pub fn import_into<R: Read>(repo: &SqliteRepository, rd: R) -> Result<usize, ImportError> {
    let rows = read_entries(rd, repo.patterns())?;

    let inserted = repo.with_transaction(|repo| -> Result<usize, ImportError> {
        for row in &rows {
            repo.insert(&row.entry).map_err(|source| match source {
                RepoError::Duplicate => ImportError::DuplicateRow(row.line),
                source => ImportError::Insert {
                    line: row.line,
                    source,
                },
            })?;
        }
        Ok(rows.len())
    })?;

    log::info!("imported {inserted} entries into `{}`", repo.current_table());
    Ok(inserted)
}
