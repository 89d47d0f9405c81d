//! Field and table-name validation.
//!
//! Table identifiers cannot be bound as statement parameters, so every
//! identifier passes `Patterns::validate_table_name` before it is spliced
//! into SQL. The table patterns are an allow-list: anything they do not
//! describe is rejected.

use regex::Regex;

use crate::entry::Entry;
use crate::error::{RepoError, RepoResult};

pub const NAME_PATTERN: &str = r"^[a-zA-Z]+( [a-zA-Z]+)*$";
pub const USERNAME_PATTERN: &str = r"^[a-zA-Z]+([._-]?[a-zA-Z0-9])*$";
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z]+([._-]?[a-zA-Z0-9])*@[a-zA-Z]+(\.[a-zA-Z]+)+$";
pub const TABLE_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9]*([_-][a-zA-Z0-9]+)*$";
pub const BRACKET_TABLE_PATTERN: &str = r"^\[[a-zA-Z0-9]+[ +!?._\-a-zA-Z0-9]*\]$";

/// Substring naming the storage engine's internal catalog tables.
pub const RESERVED_INFIX: &str = "sql";
pub const RESERVED_WORD: &str = "table";

const MIN_TABLE_NAME_LEN: usize = 2;

/// Compiled validation patterns. Built once and handed to the repository.
#[derive(Clone, Debug)]
pub struct Patterns {
    name: Regex,
    username: Regex,
    email: Regex,
    table: Regex,
    bracket_table: Regex,
    reserved_infix: String,
    reserved_word: String,
}

impl Patterns {
    pub fn new(
        name: &str,
        username: &str,
        email: &str,
        table: &str,
        bracket_table: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: Regex::new(name)?,
            username: Regex::new(username)?,
            email: Regex::new(email)?,
            table: Regex::new(table)?,
            bracket_table: Regex::new(bracket_table)?,
            reserved_infix: RESERVED_INFIX.to_string(),
            reserved_word: RESERVED_WORD.to_string(),
        })
    }

    pub fn with_reserved(mut self, infix: &str, word: &str) -> Self {
        self.reserved_infix = infix.to_ascii_lowercase();
        self.reserved_word = word.to_ascii_lowercase();
        self
    }

    pub fn validate_name(&self, name: &str) -> RepoResult<()> {
        validate_field(name, &self.name, RepoError::InvalidName)
    }

    pub fn validate_username(&self, username: &str) -> RepoResult<()> {
        validate_field(username, &self.username, RepoError::InvalidUsername)
    }

    pub fn validate_email(&self, email: &str) -> RepoResult<()> {
        validate_field(email, &self.email, RepoError::InvalidEmail)
    }

    /// Checks name, username and email in that order, stopping at the first failure.
    pub fn validate_entry(&self, entry: &Entry) -> RepoResult<()> {
        self.validate_name(&entry.name)?;
        self.validate_username(&entry.username)?;
        self.validate_email(&entry.email)
    }

    pub fn validate_table_name(&self, table: &str) -> RepoResult<()> {
        let lowered = table.to_ascii_lowercase();
        if lowered.contains(&self.reserved_infix) || lowered == self.reserved_word {
            return Err(RepoError::InvalidTableName);
        }

        let plain = table.len() >= MIN_TABLE_NAME_LEN && self.table.is_match(table);
        if plain || self.bracket_table.is_match(table) {
            Ok(())
        } else {
            Err(RepoError::InvalidTableName)
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new(
            NAME_PATTERN,
            USERNAME_PATTERN,
            EMAIL_PATTERN,
            TABLE_PATTERN,
            BRACKET_TABLE_PATTERN,
        )
        .expect("built-in validation patterns compile")
    }
}

fn validate_field(value: &str, pattern: &Regex, failure: RepoError) -> RepoResult<()> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(failure)
    }
}

/// Double-quotes a table name for use in statement text. Only call this on
/// names that passed `validate_table_name`; neither table pattern admits `"`.
pub(crate) fn quote_ident(table: &str) -> String {
    format!("\"{table}\"")
}
