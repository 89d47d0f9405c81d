use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// A contact record. `id` is 0 until storage assigns one on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn with_id(
        id: i64,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<Self> {
        if id <= 0 {
            return Err(RepoError::InvalidId);
        }
        Ok(Self {
            id,
            ..Self::new(name, username, email)
        })
    }

    pub fn display<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "ID: {}", self.id)?;
        writeln!(w, "Name: {}", self.name)?;
        writeln!(w, "Username: {}", self.username)?;
        writeln!(w, "Email: {}", self.email)
    }
}
