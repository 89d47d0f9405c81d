//! Contact tables for printer address books.
//!
//! The `repository` module owns table lifecycle and entry CRUD over SQLite;
//! `importer`, `exporter` and `shell` are thin collaborators around it.

pub mod app;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod entry;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod repository;
pub mod shell;
pub mod tracing;
pub mod validate;

pub use entry::Entry;
pub use error::{RepoError, RepoResult};
pub use repository::{RepoConfig, SqliteRepository, DEFAULT_TABLE};
pub use validate::Patterns;
