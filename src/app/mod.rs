mod wiring;

use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::cli::{self, Command};
use crate::commands::Session;
use crate::{context, shell};

pub struct App {
    pub ctx: context::Context,
    pub session: Session,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = crate::cli::parse();

        crate::tracing::set_log_file(cli.log_file.as_deref().map(std::path::Path::new));

        let ctx = context::Context::from_cli(&cli);
        Ok((Self::new(ctx)?, cli))
    }

    /// Creates the data directory, opens the database and prepares the
    /// default table.
    pub fn new(ctx: context::Context) -> Result<Self> {
        log::info!("starting abtool");
        log::info!("data dir: {}", ctx.config.data_dir.display());
        log::info!("database: {}", ctx.config.db_path().display());

        wiring::init_data_dir(&ctx)?;
        let repo = wiring::init_repository(&ctx)?;
        let session = Session::new(repo, &ctx.config.export_dir);

        Ok(Self { ctx, session })
    }
}

pub fn run() -> Result<()> {
    let (mut app, cli) = App::from_cli()?;

    match &cli.cmd {
        Some(Command::Shell) | None if io::stdin().is_terminal() => {
            shell::run_interactive(&mut app.session)?;
        }
        Some(Command::Shell) | None => {
            let mut out = io::stdout().lock();
            shell::run(&mut app.session, io::stdin().lock(), &mut out)?;
            out.flush()?;
        }
        Some(cmd) => {
            let mut out = io::stdout().lock();
            cmd.run(&mut app.session, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use crate::repository::DEFAULT_TABLE;

    fn ctx(dir: &std::path::Path, table: Option<&str>, reset: bool) -> context::Context {
        context::Context {
            config: Configuration {
                data_dir: dir.join("Database"),
                db_file: "sqlite.db".to_string(),
                export_dir: dir.join("books"),
                table: table.map(str::to_string),
                log_file: None,
                reset,
            },
        }
    }

    #[test]
    fn new_creates_data_dir_and_default_table() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(ctx(dir.path(), None, false)).unwrap();
        assert!(dir.path().join("Database").join("sqlite.db").exists());
        assert_eq!(app.session.repo.current_table(), DEFAULT_TABLE);
    }

    #[test]
    fn state_persists_and_reset_wipes_it() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = App::new(ctx(dir.path(), None, false)).unwrap();
            app.session.repo.new_table("reports").unwrap();
        }

        let app = App::new(ctx(dir.path(), Some("reports"), false)).unwrap();
        assert_eq!(app.session.repo.current_table(), "reports");
        drop(app);

        let app = App::new(ctx(dir.path(), None, true)).unwrap();
        assert_eq!(
            app.session.repo.list_tables().unwrap(),
            vec![DEFAULT_TABLE.to_string()]
        );
    }

    #[test]
    fn unknown_table_option_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let err = App::new(ctx(dir.path(), Some("missing"), false))
            .err()
            .expect("startup should fail");
        assert!(format!("{err:#}").contains("table does not exist"));
    }
}
