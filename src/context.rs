use std::path::PathBuf;

use crate::configuration::Configuration;

pub struct Context {
    pub config: Configuration,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        let cfg = Configuration {
            data_dir: PathBuf::from(&cli.data_dir),
            db_file: cli.db_file.clone(),
            export_dir: PathBuf::from(&cli.export_dir),
            table: cli.table.clone(),
            log_file: cli.log_file.as_ref().map(PathBuf::from),
            reset: cli.reset,
        };
        Self { config: cfg }
    }
}
