use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Curate contact tables and export printer address books",
    long_about = "Keeps contacts in named SQLite tables, imports them from CSV and exports them as a DeviceAddressBook XML file. Runs an interactive shell when no subcommand is given.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        env = "ABTOOL_DATA_DIR",
        default_value = "./Database",
        value_name = "DIR",
        help = "Directory holding the SQLite database"
    )]
    pub data_dir: String,

    #[arg(
        long,
        env = "ABTOOL_DB_FILE",
        default_value = "sqlite.db",
        value_name = "FILE",
        help = "Database file name inside the data directory"
    )]
    pub db_file: String,

    #[arg(
        long,
        env = "ABTOOL_EXPORT_DIR",
        default_value = "./Address Books",
        value_name = "DIR",
        help = "Directory that receives exported address books"
    )]
    pub export_dir: String,

    #[arg(
        short = 't',
        long,
        env = "ABTOOL_TABLE",
        value_name = "TABLE",
        help = "Table to switch to before running the command"
    )]
    pub table: Option<String>,

    #[arg(
        long = "log-file",
        env = "ABTOOL_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Delete the SQLite database before starting"
    )]
    pub reset: bool,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    if dotenvy::from_filename(&dotenv_path).is_ok() {
        log::info!("loaded env from {}", dotenv_path);
    }

    Cli::parse()
}
