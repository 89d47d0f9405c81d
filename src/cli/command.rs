use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Start the interactive shell (default)")]
    Shell,
    #[command(about = "Create a new table")]
    CreateTable {
        #[arg(value_name = "TABLE")]
        name: String,
    },
    #[command(about = "Remove every entry from the current table")]
    ClearTable,
    #[command(
        about = "Delete a table",
        long_about = "Drop a table and its entries. The default table cannot be deleted."
    )]
    DeleteTable {
        #[arg(value_name = "TABLE")]
        name: String,
    },
    #[command(about = "List all tables")]
    ListTables,
    #[command(about = "Show every entry in the current table")]
    ShowUsers {
        #[arg(long, default_value_t = false, help = "Print entries as JSON")]
        json: bool,
    },
    #[command(about = "Show one entry by username")]
    GetUser {
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    #[command(about = "Add an entry to the current table")]
    AddUser {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "USERNAME")]
        username: String,
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    #[command(about = "Replace the fields of an entry")]
    UpdateUser {
        #[arg(value_name = "USERNAME", help = "Username of the entry to update")]
        username: String,
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "NEW_USERNAME")]
        new_username: String,
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    #[command(about = "Delete an entry by username")]
    DeleteUser {
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    #[command(
        about = "Import entries from a CSV file",
        long_about = "Import a CSV file with the header name,username,email into the current table. The import stops at the first invalid or duplicate row and adds nothing."
    )]
    ImportCsv {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    #[command(about = "Export the current table as an address book XML file")]
    ExportXml {
        #[arg(value_name = "PATH", help = "Output file (defaults to EXPORT_DIR/TABLE.xml)")]
        path: Option<PathBuf>,
    },
}
