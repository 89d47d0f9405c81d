use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::Command;
use crate::entry::Entry;
use crate::repository::SqliteRepository;

mod table;
mod user;

/// Everything a command needs: the repository and where exports go.
pub struct Session {
    pub repo: SqliteRepository,
    pub export_dir: PathBuf,
}

impl Session {
    pub fn new(repo: SqliteRepository, export_dir: impl AsRef<Path>) -> Self {
        Self {
            repo,
            export_dir: export_dir.as_ref().to_path_buf(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    CreateTable(String),
    SwitchTable(String),
    ClearTable,
    DeleteTable(String),
    ListTables,
    ShowUsers { json: bool },
    GetUser(String),
    AddUser(Entry),
    UpdateUser { username: String, entry: Entry },
    DeleteUser(String),
    ImportCsv(PathBuf),
    ExportXml(Option<PathBuf>),
    Help(Option<String>),
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Notice,
}

impl Status {
    fn symbol(self) -> char {
        match self {
            Status::Success => '+',
            Status::Failure => '-',
            Status::Notice => '!',
        }
    }
}

pub fn output_message<W: Write + ?Sized>(w: &mut W, status: Status, msg: &str) -> std::io::Result<()> {
    write!(w, "[{}] {}\n\n", status.symbol(), msg)
}

pub struct CommandHelp {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "add_user",
        description: "add user to the current table. Fields must be separated by commas",
        usage: "add_user 'NAME,USERNAME,EMAIL'",
    },
    CommandHelp {
        name: "clear_table",
        description: "clear the current table of all entries",
        usage: "clear_table",
    },
    CommandHelp {
        name: "create_table",
        description: "creates new table and sets it to the current table",
        usage: "create_table 'TABLE_NAME'",
    },
    CommandHelp {
        name: "delete_table",
        description: "delete a table and all of its entries",
        usage: "delete_table 'TABLE_NAME'",
    },
    CommandHelp {
        name: "delete_user",
        description: "delete a single user from the current table",
        usage: "delete_user 'USERNAME'",
    },
    CommandHelp {
        name: "exit",
        description: "exits the program",
        usage: "exit",
    },
    CommandHelp {
        name: "export_xml",
        description: "export the current table as an address book",
        usage: "export_xml ['PATH_TO_FILE']",
    },
    CommandHelp {
        name: "get_user",
        description: "show a single user from the current table",
        usage: "get_user 'USERNAME'",
    },
    CommandHelp {
        name: "help",
        description: "show the commands or the usage of one command",
        usage: "help ['COMMAND']",
    },
    CommandHelp {
        name: "import_csv",
        description: "import users from csv file into current table",
        usage: "import_csv 'PATH_TO_FILE'",
    },
    CommandHelp {
        name: "list_tables",
        description: "list all tables",
        usage: "list_tables",
    },
    CommandHelp {
        name: "show_users",
        description: "show all the users in the current table",
        usage: "show_users",
    },
    CommandHelp {
        name: "switch_table",
        description: "switch the current table",
        usage: "switch_table 'TABLE_NAME'",
    },
    CommandHelp {
        name: "update_user",
        description: "replace the fields of a user in the current table",
        usage: "update_user 'USERNAME' 'NAME,USERNAME,EMAIL'",
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS.iter().find(|c| c.name == name)
}

fn help<W: Write + ?Sized>(w: &mut W, topic: Option<&str>) -> Result<()> {
    if let Some(command) = topic.and_then(find_command) {
        write!(w, "\n{}\nusage: {}\n\n", command.description, command.usage)?;
        return Ok(());
    }

    writeln!(w, "\nCommands:")?;
    for c in COMMANDS {
        writeln!(w, "     {:<15} : {}", c.name, c.description)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Runs one action against the session. Domain failures come back as
/// errors; the caller decides whether to report them and carry on.
pub fn execute<W: Write + ?Sized>(session: &mut Session, w: &mut W, action: &Action) -> Result<Flow> {
    match action {
        Action::CreateTable(name) => table::create(session, w, name)?,
        Action::SwitchTable(name) => table::switch(session, w, name)?,
        Action::ClearTable => table::clear(session, w)?,
        Action::DeleteTable(name) => table::delete(session, w, name)?,
        Action::ListTables => table::list(session, w)?,
        Action::ShowUsers { json } => user::show_all(session, w, *json)?,
        Action::GetUser(username) => user::show_one(session, w, username)?,
        Action::AddUser(entry) => user::add(session, w, entry)?,
        Action::UpdateUser { username, entry } => user::update(session, w, username, entry)?,
        Action::DeleteUser(username) => user::delete(session, w, username)?,
        Action::ImportCsv(path) => user::import_csv(session, w, path)?,
        Action::ExportXml(path) => user::export_xml(session, w, path.as_deref())?,
        Action::Help(topic) => help(w, topic.as_deref())?,
        Action::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

impl Command {
    /// The shell has no one-shot action; every other subcommand maps to one.
    pub fn action(&self) -> Option<Action> {
        let action = match self {
            Command::Shell => return None,
            Command::CreateTable { name } => Action::CreateTable(name.clone()),
            Command::ClearTable => Action::ClearTable,
            Command::DeleteTable { name } => Action::DeleteTable(name.clone()),
            Command::ListTables => Action::ListTables,
            Command::ShowUsers { json } => Action::ShowUsers { json: *json },
            Command::GetUser { username } => Action::GetUser(username.clone()),
            Command::AddUser {
                name,
                username,
                email,
            } => Action::AddUser(Entry::new(name, username, email)),
            Command::UpdateUser {
                username,
                name,
                new_username,
                email,
            } => Action::UpdateUser {
                username: username.clone(),
                entry: Entry::new(name, new_username, email),
            },
            Command::DeleteUser { username } => Action::DeleteUser(username.clone()),
            Command::ImportCsv { path } => Action::ImportCsv(path.clone()),
            Command::ExportXml { path } => Action::ExportXml(path.clone()),
        };
        Some(action)
    }

    pub fn run<W: Write + ?Sized>(&self, session: &mut Session, w: &mut W) -> Result<()> {
        if let Some(action) = self.action() {
            execute(session, w, &action)?;
        }
        Ok(())
    }
}
