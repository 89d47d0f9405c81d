//! Line-oriented interactive shell over a `Session`.
//!
//! A terminal gets the line editor in [`editor`]; piped input goes through
//! [`run`]. Both feed lines to the same dispatcher.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::commands::{self, find_command, output_message, Action, Flow, Session, Status};
use crate::entry::Entry;

mod editor;

pub use editor::{run_interactive, CommandCompleter};

fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '"' | '\'' | '`')).collect()
}

/// Splits a line into a command and its (unquoted) parameter.
pub fn parse_args(line: &str) -> (String, String) {
    let mut fields = line.split_whitespace();
    let Some(command) = fields.next() else {
        return (String::new(), String::new());
    };
    let param = fields.collect::<Vec<_>>().join(" ");
    (command.to_string(), strip_quotes(&param))
}

fn parse_entry(fields: &str) -> Result<Entry> {
    let parts: Vec<&str> = fields.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [name, username, email] => Ok(Entry::new(*name, *username, *email)),
        _ => bail!("invalid number of fields"),
    }
}

fn required(command: &str, param: &str) -> Result<String> {
    if param.is_empty() {
        let usage = find_command(command).map_or(command, |c| c.usage);
        bail!("missing parameter, usage: {usage}");
    }
    Ok(param.to_string())
}

/// Turns a shell line into an action. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>> {
    let (command, param) = parse_args(line);
    let action = match command.as_str() {
        "" => return Ok(None),
        "create_table" => Action::CreateTable(required(&command, &param)?),
        "switch_table" => Action::SwitchTable(required(&command, &param)?),
        "clear_table" => Action::ClearTable,
        "delete_table" => Action::DeleteTable(required(&command, &param)?),
        "list_tables" => Action::ListTables,
        "show_users" => Action::ShowUsers {
            json: param == "--json",
        },
        "get_user" => Action::GetUser(required(&command, &param)?),
        "add_user" => Action::AddUser(parse_entry(&required(&command, &param)?)?),
        "update_user" => {
            let param = required(&command, &param)?;
            let Some((username, fields)) = param.split_once(' ') else {
                bail!("invalid number of fields");
            };
            Action::UpdateUser {
                username: username.to_string(),
                entry: parse_entry(fields)?,
            }
        }
        "delete_user" => Action::DeleteUser(required(&command, &param)?),
        "import_csv" => Action::ImportCsv(PathBuf::from(required(&command, &param)?)),
        "export_xml" => Action::ExportXml((!param.is_empty()).then(|| PathBuf::from(&param))),
        "help" => Action::Help((!param.is_empty()).then_some(param)),
        "exit" | "quit" => Action::Exit,
        other => bail!("unknown command `{other}`, type `help` to list commands"),
    };
    Ok(Some(action))
}

fn prompt(session: &Session) -> String {
    format!("{}> ", session.repo.current_table())
}

/// Runs one shell line. A failed command is reported on `w` and the shell
/// carries on; only write errors come back as `Err`.
fn dispatch<W: Write + ?Sized>(session: &mut Session, w: &mut W, line: &str) -> io::Result<Flow> {
    log::debug!("shell input: {line}");

    let outcome = parse_line(line).and_then(|action| match action {
        Some(action) => commands::execute(session, w, &action),
        None => Ok(Flow::Continue),
    });

    match outcome {
        Ok(flow) => Ok(flow),
        Err(err) => {
            output_message(w, Status::Failure, &err.to_string())?;
            Ok(Flow::Continue)
        }
    }
}

/// Reads commands from `input` until `exit` or end of input.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, w: &mut W) -> Result<()> {
    output_message(w, Status::Notice, "type `help` to list commands")?;
    write!(w, "{}", prompt(session))?;
    w.flush()?;

    for line in input.lines() {
        if dispatch(session, w, &line?)? == Flow::Exit {
            return Ok(());
        }
        write!(w, "{}", prompt(session))?;
        w.flush()?;
    }

    writeln!(w)?;
    Ok(())
}
