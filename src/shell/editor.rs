use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, CompletionType, ConditionalEventHandler, Config, EditMode, Editor, Event, EventContext,
    EventHandler, Helper, KeyEvent, RepeatCount,
};

use super::{dispatch, prompt};
use crate::commands::{output_message, Flow, Session, Status, COMMANDS};

/// Commands whose parameter is a table name.
const TABLE_COMMANDS: [&str; 2] = ["switch_table", "delete_table"];

/// Tab completion for command names, `help` topics and table names.
#[derive(Debug, Default)]
pub struct CommandCompleter {
    tables: Vec<String>,
}

impl CommandCompleter {
    pub fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = tables;
    }

    /// Start of the word under the cursor and the names that extend it.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        let start = head.rfind([' ', '\t']).map_or(0, |i| i + 1);
        let word = &head[start..];
        let before: Vec<&str> = head[..start].split_whitespace().collect();

        let names: Vec<&str> = match before.as_slice() {
            [] | ["help"] => COMMANDS.iter().map(|c| c.name).collect(),
            [command] if TABLE_COMMANDS.contains(command) => {
                self.tables.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        };

        let matches = names
            .into_iter()
            .filter(|name| name.starts_with(word))
            .map(str::to_string)
            .collect();
        (start, matches)
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(line, pos);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

/// Ctrl-C handler that remembers whether the line being edited was empty.
struct InterruptTracker {
    empty_line: Arc<AtomicBool>,
}

impl ConditionalEventHandler for InterruptTracker {
    fn handle(&self, _evt: &Event, _n: RepeatCount, _positive: bool, ctx: &EventContext) -> Option<Cmd> {
        self.empty_line.store(ctx.line().is_empty(), Ordering::Relaxed);
        Some(Cmd::Interrupt)
    }
}

/// Ctrl-C on an empty prompt leaves the shell; on a partly typed line it
/// only drops that line.
fn after_interrupt(line_was_empty: bool) -> Flow {
    if line_was_empty {
        Flow::Exit
    } else {
        Flow::Continue
    }
}

/// Line-edited shell on the terminal: history (Ctrl-R searches it), tab
/// completion and Ctrl-C handling.
pub fn run_interactive(session: &mut Session) -> Result<()> {
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .auto_add_history(true)
        .build();

    let mut rl = Editor::<CommandCompleter, DefaultHistory>::with_config(config)?;
    rl.set_helper(Some(CommandCompleter::default()));

    let empty_line = Arc::new(AtomicBool::new(false));
    rl.bind_sequence(
        KeyEvent::ctrl('C'),
        EventHandler::Conditional(Box::new(InterruptTracker {
            empty_line: Arc::clone(&empty_line),
        })),
    );

    let mut out = io::stdout();
    output_message(&mut out, Status::Notice, "type `help` to list commands")?;

    loop {
        if let Some(helper) = rl.helper_mut() {
            match session.repo.list_tables() {
                Ok(tables) => helper.set_tables(tables),
                Err(err) => log::debug!("table completion unavailable: {err}"),
            }
        }

        let flow = match rl.readline(&prompt(session)) {
            Ok(line) => dispatch(session, &mut out, &line)?,
            Err(ReadlineError::Interrupted) => after_interrupt(empty_line.swap(false, Ordering::Relaxed)),
            Err(ReadlineError::Eof) => Flow::Exit,
            Err(err) => return Err(err.into()),
        };

        if flow == Flow::Exit {
            return Ok(());
        }
    }
}
