use std::fmt;

/// A line of input to the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Save an expression as a new entry.
    Save(&'a str),

    /// Evaluate an expression without saving it.
    Eval(&'a str),
    Edit { id: &'a str, expr: &'a str },
    Alias { id: &'a str, name: Option<&'a str> },
    Note { id: &'a str, text: Option<&'a str> },
    Collapse(&'a str),
    Delete(&'a str),
    Refresh(&'a str),
    Tree,
    Clear,
    SaveTo(&'a str),
    Load(&'a str),
    Help,
    Quit,
}

impl Command<'_> {
    /// Returns true if the command may change the history.
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::Eval(_) | Self::Tree | Self::SaveTo(_) | Self::Help | Self::Quit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument { command: &'static str, argument: &'static str },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown command `:{}` (try `:help`)", name),
            Self::MissingArgument { command, argument } => {
                write!(f, "`:{}` needs {}", command, argument)
            },
        }
    }
}

/// Splits off the first whitespace-separated word of `input`.
fn split_word(input: &str) -> (&str, Option<&str>) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, Some(rest.trim()).filter(|rest| !rest.is_empty())),
        None => (input, None),
    }
}

fn required<'a>(
    value: Option<&'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    value.ok_or(CommandError::MissingArgument { command, argument })
}

/// Parses a line of input. Lines that do not start with `:` are expressions to save.
pub fn parse(line: &str) -> Result<Command<'_>, CommandError> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Save(line));
    };

    let (name, rest) = split_word(command);
    let command = match name {
        "eval" | "e" => Command::Eval(required(rest, "eval", "an expression")?),
        "edit" => {
            let (id, expr) = split_word(required(rest, "edit", "a node and an expression")?);
            Command::Edit { id, expr: required(expr, "edit", "an expression")? }
        },
        "alias" => {
            let (id, name) = split_word(required(rest, "alias", "a node")?);
            Command::Alias { id, name }
        },
        "note" => {
            let (id, text) = split_word(required(rest, "note", "a node")?);
            Command::Note { id, text }
        },
        "collapse" => Command::Collapse(required(rest, "collapse", "a node")?),
        "delete" | "rm" => Command::Delete(required(rest, "delete", "a node")?),
        "refresh" => Command::Refresh(required(rest, "refresh", "a node")?),
        "tree" | "ls" => Command::Tree,
        "clear" => Command::Clear,
        "save" => Command::SaveTo(required(rest, "save", "a path")?),
        "load" => Command::Load(required(rest, "load", "a path")?),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

pub const HELP: &str = "\
<expr>                 save an expression; refer to earlier entries with $id, $alias or ans
:eval <expr>           evaluate an expression without saving it
:edit <id> <expr>      replace the expression of an entry and update its dependents
:alias <id> [name]     set or remove the alias of an entry
:note <id> [text]      set or remove the note of an entry
:collapse <id>         hide or show the dependents of an entry in :tree
:delete <id>           delete an entry and everything that depends on it
:refresh <id>          re-evaluate an entry and its dependents
:tree                  show the history
:clear                 delete every entry
:save <path>           save the history to a file
:load <path>           load the history from a file
:help                  show this message
:quit                  exit";
