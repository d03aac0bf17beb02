mod command;
mod error;
mod render;
mod session;

use calc_compute::{Ctxt, TrigMode};
use calc_history::{backend::Cas, Calculator, CalculatorOptions, Computed, Event};
use command::{Command, HELP};
use error::Error;
use rustyline::{error::ReadlineError, DefaultEditor};
use session::Session;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: calc-repl [--degrees] [--no-implicit] [--session <path>]";

/// Command-line options.
#[derive(Debug, Default)]
struct Args {
    degrees: bool,
    no_implicit: bool,
    session: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--degrees" => parsed.degrees = true,
                "--no-implicit" => parsed.no_implicit = true,
                "--session" => {
                    let path = args.next().ok_or("`--session` needs a path")?;
                    parsed.session = Some(path.into());
                },
                other => return Err(format!("unknown argument `{}`", other)),
            }
        }
        Ok(parsed)
    }
}

/// Whether the REPL should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Turns the errors of a computed value into an [`Error`], if there are any.
fn check(calc: &Calculator<Cas>, source: &str, value: &Computed<calc_compute::Value>) -> Result<(), Error> {
    let errors = calc.errors(value);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Diagnostics { source: source.to_string(), errors: errors.to_vec() })
    }
}

fn print_entry(calc: &Calculator<Cas>, id: &str) {
    if let Some(node) = calc.tree().get(id) {
        println!("{}", render::describe(calc, node));
    }
}

/// Runs a single command against the calculator.
fn run(calc: &mut Calculator<Cas>, command: Command<'_>) -> Result<Flow, Error> {
    match command {
        Command::Save("") => (),
        Command::Save(expr) => {
            let saved = calc.save_new_expression(expr)?;
            match saved.node {
                Some(id) => println!("{} = {}", id, calc.format(&saved.evaluation.value)),
                None => check(calc, &saved.evaluation.equation, &saved.evaluation.value)?,
            }
        },
        Command::Eval(expr) => {
            let evaluation = calc.evaluate_expression(expr);
            check(calc, &evaluation.equation, &evaluation.value)?;
            println!("{}", calc.format(&evaluation.value));
        },
        Command::Edit { id, expr } => {
            let value = calc.edit_node(id, expr)?;
            let equation = calc.tree().get(id).map(|node| node.equation().to_string()).unwrap_or_default();
            check(calc, &equation, &value)?;
            print_entry(calc, id);
        },
        Command::Alias { id, name } => {
            calc.set_alias(id, name)?;
            print_entry(calc, id);
        },
        Command::Note { id, text } => {
            calc.tree_mut().set_note(id, text)?;
            print_entry(calc, id);
        },
        Command::Collapse(id) => {
            let collapsed = calc.tree_mut().toggle_collapse(id)?;
            println!("{} {}", id, if collapsed { "collapsed" } else { "expanded" });
        },
        Command::Delete(id) => {
            let before = calc.tree().len();
            if !calc.tree_mut().delete_node(id) {
                return Err(calc_history::TreeError::NodeNotFound(id.into()).into());
            }
            println!("deleted {} entries", before - calc.tree().len());
        },
        Command::Refresh(id) => {
            calc.refresh(id)?;
            print_entry(calc, id);
        },
        Command::Tree => print!("{}", render::render_tree(calc)),
        Command::Clear => calc.tree_mut().clear(),
        Command::SaveTo(path) => session::save_to(calc, Path::new(path))?,
        Command::Load(path) => {
            session::load_from(calc, Path::new(path))?;
            println!("loaded {} entries", calc.tree().len());
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Parses and runs a line of input, reporting any error, and saves the session afterwards if the
/// history may have changed.
fn process(calc: &mut Calculator<Cas>, session: &Session, line: &str) -> Flow {
    let command = match command::parse(line) {
        Ok(command) => command,
        Err(err) => {
            Error::from(err).report_to_stderr();
            return Flow::Continue;
        },
    };

    let mutates = command.mutates();
    let flow = run(calc, command).unwrap_or_else(|err| {
        err.report_to_stderr();
        Flow::Continue
    });

    if mutates {
        if let Err(err) = session.flush(calc) {
            err.report_to_stderr();
        }
    }
    flow
}

fn main() -> ExitCode {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            return ExitCode::from(2);
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let trig_mode = if args.degrees { TrigMode::Degrees } else { TrigMode::Radians };
    let options = CalculatorOptions { implicit_dependencies: !args.no_implicit };
    let mut calc = Calculator::new(Cas::new(Ctxt::with_trig_mode(trig_mode)), options);

    let mut session = Session::attach(&mut calc, args.session.clone());
    match session.restore(&mut calc) {
        Ok(true) => println!("restored {} entries", calc.tree().len()),
        Ok(false) => (),
        Err(err) => {
            err.report_to_stderr();
            if let Some(path) = &args.session {
                eprintln!("{} was left untouched; changes will not be saved automatically", path.display());
            }
        },
    }

    calc.subscribe(|event| {
        if let Event::ImplicitDependencyFormed { node, literal } = event {
            println!("({} refers to {})", literal, node);
        }
    });

    if !io::stdin().is_terminal() {
        // one command per line
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    eprintln!("error: {}", err);
                    return ExitCode::FAILURE;
                },
            };
            if process(&mut calc, &session, &line) == Flow::Quit {
                break;
            }
        }
        return ExitCode::SUCCESS;
    }

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            Error::from(err).report_to_stderr();
            return ExitCode::FAILURE;
        },
    };

    fn process_line(
        rl: &mut DefaultEditor,
        calc: &mut Calculator<Cas>,
        session: &Session,
    ) -> Result<Flow, ReadlineError> {
        let input = rl.readline("> ")?;
        if input.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        rl.add_history_entry(&input)?;
        Ok(process(calc, session, &input))
    }

    loop {
        match process_line(&mut rl, &mut calc, &session) {
            Ok(Flow::Continue) => (),
            Ok(Flow::Quit) => break,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            },
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn args(items: &[&str]) -> Result<Args, String> {
        Args::parse(items.iter().map(|item| item.to_string()))
    }

    #[test]
    fn flags() {
        let parsed = args(&["--degrees", "--session", "history.json"]).unwrap();
        assert!(parsed.degrees);
        assert!(!parsed.no_implicit);
        assert_eq!(parsed.session, Some(PathBuf::from("history.json")));
    }

    #[test]
    fn bad_flags() {
        assert_eq!(args(&["--session"]).unwrap_err(), "`--session` needs a path");
        assert_eq!(args(&["-x"]).unwrap_err(), "unknown argument `-x`");
    }

    #[test]
    fn commands() {
        let mut calc = Calculator::<Cas>::default();
        assert_eq!(run(&mut calc, Command::Save("4")).unwrap(), Flow::Continue);
        run(&mut calc, Command::Save("$a0 / 2")).unwrap();
        run(&mut calc, Command::Edit { id: "a0", expr: "10" }).unwrap();
        assert_eq!(
            calc.tree().get("a1").and_then(|node| node.value()).map(|value| calc.format(value)),
            Some("5".to_string()),
        );

        assert!(matches!(run(&mut calc, Command::Save("1 +")), Err(Error::Diagnostics { .. })));
        assert!(matches!(run(&mut calc, Command::Delete("z9")), Err(Error::Tree(_))));
        run(&mut calc, Command::Delete("a0")).unwrap();
        assert!(calc.tree().is_empty());
        assert_eq!(run(&mut calc, Command::Quit).unwrap(), Flow::Quit);
    }
}
