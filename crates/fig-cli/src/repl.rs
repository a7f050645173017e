//! Interactive read-eval-print loop
//!
//! Each line is an expression evaluated against the globals. Lines starting
//! with `:` are commands.

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use fig::{globals, parse, Scope, Settings, Value};

const HELP: &str = "\
:help           show this message
:tree <expr>    print the canonical tree
:let name expr  bind a name for later lines
:quit           exit";

/// What one input line asks for.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Empty,
    Quit,
    Help,
    Tree(&'a str),
    Let(&'a str, &'a str),
    Eval(&'a str),
    Unknown(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return if line.is_empty() {
            Line::Empty
        } else {
            Line::Eval(line)
        };
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    match name {
        "q" | "quit" => Line::Quit,
        "h" | "help" => Line::Help,
        "tree" => Line::Tree(rest),
        "let" => match rest.split_once(' ') {
            Some((name, expr)) => Line::Let(name, expr.trim()),
            None => Line::Unknown(line),
        },
        _ => Line::Unknown(line),
    }
}

/// Run the loop until `:quit` or end of input.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().context("starting line editor")?;
    let mut scope = globals().clone();
    println!("fig {} (:help for commands)", fig::VERSION);

    loop {
        let line = match editor.readline("fig> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("reading input"),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }

        match classify(&line) {
            Line::Empty => {}
            Line::Quit => break,
            Line::Help => println!("{}", HELP),
            Line::Tree(source) => match parse(source) {
                Ok(parsed) => {
                    println!("{}", parsed.expr.to_tree_string());
                    for error in &parsed.errors {
                        println!("error: {}", error);
                    }
                }
                Err(fatal) => println!("error: {}", fatal),
            },
            Line::Let(name, source) => {
                if let Some(value) = evaluate(settings, source, &scope) {
                    match Scope::with_values(&scope, [(name, value)]) {
                        Ok(next) => scope = next,
                        Err(dup) => println!("error: {}", dup),
                    }
                }
            }
            Line::Eval(source) => {
                if let Some(value) = evaluate(settings, source, &scope) {
                    println!("{}", value);
                }
            }
            Line::Unknown(line) => println!("unknown command {:?}, try :help", line),
        }
    }
    Ok(())
}

/// Evaluate one line, printing failures.
fn evaluate(settings: &Settings, source: &str, scope: &Scope) -> Option<Value> {
    match fig::eval_source(&settings.context(), source, scope) {
        Ok(value) => Some(value),
        Err(err) => {
            println!("error: {}", err);
            None
        }
    }
}
