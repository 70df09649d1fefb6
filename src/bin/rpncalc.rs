// Copyright 2025 rpncalc Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! rpncalc CLI - evaluate expressions, run assignments, filter delimited rows
//!

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, DefaultEditor, EditMode, Editor};
use tracing_subscriber::EnvFilter;

use rpncalc::common::version::{version_info, VERSION};
use rpncalc::{Engine, EngineConfig};

const HISTORY_FILE: &str = ".rpncalc_history";

/// rpncalc expression engine CLI
#[derive(Parser, Debug)]
#[command(name = "rpncalc")]
#[command(version = VERSION)]
#[command(about = "Infix expression compiler and stack VM with a row-filter language")]
#[command(
    long_about = "rpncalc compiles infix numeric expressions to postfix programs and runs them.\n\
Without a subcommand it starts an interactive session, or reads one statement\n\
per line when stdin is a pipe.\n\n\
ENGINE PARAMETERS (--params key=value&key2=value2):\n\
  program_capacity=UNITS   Program buffer size (default: 1000)\n\
  stack_capacity=N         Operand stack depth (default: 30)\n\
  symbol_buckets=N         Symbol hash buckets (default: 128)\n\
  literal_capacity=BYTES   Longest filter string literal (default: 1024)\n\
  nesting_limit=N          Deepest nesting of groups (default: 128)\n\
  auto_install=on|off      Create unknown variables as 0 (default: off)\n\n\
EXAMPLES:\n\
  rpncalc eval '2+3*4' 'sqrt(2)'\n\
  rpncalc eval --assign 'r=2' 'pi*r*r'\n\
  rpncalc filter '$2 ~ \"^[0-9]+$\"' data.csv\n\
  rpncalc filter --whitespace '$1 == \"GET\"' access.log"
)]
struct Args {
    /// Engine parameters
    #[arg(short = 'p', long = "params", value_name = "PARAMS", default_value = "")]
    params: String,

    /// Assignments run before anything else
    #[arg(short = 'a', long = "assign", value_name = "STMTS")]
    assign: Option<String>,

    /// Suppress banners
    #[arg(short = 'q', long = "quiet", default_value = "false")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate expressions and print one value per line
    Eval {
        /// Print the compiled program instead of its value
        #[arg(short = 'd', long = "disassemble", default_value = "false")]
        disassemble: bool,

        #[arg(required = true, value_name = "EXPR")]
        expressions: Vec<String>,
    },

    /// Print the lines of FILE (or stdin) whose fields match EXPR
    Filter {
        #[arg(value_name = "EXPR")]
        expression: String,

        /// Field delimiter
        #[arg(short = 'd', long = "delimiter", default_value = ",")]
        delimiter: char,

        /// Split fields on runs of whitespace instead of a delimiter
        #[arg(short = 'w', long = "whitespace", default_value = "false")]
        whitespace: bool,

        #[arg(value_name = "FILE")]
        file: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match EngineConfig::from_params(&args.params) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut engine = Engine::with_config(config);

    if let Some(ref stmts) = args.assign {
        if let Err(e) = engine.assign(stmts) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let result = match args.command {
        Some(Command::Eval {
            disassemble,
            expressions,
        }) => run_eval(&mut engine, &expressions, disassemble),
        Some(Command::Filter {
            expression,
            delimiter,
            whitespace,
            file,
        }) => run_filter(&engine, &expression, delimiter, whitespace, file.as_deref()),
        None if !io::stdin().is_terminal() => run_piped(&mut engine),
        None => Repl::new(engine, args.quiet).and_then(|mut repl| repl.run()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_eval(engine: &mut Engine, expressions: &[String], disassemble: bool) -> io::Result<()> {
    let mut failed = false;
    for expr in expressions {
        let outcome = if disassemble {
            engine.compile(expr).map(|_| engine.disassemble())
        } else {
            engine.evaluate(expr).map(|value| format!("{}\n", value))
        };
        match outcome {
            Ok(text) => print!("{}", text),
            Err(e) => {
                eprintln!("\x1b[1;31mError:\x1b[0m {}: {}", expr, e);
                failed = true;
            }
        }
    }
    if failed {
        return Err(io::Error::other("one or more expressions failed"));
    }
    Ok(())
}

fn run_filter(
    engine: &Engine,
    expression: &str,
    delimiter: char,
    whitespace: bool,
    file: Option<&str>,
) -> io::Result<()> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            io::Error::new(e.kind(), format!("Error opening file {}: {}", path, e))
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut filter = engine.row_filter(expression);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = if whitespace {
            line.split_whitespace().collect()
        } else {
            line.split(delimiter).collect()
        };

        match filter.try_match(&fields) {
            Ok(true) => writeln!(out, "{}", line)?,
            Ok(false) => {}
            // The expression is the same for every line; report once and stop
            Err(e) => return Err(io::Error::other(format!("invalid filter: {}", e))),
        }
    }
    Ok(())
}

fn run_piped(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Err(e) = run_statement(engine, line) {
            eprintln!("Error: {}", e);
        }
    }
    Ok(())
}

/// Run one line: an assignment list or an expression to print
fn run_statement(engine: &mut Engine, line: &str) -> rpncalc::Result<()> {
    if is_assignment(line) {
        for done in engine.assign(line)? {
            println!("{} = {}", engine.symbols().name(done.symbol), done.value);
        }
    } else {
        println!("{}", engine.evaluate(line)?);
    }
    Ok(())
}

/// A line is an assignment when it contains an `=` that is not part of
/// `==`, `!=`, `<=` or `>=`
fn is_assignment(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'='
            && bytes.get(i + 1) != Some(&b'=')
            && !matches!(i.checked_sub(1).map(|j| bytes[j]), Some(b'=' | b'!' | b'<' | b'>'))
    })
}

struct Repl {
    engine: Engine,
    quiet: bool,
    editor: Editor<(), DefaultHistory>,
}

impl Repl {
    fn new(engine: Engine, quiet: bool) -> io::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor =
            DefaultEditor::with_config(config).map_err(|e| io::Error::other(e.to_string()))?;

        if let Some(home) = dirs::home_dir() {
            let _ = editor.load_history(&home.join(HISTORY_FILE));
        }

        Ok(Self {
            engine,
            quiet,
            editor,
        })
    }

    fn run(&mut self) -> io::Result<()> {
        if !self.quiet {
            println!("{}", version_info());
            println!("Enter an expression or `name = expr`, ':help' for commands, ':quit' to exit.");
            println!();
        }

        loop {
            match self.editor.readline("\x1b[1;36m>\x1b[0m ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    match line {
                        ":quit" | ":q" | "exit" | "quit" => break,
                        ":help" | ":h" => print_help(),
                        ":program" | ":p" => print!("{}", self.engine.disassemble()),
                        ":vars" | ":v" => self.print_variables(),
                        _ => {
                            if let Err(e) = run_statement(&mut self.engine, line) {
                                eprintln!("\x1b[1;31mError:\x1b[0m {}", e);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                }
            }
        }

        if let Some(home) = dirs::home_dir() {
            let _ = self.editor.save_history(&home.join(HISTORY_FILE));
        }
        Ok(())
    }

    fn print_variables(&self) {
        let symbols = self.engine.symbols();
        if symbols.is_empty() {
            println!("(no variables)");
            return;
        }

        let mut names: Vec<_> = symbols.iter().map(|(_, s)| (s.name(), s.value())).collect();
        names.sort_by(|a, b| a.0.cmp(b.0));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new("name"), Cell::new("value")]);
        for (name, value) in names {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        println!("{}", table);
    }
}

fn print_help() {
    println!(
        "
  <expr>               Evaluate and print, e.g. 2 + 3 * sqrt(x)
  name = expr[; ...]   Assign one or more variables
  :program   :p        Show the last compiled program
  :vars      :v        List variables
  :help      :h        This help
  :quit      :q        Exit

  Operators  ?: || && | ^ & == != < > <= >= << >> + - * / % ! ~
  Functions  abs acos asin atan atan2 ceil cos cosh exp floor log log10
             max min pow round sin sinh sqrt tan tanh
  Constants  pi e nan
"
    );
}
