// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for experimenting with namespace-scoped hash tables

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use humansize::{format_size, BINARY};
use nstable::{config::DEFAULT_BUCKET_COUNT, Config, Payload, SymbolTable, NOT_FOUND};
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};

    () => {{
        eprintln!("Program terminated unexpectedly");
        std::process::exit(1);
    }};
}

use tracing::{debug, info};

pub fn init_tracing(quiet: bool, verbose: u8) -> (bool, LevelFilter) {
    let is_verbose = !quiet && verbose > 0;

    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs through `log`)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let registry = Registry::default();

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("NSTABLE_LOG")
        .from_env_lossy()
        .add_directive(
            "rustyline=warn"
                .parse()
                .expect("Failed to parse rustyline directive"),
        );

    let subscriber = registry.with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        prev_hook(info); // daisy-chain to old panic hook
    }));

    (is_verbose, level_filter)
}

/// CLI tool for experimenting with namespace-scoped hash tables
#[derive(Parser, Debug)]
#[command(name = "nstable")]
#[command(about = "CLI tool for experimenting with namespace-scoped hash tables")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Number of buckets of the table (fixed for the whole session)
    #[arg(short, long, default_value_t = DEFAULT_BUCKET_COUNT, value_name = "COUNT")]
    buckets: usize,

    /// Command to run (if omitted, starts interactive shell)
    #[command(subcommand)]
    command: Option<ToolCommand>,
}

#[derive(Subcommand, Debug, Clone)]
enum ToolCommand {
    /// Hash a string with the diffusion hash
    Hash {
        /// The data to hash
        data: String,
        /// Seed to start from
        #[arg(short, long, default_value_t = 0)]
        seed: u32,
    },
    /// Show which bucket a key lands in
    Bucket {
        /// The key to place
        key: String,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

// Internal shell commands, include all external tool commands
#[derive(Parser, Debug)]
#[command(name = "")]
#[command(no_binary_name = true)]
#[command(disable_version_flag = true)]
#[command(help_template = "
{version}

Available Commands:

{subcommands}

Use `help COMMAND` or `COMMAND --help` for more details.

")]
struct ShellArgs {
    #[command(subcommand)]
    command: ShellCommand,
}

// Shell commands (including ones not available from CLI)
#[derive(Subcommand, Debug, Clone)]
enum ShellCommand {
    #[command(flatten)]
    ToolCmd(ToolCommand),

    /// Add a string value (shadows existing entries)
    Add {
        /// The key to add
        key: String,
        /// The value to store
        value: String,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Add an integer value (shadows existing entries)
    #[command(name = "addint")]
    AddInt {
        /// The key to add
        key: String,
        /// The integer to store
        value: u32,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Get the value for a key
    Get {
        /// The key to look up
        key: String,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Get the integer for a key (4294967295 if absent)
    #[command(name = "getint")]
    GetInt {
        /// The key to look up
        key: String,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Remove the newest entry for a key
    Del {
        /// The key to remove
        key: String,
        /// Namespace of the key
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// List all entries of a namespace (or the unscoped entries)
    #[command(visible_alias = "ls")]
    List {
        /// Namespace to list
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Count the number of entries
    Count,
    /// Show table statistics
    Info,
    /// Remove all entries
    Clean,
    /// Exit the current shell
    #[command(visible_alias = "quit")]
    Exit,
}

struct Session {
    table: RefCell<SymbolTable<String>>,
}

impl Session {
    fn open(bucket_count: usize) -> nstable::Result<Self> {
        let table = Config::new(bucket_count).create()?;

        Ok(Self {
            table: RefCell::new(table),
        })
    }
}

fn format_key(key: &[u8]) -> String {
    match std::str::from_utf8(key) {
        Ok(s) => s.to_string(),
        Err(_) => format!("{key:?}"),
    }
}

fn format_payload(payload: &Payload<String>) -> String {
    match payload {
        Payload::Value(s) => s.clone(),
        Payload::Uint32(n) => format!("{n} (int)"),
    }
}

fn handle_hash(data: &str, seed: u32) {
    println!("0x{:08x}", nstable::hash(seed, data.as_bytes()));
}

fn handle_bucket(session: &Session, key: &str, namespace: Option<&str>) {
    let table = session.table.borrow();
    println!("{}", table.bucket_index(key.as_bytes(), namespace));
}

fn handle_add(session: &Session, key: &str, value: String, namespace: Option<&str>) {
    match session
        .table
        .borrow_mut()
        .add(key, namespace, Payload::Value(value))
    {
        Ok(()) => println!("OK (add)"),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn handle_add_int(session: &Session, key: &str, value: u32, namespace: Option<&str>) {
    match session.table.borrow_mut().add_uint32(key, namespace, value) {
        Ok(()) => println!("OK (add)"),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn handle_get(session: &Session, key: &str, namespace: Option<&str>) {
    match session.table.borrow().lookup(key, namespace) {
        Some(payload) => println!("{}", format_payload(payload)),
        None => println!("(not found)"),
    }
}

fn handle_get_int(session: &Session, key: &str, namespace: Option<&str>) {
    let value = session.table.borrow().lookup_uint32(key, namespace);

    if value == NOT_FOUND {
        debug!("no integer stored under {key:?}");
    }
    println!("{value}");
}

fn handle_del(session: &Session, key: &str, namespace: Option<&str>) {
    match session.table.borrow_mut().remove(key, namespace) {
        Some(payload) => println!("OK (removed {})", format_payload(&payload)),
        None => println!("(not found)"),
    }
}

fn handle_list(session: &Session, namespace: Option<&str>) {
    let table = session.table.borrow();
    let mut count = 0;

    for (key, payload) in table.iter(namespace) {
        println!("{} = {}", format_key(key), format_payload(payload));
        count += 1;
    }

    println!("OK ({count} items)");
}

fn handle_count(session: &Session) {
    println!("{}", session.table.borrow().len());
}

fn print_info(session: &Session) {
    let table = session.table.borrow();
    let occupancy = table.occupancy();

    println!("Buckets: {}", table.bucket_count());
    println!("Entries: {}", table.len());
    println!("Used buckets: {}", occupancy.used_buckets);
    println!("Longest chain: {}", occupancy.longest_chain);
    println!("Memory: {}", format_size(table.heap_size(), BINARY));
}

fn handle_clean(session: &Session) {
    let mut table = session.table.borrow_mut();
    let count = table.len();
    table.clean();
    println!("OK (cleaned {count} entries)");
}

/// Result of executing a command
enum CommandResult {
    Continue,
    Exit,
}

/// Execute a parsed command
fn execute_command(session: &Session, cmd: ToolCommand) -> CommandResult {
    match cmd {
        ToolCommand::Hash { data, seed } => handle_hash(&data, seed),
        ToolCommand::Bucket { key, namespace } => {
            handle_bucket(session, &key, namespace.as_deref());
        }
    }
    CommandResult::Continue
}

/// Execute a shell-only command
fn execute_shell_command(session: &Session, cmd: ShellCommand) -> CommandResult {
    match cmd {
        ShellCommand::ToolCmd(tool_cmd) => return execute_command(session, tool_cmd),
        ShellCommand::Add {
            key,
            value,
            namespace,
        } => handle_add(session, &key, value, namespace.as_deref()),
        ShellCommand::AddInt {
            key,
            value,
            namespace,
        } => handle_add_int(session, &key, value, namespace.as_deref()),
        ShellCommand::Get { key, namespace } => handle_get(session, &key, namespace.as_deref()),
        ShellCommand::GetInt { key, namespace } => {
            handle_get_int(session, &key, namespace.as_deref());
        }
        ShellCommand::Del { key, namespace } => handle_del(session, &key, namespace.as_deref()),
        ShellCommand::List { namespace } => handle_list(session, namespace.as_deref()),
        ShellCommand::Count => handle_count(session),
        ShellCommand::Info => print_info(session),
        ShellCommand::Clean => handle_clean(session),
        ShellCommand::Exit => return CommandResult::Exit,
    }
    CommandResult::Continue
}

/// Parse and run a shell command line
fn run_shell_command(session: &Session, line: &str) -> CommandResult {
    let line = line.trim();
    if line.is_empty() {
        return CommandResult::Continue;
    }

    let tokens = match shlex::split(line) {
        Some(t) if !t.is_empty() => t,
        Some(_) => return CommandResult::Continue,
        None => {
            eprintln!("error: unclosed quote");
            return CommandResult::Continue;
        }
    };

    match ShellArgs::try_parse_from(&tokens) {
        Ok(args) => execute_shell_command(session, args.command),
        Err(e) => {
            // Print clap's error message
            eprintln!("{e}");
            CommandResult::Continue
        }
    }
}

fn run_shell(session: &Session) {
    if io::stdin().is_terminal() {
        run_shell_interactive(session);
    } else {
        run_shell_non_interactive(session);
    }
}

fn run_shell_interactive(session: &Session) {
    println!("Welcome to the nstable shell");
    println!("Type 'help' for available commands, 'exit' to quit.\n");

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error initializing line editor: {e}");
            return;
        }
    };

    loop {
        match rl.readline("nstable> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                if let CommandResult::Exit = run_shell_command(session, &line) {
                    break;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ignore Ctrl+C, just show a new prompt
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        }
    }
}

fn run_shell_non_interactive(session: &Session) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if stdout.flush().is_err() {
            die!("can't flush stdout");
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF
                break;
            }
            Ok(_) => {
                if let CommandResult::Exit = run_shell_command(session, &line) {
                    break;
                }
            }
            Err(e) => {
                die!("Error reading input: {}", e);
            }
        }
    }
}

fn main() {
    let args = ToolArgs::parse();
    let (verbose, level_filter) = init_tracing(args.quiet, args.verbose);

    let cmd = ToolArgs::command();

    info!(
        "starting {} ({} {}), log level: {level_filter}",
        cmd.get_name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let session = match Session::open(args.buckets) {
        Ok(s) => s,
        Err(e) => {
            let note = if verbose {
                ""
            } else {
                ". Note: Use -v (one or multiple times) for more information"
            };
            die!("Error creating table: {}{}", e, note);
        }
    };

    match args.command {
        Some(cmd) => {
            execute_command(&session, cmd);
        }
        None => run_shell(&session),
    }
}
