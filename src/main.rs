use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::Lox;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints every statement in prefix form
    Parse { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Static errors (scan, parse, resolve).
const EXIT_DATA_ERR: u8 = 65;

/// Runtime errors.
const EXIT_SOFTWARE: u8 = 70;

fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) -> u8 {
    for e in errors {
        debug!("Reporting error on line {:?}: {:?}", e.line(), e);
        eprintln!("{}", e);
    }

    if errors.iter().any(LoxError::is_runtime) {
        EXIT_SOFTWARE
    } else {
        EXIT_DATA_ERR
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<u8> {
    let source = read_file(filename)?;
    let (tokens, errors) = rox::scan(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if errors.is_empty() {
        Ok(0)
    } else {
        Ok(report(&errors))
    }
}

fn parse(filename: &Path) -> Result<u8> {
    let source = read_file(filename)?;
    let (tokens, mut errors) = rox::scan(&source);
    let (statements, parse_errors) = rox::parse(&tokens);
    errors.extend(parse_errors);

    for stmt in &statements {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    if errors.is_empty() {
        Ok(0)
    } else {
        Ok(report(&errors))
    }
}

fn run(filename: &Path) -> Result<u8> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    match lox.run(&source) {
        Ok(()) => {
            info!("Program executed successfully");
            Ok(0)
        }
        Err(errors) => Ok(report(&errors)),
    }
}

fn repl() -> Result<u8> {
    let mut lox = Lox::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim_end();
        if line.is_empty() || line == "q" {
            break;
        }

        if let Err(errors) = lox.run(line) {
            report(&errors);
        }
    }

    Ok(0)
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Run { filename } => run(filename)?,
        Commands::Repl => repl()?,
    };

    Ok(ExitCode::from(code))
}
