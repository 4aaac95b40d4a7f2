use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

use interpreter::{run_source, InterpretError};

/// Scans, parses and evaluates Lox expressions.
#[derive(clap::Parser)]
struct Args {
    /// Source file, starts an interactive prompt if omitted
    file: Option<PathBuf>,

    /// Print the scanned tokens before doing anything else
    #[arg(long)]
    tokens: bool,

    /// Print the expression trees instead of evaluating them
    #[arg(long)]
    ast: bool,
}

fn run_file(path: PathBuf, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)?;
    match run(&source, args) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e @ InterpretError::CompileError(_)) => {
            eprintln!("{e}");
            Ok(ExitCode::from(65))
        }
        Err(e @ InterpretError::RuntimeError(_)) => {
            eprintln!("{e}");
            Ok(ExitCode::from(70))
        }
        Err(e @ InterpretError::Io(_)) => Err(e.into()),
    }
}

fn run_prompt(args: &Args) -> anyhow::Result<ExitCode> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(ExitCode::SUCCESS);
        }
        match run(&line, args) {
            Ok(()) => (),
            Err(InterpretError::Io(e)) => return Err(e.into()),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn run(source: &str, args: &Args) -> Result<(), InterpretError> {
    if args.tokens {
        let (tokens, _) = scanner::scan(source);
        for token in &tokens {
            println!("{token}");
        }
    }

    if args.ast {
        let (tokens, mut diagnostics) = scanner::scan(source);
        let (exprs, parse_diagnostics) = parser::parse_sequence(tokens);
        diagnostics.append(parse_diagnostics);
        if !diagnostics.is_empty() {
            return Err(InterpretError::CompileError(diagnostics));
        }
        for expr in &exprs {
            println!("{expr}");
        }
        return Ok(());
    }

    run_source(source, &mut stdout())
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("tokens: {}, ast: {}", args.tokens, args.ast);

    match &args.file {
        Some(file) => run_file(file.clone(), &args),
        None => run_prompt(&args),
    }
}
