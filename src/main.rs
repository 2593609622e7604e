use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use tusk::{evaluate, parse, tokenize};

/// tusk is a tree-walking interpreter for the Tusk scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the token stream instead of evaluating.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed tree instead of evaluating.
    #[arg(long)]
    ast: bool,

    /// The script file to run.
    file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Ok(source) = fs::read_to_string(&args.file) else {
        eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                  args.file.display());
        return ExitCode::from(1);
    };

    if args.tokens {
        let (tokens, diags) = tokenize(&source);
        for d in &diags {
            eprintln!("{d}");
        }
        for token in &tokens {
            println!("{}:{}  {}", token.span.line, token.span.column, token.lexeme);
        }
        return ExitCode::SUCCESS;
    }

    if args.ast {
        let (program, lex_diags, parse_diags) = parse(&source);
        for d in &lex_diags {
            eprintln!("{d}");
        }
        for d in &parse_diags {
            eprintln!("{d}");
        }
        println!("{program:#?}");
        return ExitCode::SUCCESS;
    }

    u8::try_from(evaluate(&source)).map_or(ExitCode::FAILURE, ExitCode::from)
}
