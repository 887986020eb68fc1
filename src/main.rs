//! py2cpp CLI - translate a Python-like subset to C++

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use py2cpp::diagnostics;

/// py2cpp - Python-subset to C++ translator
#[derive(Parser, Debug)]
#[command(name = "py2cpp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate a Python-like subset to C++", long_about = None)]
struct Cli {
    /// Input source file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output C++ file (default: <INPUT>.cpp in the current directory)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Check only (don't generate output)
    #[arg(short, long)]
    check: bool,

    /// Dump the token stream and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// Dump the parser state trace and exit
    #[arg(long)]
    trace: bool,

    /// Emit JSON diagnostics to stderr (on failure only)
    #[arg(long)]
    diag_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let source = std::fs::read_to_string(&cli.input)?;

    if cli.trace {
        let trace = match py2cpp::parse_trace(&source) {
            Ok(trace) => trace,
            Err(err) => return fail(&cli, &err),
        };
        println!("=== Parser state trace ===");
        for (i, (state, token)) in trace.iter().enumerate() {
            println!(
                "[{i:03}] {state:?} at {:?} '{}' (line {})",
                token.kind, token.lexeme, token.line
            );
        }
        return Ok(());
    }

    if cli.dump_tokens {
        let tokens = match py2cpp::lexer::tokenize(&source) {
            Ok(tokens) => tokens,
            Err(err) => return fail(&cli, &err),
        };
        println!("=== Tokens ===");
        for (i, token) in tokens.iter().enumerate() {
            println!(
                "[{i:03}] {:?} '{}' (line {})",
                token.kind, token.lexeme, token.line
            );
        }
        return Ok(());
    }

    let result = match py2cpp::translate(&source) {
        Ok(result) => result,
        Err(err) => return fail(&cli, &err),
    };

    if cli.dump_ast {
        println!("=== AST ===");
        println!("{:#?}", result.ast);
        return Ok(());
    }

    if cli.check {
        println!("✅ Translation successful!");
        return Ok(());
    }

    let output_path = cli.output.unwrap_or_else(|| {
        let mut p = cli.input.clone();
        p.set_extension("cpp");
        match p.file_name() {
            Some(filename) => PathBuf::from(filename),
            None => p,
        }
    });

    std::fs::write(&output_path, &result.target_code)?;
    println!("✅ Translated to: {output_path:?}");

    Ok(())
}

/// Print diagnostics for a failed run and exit non-zero.
fn fail(cli: &Cli, err: &py2cpp::TranslateError) -> Result<()> {
    let diags = diagnostics::from_error(err, Some(&cli.input));
    print!("{}", diags.to_text());
    if cli.diag_json {
        eprintln!("{}", diags.to_json());
    }
    std::process::exit(1);
}
