// ccfront: C front end driver

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use crossterm::tty::IsTty;

use ccfront::codegen::{RegisterAllocator, TripleList};
use ccfront::diagnostics::Diagnostics;
use ccfront::parser::{ParseOptions, Parser, TokenStream};
use ccfront::{printer, tokenize};

#[derive(ClapParser, Debug)]
#[command(version, about = "Tokenize, parse and inspect a C source file")]
struct Args {
    /// C source file
    file: PathBuf,

    /// Print the token stream
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree
    #[arg(long)]
    ast: bool,

    /// Explain each top-level declaration in English
    #[arg(long)]
    explain: bool,

    /// Print the global symbol table after parsing
    #[arg(long)]
    symbols: bool,

    /// Parse the file as a single expression and generate code for it
    #[arg(long)]
    expr: bool,

    /// Print three-address triples for the expression
    #[arg(long = "emit-triples", requires = "expr")]
    emit_triples: bool,

    /// Stop after this many errors
    #[arg(long = "max-errors", value_name = "N")]
    max_errors: Option<usize>,

    /// Treat warnings as errors
    #[arg(short = 'W', long = "warnings-as-errors")]
    warnings_as_errors: bool,

    /// Disable coloured diagnostics
    #[arg(long = "no-color")]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let source = fs::read_to_string(&args.file)?;
    let color = !args.no_color && io::stderr().is_tty();
    let options = ParseOptions {
        max_errors: args.max_errors,
        warnings_as_errors: args.warnings_as_errors,
    };

    let tokens = tokenize(&source);
    log::debug!("{}: {} token(s)", args.file.display(), tokens.len());
    if args.tokens {
        print_tokens(&tokens);
    }

    let failed = if args.expr {
        run_expression(&args, tokens, options, &source, color)
    } else {
        run_translation_unit(&args, tokens, options, &source, color)
    };

    if failed {
        process::exit(1);
    }
    Ok(())
}

fn run_translation_unit(
    args: &Args,
    tokens: TokenStream,
    options: ParseOptions,
    source: &str,
    color: bool,
) -> bool {
    let output = Parser::with_options(tokens, options).parse_translation_unit();
    report(&output.diagnostics, source, color);

    if output.has_errors() {
        return true;
    }

    if args.ast {
        print!("{}", printer::print_unit(&output.unit));
    }
    if args.explain {
        for line in printer::explain_unit(&output.unit) {
            println!("{}", line);
        }
    }
    if args.symbols {
        print!("{}", output.symbols.dump());
    }
    false
}

fn run_expression(
    args: &Args,
    tokens: TokenStream,
    options: ParseOptions,
    source: &str,
    color: bool,
) -> bool {
    let output = Parser::with_options(tokens, options).parse_expression_unit();
    report(&output.diagnostics, source, color);

    let expr = match output.expr {
        Some(expr) if !output.diagnostics.has_errors() => expr,
        _ => return true,
    };

    if args.ast {
        print!("{}", printer::print_expr(&expr));
    }

    let mut registers = RegisterAllocator::new();
    match registers.gen_expression(&expr) {
        Ok(reg) => {
            print!("{}", registers.listing());
            log::debug!("result in {}", reg);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            return true;
        }
    }

    if args.emit_triples {
        match TripleList::from_expression(&expr) {
            Ok(triples) => print!("{}", triples),
            Err(err) => {
                eprintln!("error: {}", err);
                return true;
            }
        }
    }
    false
}

fn print_tokens(tokens: &TokenStream) {
    for token in tokens.tokens() {
        println!("{:>4}:{:<4} {}", token.location.line, token.location.column, token.kind);
    }
}

fn report(diagnostics: &Diagnostics, source: &str, color: bool) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic.render(Some(source), color));
    }
    if diagnostics.limit_reached() {
        eprintln!("too many errors emitted, stopping now");
    }
    if !diagnostics.is_empty() {
        eprintln!(
            "{} error(s), {} warning(s) generated.",
            diagnostics.error_count(),
            diagnostics.warning_count()
        );
    }
}
