//! CLI tool to inspect, compile and run Corky programs.

use std::fs;
use std::process::ExitCode;

use corky_rs::{DEFAULT_MAX_SCOPE_DEPTH, Error, Language, Program, format_tokens, tokenize};

struct Options {
    command: String,
    language: Language,
    max_depth: usize,
    files: Vec<String>,
    program_args: Vec<String>,
}

fn usage() -> ExitCode {
    eprintln!("Usage: corky <command> [options] [files...] [-- args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens   Print the token stream");
    eprintln!("  tree     Print the syntax tree");
    eprintln!("  compile  Print the target program listing");
    eprintln!("  run      Run the program; args after -- are passed to it");
    eprintln!("  fmt      Re-serialize the source to stdout");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --unchecked      Generate without runtime checks");
    eprintln!("  --max-depth <N>  Scope depth guard (default {DEFAULT_MAX_SCOPE_DEPTH})");
    eprintln!();
    eprintln!("Set RUST_LOG=debug for pipeline logs.");
    ExitCode::from(2)
}

fn parse_args(args: &[String]) -> Option<Options> {
    let command = args.get(1)?.clone();
    let mut options = Options {
        command,
        language: Language::Checked,
        max_depth: DEFAULT_MAX_SCOPE_DEPTH,
        files: Vec::new(),
        program_args: Vec::new(),
    };

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--unchecked" => options.language = Language::Unchecked,
            "--max-depth" => options.max_depth = rest.next()?.parse().ok()?,
            "--" => {
                options.program_args = rest.cloned().collect();
                break;
            }
            _ => options.files.push(arg.clone()),
        }
    }
    Some(options)
}

fn process(options: &Options, content: &str) -> Result<String, Error> {
    match options.command.as_str() {
        "tokens" => Ok(tokenize(content)?
            .iter()
            .map(|token| format!("{}\t:{token}\n", token.line))
            .collect::<Vec<_>>()
            .concat()),
        "fmt" => Ok(format_tokens(&tokenize(content)?)),
        "tree" => {
            let program = Program::new(content)?;
            Ok(program
                .tree()
                .iter()
                .map(|node| format!("{:>4}  {node:?}\n", node.line()))
                .collect::<Vec<_>>()
                .concat())
        }
        "compile" => {
            let mut program = Program::new(content)?.with_max_scope_depth(options.max_depth);
            Ok(program.compile_language(options.language).to_string())
        }
        _ => {
            let mut program = Program::new(content)?.with_max_scope_depth(options.max_depth);
            let output = program.compile_language(options.language);
            match output.target() {
                Some(target) => Ok(target.run(&options.program_args)?),
                None => Ok(output.to_string()),
            }
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("Error: failed to install logger: {e}");
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let Some(options) = parse_args(&args) else {
        eprintln!("Error: --max-depth needs a number");
        return ExitCode::from(2);
    };

    if !matches!(
        options.command.as_str(),
        "tokens" | "tree" | "compile" | "run" | "fmt"
    ) {
        eprintln!("Unknown command: {}", options.command);
        return ExitCode::from(2);
    }

    if options.files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in &options.files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match process(&options, &content) {
            Ok(output) => print!("{output}"),
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
