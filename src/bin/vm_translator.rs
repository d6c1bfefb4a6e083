//! VM to Hack assembly translator CLI.
//!
//! Translates each `.vm` input independently into a `.asm` file next to it.
//!
//! # Usage
//! ```text
//! vm_translator <input.vm>... [OPTIONS]
//! ```
//!
//! # Options
//! - `-o, --output <file>`: Output file path (single input only)
//! - `-u, --unit <name>`: Unit name for static symbols (single input only)
//! - `--no-comments`: Omit the per-instruction source comments
//! - `--stdout`: Write assembly to stdout instead of files
//!
//! # Examples
//! ```text
//! vm_translator Main.vm
//! vm_translator Main.vm -o build/Main.asm
//! vm_translator Main.vm Sys.vm --no-comments
//! ```

use hackvm::translator::{Translation, output_path_for, translate_file};
use hackvm::utils::log;
use hackvm::{error, info};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

struct Options {
    inputs: Vec<String>,
    output: Option<String>,
    unit: Option<String>,
    annotate: bool,
    stdout: bool,
}

fn main() {
    log::init_from_env();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let options = parse_args(&args);

    if options.inputs.len() > 1 && (options.output.is_some() || options.unit.is_some()) {
        error!("--output and --unit require a single input file");
        process::exit(1);
    }

    let mut failed = false;
    for input in &options.inputs {
        if !translate_one(input, &options) {
            failed = true;
        }
    }
    if failed {
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        inputs: Vec::new(),
        output: None,
        unit: None,
        annotate: true,
        stdout: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--output" | "-o" | "--unit" | "-u") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                if k == "--output" || k == "-o" {
                    options.output = Some(args[i].clone());
                } else {
                    options.unit = Some(args[i].clone());
                }
                i += 1;
            }
            "--no-comments" => {
                options.annotate = false;
                i += 1;
            }
            "--stdout" => {
                options.stdout = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
            input => {
                options.inputs.push(input.to_string());
                i += 1;
            }
        }
    }

    if options.inputs.is_empty() {
        error!("No input file given\n");
        print_usage(&args[0]);
        process::exit(1);
    }
    options
}

/// Translates a single input. Reports failures and returns false on error.
fn translate_one(input: &str, options: &Options) -> bool {
    let input_path = Path::new(input);
    if !input_path.exists() {
        error!("Input file does not exist: {}", input);
        return false;
    }

    let Some(default_output) = output_path_for(input_path) else {
        error!("Input file must have a .vm extension: {}", input);
        return false;
    };
    let output_path = options
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or(default_output);

    let unit = options.unit.as_deref();
    let translation = match translate_file(input_path, unit, options.annotate) {
        Ok(t) => t,
        Err(_) => {
            // the diagnostic has already been written
            error!("Translation failed: {}", input);
            return false;
        }
    };

    if options.stdout {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(translation.assembly.as_bytes()) {
            error!("Failed to write to stdout: {}", e);
            return false;
        }
        return true;
    }

    write_output(input, &output_path, &translation)
}

fn write_output(input: &str, output_path: &Path, translation: &Translation) -> bool {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        error!("Output directory does not exist: {}", parent.display());
        return false;
    }

    if let Err(e) = fs::write(output_path, &translation.assembly) {
        error!("Failed to write output file: {}", e);
        return false;
    }

    info!(
        "Translated {} -> {} ({} instructions)",
        input,
        output_path.display(),
        translation.instructions
    );
    true
}

const USAGE: &str = "\
VM Translator

USAGE:
    {program} <input.vm>... [OPTIONS]

ARGS:
    <input.vm>    VM source file(s) to translate, each as its own unit

OPTIONS:
    -o, --output <file>    Output file path (defaults to <input>.asm; single input only)
    -u, --unit <name>      Unit name for static symbols (defaults to the file stem)
        --no-comments      Do not prefix blocks with the source instruction
        --stdout           Write assembly to stdout instead of files
    -h, --help             Print this help message

ENVIRONMENT:
    HACKVM_LOG             debug | info | warn | error | off (default info)
    HACKVM_LOG_TIMESTAMP   set to 0 to hide log timestamps

EXAMPLES:
    # Translate to Main.asm
    {program} Main.vm

    # Translate with explicit output
    {program} Main.vm -o build/Main.asm

    # Translate several units without comments
    {program} Main.vm Sys.vm --no-comments
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
