//! tritone-vectors - RTL test-vector generation for the Tritone TPU
//!
//! # Usage
//!
//! ```bash
//! # Generate the full vector set into a directory
//! tritone-vectors path/to/vectors
//!
//! # Also emit an extra systolic set for a given array size
//! tritone-vectors --array-size 4 path/to/vectors
//! ```
//!
//! # Exit Codes
//!
//! - 0: vectors written
//! - 1: generation failed
//! - 2: invalid arguments

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tritone::mac::MacConfig;
use tritone::vectors;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut array_size: Option<usize> = None;
    let mut output: Option<PathBuf> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--array-size" | "-a" => match iter.next().and_then(|v| v.parse().ok()) {
                Some(size) => array_size = Some(size),
                None => {
                    eprintln!("Error: --array-size needs a positive integer\n");
                    print_help();
                    return ExitCode::from(2);
                }
            },
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}\n", arg);
                print_help();
                return ExitCode::from(2);
            }
            _ => output = Some(PathBuf::from(arg)),
        }
    }

    let Some(output) = output else {
        eprintln!("Error: No output directory specified\n");
        print_help();
        return ExitCode::from(2);
    };

    match run(&output, array_size) {
        Ok(()) => {
            println!("Test vectors written to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(output: &Path, array_size: Option<usize>) -> anyhow::Result<()> {
    vectors::generate_all(output)
        .with_context(|| format!("generating vector set in {}", output.display()))?;

    if let Some(size) = array_size {
        vectors::write_systolic_vectors(output, size, &MacConfig::default())
            .with_context(|| format!("generating {size}x{size} systolic vectors"))?;
    }
    Ok(())
}

fn print_help() {
    println!("tritone-vectors - RTL test-vector generation for the Tritone TPU");
    println!();
    println!("USAGE:");
    println!("    tritone-vectors [OPTIONS] <OUTPUT_DIR>");
    println!();
    println!("OPTIONS:");
    println!("    -a, --array-size <R>   Also emit systolic vectors for an RxR array");
    println!("    -h, --help             Show this help");
}
