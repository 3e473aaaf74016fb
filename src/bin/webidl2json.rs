//! # webidl2json command line interface
//!
//! A thin CLI wrapper around [`webidl_ast::api`] that parses Web IDL
//! sources and writes their serialized document tree as JSON.
//!
//! ## Design philosophy
//!
//! - **CLI layer**: argument parsing, directory traversal, and file I/O
//!   live here only.
//! - **API layer**: `webidl_ast::api::parse_and_serialize` contains the pure
//!   processing logic with no side effects.
//!
//! ## Usage
//!
//! ```bash
//! # Parse a single file, print JSON to stdout
//! webidl2json path/to/interface.idl
//!
//! # Parse every *.idl file under a directory, writing *.json next to it
//! webidl2json path/to/idl-dir -o path/to/out-dir
//!
//! # Pretty-print
//! webidl2json path/to/interface.idl --pretty
//! ```
//!
//! A per-file failure during a directory run is reported on stderr and
//! counted; it does not abort the walk (§6.3 of the core specification).
//! The process exits nonzero iff at least one file failed.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use webidl_ast::api::{parse_and_serialize, ProcessArgs};
use webidl_ast::error::format_diagnostic;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a .idl file, or a directory to walk for *.idl files
    input: PathBuf,

    /// Output file (file mode) or output directory (directory mode).
    /// Defaults to stdout in file mode, or the input directory in
    /// directory mode.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON document tree
    #[arg(long)]
    pretty: bool,
}

fn main() {
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("Error: input path '{}' does not exist", args.input.display());
        std::process::exit(1);
    }

    let exit_code = if args.input.is_dir() {
        run_directory(&args.input, args.output.as_deref(), args.pretty)
    } else {
        run_file(&args.input, args.output.as_deref(), args.pretty)
    };

    std::process::exit(exit_code);
}

fn run_file(input: &Path, output: Option<&Path>, pretty: bool) -> i32 {
    match process_one(input, pretty) {
        Ok(json) => {
            match output {
                Some(out_path) => {
                    if let Err(e) = fs::write(out_path, json) {
                        eprintln!("Error: failed to write '{}': {}", out_path.display(), e);
                        return 1;
                    }
                }
                None => println!("{}", json),
            }
            0
        }
        Err(line) => {
            eprintln!("{}", line);
            1
        }
    }
}

fn run_directory(input: &Path, output: Option<&Path>, pretty: bool) -> i32 {
    let output_dir = output.unwrap_or(input);
    let mut failures = 0usize;
    let mut processed = 0usize;

    for entry in walkdir::WalkDir::new(input) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("idl") {
            continue;
        }

        processed += 1;
        let dest = output_dir.join(
            entry
                .path()
                .file_stem()
                .map(|stem| format!("{}.json", stem.to_string_lossy()))
                .unwrap_or_else(|| "output.json".to_string()),
        );

        match process_one(entry.path(), pretty) {
            Ok(json) => {
                if let Err(e) = fs::write(&dest, json) {
                    eprintln!("Error: failed to write '{}': {}", dest.display(), e);
                    failures += 1;
                }
            }
            Err(line) => {
                eprintln!("{}", line);
                failures += 1;
            }
        }
    }

    if processed == 0 {
        eprintln!("Error: no *.idl files found under '{}'", input.display());
        return 1;
    }

    if failures > 0 {
        eprintln!("{} of {} file(s) failed to parse", failures, processed);
    }

    if failures > 0 {
        1
    } else {
        0
    }
}

fn process_one(path: &Path, pretty: bool) -> Result<String, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error: failed to read '{}': {}", path.display(), e))?;
    let source_path = path.display().to_string();
    let args = ProcessArgs {
        content,
        source_path: source_path.clone(),
        pretty,
    };
    parse_and_serialize(args).map_err(|e| match e {
        webidl_ast::api::ProcessError::Parse(parse_err) => {
            format_diagnostic(&source_path, &parse_err)
        }
        other => format!("{}: error: {}", source_path, other),
    })
}
