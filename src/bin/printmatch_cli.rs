//! CLI tool for printmatch - parses manifest XLSX files and outputs JSON
//!
//! Usage:
//!   printmatch_cli <manifest.xlsx>              # Output JSON to stdout
//!   printmatch_cli <manifest.xlsx> -o out.json  # Output JSON to file
//!   printmatch_cli <manifest.xlsx> --seed       # Pre-seed sizes from labels

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use printmatch::manifest::{parse_xlsx, ParserOptions};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: printmatch_cli <manifest.xlsx> [--seed] [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let seed = args.iter().any(|a| a == "--seed");
    let output_path = args
        .iter()
        .position(|a| a == "-o")
        .and_then(|i| args.get(i + 1));

    // Read input file
    let data = match fs::read(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse manifest
    let options = if seed {
        ParserOptions::seeded()
    } else {
        ParserOptions::unseeded()
    };
    let records = match parse_xlsx(&data, options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing manifest: {}", e);
            std::process::exit(1);
        }
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&records) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Wrote {} records to {}", records.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let _ = handle.write_all(json.as_bytes());
            let _ = handle.write_all(b"\n");
        }
    }
}
