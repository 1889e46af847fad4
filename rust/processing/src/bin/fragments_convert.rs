// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: convert a JSON interchange document into fragments and print a
//! summary of the resulting model.
//!
//! Usage:
//!   fragments-convert <input.json> [options]

use ifc_fragments_processing::{
    JsonGeometryReader, JsonMetadataReader, LoadPipeline, LoaderConfig, ModelSummary,
};
use std::env;
use std::fs;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let input_path = &args[1];

    // Parse options
    let mut output_path: Option<String> = None;
    let mut pretty = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                match args.get(i) {
                    Some(path) => output_path = Some(path.clone()),
                    None => {
                        eprintln!("--output needs a file path");
                        process::exit(1);
                    }
                }
            }
            "--pretty" => {
                pretty = true;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = LoaderConfig::from_env();
    tracing::info!(
        input = %input_path,
        worker_threads = config.worker_threads,
        "Starting fragment conversion"
    );

    let pipeline = match LoadPipeline::new(JsonGeometryReader, JsonMetadataReader, &config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::error!(error = %err, "Failed to start load pipeline");
            process::exit(1);
        }
    };

    let model = match pipeline.run_file(input_path) {
        Ok(model) => model,
        Err(err) => {
            tracing::error!(error = %err, "Load failed");
            eprintln!("Failed to load {}: {}", input_path, err);
            process::exit(1);
        }
    };

    let summary = ModelSummary::from_model(&model);
    let json = if pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    };
    let json = match json {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Failed to serialize summary: {}", err);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(err) = fs::write(&path, json + "\n") {
                eprintln!("Failed to write {}: {}", path, err);
                process::exit(1);
            }
            tracing::info!(output = %path, "Summary written");
        }
        None => println!("{}", json),
    }
}

fn print_usage() {
    eprintln!("Usage: fragments-convert <input.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --output <file>  Write the summary to a file instead of stdout");
    eprintln!("  --pretty         Pretty-print the summary JSON");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG                       Log filter (default: info)");
    eprintln!("  IFC_FRAGMENTS_WORKER_THREADS   Producer threads (default: CPU count, minimum 2)");
}
