//! cdict-merge
//!
//! Streams several dumped dictionaries into a single file.

use std::path::PathBuf;

use clap::Parser;
use compressed_dictionary::{CombineOptions, Compression, CompressedDictionary};
use tracing_subscriber::{fmt, EnvFilter};

/// Merge dumped dictionaries into one file
#[derive(Parser, Debug)]
#[command(name = "cdict-merge")]
#[command(about = "Merge compressed dictionary dumps into a single file")]
#[command(version)]
struct Args {
    /// Input dictionaries to merge
    #[arg(short, long = "input-files", num_args = 1.., required = true)]
    input_files: Vec<PathBuf>,

    /// Output file receiving the merged dictionary
    #[arg(short, long = "output-file")]
    output_file: PathBuf,

    /// Compression of the output dictionary (defaults to the first input's)
    #[arg(long, value_parser = parse_compression)]
    compression: Option<Compression>,

    /// Renumber keys from 0 instead of keeping them
    #[arg(long)]
    reset_keys: bool,
}

fn parse_compression(s: &str) -> Result<Compression, String> {
    s.parse().map_err(|e: compressed_dictionary::DictError| e.to_string())
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,compressed_dictionary=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    for input in &args.input_files {
        if !input.is_file() {
            tracing::error!("Input file {} does not exist", input.display());
            std::process::exit(1);
        }
    }

    if args.output_file.is_dir() {
        tracing::error!("Output {} is a directory", args.output_file.display());
        std::process::exit(1);
    }

    let mut options = CombineOptions::default().reset_keys(args.reset_keys);
    if let Some(compression) = args.compression {
        options = options.compression(compression);
    }

    tracing::info!(
        "Merging {} input dictionaries into {}",
        args.input_files.len(),
        args.output_file.display()
    );

    match CompressedDictionary::combine_on_disk(&args.output_file, &args.input_files, &options) {
        Ok(stats) => {
            tracing::info!(
                "Done: {} records written, {} re-encoded",
                stats.records,
                stats.reencoded
            );
        }
        Err(e) => {
            tracing::error!("Merge failed: {}", e);
            // A partial output is unusable
            let _ = std::fs::remove_file(&args.output_file);
            std::process::exit(1);
        }
    }
}
