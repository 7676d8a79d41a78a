//! cdict-split
//!
//! Splits one dumped dictionary into several smaller dumps.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use compressed_dictionary::{CompressedDictionary, LoadOptions, SplitOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// Split a dumped dictionary into parts
#[derive(Parser, Debug)]
#[command(name = "cdict-split")]
#[command(about = "Split a compressed dictionary dump into several files")]
#[command(version)]
#[command(group(ArgGroup::new("size").required(true).args(["parts", "parts_length"])))]
struct Args {
    /// Input dictionary to split
    #[arg(short, long = "input-file")]
    input_file: PathBuf,

    /// Output folder receiving the parts (must not exist yet)
    #[arg(short, long = "output-folder")]
    output_folder: PathBuf,

    /// Number of parts to produce
    #[arg(long)]
    parts: Option<usize>,

    /// Number of entries per part
    #[arg(long)]
    parts_length: Option<usize>,

    /// Drop the last part if it is smaller than the others
    #[arg(long)]
    drop_last: bool,

    /// Renumber each part's keys from 0
    #[arg(long)]
    reset_keys: bool,

    /// Shuffle entries before splitting
    #[arg(long)]
    shuffle: bool,

    /// Seed for a reproducible shuffle
    #[arg(long, requires = "shuffle")]
    seed: Option<u64>,

    /// Read only this many entries from the input
    #[arg(long)]
    limit: Option<usize>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,compressed_dictionary=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("Split failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Done");
}

fn run(args: &Args) -> compressed_dictionary::Result<()> {
    if !args.input_file.is_file() {
        return Err(compressed_dictionary::DictError::Configuration(format!(
            "input file {} does not exist",
            args.input_file.display()
        )));
    }
    if args.output_folder.exists() {
        return Err(compressed_dictionary::DictError::Configuration(format!(
            "output folder {} already exists",
            args.output_folder.display()
        )));
    }

    let mut options = SplitOptions::builder()
        .drop_last(args.drop_last)
        .reset_keys(args.reset_keys)
        .shuffle(args.shuffle);
    if let Some(parts) = args.parts {
        options = options.parts(parts);
    }
    if let Some(length) = args.parts_length {
        options = options.parts_length(length);
    }
    if let Some(seed) = args.seed {
        options = options.seed(seed);
    }
    let options = options.build();

    tracing::info!("Loading input dictionary {}", args.input_file.display());
    let mut load = LoadOptions::default();
    load.limit = args.limit;
    let dictionary = CompressedDictionary::load_with(&args.input_file, &load)?;

    std::fs::create_dir_all(&args.output_folder)?;

    let splits = dictionary.split(&options)?;
    let total = splits.len();
    tracing::info!("Writing {} splits of {} entries", total, dictionary.len());

    let stem = file_stem(&args.input_file);
    for (i, part) in splits.enumerate() {
        let path = args.output_folder.join(format!("{}-split-{}", stem, i));
        part.dump(&path)?;
        tracing::info!("[{}/{}] {} ({} entries)", i + 1, total, path.display(), part.len());
    }

    Ok(())
}

/// Input file name up to its first dot
fn file_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .unwrap_or("dictionary")
        .to_string()
}
