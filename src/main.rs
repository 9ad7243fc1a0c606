use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use imagetrim::{CodecSession, OutputFormat, Trimmer};

#[derive(Parser)]
#[command(name = "imagetrim")]
#[command(about = "Crops every image under a directory to its non-transparent pixels, in place", long_about = None)]
struct Args {
    /// Directory to trim recursively (defaults to the current directory)
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Format trimmed files are written in; the file name is never changed
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    output_format: OutputFormat,

    /// Also log skipped files and codec details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let root = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("Error: Failed to get current directory: {e}");
            std::process::exit(1);
        }),
    };

    if !root.is_dir() {
        eprintln!("Error: '{}' is not a directory", root.display());
        std::process::exit(1);
    }

    tracing::info!("Trimming images under {}", root.display());

    let session = CodecSession::open(args.output_format);
    Trimmer::new(&session).run(&root);
}
