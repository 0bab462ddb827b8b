use clap::{Args, Subcommand};
use packetio_frame::FrameConfig;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod dump;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame a single payload and write it out.
    Encode(EncodeArgs),
    /// Decode a frame stream and print each frame.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, config),
        Command::Dump(args) => dump::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Type tag for the frame (0-255).
    #[arg(long, short = 't')]
    pub tag: u8,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Append the frame to this file instead of writing to stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Frame stream to read. Default: stdin.
    pub path: Option<PathBuf>,
    /// Only decode these tags (comma-separated); other frames are skipped.
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<u8>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
