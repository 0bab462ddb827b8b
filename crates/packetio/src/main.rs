mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use packetio_frame::{FrameConfig, MAX_PAYLOAD_LEN};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "packetio", version, about = "Typed frame stream CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "PACKETIO_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Largest payload accepted when encoding or decoding, in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = MAX_PAYLOAD_LEN, global = true)]
    max_payload: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = FrameConfig {
        max_payload_size: cli.max_payload,
    };
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from(["packetio", "encode", "--tag", "1", "--data", "hello"])
            .expect("encode args should parse");

        assert!(matches!(cli.command, Command::Encode(_)));
        assert_eq!(cli.max_payload, MAX_PAYLOAD_LEN);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "packetio",
            "encode",
            "--tag",
            "1",
            "--json",
            "{\"x\":1}",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_tag_outside_byte_range() {
        let err = Cli::try_parse_from(["packetio", "encode", "--tag", "256", "--data", "x"])
            .expect_err("tag 256 should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_dump_subcommand_with_tags() {
        let cli = Cli::try_parse_from([
            "packetio",
            "dump",
            "/tmp/frames.bin",
            "--tags",
            "1,2",
            "--max-payload",
            "1024",
        ])
        .expect("dump args should parse");

        assert_eq!(cli.max_payload, 1024);
        match cli.command {
            Command::Dump(args) => assert_eq!(args.tags, Some(vec![1, 2])),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
