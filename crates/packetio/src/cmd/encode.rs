use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use packetio_frame::{FrameConfig, FrameEncoder};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: EncodeArgs, config: FrameConfig) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let mut encoder = FrameEncoder::with_config(sink, config);
    encoder
        .encode_all(args.tag, &payload)
        .map_err(|err| frame_error("encode failed", err))?;

    tracing::debug!(tag = args.tag, size = payload.len(), "frame written");
    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(json) = &args.json {
        serde_json::from_str::<serde_json::Value>(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(json.as_bytes().to_vec());
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> EncodeArgs {
        EncodeArgs {
            tag: 1,
            json: None,
            data: None,
            file: None,
            out: None,
        }
    }

    #[test]
    fn data_payload_is_verbatim() {
        let args = EncodeArgs {
            data: Some("hello".to_string()),
            ..args()
        };
        assert_eq!(resolve_payload(&args).unwrap(), b"hello");
    }

    #[test]
    fn invalid_json_is_usage_error() {
        let args = EncodeArgs {
            json: Some("{nope".to_string()),
            ..args()
        };
        let err = resolve_payload(&args).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn missing_payload_is_empty_frame() {
        assert!(resolve_payload(&args()).unwrap().is_empty());
    }

    #[test]
    fn appends_frames_to_out_file() {
        let path = std::env::temp_dir().join(format!(
            "packetio-encode-append-{}.bin",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        for data in ["one", "two"] {
            let args = EncodeArgs {
                data: Some(data.to_string()),
                out: Some(path.clone()),
                ..args()
            };
            assert_eq!(run(args, FrameConfig::default()).unwrap(), SUCCESS);
        }

        let wire = fs::read(&path).unwrap();
        assert_eq!(wire, b"\x01\x00\x00\x03one\x01\x00\x00\x03two");
        let _ = fs::remove_file(&path);
    }
}
