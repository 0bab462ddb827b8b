use std::fs::File;
use std::io::{self, Read};

use packetio_frame::{DispatchTable, FrameConfig, FrameDecoder, FrameError};

use crate::cmd::DumpArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{FramePrinter, OutputFormat};

pub fn run(args: DumpArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let source: Box<dyn Read> = match &args.path {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let mut printer = FramePrinter::new(format);
    let table = build_table(args.tags.as_deref());
    let result = dump_frames(source, table, config, args.count, |index, tag, payload| {
        printer.frame(index, tag, payload)
    });
    printer.finish();

    let summary = result.map_err(|err| frame_error("decode failed", err))?;
    tracing::info!(
        frames = summary.printed,
        skipped = summary.skipped,
        "dump complete"
    );
    Ok(SUCCESS)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DumpSummary {
    printed: usize,
    skipped: usize,
}

/// One byte-vector target per requested tag, or for every tag.
fn build_table(tags: Option<&[u8]>) -> DispatchTable<Vec<u8>> {
    match tags {
        Some(tags) => tags.iter().map(|tag| (*tag, Vec::new())).collect(),
        None => (0..=u8::MAX).map(|tag| (tag, Vec::new())).collect(),
    }
}

/// Decode frames until end of stream (or `limit` printed frames).
///
/// Frames the table can't take are skipped; the stream stays aligned.
fn dump_frames<R, F>(
    source: R,
    table: DispatchTable<Vec<u8>>,
    config: FrameConfig,
    limit: Option<usize>,
    mut emit: F,
) -> Result<DumpSummary, FrameError>
where
    R: Read,
    F: FnMut(u64, u8, &[u8]),
{
    let mut decoder = FrameDecoder::with_config(source, table, config);
    let mut summary = DumpSummary::default();
    let mut index = 0u64;

    while limit.is_none_or(|limit| summary.printed < limit) {
        match decoder.decode() {
            Ok(decoded) => {
                emit(index, decoded.tag, decoded.target.as_slice());
                summary.printed += 1;
            }
            Err(FrameError::EndOfStream) => break,
            Err(err) if err.is_recoverable() => {
                tracing::warn!(frame = index, error = %err, "skipping frame");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
        index += 1;
    }

    Ok(summary)
}
