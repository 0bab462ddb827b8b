use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: u64,
    tag: u8,
    payload_size: usize,
    payload: &'a str,
}

/// Prints decoded frames in the selected format.
///
/// Table output is collected and rendered once by [`finish`](Self::finish).
pub struct FramePrinter {
    format: OutputFormat,
    table: Option<Table>,
}

impl FramePrinter {
    pub fn new(format: OutputFormat) -> Self {
        let table = matches!(format, OutputFormat::Table).then(|| {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "TAG", "SIZE", "PAYLOAD"]);
            table
        });
        Self { format, table }
    }

    pub fn frame(&mut self, index: u64, tag: u8, payload: &[u8]) {
        let preview = payload_preview(payload);
        match self.format {
            OutputFormat::Json => {
                let out = FrameOutput {
                    index,
                    tag,
                    payload_size: payload.len(),
                    payload: &preview,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => {
                if let Some(table) = self.table.as_mut() {
                    table.add_row(vec![
                        index.to_string(),
                        tag.to_string(),
                        payload.len().to_string(),
                        preview,
                    ]);
                }
            }
            OutputFormat::Pretty => {
                println!(
                    "#{index} tag={tag} size={} payload={preview}",
                    payload.len()
                );
            }
            OutputFormat::Raw => print_raw(payload),
        }
    }

    pub fn finish(self) {
        if let Some(table) = self.table {
            println!("{table}");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
