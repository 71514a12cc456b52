//! JSON Lines (JSONL) output writer.

use std::fs::File;
use std::io::{BufWriter, Write};

use super::ExportRecord;
use crate::core::models::OutputConfig;
use crate::error::Result;
use crate::message::ChatMessage;

/// Writes messages to JSONL, one compact JSON object per line.
///
/// ```jsonl
/// {"channel":"general","username":"alice","message":"Hello"}
/// {"channel":"general","username":"bob","message":"Hi"}
/// ```
pub fn write_jsonl(messages: &[ChatMessage], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_lines(&mut writer, messages, config)?;
    writer.flush()?;
    Ok(())
}

/// Converts messages to a JSONL string.
pub fn to_jsonl(messages: &[ChatMessage], config: &OutputConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_lines(&mut buffer, messages, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_lines<W: Write>(sink: &mut W, messages: &[ChatMessage], config: &OutputConfig) -> Result<()> {
    for msg in messages {
        serde_json::to_writer(&mut *sink, &ExportRecord::new(msg, config))?;
        sink.write_all(b"\n")?;
    }
    Ok(())
}
