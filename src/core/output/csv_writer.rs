//! CSV output writer.

use std::fs::File;
use std::io::Write;

use super::TIMESTAMP_FORMAT;
use crate::core::models::OutputConfig;
use crate::error::Result;
use crate::message::ChatMessage;

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns, in order, depending on [`OutputConfig`]:
///   - With IDs: `ID`
///   - With timestamps: `Timestamp`
///   - Always: `Channel`, `User`, `Message`
///   - With IDs: `UserID`
///   - With metadata: `Country`, `City`, `Reply`, `Mention`
/// - Encoding: UTF-8
pub fn write_csv(messages: &[ChatMessage], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(file, messages, config)
}

/// Converts messages to a CSV string, same format as [`write_csv`].
pub fn to_csv(messages: &[ChatMessage], config: &OutputConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, messages, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_records<W: Write>(sink: W, messages: &[ChatMessage], config: &OutputConfig) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    writer.write_record(build_header(config))?;
    for msg in messages {
        writer.write_record(build_record(msg, config))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV header based on output configuration.
fn build_header(config: &OutputConfig) -> Vec<&'static str> {
    let mut header = Vec::new();

    if config.include_ids {
        header.push("ID");
    }
    if config.include_timestamps {
        header.push("Timestamp");
    }

    header.extend(["Channel", "User", "Message"]);

    if config.include_ids {
        header.push("UserID");
    }
    if config.include_metadata {
        header.extend(["Country", "City", "Reply", "Mention"]);
    }

    header
}

/// Build CSV record for a single message.
fn build_record(msg: &ChatMessage, config: &OutputConfig) -> Vec<String> {
    let mut record = Vec::new();

    if config.include_ids {
        record.push(msg.id.clone());
    }
    if config.include_timestamps {
        record.push(msg.timestamp.format(TIMESTAMP_FORMAT).to_string());
    }

    record.push(msg.channel.clone());
    record.push(msg.username.clone());
    record.push(msg.message.clone());

    if config.include_ids {
        record.push(msg.user_id.clone().unwrap_or_default());
    }
    if config.include_metadata {
        record.push(msg.country.clone().unwrap_or_default());
        record.push(msg.city.clone().unwrap_or_default());
        record.push(msg.is_reply.to_string());
        record.push(msg.is_mention.to_string());
    }

    record
}
