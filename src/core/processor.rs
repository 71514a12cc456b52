//! Column repair for exports whose message text broke the column layout.
//!
//! Some exporters write the message body unquoted, so a comma in the text
//! spills into extra columns. [`repair_columns`] rewrites such a file under a
//! known header list: rows with the expected width pass through and every
//! other row has its overflow folded back into the last column.

use std::fs;
use std::io::Write;

use tracing::{debug, info};

use crate::error::Result;

/// The 27 columns of a full streaming-platform chat export.
pub const TWITCH_EXPORT_HEADERS: &[&str] = &[
    "time",
    "city",
    "country",
    "region",
    "body_full",
    "asn_id",
    "ip",
    "login",
    "server_timestamp",
    "body",
    "channel",
    "msg_id",
    "filtered_tags",
    "asn",
    "user_id",
    "time_utc",
    "canonical_client_id",
    "room_id",
    "room_type",
    "chatroom_type",
    "chatroom_id",
    "channel_points_modification",
    "previously_dropped",
    "is_reply",
    "is_mention",
    "chant_id",
    "chant_message_id",
];

/// Counts from one repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Records read from the input (the input's own header included)
    pub records: usize,
    /// Records that already had the expected width
    pub intact: usize,
    /// Records whose fields were folded or padded
    pub rebuilt: usize,
}

impl RepairStats {
    /// Share of records that needed rebuilding, in percent.
    pub fn rebuilt_ratio(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        self.rebuilt as f64 / self.records as f64 * 100.0
    }
}

/// Fits one record to `width` columns.
///
/// Keeps the first `width - 1` fields and joins the rest with `,` into the
/// last one. A record shorter than that gains one empty trailing field.
pub fn fit_record(fields: &[&str], width: usize) -> Vec<String> {
    if width == 0 || fields.len() == width {
        return fields.iter().map(|f| (*f).to_string()).collect();
    }
    let keep = (width - 1).min(fields.len());
    let mut fitted: Vec<String> = fields[..keep].iter().map(|f| (*f).to_string()).collect();
    fitted.push(fields[keep..].join(","));
    fitted
}

/// Splits `text` into logical CSV lines.
///
/// A line break inside a quoted field does not end the line. Spaces at the
/// start of each field are dropped before quote detection, so `a, "b"` holds
/// the quoted field `"b"`. Quoted content and trailing spaces are untouched.
/// A final line break does not open an extra empty line.
pub fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            line.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    line.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            ' ' if field_start => {}
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut line));
                field_start = true;
            }
            ',' => {
                line.push(c);
                field_start = true;
            }
            '"' if field_start => {
                line.push(c);
                in_quotes = true;
                field_start = false;
            }
            _ => {
                line.push(c);
                field_start = false;
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Decodes the fields of one logical line; a blank line has none.
fn line_fields(line: &str) -> Result<Vec<String>> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record.iter().map(str::to_string).collect())
}

/// Rewrites `text` under `headers`, writing the result to `sink`.
pub fn repair_into<W: Write>(text: &str, headers: &[&str], sink: W) -> Result<RepairStats> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(sink);

    writer.write_record(headers)?;

    let mut stats = RepairStats::default();
    for line in logical_lines(text) {
        let owned = line_fields(&line)?;
        let fields: Vec<&str> = owned.iter().map(String::as_str).collect();
        stats.records += 1;

        if headers.is_empty() || fields.len() == headers.len() {
            stats.intact += 1;
            writer.write_record(&fields)?;
        } else {
            stats.rebuilt += 1;
            debug!(
                record = stats.records,
                fields = fields.len(),
                expected = headers.len(),
                "rebuilding record"
            );
            writer.write_record(fit_record(&fields, headers.len()))?;
        }
    }

    writer.flush()?;
    Ok(stats)
}

/// Rewrites `text` under `headers` and returns the repaired CSV.
///
/// # Example
///
/// ```rust
/// use chatlens::core::processor::repair_columns;
///
/// # fn main() -> chatlens::Result<()> {
/// let fixed = repair_columns("t1,alice,hello, world\n", &["time", "login", "body"])?;
/// assert_eq!(fixed, "time,login,body\r\nt1,alice,\"hello,world\"\r\n");
/// # Ok(())
/// # }
/// ```
pub fn repair_columns(text: &str, headers: &[&str]) -> Result<String> {
    let mut buffer = Vec::new();
    repair_into(text, headers, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Repairs `input_path` into `output_path`.
pub fn repair_file(input_path: &str, output_path: &str, headers: &[&str]) -> Result<RepairStats> {
    let text = fs::read_to_string(input_path)?;
    let file = fs::File::create(output_path)?;
    let stats = repair_into(&text, headers, file)?;
    info!(
        input = input_path,
        output = output_path,
        records = stats.records,
        rebuilt = stats.rebuilt,
        "repaired columns"
    );
    Ok(stats)
}
