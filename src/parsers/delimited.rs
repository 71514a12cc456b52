//! Delimited-text row parsing.
//!
//! Text goes through two stages:
//!
//! 1. **Structured**: the `csv` crate with permissive settings (comma
//!    separated, flexible record length, blank records skipped, header and
//!    cells trimmed of whitespace and trailing noise).
//! 2. **Scanning**: a line-by-line parser that finds the header by keyword,
//!    detects the delimiter per line and tolerates files that mix comma and
//!    semicolon rows or repeat their header.
//!
//! The scanning stage runs only when the structured stage fails or admits
//! no rows. Both stages filter rows with the same admission predicate.

use tracing::{debug, warn};

use super::{ParserPath, is_admissible};
use crate::config::IngestConfig;
use crate::message::RawRow;
use crate::parsing::LineSplitter;

/// Outcome of [`parse_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextRows {
    pub rows: Vec<RawRow>,
    pub path: ParserPath,
}

/// Parses delimited text into admitted raw rows.
///
/// Never fails: an empty result means neither stage found a usable row.
pub fn parse_text(text: &str, config: &IngestConfig) -> TextRows {
    if config.structured_first {
        match parse_structured(text, config) {
            Ok(rows) if !rows.is_empty() => {
                debug!(rows = rows.len(), "structured parser admitted rows");
                return TextRows {
                    rows,
                    path: ParserPath::Structured,
                };
            }
            Ok(_) => debug!("structured parser admitted no rows, falling back to scanning"),
            Err(e) => warn!(error = %e, "structured parser failed, falling back to scanning"),
        }
    }

    let rows = parse_scanning(text, config);
    debug!(rows = rows.len(), "scanning parser admitted rows");
    TextRows {
        rows,
        path: ParserPath::Scanning,
    }
}

/// Removes the trailing-noise run from the end of every line.
///
/// Line endings are normalized to `\n`.
pub fn strip_line_noise(text: &str, config: &IngestConfig) -> String {
    text.lines()
        .map(|line| config.strip_noise(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Stage 1: csv crate
// ============================================================================

/// Parses `text` with the csv crate, using the first record as the header.
pub fn parse_structured(text: &str, config: &IngestConfig) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .double_quote(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| config.strip_noise(h.trim()).to_string())
        .collect();

    let mut rows = Vec::new();
    let mut rejected = 0usize;

    for result in reader.records() {
        let record = result?;

        // Greedy empty-line skip: whitespace-only records carry nothing
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), config.strip_noise(value.trim())))
            .collect();

        if is_repeated_header(&row, config) {
            continue;
        }
        if is_admissible(&row) {
            rows.push(row);
        } else {
            rejected += 1;
        }
    }

    if rejected > 0 {
        debug!(rejected, "structured parser dropped rows failing admission");
    }
    Ok(rows)
}

/// A re-concatenated export repeats its header as a data record.
fn is_repeated_header(row: &RawRow, config: &IngestConfig) -> bool {
    config.is_header_record(row.iter().map(|(_, v)| v))
}

// ============================================================================
// Stage 2: line scanner
// ============================================================================

/// Parses `text` line by line with per-line delimiter detection.
pub fn parse_scanning(text: &str, config: &IngestConfig) -> Vec<RawRow> {
    let splitter = LineSplitter::from_config(config);
    let lines: Vec<&str> = text.lines().collect();

    let Some(first) = lines.first() else {
        return Vec::new();
    };

    let header_index = lines
        .iter()
        .take(config.header_scan_lines)
        .position(|line| config.is_header_line(line));

    let (header_line, data_start) = match header_index {
        Some(i) => {
            debug!(line = i, "header detected");
            (lines[i], i + 1)
        }
        None => {
            debug!("no header within scan window, using line 0");
            (*first, 1)
        }
    };

    let headers: Vec<String> = splitter
        .split_auto(header_line.trim())
        .iter()
        .map(|h| clean_header(h, config))
        .collect();
    debug!(columns = headers.len(), "header columns");

    let mut rows = Vec::new();
    let mut rejected = 0usize;

    for line in &lines[data_start.min(lines.len())..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let values = splitter.split_auto(line);
        let cells: Vec<String> = values.iter().map(|v| clean_header(v, config)).collect();
        if config.is_header_record(cells.iter().map(String::as_str)) {
            debug!("skipping repeated header line");
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(values)
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), value))
            .collect();

        if is_admissible(&row) {
            rows.push(row);
        } else {
            rejected += 1;
        }
    }

    if rejected > 0 {
        debug!(rejected, "scanning parser dropped rows failing admission");
    }
    rows
}

/// Header cells lose every double quote, not just an enclosing pair.
fn clean_header(raw: &str, config: &IngestConfig) -> String {
    let unquoted = raw.trim().replace('"', "");
    config.strip_noise(&unquoted).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    #[test]
    fn test_structured_basic() {
        let text = "time,channel,login,body\n2024-01-01 10:00:00,general,alice,hello\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("login"), Some("alice"));
        assert_eq!(rows[0].get("body"), Some("hello"));
    }

    #[test]
    fn test_structured_trims_header_and_noise() {
        let text = " time ,channel, login ,body;;\nt1,general;, alice ,hi;;\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("channel"), Some("general"));
        assert_eq!(rows[0].get("login"), Some("alice"));
        assert_eq!(rows[0].get("body"), Some("hi"));
    }

    #[test]
    fn test_structured_admission() {
        let text = "time,channel,login,body\nt1,foo,bar,\nt2,foo,bar,kept\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("body"), Some("kept"));
    }

    #[test]
    fn test_structured_body_full_counts_as_message() {
        let text = "time,channel,login,body,body_full\nt1,foo,bar,,full\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_structured_skips_repeated_header() {
        let text = "time,channel,login,body\nt1,c,u,a\ntime,channel,login,body\nt2,c,u,b\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_message_mentioning_header_words_is_kept() {
        let text = "time,channel,login,body\n\
                    t1,general,alice,what time does the channel login body open\n\
                    t2,general,bob,yo\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("body"), Some("what time does the channel login body open"));
    }

    #[test]
    fn test_scanning_skips_repeated_header_with_other_delimiter() {
        let text = "time,channel,login,body\nt1,general,alice,hi\n\"time\";\"channel\";\"login\";\"body\";;\nt2,general,bob,yo\n";
        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("login"), Some("bob"));
    }

    #[test]
    fn test_structured_semicolon_file_admits_nothing() {
        let text = "time;channel;login;body\nt1;general;alice;hello\n";
        let rows = parse_structured(text, &config()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_scanning_finds_header_after_preamble() {
        let text = "Chat export\ngenerated today\ntime,channel,login,body\nt1,general,alice,hello\n";
        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("channel"), Some("general"));
    }

    #[test]
    fn test_scanning_header_outside_window_uses_line_zero() {
        let cfg = config().with_header_scan_lines(1);
        let text = "x,channel,login,body\ntime,channel,login,body\nt1,general,alice,hello\n";
        let rows = parse_scanning(text, &cfg);
        // Line 0 is the header, line 1 is skipped as a repeated header
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("x"), Some("t1"));
    }

    #[test]
    fn test_scanning_mixed_delimiters() {
        let text = "time,channel,login,body\nt1,general,alice,hello\nt2;general;bob;\"hi, there\"\n";
        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("login"), Some("bob"));
        assert_eq!(rows[1].get("body"), Some("hi, there"));
    }

    #[test]
    fn test_scanning_cleans_quoted_header() {
        let text = "\"time\",\"channel\",\"login\",\"body\";\nt1,general,alice,hello\n";
        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("body"), Some("hello"));
    }

    #[test]
    fn test_scanning_skips_blank_and_short_lines() {
        let text = "time,channel,login,body\n\n   \nt1,general\nt2,general,alice,hi\n";
        let rows = parse_scanning(text, &config());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_scanning_empty_text() {
        assert!(parse_scanning("", &config()).is_empty());
    }

    #[test]
    fn test_parse_text_prefers_structured() {
        let text = "time,channel,login,body\nt1,general,alice,hello\n";
        let out = parse_text(text, &config());
        assert_eq!(out.path, ParserPath::Structured);
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn test_parse_text_falls_back_to_scanning() {
        let text = "time;channel;login;body\nt1;general;alice;hello\n";
        let out = parse_text(text, &config());
        assert_eq!(out.path, ParserPath::Scanning);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].get("body"), Some("hello"));
    }

    #[test]
    fn test_parse_text_scanning_only() {
        let cfg = config().with_structured_first(false);
        let text = "time,channel,login,body\nt1,general,alice,hello\n";
        assert_eq!(parse_text(text, &cfg).path, ParserPath::Scanning);
    }

    #[test]
    fn test_strip_line_noise() {
        let text = "a,b;;;\r\nc,d;\r\ne";
        assert_eq!(strip_line_noise(text, &config()), "a,b\nc,d\ne");
    }
}
