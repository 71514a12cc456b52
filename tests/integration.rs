//! Integration tests for the load pipeline with real files

use chatlens::core::{ChannelIndex, is_valid};
use chatlens::message::{DEFAULT_CHANNEL, DEFAULT_USERNAME};
use chatlens::parsing::local_to_utc;
use chatlens::prelude::*;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

fn fixtures_dir() -> &'static str {
    "tests/fixtures"
}

fn ensure_fixtures() {
    INIT.call_once(|| {
        let dir = fixtures_dir();
        if !Path::new(dir).exists() {
            fs::create_dir_all(dir).unwrap();
        }

        // Exporter output: every line ends in a run of semicolons
        let noisy_csv = "time,channel,login,body,user_id,country,city,is_reply,is_mention;;;
2024-03-01 18:00:00,speedruns,alice,gg,1001,US,Seattle,false,false;;;
2024-03-01 18:00:05,speedruns,bob,\"what a run, wow\",1002,DE,Berlin,true,false;;;
2024-03-01 18:00:07,speedruns,carol,@alice nice,1003,,,false,true;;
2024-03-01 19:00:00,retro,dave,first!,1004,KZ,Almaty,false,false;;;;;
";
        fs::write(format!("{dir}/chat_messages.csv"), noisy_csv).unwrap();

        // Semicolon-only text export, header found after a preamble
        let semicolon_txt = "Exported by chat-dump v2
time;channel;login;body
2024-03-02 10:00:00;general;alice;hello there
2024-03-02 10:00:30;general;bob;\"hi; alice\"
2024-03-02 10:01:00;offtopic;carol;cats
";
        fs::write(format!("{dir}/semicolon.txt"), semicolon_txt).unwrap();

        // Two exports glued together: repeated header, blank lines, garbage
        let concatenated = "time,channel,login,body
2024-03-03 09:00:00,general,alice,morning

time,channel,login,body
2024-03-03 09:05:00,general,bob,morning alice
this line is garbage
2024-03-03 09:06:00,general,,no login here
";
        fs::write(format!("{dir}/concatenated.txt"), concatenated).unwrap();
    });
}

fn fixture(name: &str) -> Vec<u8> {
    ensure_fixtures();
    fs::read(format!("{}/{}", fixtures_dir(), name)).unwrap()
}

fn frozen() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

fn load_text(text: &str, filename: &str) -> Result<Dataset> {
    load(text.as_bytes(), filename, &IngestConfig::default(), fixed_clock(frozen()))
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    let naive = NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap();
    local_to_utc(naive).unwrap()
}

// =========================================================================
// File fixtures
// =========================================================================

#[test]
fn test_noisy_csv_fixture() {
    let bytes = fixture("chat_messages.csv");
    let dataset = load(&bytes, "chat_messages.csv", &IngestConfig::default(), system_clock()).unwrap();

    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.report().format, InputFormat::NoisyCsv);
    assert_eq!(dataset.report().path, ParserPath::Structured);

    let speedruns = dataset.channel_messages("speedruns");
    assert_eq!(speedruns.len(), 3);
    assert_eq!(speedruns[1].message, "what a run, wow");
    assert_eq!(speedruns[1].country.as_deref(), Some("DE"));
    assert!(speedruns[1].is_reply);
    assert!(speedruns[2].is_mention);
    assert_eq!(speedruns[2].city, None);

    // Trailing noise never leaks into the last column
    let retro = dataset.channel_messages("retro");
    assert!(!retro[0].is_reply);
    assert_eq!(retro[0].original.get("is_mention"), Some("false"));
}

#[test]
fn test_semicolon_fixture_falls_back_to_scanning() {
    let bytes = fixture("semicolon.txt");
    let dataset = load(&bytes, "semicolon.txt", &IngestConfig::default(), system_clock()).unwrap();

    assert_eq!(dataset.report().path, ParserPath::Scanning);
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.channel_messages("general")[1].message, "hi; alice");
    assert_eq!(dataset.first_channel(), Some("general"));
}

#[test]
fn test_concatenated_fixture() {
    let bytes = fixture("concatenated.txt");
    let dataset = load(&bytes, "concatenated.txt", &IngestConfig::default(), system_clock()).unwrap();

    let general = dataset.channel_messages("general");
    let users: Vec<&str> = general.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(users, vec!["alice", "bob"]);
    assert_eq!(dataset.stats().total_channels, 1);
}

// =========================================================================
// End-to-end scenario
// =========================================================================

#[test]
fn test_one_complete_one_missing_body() {
    let text = "time,channel,login,body\n\
                2024-01-01 10:00:00,general,alice,hello\n\
                2024-01-01 10:01:00,general,bob,\n";
    let dataset = load_text(text, "chat.txt").unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.index().len(), 1);
    let general = dataset.channel_messages("general");
    assert_eq!(general.len(), 1);
    assert_eq!(general[0].username, "alice");
    assert_eq!(general[0].timestamp, local(2024, 1, 1, 10, 0, 0));
}

#[test]
fn test_report_counts() {
    let text = "time,channel,login,body\n\
                2024-01-01 10:00:00,general,alice,hello\n\
                2024-01-01 10:01:00,random,bob,\"''\"\n\
                2024-01-01 10:02:00,random,carol,hey\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    let report = dataset.report();

    // The quoted-quotes body is empty after cleanup
    assert_eq!(report.rows_admitted, 3);
    assert_eq!(report.messages_kept, 2);
    assert_eq!(report.messages_rejected, 1);
    assert_eq!(report.channels, 2);
}

// =========================================================================
// Timestamps
// =========================================================================

#[test]
fn test_timestamp_encodings() {
    let text = "time,channel,login,body\n\
                2020-10-31 12:48:11,c,a,calendar\n\
                1604148491000,c,a,millis\n\
                1604148491,c,a,seconds\n\
                [2020-10-31 12:48:11 UTC+2],c,a,embedded\n\
                garbage,c,a,fallback\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    let by_text = |body: &str| {
        dataset
            .messages()
            .iter()
            .find(|m| m.message == body)
            .unwrap()
            .timestamp
    };

    assert_eq!(by_text("calendar"), local(2020, 10, 31, 12, 48, 11));
    assert_eq!(by_text("millis"), Utc.timestamp_millis_opt(1604148491000).unwrap());
    assert_eq!(by_text("seconds"), Utc.timestamp_opt(1604148491, 0).unwrap());
    assert_eq!(by_text("embedded"), local(2020, 10, 31, 12, 48, 11));
    assert_eq!(by_text("fallback"), frozen());
}

#[test]
fn test_timestamp_alternate_keys() {
    let text = "server_timestamp,channel,login,body\n1604148491,c,a,hi\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    assert_eq!(
        dataset.messages()[0].timestamp,
        Utc.timestamp_opt(1604148491, 0).unwrap()
    );
}

#[test]
fn test_missing_time_column_uses_clock() {
    let dataset = load_text("channel,login,body\nc,a,hi\n", "chat.txt").unwrap();
    assert_eq!(dataset.messages()[0].timestamp, frozen());
}

// =========================================================================
// Grouping and validation
// =========================================================================

#[test]
fn test_grouping_orders_bucket_by_time() {
    let text = "time,channel,login,body\n\
                2024-01-01 10:02:00,general,a,t2\n\
                2024-01-01 10:01:00,general,b,t1\n\
                2024-01-01 10:03:00,general,c,t3\n";
    let dataset = load_text(text, "chat.txt").unwrap();

    let order: Vec<&str> = dataset
        .channel_messages("general")
        .iter()
        .map(|m| m.message.as_str())
        .collect();
    assert_eq!(order, vec!["t1", "t2", "t3"]);

    // File order is still available
    assert_eq!(dataset.messages()[0].message, "t2");
}

#[test]
fn test_equal_timestamps_keep_file_order() {
    let text = "time,channel,login,body\n\
                2024-01-01 10:00:00,general,a,first\n\
                2024-01-01 10:00:00,general,b,second\n\
                2024-01-01 10:00:00,general,c,third\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    let order: Vec<&str> = dataset
        .channel_messages("general")
        .iter()
        .map(|m| m.message.as_str())
        .collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn test_both_defaults_fail_validation() {
    let at = frozen();
    let anonymous = ChatMessage::new("m1", DEFAULT_USERNAME, "text", DEFAULT_CHANNEL).with_timestamp(at);
    let user_only = ChatMessage::new("m2", "alice", "text", DEFAULT_CHANNEL).with_timestamp(at);
    let channel_only = ChatMessage::new("m3", DEFAULT_USERNAME, "text", "general").with_timestamp(at);

    assert!(!is_valid(&anonymous));
    assert!(is_valid(&user_only));
    assert!(is_valid(&channel_only));

    let dataset = Dataset::from_messages(
        vec![anonymous.clone(), user_only, channel_only],
        InputFormat::Spreadsheet,
        ParserPath::Spreadsheet,
    )
    .unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.report().messages_rejected, 1);

    let err = Dataset::from_messages(vec![anonymous], InputFormat::Spreadsheet, ParserPath::Spreadsheet)
        .unwrap_err();
    assert!(err.is_empty_dataset());
}

#[test]
fn test_channel_index_positions() {
    let at = frozen();
    let messages = vec![
        ChatMessage::new("1", "a", "x", "b").with_timestamp(at),
        ChatMessage::new("2", "a", "x", "a").with_timestamp(at),
        ChatMessage::new("3", "a", "x", "b").with_timestamp(at - chrono::Duration::seconds(1)),
    ];
    let index = ChannelIndex::build(&messages);

    assert_eq!(index.names().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(index.get("b"), Some(&[2, 0][..]));
    assert_eq!(index.get("a"), Some(&[1][..]));
    assert!(index.get("c").is_none());
}

// =========================================================================
// Dataset views
// =========================================================================

fn three_channels() -> Dataset {
    let text = "time,channel,login,body\n\
                2024-02-10 12:00:00,Retro,a,1\n\
                2024-02-11 12:00:00,general,b,2\n\
                2024-02-09 12:00:00,general,c,3\n\
                2024-02-12 12:00:00,Speedruns,d,4\n\
                2024-02-13 12:00:00,general,e,5\n";
    load_text(text, "chat.txt").unwrap()
}

#[test]
fn test_channels_sorted_by_count_then_first_seen() {
    let dataset = three_channels();
    let names: Vec<(String, usize)> = dataset
        .channels()
        .into_iter()
        .map(|c| (c.name, c.count))
        .collect();
    assert_eq!(
        names,
        vec![
            ("general".to_string(), 3),
            ("Retro".to_string(), 1),
            ("Speedruns".to_string(), 1),
        ]
    );
}

#[test]
fn test_filter_channels() {
    let dataset = three_channels();
    let hits = dataset.filter_channels("RE");
    let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Retro"]);
    assert_eq!(dataset.filter_channels("").len(), 3);
    assert!(dataset.filter_channels("nope").is_empty());
}

#[test]
fn test_first_channel_and_bounds() {
    let dataset = three_channels();
    assert_eq!(dataset.first_channel(), Some("Retro"));

    let (earliest, latest) = dataset.date_bounds().unwrap();
    assert_eq!(earliest, local(2024, 2, 9, 12, 0, 0));
    assert_eq!(latest, local(2024, 2, 13, 12, 0, 0));

    let stats = dataset.stats();
    assert_eq!(stats.total_messages, 5);
    assert_eq!(stats.total_channels, 3);
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn test_query_date_range_inclusive() {
    let dataset = three_channels();
    let filter = QueryFilter::new()
        .with_date_from("2024-02-11")
        .unwrap()
        .with_date_to("2024-02-13")
        .unwrap();
    let hits = query(&dataset, "general", &filter);
    let bodies: Vec<&str> = hits.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["2", "5"]);
}

#[test]
fn test_query_end_of_day_is_inclusive() {
    let text = "time,channel,login,body\n\
                2024-02-11 23:59:59,general,a,late\n\
                2024-02-12 00:00:00,general,b,next day\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    let filter = QueryFilter::new().with_date_to("2024-02-11").unwrap();
    let hits = query(&dataset, "general", &filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].message, "late");
}

#[test]
fn test_query_search_matches_username_too() {
    let text = "time,channel,login,body\n\
                2024-01-01 10:00:00,general,HelloKitty,meow\n\
                2024-01-01 10:01:00,general,bob,say HELLO\n\
                2024-01-01 10:02:00,general,carol,bye\n";
    let dataset = load_text(text, "chat.txt").unwrap();
    let hits = query(&dataset, "general", &QueryFilter::new().with_search("hello"));
    assert_eq!(hits.len(), 2);
    assert!(!is_highlighted(&hits[0].message, "hello"));
    assert!(is_highlighted(&hits[1].message, "hello"));
}

#[test]
fn test_query_composition_empty_not_error() {
    let dataset = three_channels();
    let filter = QueryFilter::new()
        .with_search("5")
        .with_date_to("2024-02-01")
        .unwrap();
    assert!(query(&dataset, "general", &filter).is_empty());
    assert!(query(&dataset, "no-such-channel", &QueryFilter::new()).is_empty());
}

#[test]
fn test_invalid_date_bound() {
    let err = QueryFilter::new().with_date_from("01/02/2024").unwrap_err();
    assert!(err.is_invalid_date());
}

// =========================================================================
// Session
// =========================================================================

#[test]
fn test_session_last_load_wins() {
    let session = ChatSession::with_clock(IngestConfig::default(), fixed_clock(frozen()));
    let first = session
        .load(b"time,channel,login,body\n2024-01-01 10:00:00,a,u,one\n", "one.txt")
        .unwrap();
    session
        .load(b"time,channel,login,body\n2024-01-01 10:00:00,b,u,two\n", "two.txt")
        .unwrap();

    assert_eq!(first.first_channel(), Some("a"));
    assert_eq!(session.current().unwrap().first_channel(), Some("b"));
    assert_eq!(session.query("b", &QueryFilter::new())[0].message, "two");
}

#[test]
fn test_session_error_keeps_dataset() {
    let session = ChatSession::default();
    session
        .load(b"time,channel,login,body\n2024-01-01 10:00:00,a,u,one\n", "one.txt")
        .unwrap();

    let err = session.load(&[0xff, 0xfe, 0x00], "broken.txt").unwrap_err();
    assert!(err.is_decode());
    assert_eq!(session.current().unwrap().len(), 1);
}

// =========================================================================
// Errors
// =========================================================================

#[test]
fn test_unsupported_extension() {
    let err = load_text("anything", "chat.json").unwrap_err();
    assert!(err.is_unsupported_format());
    assert!(err.to_string().contains("json"));
}

#[test]
fn test_no_admitted_rows() {
    let err = load_text("time,channel,login,body\n,,,\n", "chat.txt").unwrap_err();
    assert!(err.is_empty_dataset());
}

#[cfg(feature = "spreadsheet")]
#[test]
fn test_workbook_fixture_end_to_end() {
    // Committed workbook: a date-formatted time cell, a row with neither
    // login nor channel, an anonymous row, a body-less row, a second sheet
    let bytes = fs::read("tests/fixtures/chat_messages.xlsx").unwrap();
    let dataset = load(&bytes, "chat_messages.xlsx", &IngestConfig::default(), fixed_clock(frozen()))
        .unwrap();

    let report = dataset.report();
    assert_eq!(report.format, InputFormat::Spreadsheet);
    assert_eq!(report.path, ParserPath::Spreadsheet);
    assert_eq!(report.rows_admitted, 5);
    assert_eq!(report.messages_kept, 3);
    assert_eq!(report.messages_rejected, 2);

    // Both defaulted identity fields and the empty body are dropped
    assert!(dataset.messages().iter().all(|m| m.message != "orphan message"));
    assert!(dataset.messages().iter().all(|m| m.username != "carol"));
    assert!(dataset.messages().iter().all(is_valid));

    let names: Vec<String> = dataset.channels().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["general", "retro"]);

    let general = dataset.channel_messages("general");
    assert_eq!(general[0].username, "alice");
    assert_eq!(general[0].message, "hello from a sheet");
    assert_eq!(general[0].timestamp, local(2023, 1, 1, 12, 0, 0));
    assert_eq!(general[0].user_id.as_deref(), Some("1001"));
    assert_eq!(general[1].username, DEFAULT_USERNAME);
    assert_eq!(general[1].timestamp, local(2023, 1, 1, 12, 10, 0));

    // Only the first sheet is read
    assert!(dataset.channel_messages("hidden").is_empty());
}

#[test]
fn test_corrupt_spreadsheet_is_decode_error() {
    let err = load_text("definitely not a zip archive", "chat.xlsx").unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn test_utf8_bom_is_ignored() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"time,channel,login,body\n2024-01-01 10:00:00,general,alice,hi\n");
    let dataset = load(&bytes, "chat.txt", &IngestConfig::default(), system_clock()).unwrap();
    assert_eq!(dataset.messages()[0].username, "alice");
}
