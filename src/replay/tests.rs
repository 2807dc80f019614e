//! Tokenizer tests: the capture happy path, every error flag, and
//! resynchronization after broken lines.
use super::*;
use crate::error::ReplayError;

/// Feed a whole string, returning the records produced and the first error
/// encountered, if any.
fn feed(reader: &mut LogReader, text: &str) -> ([Option<LogRecord>; 4], Option<ReplayError>) {
    let mut records = [None; 4];
    let mut produced = 0;
    let mut first_error = None;

    for &byte in text.as_bytes() {
        match reader.push_byte(byte) {
            ReplayOutcome::Consumed => {}
            ReplayOutcome::FrameReady(record) => {
                records[produced] = Some(record);
                produced += 1;
            }
            ReplayOutcome::Failed(error) => {
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }
    (records, first_error)
}

#[test]
fn tokenizes_one_capture_line() {
    let mut reader = LogReader::new();
    let (records, error) = feed(
        &mut reader,
        "00069992088 00000207 00 8 00 00 00 00 C8 00 04 00\n",
    );

    assert_eq!(error, None);
    let record = records[0].expect("one record");
    assert_eq!(record.timestamp_us, 69_992_088);
    assert_eq!(record.id, 0x207);
    assert_eq!(record.flags, 0);
    assert_eq!(record.len, 8);
    assert_eq!(
        record.data,
        [0x00, 0x00, 0x00, 0x00, 0xC8, 0x00, 0x04, 0x00]
    );
    assert_eq!(reader.total_frames(), 1);

    let frame = record.frame();
    assert_eq!(frame.id, 0x207);
    assert_eq!(frame.data[4], 0xC8);
}

#[test]
fn skips_comment_and_header_lines() {
    let mut reader = LogReader::new();
    let (records, error) = feed(
        &mut reader,
        ";CANARY V2.3\n;TIME_us.d  ID       FL L DATA\n0000001000 00000217 00 1 02\n",
    );

    assert_eq!(error, None);
    let record = records[0].expect("one record");
    assert_eq!(record.id, 0x217);
    assert_eq!(record.len, 1);
    assert_eq!(record.data[0], 0x02);
}

#[test]
fn common_log_carries_a_bus_column() {
    let mut reader = LogReader::new();
    reader.common_log = true;
    let (records, error) = feed(&mut reader, "0000001000 1 00000247 00 2 44 7D\n");

    assert_eq!(error, None);
    let record = records[0].expect("one record");
    assert_eq!(record.id, 0x247);
    assert_eq!(record.data[0], 0x44);
    assert_eq!(record.data[1], 0x7D);
}

#[test]
fn timestamp_fraction_marker_is_dropped() {
    let mut reader = LogReader::new();
    let (records, error) = feed(&mut reader, "0000001000.5 00000207 00 1 AA\n");

    assert_eq!(error, None);
    // Digits around the dot collapse into one timestamp token.
    assert_eq!(records[0].unwrap().timestamp_us, 10_005);
}

#[test]
fn blank_lines_and_crlf_are_tolerated() {
    let mut reader = LogReader::new();
    let (records, error) = feed(
        &mut reader,
        "\n0000001000 00000207 00 1 AA\r\n\n0000002000 00000217 00 1 BB\r\n",
    );

    assert_eq!(error, None);
    assert_eq!(records[0].unwrap().data[0], 0xAA);
    assert_eq!(records[1].unwrap().data[0], 0xBB);
    assert_eq!(reader.total_frames(), 2);
}

//==================================================================================Error paths

#[test]
fn short_token_reports_incomplete_and_resyncs() {
    let mut reader = LogReader::new();
    let (records, error) = feed(
        &mut reader,
        "0000001000 0207 00 1 AA\n0000002000 00000217 00 1 BB\n",
    );

    assert_eq!(error, Some(ReplayError::Incomplete { column: Column::Id }));
    // The broken line produced nothing; the next one parsed cleanly.
    assert_eq!(records[0].unwrap().id, 0x217);
    assert_eq!(reader.total_frames(), 1);
}

#[test]
fn oversized_token_reports_overflow() {
    let mut reader = LogReader::new();
    let (_, error) = feed(&mut reader, "0000001000 000000207 00 1 AA\n");

    assert_eq!(error, Some(ReplayError::Overflow { column: Column::Id }));
}

#[test]
fn truncated_line_reports_unexpected_newline() {
    let mut reader = LogReader::new();
    let (records, error) = feed(
        &mut reader,
        "0000001000 00000207 00\n0000002000 00000217 00 1 BB\n",
    );

    assert_eq!(
        error,
        Some(ReplayError::UnexpectedNewline {
            column: Column::Flags
        })
    );
    assert_eq!(records[0].unwrap().id, 0x217);
}

#[test]
fn truncated_data_reports_unexpected_newline() {
    let mut reader = LogReader::new();
    let (_, error) = feed(&mut reader, "0000001000 00000207 00 8 AA BB\n");

    assert_eq!(
        error,
        Some(ReplayError::UnexpectedNewline {
            column: Column::Data
        })
    );
}

#[test]
fn length_above_eight_reports_overflow() {
    let mut reader = LogReader::new();
    let (_, error) = feed(&mut reader, "0000001000 00000207 00 9 AA\n");

    assert_eq!(error, Some(ReplayError::Overflow { column: Column::Len }));
}

#[test]
fn non_digit_reports_bad_character() {
    let mut reader = LogReader::new();
    let (_, error) = feed(&mut reader, "0000001000 00000207 00 1 ZZ\n");

    assert_eq!(
        error,
        Some(ReplayError::BadCharacter {
            column: Column::Data
        })
    );
}
