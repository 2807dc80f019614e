//! Replay of CANARY-format CAN log captures, so historical module traffic
//! can drive the controller with no bus attached.
//!
//! The reader is fed one byte at a time and tokenizes the whitespace
//! separated columns of each log line: timestamp in microseconds, an
//! optional bus number, hex identifier, hex flags, decimal length, then the
//! data bytes in hex. Lines starting with `;` are comments. A full line
//! yields a [`LogRecord`]; a broken line yields a typed error and the
//! reader resynchronizes on its own.
use crate::error::ReplayError;
use crate::protocol::can_frame::Frame;

/// Widest column is the zero-padded microsecond timestamp.
const TOKEN_CAPACITY: usize = 11;

//==================================================================================Records

/// One tokenized log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    /// Capture timestamp (microseconds).
    pub timestamp_us: u32,
    /// Frame identifier.
    pub id: u32,
    /// Logger flag byte; carried through, not interpreted.
    pub flags: u8,
    /// Data length code (0 to 8).
    pub len: u8,
    /// Payload bytes.
    pub data: [u8; 8],
}

impl LogRecord {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        id: 0,
        flags: 0,
        len: 0,
        data: [0; 8],
    };

    /// The wire frame this record describes, with the timestamp dropped.
    pub fn frame(&self) -> Frame {
        Frame {
            id: self.id,
            len: self.len,
            data: self.data,
        }
    }
}

/// Result of feeding one byte to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Byte absorbed; the current line is still incomplete.
    Consumed,
    /// A full log line was tokenized.
    FrameReady(LogRecord),
    /// The current line is unparseable; the reader has resynchronized.
    Failed(ReplayError),
}

/// Column of a log line currently being tokenized. Doubles as the error
/// location in [`ReplayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Timestamp,
    BusNumber,
    Id,
    Flags,
    Len,
    Data,
}

impl Column {
    /// Radix, minimum digits, and maximum digits of the column's token.
    fn shape(self) -> (u32, u8, u8) {
        match self {
            Column::Timestamp => (10, 10, 11),
            Column::BusNumber => (10, 1, 1),
            Column::Id => (16, 8, 8),
            Column::Flags => (16, 2, 2),
            Column::Len => (10, 1, 1),
            Column::Data => (16, 2, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// Discarding a comment or the remains of a broken line.
    SkipLine,
    /// Accumulating the token of one column.
    Token(Column),
}

//==================================================================================Reader

/// Byte-fed tokenizer for one log stream.
#[derive(Debug)]
pub struct LogReader {
    state: ReaderState,
    token: [u8; TOKEN_CAPACITY],
    token_len: u8,
    record: LogRecord,
    data_index: u8,
    total_frames: u32,
    /// Captures from the two-bus logger carry a bus-number column after
    /// the timestamp; set this to tokenize (and discard) it.
    pub common_log: bool,
}

impl LogReader {
    pub const fn new() -> Self {
        Self {
            state: ReaderState::Token(Column::Timestamp),
            token: [0; TOKEN_CAPACITY],
            token_len: 0,
            record: LogRecord::EMPTY,
            data_index: 0,
            total_frames: 0,
            common_log: false,
        }
    }

    /// Number of complete records produced so far.
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Feed one byte of the capture stream.
    pub fn push_byte(&mut self, byte: u8) -> ReplayOutcome {
        if byte == b';' {
            self.token_len = 0;
            self.state = ReaderState::SkipLine;
            return ReplayOutcome::Consumed;
        }

        match self.state {
            ReaderState::SkipLine => {
                if byte == b'\n' {
                    self.state = ReaderState::Token(Column::Timestamp);
                }
                ReplayOutcome::Consumed
            }
            ReaderState::Token(column) => self.token_byte(column, byte),
        }
    }

    fn token_byte(&mut self, column: Column, byte: u8) -> ReplayOutcome {
        // Some captures carry a fractional microsecond marker; drop it.
        if column == Column::Timestamp && byte == b'.' {
            return ReplayOutcome::Consumed;
        }
        if byte == b'\n' {
            return self.end_of_line(column);
        }
        if byte.is_ascii_whitespace() {
            if self.token_len == 0 {
                // Separator run between columns.
                return ReplayOutcome::Consumed;
            }
            return self.finish_token(column);
        }

        let (radix, _, max) = column.shape();
        let digit_ok = match radix {
            16 => byte.is_ascii_hexdigit(),
            _ => byte.is_ascii_digit(),
        };
        if !digit_ok {
            return self.fail(ReplayError::BadCharacter { column });
        }
        if self.token_len >= max {
            return self.fail(ReplayError::Overflow { column });
        }
        self.token[self.token_len as usize] = byte;
        self.token_len += 1;
        ReplayOutcome::Consumed
    }

    /// A newline legitimately terminates the final data byte of a record,
    /// or an entirely blank line; anywhere else it means the line was
    /// truncated, and parsing restarts at the timestamp column.
    fn end_of_line(&mut self, column: Column) -> ReplayOutcome {
        if column == Column::Data && self.token_len > 0 && self.data_index + 1 == self.record.len {
            return self.finish_token(column);
        }
        if column == Column::Timestamp && self.token_len == 0 {
            return ReplayOutcome::Consumed;
        }
        self.token_len = 0;
        self.state = ReaderState::Token(Column::Timestamp);
        ReplayOutcome::Failed(ReplayError::UnexpectedNewline { column })
    }

    fn fail(&mut self, error: ReplayError) -> ReplayOutcome {
        self.token_len = 0;
        self.state = ReaderState::SkipLine;
        ReplayOutcome::Failed(error)
    }

    fn finish_token(&mut self, column: Column) -> ReplayOutcome {
        let (radix, min, _) = column.shape();
        if self.token_len < min {
            return self.fail(ReplayError::Incomplete { column });
        }

        let text = match core::str::from_utf8(&self.token[..self.token_len as usize]) {
            Ok(text) => text,
            // Unreachable: only ASCII digits are accumulated.
            Err(_) => return self.fail(ReplayError::BadCharacter { column }),
        };
        let value = match u32::from_str_radix(text, radix) {
            Ok(value) => value,
            Err(_) => return self.fail(ReplayError::Overflow { column }),
        };

        self.token_len = 0;
        self.advance(column, value)
    }

    fn advance(&mut self, column: Column, value: u32) -> ReplayOutcome {
        match column {
            Column::Timestamp => {
                self.record.timestamp_us = value;
                self.state = ReaderState::Token(if self.common_log {
                    Column::BusNumber
                } else {
                    Column::Id
                });
            }
            Column::BusNumber => {
                // Tokenized but not kept; replays are single-bus.
                self.state = ReaderState::Token(Column::Id);
            }
            Column::Id => {
                self.record.id = value;
                self.state = ReaderState::Token(Column::Flags);
            }
            Column::Flags => {
                self.record.flags = value as u8;
                self.state = ReaderState::Token(Column::Len);
            }
            Column::Len => {
                if value > 8 {
                    return self.fail(ReplayError::Overflow { column });
                }
                self.record.len = value as u8;
                self.record.data = [0; 8];
                self.data_index = 0;
                if value == 0 {
                    return self.complete_record();
                }
                self.state = ReaderState::Token(Column::Data);
            }
            Column::Data => {
                self.record.data[self.data_index as usize] = value as u8;
                self.data_index += 1;
                if self.data_index >= self.record.len {
                    return self.complete_record();
                }
            }
        }
        ReplayOutcome::Consumed
    }

    fn complete_record(&mut self) -> ReplayOutcome {
        self.total_frames += 1;
        self.state = ReaderState::Token(Column::Timestamp);
        ReplayOutcome::FrameReady(self.record)
    }
}

impl Default for LogReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
