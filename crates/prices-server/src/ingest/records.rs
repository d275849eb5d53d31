//! Strict CSV record reading
//!
//! The `csv` crate keeps stray quotes (`a"b`, `"a"b`) as field text. Records
//! like that are rejected here by re-scanning the raw bytes of each record
//! after the tokenizer has split it.
//!
//! Raw bytes are captured by a tee in front of the tokenizer. Only the bytes
//! of the record being checked (plus the tokenizer's read-ahead) are held.

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use csv::{ByteRecord, ReaderBuilder, StringRecord};

use super::validator::RejectReason;

struct Tee<R> {
    inner: R,
    window: Rc<RefCell<Vec<u8>>>,
}

impl<R: Read> Read for Tee<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.window.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Headerless CSV reader that rejects malformed quoting and invalid UTF-8
pub struct RecordReader<R> {
    csv: csv::Reader<Tee<R>>,
    window: Rc<RefCell<Vec<u8>>>,
    /// Stream offset of `window[0]`
    window_start: u64,
    raw: ByteRecord,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        let window = Rc::new(RefCell::new(Vec::new()));
        let csv = ReaderBuilder::new().has_headers(false).from_reader(Tee {
            inner,
            window: Rc::clone(&window),
        });

        Self {
            csv,
            window,
            window_start: 0,
            raw: ByteRecord::new(),
        }
    }

    /// Read the next record into `record`
    ///
    /// `Ok(None)` at end of input, `Ok(Some(Err(_)))` for a record that was
    /// tokenized but rejected. Only I/O failures of the stream are `Err`.
    pub fn read(
        &mut self,
        record: &mut StringRecord,
    ) -> io::Result<Option<Result<(), RejectReason>>> {
        let outcome = match self.csv.read_byte_record(&mut self.raw) {
            Ok(false) => return Ok(None),
            Ok(true) => self.check_quoting().and_then(|()| self.decode(record)),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => Err(RejectReason::Unparseable(err.to_string())),
        };

        self.release();
        Ok(Some(outcome))
    }

    fn check_quoting(&self) -> Result<(), RejectReason> {
        let end = self.csv.position().byte().saturating_sub(self.window_start) as usize;
        let window = self.window.borrow();
        match window.get(..end) {
            Some(raw) => check_quoting(raw),
            None => Ok(()),
        }
    }

    fn decode(&mut self, record: &mut StringRecord) -> Result<(), RejectReason> {
        match StringRecord::from_byte_record(std::mem::take(&mut self.raw)) {
            Ok(decoded) => {
                *record = decoded;
                Ok(())
            },
            Err(err) => {
                let reason = RejectReason::Unparseable(err.utf8_error().to_string());
                self.raw = err.into_byte_record();
                Err(reason)
            },
        }
    }

    /// Drop the bytes of every record read so far
    fn release(&mut self) {
        let upto = self.csv.position().byte();
        let mut window = self.window.borrow_mut();
        let consumed = (upto.saturating_sub(self.window_start) as usize).min(window.len());
        window.drain(..consumed);
        self.window_start += consumed as u64;
    }
}

/// Reject quotes a strict RFC 4180 reader would refuse
///
/// A `"` may only open a field, close it right before a delimiter or the end
/// of the record, or appear doubled inside a quoted field.
pub fn check_quoting(raw: &[u8]) -> Result<(), RejectReason> {
    let raw = trim_line_breaks(raw);
    let raw = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw);
    let mut i = 0;
    let mut at_field_start = true;

    while i < raw.len() {
        if at_field_start && raw[i] == b'"' {
            i += 1;
            loop {
                match (raw.get(i), raw.get(i + 1)) {
                    (None, _) => return Err(quote_error("unterminated quoted field")),
                    (Some(b'"'), Some(b'"')) => i += 2,
                    (Some(b'"'), Some(b',')) => {
                        i += 2;
                        break;
                    },
                    (Some(b'"'), None) => {
                        i += 1;
                        break;
                    },
                    (Some(b'"'), Some(_)) => {
                        return Err(quote_error("extraneous \" after quoted field"))
                    },
                    (Some(_), _) => i += 1,
                }
            }
        } else {
            match raw[i] {
                b',' => at_field_start = true,
                b'"' => return Err(quote_error("bare \" in unquoted field")),
                _ => at_field_start = false,
            }
            i += 1;
        }
    }

    Ok(())
}

fn quote_error(message: &str) -> RejectReason {
    RejectReason::Unparseable(message.to_string())
}

fn trim_line_breaks(raw: &[u8]) -> &[u8] {
    let is_break = |b: &u8| *b == b'\n' || *b == b'\r';
    let start = raw.iter().position(|b| !is_break(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_break(b)).map_or(start, |i| i + 1);
    &raw[start..end]
}
