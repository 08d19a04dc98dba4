//! Row source: lazily pulls data rows off the CSV reader, one at a time.

use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use std::iter::FusedIterator;

use crate::Job;
use crate::error::IngestError;

/// Build the underlying CSV reader. Headers are handled by [`read_header`](super::read_header)
/// and rows may be ragged; cardinality is checked by the workers, not here.
pub fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader)
}

/// Finite, non-restartable sequence of rows read after the header.
///
/// Yields `Ok(job)` per row. Cells are decoded lossily, so bad UTF-8 in one row only costs that
/// row's bytes (replaced with U+FFFD) and never the rows after it. End of input ends the sequence
/// quietly. An I/O failure is yielded once as [`IngestError::UpstreamReadFailure`] and the source
/// stops; the underlying reader is never touched again.
pub struct RowSource<R> {
    rdr: csv::Reader<R>,
    record: ByteRecord,
    last_line: u64,
    rows_read: usize,
    finished: bool,
}

impl<R: Read> RowSource<R> {
    /// Wrap a reader that has already had its header consumed.
    pub fn new(rdr: csv::Reader<R>) -> Self {
        let last_line = rdr.position().line().saturating_sub(1);
        Self {
            rdr,
            record: ByteRecord::new(),
            last_line,
            rows_read: 0,
            finished: false,
        }
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }
}

impl<R: Read> Iterator for RowSource<R> {
    type Item = Result<Job, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.rdr.read_byte_record(&mut self.record) {
            Ok(true) => {
                let line = self
                    .record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(self.last_line + 1);
                self.last_line = line;
                self.rows_read += 1;
                let row = self
                    .record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect();
                Some(Ok(Job { line, row }))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(IngestError::UpstreamReadFailure {
                    line: self.last_line,
                    message: e.to_string(),
                }))
            }
        }
    }
}

impl<R: Read> FusedIterator for RowSource<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::read_header;
    use std::io;

    /// Serves `data`, then fails every read after it.
    struct BrokenPipe {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_yields_rows_with_line_numbers() {
        let mut rdr = csv_reader("a,b\n1,2\n3\n".as_bytes(), b',');
        read_header(&mut rdr).unwrap();
        let mut src = RowSource::new(rdr);
        let first = src.next().unwrap().unwrap();
        assert_eq!((first.line, first.row), (2, vec!["1".into(), "2".into()]));
        let second = src.next().unwrap().unwrap();
        assert_eq!((second.line, second.row), (3, vec!["3".into()]));
        assert!(src.next().is_none());
        assert_eq!(src.rows_read(), 2);
    }

    #[test]
    fn test_read_failure_is_reported_once() {
        let data = b"a,b\n1,2\n".to_vec();
        let mut rdr = csv_reader(
            BrokenPipe {
                data: io::Cursor::new(data),
            },
            b',',
        );
        read_header(&mut rdr).unwrap();
        let items: Vec<_> = RowSource::new(rdr).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(IngestError::UpstreamReadFailure { line, message }) => {
                assert_eq!(*line, 2);
                assert!(message.contains("pipe closed"));
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_row_does_not_end_source() {
        let mut rdr = csv_reader(&b"a,b\n1,2\n\xff\xfe,x\n3,4\n"[..], b',');
        read_header(&mut rdr).unwrap();
        let rows: Vec<Job> = RowSource::new(rdr).map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].row, vec!["\u{fffd}\u{fffd}".to_string(), "x".to_string()]);
        assert_eq!(rows[2].row, vec!["3".to_string(), "4".to_string()]);
    }
}
