//! `du` report parsing.
//!
//! A report holds one record per line with exactly three tab-separated
//! fields, as produced by `du -ak --time`:
//!
//! ```text
//! <size KB>\t<YYYY-MM-DD HH:MM>\t<path/segments>
//! ```

use std::io::{self, BufRead};

use chrono::NaiveDateTime;

use crate::error::LineError;

/// Modification time layout used by `du --time`.
pub const MODIFIED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Separator between path segments in a report.
pub const PATH_SEPARATOR: char = '/';

/// One parsed report record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub size_kb: u64,
    /// Seconds since the Unix epoch (UTC).
    pub modified: i64,
    /// Path segments in root-to-leaf order, never empty.
    pub segments: Vec<String>,
}

impl ReportLine {
    /// Returns the final path segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns the segments preceding the final one.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    /// Rejoins the segments with `/`.
    pub fn joined_path(&self) -> String {
        self.segments.join("/")
    }
}

/// Decodes one raw report line and parses it.
///
/// Names that are not valid UTF-8 are rejected instead of being decoded
/// lossily, so two distinct names can never collapse into one.
pub fn parse_bytes(raw: &[u8]) -> Result<ReportLine, LineError> {
    let line = std::str::from_utf8(raw).map_err(|e| LineError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    parse_line(line)
}

/// Parses a single report line.
pub fn parse_line(raw: &str) -> Result<ReportLine, LineError> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    let fields: Vec<&str> = line.split('\t').collect();
    let [size, modified, path] = fields.as_slice() else {
        return Err(LineError::InvalidFieldCount {
            found: fields.len(),
            line: line.to_string(),
        });
    };

    let size_kb = size
        .parse::<u64>()
        .map_err(|e| LineError::InvalidSize {
            value: size.to_string(),
            reason: e.to_string(),
        })?;

    let modified = NaiveDateTime::parse_from_str(modified, MODIFIED_TIME_FORMAT)
        .map_err(|e| LineError::InvalidTimestamp {
            value: modified.to_string(),
            reason: e.to_string(),
        })?
        .and_utc()
        .timestamp();

    let segments = split_path(path);
    if segments.is_empty() {
        return Err(LineError::EmptyPath);
    }

    Ok(ReportLine {
        size_kb,
        modified,
        segments,
    })
}

/// Splits a report path into segments, dropping trailing empty ones.
///
/// A leading empty segment (absolute path) is kept: it names the root.
fn split_path(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = path.split(PATH_SEPARATOR).map(str::to_string).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    if segments.is_empty() && path.starts_with(PATH_SEPARATOR) {
        // "/" on its own is the filesystem root.
        segments.push(String::new());
    }
    segments
}

/// Iterator over the raw lines of a report, numbered from 1.
///
/// Lines are yielded as bytes without the trailing newline; I/O failures
/// are yielded as errors.
pub struct ReportLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> ReportLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for ReportLines<R> {
    type Item = io::Result<(usize, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                Some(Ok((self.line_no, self.buf.clone())))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_well_formed_line() {
        let line = parse_line("8160\t2023-04-08 12:03\t./pytest").unwrap();
        assert_eq!(line.size_kb, 8160);
        assert_eq!(line.modified, 1680955380);
        assert_eq!(line.segments, vec![".", "pytest"]);
        assert_eq!(line.name(), "pytest");
        assert_eq!(line.parent_segments(), &[".".to_string()]);
    }

    #[test]
    fn strips_carriage_return() {
        let line = parse_line("4\t2023-04-08 12:03\t./a\r").unwrap();
        assert_eq!(line.segments, vec![".", "a"]);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_line("4\t./a").unwrap_err();
        assert!(matches!(err, LineError::InvalidFieldCount { found: 2, .. }));

        let err = parse_line("4\t2023-04-08 12:03\t./a\textra").unwrap_err();
        assert!(matches!(err, LineError::InvalidFieldCount { found: 4, .. }));
    }

    #[test]
    fn rejects_bad_size() {
        assert!(matches!(
            parse_line("4k\t2023-04-08 12:03\t./a"),
            Err(LineError::InvalidSize { .. })
        ));
        assert!(matches!(
            parse_line("-4\t2023-04-08 12:03\t./a"),
            Err(LineError::InvalidSize { .. })
        ));
    }

    #[test]
    fn rejects_bad_timestamp() {
        assert!(matches!(
            parse_line("4\t2023-04-08T12:03\t./a"),
            Err(LineError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_line("4\t2023-04-08\t./a"),
            Err(LineError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn empty_path_is_structural_error() {
        let err = parse_line("4\t2023-04-08 12:03\t").unwrap_err();
        assert_eq!(err, LineError::EmptyPath);
    }

    #[test]
    fn trailing_separator_is_dropped() {
        let line = parse_line("4\t2023-04-08 12:03\ta/b/").unwrap();
        assert_eq!(line.segments, vec!["a", "b"]);
    }

    #[test]
    fn absolute_paths_keep_empty_root_segment() {
        let line = parse_line("4\t2023-04-08 12:03\t/usr/lib").unwrap();
        assert_eq!(line.segments, vec!["", "usr", "lib"]);

        let root = parse_line("4\t2023-04-08 12:03\t/").unwrap();
        assert_eq!(root.segments, vec![""]);
    }

    #[test]
    fn rejects_padded_fields() {
        assert!(matches!(
            parse_line(" 4\t2023-04-08 12:03\t./a"),
            Err(LineError::InvalidSize { .. })
        ));
        assert!(matches!(
            parse_line("4 \t2023-04-08 12:03\t./a"),
            Err(LineError::InvalidSize { .. })
        ));
        assert!(matches!(
            parse_line("4\t2023-04-08 12:03 \t./a"),
            Err(LineError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn report_lines_numbers_raw_lines() {
        let data = b"1\t2023-04-08 12:03\ta/x\n2\t2023-04-08 12:03\ta/\xff\nlast".to_vec();
        let lines: Vec<_> = ReportLines::new(Cursor::new(data))
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (1, b"1\t2023-04-08 12:03\ta/x".to_vec()));
        assert_eq!(lines[1], (2, b"2\t2023-04-08 12:03\ta/\xff".to_vec()));
        assert_eq!(lines[2], (3, b"last".to_vec()));
    }

    #[test]
    fn invalid_utf8_is_a_line_error() {
        let err = parse_bytes(b"10\t2023-04-08 12:03\t./d/\xff").unwrap_err();
        assert_eq!(err, LineError::InvalidUtf8 { valid_up_to: 24 });

        let line = parse_bytes("10\t2023-04-08 12:03\t./d/é".as_bytes()).unwrap();
        assert_eq!(line.name(), "é");
    }
}
