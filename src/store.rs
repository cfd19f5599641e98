//! Lazily materialized line buffer over an input stream.
//!
//! Lines are read from the upstream reader one at a time, only when an index
//! at the end of the materialized range is requested. Indices are stable once
//! assigned; the store only appends, and edits replace content in place.

use std::io::BufRead;

use crate::text::Terminator;

/// One buffered line: content with its original terminator split off.
///
/// `content` never contains the terminator bytes; `raw()` reassembles the
/// line exactly as the stream delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    content: String,
    terminator: Terminator,
}

impl Line {
    pub fn new(content: impl Into<String>, terminator: Terminator) -> Self {
        Self {
            content: content.into(),
            terminator,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// The line as the stream carried it, terminator included.
    pub fn raw(&self) -> String {
        format!("{}{}", self.content, self.terminator.as_str())
    }
}

/// Append-only sequence of lines fed on demand from a reader.
pub struct LineStore<R> {
    lines: Vec<Line>,
    reader: R,
    exhausted: bool,
}

impl<R: BufRead> LineStore<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Vec::new(),
            reader,
            exhausted: false,
        }
    }

    /// Number of lines materialized so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Has the upstream reader reported end-of-stream?
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Access a materialized line without touching the stream.
    pub fn peek(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Fetch the line at `index`, reading from the stream if `index` is
    /// exactly one past the materialized range.
    ///
    /// This is the only operation that performs stream I/O, and it reads at
    /// most one line per call - there is no read-ahead. Returns `None` for
    /// indices beyond the next unread line, or once the stream is exhausted.
    /// A partial final line (bytes with no trailing newline) is returned with
    /// [`Terminator::None`] and marks the store exhausted.
    pub fn get(&mut self, index: usize) -> Option<&Line> {
        if index < self.lines.len() {
            return self.lines.get(index);
        }
        if index > self.lines.len() || self.exhausted {
            return None;
        }
        self.read_next()
    }

    fn read_next(&mut self) -> Option<&Line> {
        let mut raw = Vec::new();
        match self.reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                self.exhausted = true;
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                // An unreadable stream is treated as end-of-stream; the
                // lines read so far stay editable.
                tracing::warn!("input read failed: {}", e);
                self.exhausted = true;
                return None;
            }
        }
        let raw = String::from_utf8_lossy(&raw);
        let (content, terminator) = Terminator::split(&raw);
        if terminator == Terminator::None {
            // No trailing newline means the reader stopped at end-of-stream.
            self.exhausted = true;
        }
        self.lines.push(Line::new(content, terminator));
        self.lines.last()
    }

    /// Fetch the line at `index` for editing, materializing an empty
    /// terminator-less line when the cursor has stepped one past the last
    /// line of an exhausted stream.
    ///
    /// The cursor only ever moves one line at a time, so `index` is at most
    /// one past the materialized range.
    pub fn line_for_edit(&mut self, index: usize) -> &Line {
        if self.get(index).is_none() {
            debug_assert_eq!(index, self.lines.len());
            self.lines.push(Line::new("", Terminator::None));
        }
        &self.lines[index]
    }

    /// Replace the content of an already-materialized line, preserving its
    /// stored terminator.
    pub fn set(&mut self, index: usize, content: impl Into<String>) {
        self.lines[index].content = content.into();
    }
}
