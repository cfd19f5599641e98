//! Width-aware text shaping: tab expansion, column truncation, and
//! line-terminator handling.
//!
//! All measurements are in terminal display columns, not bytes or chars:
//! most glyphs occupy one column, East-Asian wide glyphs occupy two,
//! control characters occupy none.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Tab stops sit every 4 display columns.
pub const TAB_STOP: usize = 4;

/// The byte sequence that originally trailed a line of input.
///
/// Preserved per line so an edit writes back exactly the terminator the
/// stream had. `None` marks the final, newline-less line of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    None,
    Lf,
    CrLf,
    Cr,
}

impl Terminator {
    /// Split a raw line into its content and trailing terminator.
    ///
    /// Recognizes `"\r\n"` first, then a lone trailing `"\n"`, then a lone
    /// trailing `"\r"`. The split is invertible: `content` plus
    /// [`Terminator::as_str`] reproduces `raw` exactly.
    pub fn split(raw: &str) -> (&str, Terminator) {
        if let Some(content) = raw.strip_suffix("\r\n") {
            (content, Terminator::CrLf)
        } else if let Some(content) = raw.strip_suffix('\n') {
            (content, Terminator::Lf)
        } else if let Some(content) = raw.strip_suffix('\r') {
            (content, Terminator::Cr)
        } else {
            (raw, Terminator::None)
        }
    }

    /// Canonical byte rendering of this terminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Terminator::None => "",
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
            Terminator::Cr => "\r",
        }
    }

    /// Marker glyph drawn after a line that leaves columns to spare.
    ///
    /// One visually distinct glyph per terminator kind; a terminator-less
    /// line gets no marker.
    pub fn glyph(self) -> Option<char> {
        match self {
            Terminator::None => None,
            Terminator::Lf => Some('\u{2B63}'),   // downwards arrow
            Terminator::CrLf => Some('\u{2936}'), // arrow down, curving left
            Terminator::Cr => Some('\u{2B60}'),   // leftwards arrow
        }
    }
}

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Replace each tab with spaces up to the next [`TAB_STOP`] column.
///
/// Column positions are measured in display width, so a wide glyph before a
/// tab advances the stop by two columns. Idempotent: the output contains no
/// tabs.
pub fn expand_tabs(s: &str) -> String {
    if !s.contains('\t') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut col = 0;
    for c in s.chars() {
        if c == '\t' {
            let pad = TAB_STOP - col % TAB_STOP;
            for _ in 0..pad {
                out.push(' ');
            }
            col += pad;
        } else {
            out.push(c);
            col += c.width().unwrap_or(0);
        }
    }
    out
}

/// Longest prefix of `s` that fits in `max_cols` display columns.
///
/// Returns the prefix and the exact column count it consumes. A glyph that
/// would overflow the budget is excluded whole; the prefix always ends on a
/// char boundary.
pub fn truncate_to_width(s: &str, max_cols: usize) -> (&str, usize) {
    let mut cols = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if cols + w > max_cols {
            return (&s[..idx], cols);
        }
        cols += w;
    }
    (s, cols)
}
