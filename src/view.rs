//! Diff-cached viewport renderer.
//!
//! Each draw walks the viewport rows top to bottom and rewrites only the
//! rows whose content changed since the previous draw; unchanged rows cost a
//! single line feed. Output is plain ANSI (color, erase-to-end-of-line)
//! queued through crossterm, so the same code drives a real terminal or a
//! byte buffer in tests.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::text::{self, Terminator};

/// Renders a fixed-height window of lines, skipping unchanged rows.
pub struct View {
    /// Raw line (terminator included) last drawn on each viewport row.
    cache: Vec<String>,
    /// Headline the cache rows belong to. A scroll shifts which buffer line
    /// occupies each row, so the whole cache is dropped when this changes -
    /// a row-for-row comparison across different headlines could wrongly
    /// suppress a redraw.
    cache_headline: usize,
}

impl View {
    pub fn new() -> Self {
        Self {
            cache: Vec::new(),
            cache_headline: 0,
        }
    }

    /// Draw up to `height` rows pulled from `supplier`, returning the number
    /// of rows actually drawn.
    ///
    /// `supplier` yields `(content, terminator)` pairs starting at
    /// `headline` and is the only path that extends the line store during a
    /// render; when it signals exhaustion the draw stops early. Every row
    /// ends with `"\r\n"` so the layout survives raw mode, where bare line
    /// feeds do not return the carriage.
    pub fn draw<W, F>(
        &mut self,
        out: &mut W,
        mut supplier: F,
        headline: usize,
        width: usize,
        height: usize,
    ) -> io::Result<usize>
    where
        W: Write,
        F: FnMut() -> Option<(String, Terminator)>,
    {
        if headline != self.cache_headline {
            self.cache.clear();
            self.cache_headline = headline;
        }
        for row in 0..height {
            let Some((content, terminator)) = supplier() else {
                return Ok(row);
            };
            let raw = format!("{}{}", content, terminator.as_str());
            if self.cache.get(row) == Some(&raw) {
                // Row already shows this exact line; just advance.
                out.write_all(b"\r\n")?;
                continue;
            }
            if row < self.cache.len() {
                self.cache[row] = raw;
            } else {
                self.cache.push(raw);
            }

            let expanded = text::expand_tabs(&content);
            let (visible, used) = text::truncate_to_width(&expanded, width);
            out.write_all(visible.as_bytes())?;
            if used < width {
                if let Some(glyph) = terminator.glyph() {
                    queue!(out, SetForegroundColor(Color::Yellow))?;
                    write!(out, "{}", glyph)?;
                }
            }
            queue!(out, ResetColor, Clear(ClearType::UntilNewLine))?;
            out.write_all(b"\r\n")?;
        }
        Ok(height)
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier_over(
        lines: Vec<(&'static str, Terminator)>,
    ) -> impl FnMut() -> Option<(String, Terminator)> {
        let mut iter = lines.into_iter();
        move || iter.next().map(|(s, t)| (s.to_string(), t))
    }

    fn screen_contents(bytes: &[u8], width: u16, height: u16) -> String {
        let mut parser = vt100::Parser::new(height, width, 0);
        parser.process(bytes);
        parser.screen().contents()
    }

    #[test]
    fn test_draw_returns_rows_drawn() {
        let mut view = View::new();
        let mut out = Vec::new();
        let drawn = view
            .draw(
                &mut out,
                supplier_over(vec![("a", Terminator::Lf), ("b", Terminator::Lf)]),
                0,
                80,
                5,
            )
            .unwrap();
        assert_eq!(drawn, 2);
    }

    #[test]
    fn test_draw_shows_content_and_terminator_glyph() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("hello", Terminator::Lf)]),
            0,
            40,
            1,
        )
        .unwrap();
        let screen = screen_contents(&out, 40, 3);
        assert!(screen.contains("hello\u{2B63}"), "screen: {:?}", screen);
    }

    #[test]
    fn test_no_glyph_when_content_fills_row() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("hello", Terminator::Lf)]),
            0,
            5,
            1,
        )
        .unwrap();
        let screen = screen_contents(&out, 5, 2);
        assert!(screen.contains("hello"));
        assert!(!screen.contains('\u{2B63}'));
    }

    #[test]
    fn test_no_glyph_for_terminator_none() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("tail", Terminator::None)]),
            0,
            40,
            1,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains('\u{2B63}'));
        assert!(!out.contains('\u{2936}'));
        assert!(!out.contains('\u{2B60}'));
    }

    #[test]
    fn test_tabs_expanded_in_output() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("a\tb", Terminator::Lf)]),
            0,
            40,
            1,
        )
        .unwrap();
        let screen = screen_contents(&out, 40, 2);
        assert!(screen.contains("a   b"), "screen: {:?}", screen);
    }

    #[test]
    fn test_unchanged_rows_skip_redraw() {
        let lines = vec![("a", Terminator::Lf), ("b", Terminator::Lf)];
        let mut view = View::new();
        let mut first = Vec::new();
        view.draw(&mut first, supplier_over(lines.clone()), 0, 80, 2)
            .unwrap();

        let mut second = Vec::new();
        view.draw(&mut second, supplier_over(lines), 0, 80, 2).unwrap();
        // Cache hit on every row: nothing but row advances
        assert_eq!(second, b"\r\n\r\n");
    }

    #[test]
    fn test_changed_row_is_redrawn() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("a", Terminator::Lf), ("b", Terminator::Lf)]),
            0,
            80,
            2,
        )
        .unwrap();

        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("a", Terminator::Lf), ("B", Terminator::Lf)]),
            0,
            80,
            2,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\r\n"), "row 0 should be skipped");
        assert!(text.contains('B'));
        assert!(!text.contains('a'));
    }

    #[test]
    fn test_terminator_change_alone_redraws_row() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(&mut out, supplier_over(vec![("a", Terminator::Lf)]), 0, 80, 1)
            .unwrap();

        let mut out = Vec::new();
        view.draw(&mut out, supplier_over(vec![("a", Terminator::CrLf)]), 0, 80, 1)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2936}'));
    }

    #[test]
    fn test_headline_change_invalidates_cache() {
        let mut view = View::new();
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("a", Terminator::Lf), ("b", Terminator::Lf)]),
            0,
            80,
            2,
        )
        .unwrap();

        // Scrolled down one line to a buffer whose new row 0 happens to read
        // "a" again. A cache survived across the scroll would match it
        // against the old row 0 and skip the write, leaving a stale screen;
        // the scroll must drop the cache and rewrite the row.
        let mut out = Vec::new();
        view.draw(
            &mut out,
            supplier_over(vec![("a", Terminator::Lf), ("x", Terminator::Lf)]),
            1,
            80,
            2,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(
            text.contains('a'),
            "row 0 must be rewritten after a scroll: {:?}",
            text
        );
        assert!(text.contains('x'));
    }
}
