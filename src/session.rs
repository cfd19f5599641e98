//! The scroll/cursor control loop.
//!
//! A session owns the line store, the renderer, and the edit capability, and
//! runs the whole program as one synchronous loop: draw the viewport, climb
//! back to the cursor row, run an edit session there, commit the result, and
//! move the window to keep the cursor visible. The loop holds the invariant
//! `headline <= cursor < headline + visible_rows` after every step.

use std::io::{self, BufRead, Write};

use crossterm::{
    cursor::{Hide, MoveToColumn, MoveUp, Show},
    execute, queue,
};

use crate::editor::{EditOutcome, LineEditor};
use crate::error::Error;
use crate::store::LineStore;
use crate::text::Terminator;
use crate::view::View;

/// Rows below the viewport reserved for the edit line and status spill.
const RESERVED_ROWS: usize = 2;

/// One run of the program: a viewport over a lazily-read line buffer with a
/// single editable line.
pub struct Session<R, W, E> {
    store: LineStore<R>,
    view: View,
    editor: E,
    out: W,
    width: usize,
    height: usize,
    /// Buffer index of the first visible line.
    headline: usize,
    /// Buffer index of the line currently open for editing.
    cursor: usize,
}

impl<R: BufRead, W: Write, E: LineEditor> Session<R, W, E> {
    pub fn new(reader: R, editor: E, out: W, width: usize, height: usize) -> Self {
        Self {
            store: LineStore::new(reader),
            view: View::new(),
            editor,
            out,
            width,
            height,
            headline: 0,
            cursor: 0,
        }
    }

    pub fn headline(&self) -> usize {
        self.headline
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn store(&self) -> &LineStore<R> {
        &self.store
    }

    /// The output sink, for inspecting rendered bytes in tests.
    pub fn output(&self) -> &W {
        &self.out
    }

    fn visible_rows(&self) -> usize {
        self.height.saturating_sub(RESERVED_ROWS).max(1)
    }

    /// Run edit steps until the user quits or the editor fails.
    ///
    /// A user-initiated quit (interrupt key) is a clean exit; an editor
    /// failure is surfaced as [`Error::Editor`]. The terminal cursor is
    /// re-shown on both paths.
    pub fn run(&mut self) -> Result<(), Error> {
        let result = self.run_loop();
        let _ = execute!(self.out, Show);
        result
    }

    fn run_loop(&mut self) -> Result<(), Error> {
        loop {
            queue!(self.out, Hide, MoveToColumn(0)).map_err(Error::Terminal)?;
            let rows = self.draw_viewport().map_err(Error::Terminal)?;

            // The draw left the terminal cursor just below the spacer line;
            // climb back up to the row being edited. `cursor` is always
            // within the drawn window, so the distance is at least one.
            let up = rows - (self.cursor - self.headline) + 1;
            queue!(self.out, MoveUp(up as u16), MoveToColumn(0), Show)
                .map_err(Error::Terminal)?;
            self.out.flush().map_err(Error::Terminal)?;

            let initial = self.store.line_for_edit(self.cursor).content().to_string();
            let outcome = self
                .editor
                .edit(&mut self.out, &initial, self.width)
                .map_err(Error::Editor)?;

            // Back to the top of the window so the next draw starts at the
            // headline row.
            if self.cursor > self.headline {
                queue!(
                    self.out,
                    MoveUp((self.cursor - self.headline) as u16),
                    MoveToColumn(0)
                )
                .map_err(Error::Terminal)?;
            }

            let delta = match outcome {
                EditOutcome::Accepted(text) => {
                    self.commit(text);
                    0
                }
                EditOutcome::MovePrev(text) => {
                    self.commit(text);
                    -1
                }
                EditOutcome::MoveNext(text) => {
                    self.commit(text);
                    1
                }
                EditOutcome::Interrupted => {
                    tracing::debug!("session interrupted by user");
                    return Ok(());
                }
            };
            self.step(delta);
        }
    }

    /// Draw the window `[headline, headline + visible_rows)` plus the spacer
    /// line below it, returning the number of content rows drawn.
    fn draw_viewport(&mut self) -> io::Result<usize> {
        let visible = self.visible_rows();
        let headline = self.headline;
        let width = self.width;
        let mut next = headline;
        let store = &mut self.store;
        let rows = self.view.draw(
            &mut self.out,
            || {
                let line = store.get(next)?;
                next += 1;
                Some((line.content().to_string(), line.terminator()))
            },
            headline,
            width,
            visible,
        )?;
        self.out.write_all(b"\r\n")?;
        Ok(rows)
    }

    /// Commit edited text into the cursor line. The stored terminator is
    /// preserved; a terminator the editor happened to hand back is split
    /// off rather than stored into the content.
    fn commit(&mut self, text: String) {
        let (content, _) = Terminator::split(&text);
        self.store.set(self.cursor, content);
    }

    /// Apply a navigation delta and re-center the window.
    ///
    /// A move above line zero is discarded whole; otherwise the headline
    /// follows the cursor so it stays within the visible rows.
    fn step(&mut self, delta: isize) {
        let Some(next) = self.cursor.checked_add_signed(delta) else {
            return;
        };
        let visible = self.visible_rows();
        if next < self.headline {
            self.headline = next;
        } else if next >= self.headline + visible {
            self.headline = next - visible + 1;
        }
        self.cursor = next;
        debug_assert!(self.headline <= self.cursor);
        debug_assert!(self.cursor < self.headline + visible);
    }
}
