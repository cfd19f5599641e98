//! Single-line edit sessions.
//!
//! The controller hands one line at a time to a [`LineEditor`]; the editor
//! blocks until the user finishes the line and reports how it ended as an
//! [`EditOutcome`]. The navigation keys that would normally move within a
//! buffer are rebound to end the session instead, so "move to the adjacent
//! line" surfaces as an explicit result rather than a side effect.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{Clear, ClearType},
    QueueableCommand,
};

use crate::text;

/// How an edit session ended. Every variant that keeps the text carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Enter: commit the text, stay on this line.
    Accepted(String),
    /// Up or Ctrl-P: commit the text, move to the previous line.
    MovePrev(String),
    /// Down or Ctrl-N: commit the text, move to the next line.
    MoveNext(String),
    /// Esc, Ctrl-C, or Ctrl-D on an empty line: end the program.
    Interrupted,
}

/// The single-line editing capability the control loop drives.
///
/// `initial` is the line content with its terminator already stripped; the
/// returned text is likewise bare content. An I/O error (closed input
/// stream, unreadable terminal) ends the whole program.
pub trait LineEditor {
    fn edit(&mut self, out: &mut dyn Write, initial: &str, width: usize)
        -> io::Result<EditOutcome>;
}

/// Char-indexed edit buffer for a single line.
#[derive(Debug)]
struct LineBuffer {
    chars: Vec<char>,
    /// Cursor position as a char index into `chars`, 0..=len.
    cursor: usize,
}

impl LineBuffer {
    fn new(initial: &str) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    fn kill_to_end(&mut self) {
        self.chars.truncate(self.cursor);
    }

    fn kill_to_start(&mut self) {
        self.chars.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Display columns occupied by the text before the cursor, with tabs
    /// expanded to their stops. Matches the columns `redraw` paints, so the
    /// terminal cursor lands on the edited char even mid-tab-run.
    fn width_before_cursor(&self) -> usize {
        let prefix: String = self.chars[..self.cursor].iter().collect();
        text::display_width(&text::expand_tabs(&prefix))
    }
}

/// What a key press did to the session.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    /// Buffer or cursor changed; keep editing.
    Edited,
    /// Session over.
    Finished(EditOutcome),
    /// Key is not bound; ignore it.
    Ignored,
}

fn apply_key(buf: &mut LineBuffer, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignored;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.code, ctrl) {
        (KeyCode::Enter, _) => KeyAction::Finished(EditOutcome::Accepted(buf.text())),
        (KeyCode::Up, _) | (KeyCode::Char('p'), true) => {
            KeyAction::Finished(EditOutcome::MovePrev(buf.text()))
        }
        (KeyCode::Down, _) | (KeyCode::Char('n'), true) => {
            KeyAction::Finished(EditOutcome::MoveNext(buf.text()))
        }
        (KeyCode::Esc, _) | (KeyCode::Char('c'), true) => {
            KeyAction::Finished(EditOutcome::Interrupted)
        }
        (KeyCode::Char('d'), true) => {
            // Readline EOF convention: Ctrl-D on an empty line quits,
            // otherwise it deletes under the cursor.
            if buf.is_empty() {
                KeyAction::Finished(EditOutcome::Interrupted)
            } else {
                buf.delete();
                KeyAction::Edited
            }
        }
        (KeyCode::Left, _) | (KeyCode::Char('b'), true) => {
            buf.move_left();
            KeyAction::Edited
        }
        (KeyCode::Right, _) | (KeyCode::Char('f'), true) => {
            buf.move_right();
            KeyAction::Edited
        }
        (KeyCode::Home, _) | (KeyCode::Char('a'), true) => {
            buf.move_home();
            KeyAction::Edited
        }
        (KeyCode::End, _) | (KeyCode::Char('e'), true) => {
            buf.move_end();
            KeyAction::Edited
        }
        (KeyCode::Backspace, _) | (KeyCode::Char('h'), true) => {
            buf.backspace();
            KeyAction::Edited
        }
        (KeyCode::Delete, _) => {
            buf.delete();
            KeyAction::Edited
        }
        (KeyCode::Char('k'), true) => {
            buf.kill_to_end();
            KeyAction::Edited
        }
        (KeyCode::Char('u'), true) => {
            buf.kill_to_start();
            KeyAction::Edited
        }
        (KeyCode::Char(c), false) => {
            buf.insert(c);
            KeyAction::Edited
        }
        _ => KeyAction::Ignored,
    }
}

/// Interactive [`LineEditor`] reading crossterm key events from the
/// controlling terminal.
pub struct KeyEditor;

impl KeyEditor {
    fn redraw(out: &mut dyn Write, buf: &LineBuffer, width: usize) -> io::Result<()> {
        // Tabs go out as spaces, same as the viewport rows; a raw tab would
        // land on the terminal's own 8-column stops and desync the cursor.
        let expanded = text::expand_tabs(&buf.text());
        let (visible, _) = text::truncate_to_width(&expanded, width);
        out.queue(MoveToColumn(0))?;
        out.write_all(visible.as_bytes())?;
        out.queue(Clear(ClearType::UntilNewLine))?;
        let col = buf.width_before_cursor().min(width) as u16;
        out.queue(MoveToColumn(col))?;
        out.flush()
    }
}

impl LineEditor for KeyEditor {
    fn edit(
        &mut self,
        out: &mut dyn Write,
        initial: &str,
        width: usize,
    ) -> io::Result<EditOutcome> {
        let mut buf = LineBuffer::new(initial);
        loop {
            Self::redraw(out, &buf, width)?;
            // Blocks until a key arrives; a closed input stream surfaces
            // here as an error and ends the program.
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if let KeyAction::Finished(outcome) = apply_key(&mut buf, key) {
                out.queue(MoveToColumn(0))?;
                out.flush()?;
                return Ok(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(buf: &mut LineBuffer, s: &str) {
        for c in s.chars() {
            assert_eq!(apply_key(buf, key(KeyCode::Char(c))), KeyAction::Edited);
        }
    }

    #[test]
    fn test_initial_cursor_at_end_of_content() {
        let buf = LineBuffer::new("hello");
        assert_eq!(buf.cursor, 5);
        assert_eq!(buf.width_before_cursor(), 5);
    }

    #[test]
    fn test_insert_and_accept() {
        let mut buf = LineBuffer::new("ab");
        type_str(&mut buf, "cd");
        assert_eq!(
            apply_key(&mut buf, key(KeyCode::Enter)),
            KeyAction::Finished(EditOutcome::Accepted("abcd".to_string()))
        );
    }

    #[test]
    fn test_insert_mid_line() {
        let mut buf = LineBuffer::new("ad");
        apply_key(&mut buf, key(KeyCode::Left));
        type_str(&mut buf, "bc");
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buf = LineBuffer::new("abc");
        apply_key(&mut buf, key(KeyCode::Backspace));
        assert_eq!(buf.text(), "ab");
        apply_key(&mut buf, key(KeyCode::Home));
        apply_key(&mut buf, key(KeyCode::Delete));
        assert_eq!(buf.text(), "b");
        // Backspace at the start is a no-op
        apply_key(&mut buf, key(KeyCode::Backspace));
        assert_eq!(buf.text(), "b");
    }

    #[test]
    fn test_kill_bindings() {
        let mut buf = LineBuffer::new("hello world");
        for _ in 0..5 {
            apply_key(&mut buf, key(KeyCode::Left));
        }
        apply_key(&mut buf, ctrl('k'));
        assert_eq!(buf.text(), "hello ");
        apply_key(&mut buf, ctrl('u'));
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_navigation_keys_end_session_with_delta() {
        let mut buf = LineBuffer::new("line");
        assert_eq!(
            apply_key(&mut buf, key(KeyCode::Up)),
            KeyAction::Finished(EditOutcome::MovePrev("line".to_string()))
        );
        assert_eq!(
            apply_key(&mut buf, key(KeyCode::Down)),
            KeyAction::Finished(EditOutcome::MoveNext("line".to_string()))
        );
        // Historical readline aliases
        assert_eq!(
            apply_key(&mut buf, ctrl('p')),
            KeyAction::Finished(EditOutcome::MovePrev("line".to_string()))
        );
        assert_eq!(
            apply_key(&mut buf, ctrl('n')),
            KeyAction::Finished(EditOutcome::MoveNext("line".to_string()))
        );
    }

    #[test]
    fn test_interrupt_keys() {
        let mut buf = LineBuffer::new("x");
        assert_eq!(
            apply_key(&mut buf, key(KeyCode::Esc)),
            KeyAction::Finished(EditOutcome::Interrupted)
        );
        assert_eq!(
            apply_key(&mut buf, ctrl('c')),
            KeyAction::Finished(EditOutcome::Interrupted)
        );
    }

    #[test]
    fn test_ctrl_d_eof_only_on_empty_buffer() {
        let mut buf = LineBuffer::new("x");
        apply_key(&mut buf, key(KeyCode::Home));
        assert_eq!(apply_key(&mut buf, ctrl('d')), KeyAction::Edited);
        assert_eq!(buf.text(), "");
        assert_eq!(
            apply_key(&mut buf, ctrl('d')),
            KeyAction::Finished(EditOutcome::Interrupted)
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut buf = LineBuffer::new("");
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('x'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(apply_key(&mut buf, release), KeyAction::Ignored);
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_cursor_width_counts_wide_glyphs() {
        let mut buf = LineBuffer::new("世界");
        assert_eq!(buf.width_before_cursor(), 4);
        apply_key(&mut buf, key(KeyCode::Left));
        assert_eq!(buf.width_before_cursor(), 2);
    }

    #[test]
    fn test_cursor_width_counts_tab_columns() {
        // "a" + tab (stop at column 4) + "b" occupies columns 0..5
        let mut buf = LineBuffer::new("a\tb");
        assert_eq!(buf.width_before_cursor(), 5);
        apply_key(&mut buf, key(KeyCode::Left));
        assert_eq!(buf.width_before_cursor(), 4);
        apply_key(&mut buf, key(KeyCode::Left));
        assert_eq!(buf.width_before_cursor(), 1);
    }

    #[test]
    fn test_redraw_expands_tabs() {
        let buf = LineBuffer::new("a\tb");
        let mut out = Vec::new();
        KeyEditor::redraw(&mut out, &buf, 40).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a   b"), "output: {:?}", text);
        assert!(!text.contains('\t'));
    }
}
