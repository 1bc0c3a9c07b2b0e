// SPDX-License-Identifier: MIT
//
// Frame rendering — viewport state to one batch of ANSI bytes.
//
// Every frame is composed in full into a `FrameBuffer` and reaches the
// terminal as a single write. The frame hides the cursor while rows are
// drawn, homes, paints every viewport row (content, banner, or `~`
// filler) with a clear-to-end-of-line after each, then repositions and
// reveals the cursor. Rows are separated by `\r\n` — no separator after
// the last row, which would scroll the terminal.
//
// There is no whole-screen clear: erasing each line as it is redrawn
// covers the viewport without the flash a full clear causes.

use std::io::{self, Write};

use tilde_term::ansi;
use tilde_term::frame::FrameBuffer;
use tilde_term::terminal::Size;

use crate::cursor::Cursor;
use crate::document::Document;

/// Version string shown on the welcome banner.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compose one frame from the viewport, cursor, and document state.
///
/// # Errors
///
/// Returns an error if appending to the frame fails.
pub fn render_frame(size: Size, cursor: &Cursor, document: &Document) -> io::Result<FrameBuffer> {
    let mut frame = FrameBuffer::new();

    ansi::cursor_hide(&mut frame)?;
    ansi::cursor_home(&mut frame)?;

    draw_rows(size, document, &mut frame)?;

    ansi::cursor_to(&mut frame, cursor.x(), cursor.y())?;
    ansi::cursor_show(&mut frame)?;

    Ok(frame)
}

/// Draw every viewport row: document content where it exists, the
/// welcome banner a third of the way down an empty document, and a `~`
/// filler everywhere else.
fn draw_rows(size: Size, document: &Document, out: &mut impl Write) -> io::Result<()> {
    for y in 0..size.rows {
        if let Some(row) = document.row(usize::from(y)) {
            out.write_all(row.clipped(usize::from(size.cols)))?;
        } else if document.is_empty() && y == size.rows / 3 {
            draw_banner(size.cols, out)?;
        } else {
            out.write_all(b"~")?;
        }

        ansi::clear_line(out)?;
        if y + 1 < size.rows {
            out.write_all(b"\r\n")?;
        }
    }

    Ok(())
}

/// Draw the version banner, centered, with the leading `~` keeping the
/// filler-row convention when there is room for padding.
fn draw_banner(cols: u16, out: &mut impl Write) -> io::Result<()> {
    let banner = format!("Tilde editor -- version {VERSION}");
    let text = &banner.as_bytes()[..banner.len().min(usize::from(cols))];

    let mut padding = (usize::from(cols) - text.len()) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        padding -= 1;
    }
    for _ in 0..padding {
        out.write_all(b" ")?;
    }

    out.write_all(text)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(size: Size, cursor: &Cursor, document: &Document) -> String {
        let frame = render_frame(size, cursor, document).unwrap();
        String::from_utf8(frame.as_bytes().to_vec()).unwrap()
    }

    fn banner_text() -> String {
        format!("Tilde editor -- version {VERSION}")
    }

    // ── Whole-frame composition ───────────────────────────────────────

    #[test]
    fn frame_with_one_row_document() {
        let size = Size { cols: 10, rows: 3 };
        let doc = Document::from_text("ab");
        let frame = rendered(size, &Cursor::new(), &doc);

        assert_eq!(
            frame,
            "\x1b[?25l\x1b[H\
             ab\x1b[K\r\n\
             ~\x1b[K\r\n\
             ~\x1b[K\
             \x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn frame_hides_cursor_first_and_shows_it_last() {
        let size = Size { cols: 10, rows: 2 };
        let frame = rendered(size, &Cursor::new(), &Document::from_text("x"));
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn frame_has_one_separator_fewer_than_rows() {
        let size = Size { cols: 40, rows: 24 };
        let frame = rendered(size, &Cursor::new(), &Document::new());
        assert_eq!(frame.matches("\r\n").count(), 23);
    }

    #[test]
    fn frame_erases_every_row() {
        let size = Size { cols: 40, rows: 24 };
        let frame = rendered(size, &Cursor::new(), &Document::new());
        assert_eq!(frame.matches("\x1b[K").count(), 24);
    }

    #[test]
    fn frame_never_clears_whole_screen() {
        let size = Size { cols: 40, rows: 10 };
        let frame = rendered(size, &Cursor::new(), &Document::new());
        assert!(!frame.contains("\x1b[2J"));
    }

    // ── Cursor positioning ────────────────────────────────────────────

    #[test]
    fn cursor_position_is_one_indexed() {
        let size = Size { cols: 10, rows: 3 };
        let mut cursor = Cursor::new();
        cursor.move_right(size);
        cursor.move_down(size);
        cursor.move_down(size);

        let frame = rendered(size, &cursor, &Document::new());
        assert!(frame.contains("\x1b[3;2H"));
    }

    // ── Row content ───────────────────────────────────────────────────

    #[test]
    fn long_row_is_clipped_to_viewport_width() {
        let size = Size { cols: 4, rows: 2 };
        let doc = Document::from_text("abcdefgh");
        let frame = rendered(size, &Cursor::new(), &doc);
        assert!(frame.contains("abcd\x1b[K"));
        assert!(!frame.contains("abcde"));
    }

    #[test]
    fn loaded_row_suppresses_banner() {
        let size = Size { cols: 80, rows: 24 };
        let doc = Document::from_text("ab");
        let frame = rendered(size, &Cursor::new(), &doc);
        assert!(!frame.contains("version"));
    }

    // ── Banner ────────────────────────────────────────────────────────

    #[test]
    fn banner_sits_a_third_of_the_way_down() {
        let size = Size { cols: 80, rows: 24 };
        let frame = rendered(size, &Cursor::new(), &Document::new());

        let rows: Vec<&str> = frame.split("\r\n").collect();
        assert_eq!(rows.len(), 24);
        assert!(rows[8].contains(&banner_text()));
        for (y, row) in rows.iter().enumerate() {
            if y != 8 {
                assert!(!row.contains("version"), "banner leaked to row {y}");
            }
        }
    }

    #[test]
    fn banner_is_centered_behind_a_tilde() {
        let size = Size { cols: 80, rows: 24 };
        let frame = rendered(size, &Cursor::new(), &Document::new());

        let banner = banner_text();
        let padding = (80 - banner.len()) / 2;
        let expected = format!("~{}{banner}\x1b[K", " ".repeat(padding - 1));
        let rows: Vec<&str> = frame.split("\r\n").collect();
        assert_eq!(rows[8], expected);
    }

    #[test]
    fn banner_clips_on_narrow_viewport() {
        let size = Size { cols: 10, rows: 6 };
        let frame = rendered(size, &Cursor::new(), &Document::new());

        let rows: Vec<&str> = frame.split("\r\n").collect();
        // rows/3 == 2; the clipped banner fills the width, no padding,
        // no leading tilde.
        assert_eq!(rows[2], format!("{}\x1b[K", &banner_text()[..10]));
    }

    #[test]
    fn every_other_row_is_a_tilde_filler() {
        let size = Size { cols: 80, rows: 24 };
        let frame = rendered(size, &Cursor::new(), &Document::new());

        let body = frame
            .strip_prefix("\x1b[?25l\x1b[H")
            .unwrap()
            .strip_suffix("\x1b[1;1H\x1b[?25h")
            .unwrap();
        for (y, row) in body.split("\r\n").enumerate() {
            if y != 8 {
                assert_eq!(row, "~\x1b[K", "row {y} is not a plain filler");
            }
        }
    }
}
