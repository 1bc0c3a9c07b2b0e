// SPDX-License-Identifier: MIT
//
// tilde — a minimal terminal text viewer built on raw ANSI control.
//
// This is the main binary that wires together the crates:
//
//   tilde-term   → raw mode, ANSI output, frame buffering, key decoding
//   tilde-editor → text rows, viewport cursor, frame rendering
//
// The loop is strictly synchronous: compose a frame, flush it in one
// write, block (with the read timeout) for the next key, dispatch,
// repeat. Each keypress flows through:
//
//   stdin → read_key → handle_key → cursor/model mutation
//   render_frame → FrameBuffer → single write to the terminal
//
// Every fatal condition propagates as a `FatalError` to `main`, which
// resets the screen once, prints one diagnostic, and exits 1 — raw mode
// itself is unwound by the terminal handle's Drop (or the panic hook).

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use tilde_editor::cursor::Cursor;
use tilde_editor::document::Document;
use tilde_editor::view;

use tilde_term::ansi;
use tilde_term::frame::FrameBuffer;
use tilde_term::input::{self, Key, TtyInput, ctrl};
use tilde_term::terminal::{self, Size, Terminal};

/// The quit chord: Ctrl-Q.
const QUIT_KEY: u8 = ctrl(b'q');

// ─── Action ─────────────────────────────────────────────────────────────────

/// What the editor tells the loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep running.
    Continue,
    /// Exit the loop cleanly.
    Quit,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The editor application state: the viewport discovered at startup, the
/// cursor bounded by it, and the loaded document.
struct Editor {
    size: Size,
    cursor: Cursor,
    document: Document,
}

impl Editor {
    fn new(size: Size, document: Document) -> Self {
        Self {
            size,
            cursor: Cursor::new(),
            document,
        }
    }

    /// Dispatch one decoded key against the cursor/model state.
    ///
    /// Keys with no binding here (plain characters, other control
    /// chords, Delete, literal Escape) are deliberate no-ops — this
    /// core models no text mutation.
    fn handle_key(&mut self, key: Key) -> Action {
        match key {
            Key::Ctrl(QUIT_KEY) => return Action::Quit,
            Key::Up => self.cursor.move_up(),
            Key::Down => self.cursor.move_down(self.size),
            Key::Left => self.cursor.move_left(),
            Key::Right => self.cursor.move_right(self.size),
            Key::Home => self.cursor.line_start(),
            Key::End => self.cursor.line_end(self.size),
            Key::PageUp => self.page_up(),
            Key::PageDown => self.page_down(),
            Key::Char(_) | Key::Ctrl(_) | Key::Delete | Key::Escape => {}
        }
        Action::Continue
    }

    /// Jump a full screen up: the vertical motion repeated `rows` times.
    fn page_up(&mut self) {
        for _ in 0..self.size.rows {
            self.cursor.move_up();
        }
    }

    /// Jump a full screen down: the vertical motion repeated `rows` times.
    fn page_down(&mut self) {
        for _ in 0..self.size.rows {
            self.cursor.move_down(self.size);
        }
    }

    /// Compose the current state into one frame of output.
    fn render_frame(&self) -> io::Result<FrameBuffer> {
        view::render_frame(self.size, &self.cursor, &self.document)
    }
}

// ─── Fatal errors ───────────────────────────────────────────────────────────

/// The conditions that end the process with exit code 1.
///
/// Everything here reaches `main` by ordinary `?` propagation; nothing
/// in the loop exits on its own.
#[derive(Debug)]
enum FatalError {
    /// Terminal attribute get/set or window-size discovery failed.
    Terminal(io::Error),
    /// A stdin read failed for a reason other than the read timeout.
    Input(io::Error),
    /// The requested file could not be opened or read.
    File(PathBuf, io::Error),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(e) => write!(f, "terminal control failed: {e}"),
            Self::Input(e) => write!(f, "input read failed: {e}"),
            Self::File(path, e) => write!(f, "{}: {e}", path.display()),
        }
    }
}

impl std::error::Error for FatalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Terminal(e) | Self::Input(e) | Self::File(_, e) => Some(e),
        }
    }
}

// ─── Entry ──────────────────────────────────────────────────────────────────

/// Clear the screen and home the cursor, flushed immediately.
fn reset_screen() -> io::Result<()> {
    let mut out = io::stdout().lock();
    ansi::clear_screen(&mut out)?;
    ansi::cursor_home(&mut out)?;
    out.flush()
}

fn run(path: Option<PathBuf>) -> Result<(), FatalError> {
    let document = match path {
        Some(path) => Document::open(&path).map_err(|e| FatalError::File(path, e))?,
        None => Document::new(),
    };

    let mut terminal = Terminal::new().map_err(FatalError::Terminal)?;
    terminal.enter().map_err(FatalError::Terminal)?;

    // The viewport is discovered once; the size-probe fallback reads the
    // terminal's reply through the same byte source the key decoder uses.
    let mut input = TtyInput::new();
    let size = terminal::query_size(&mut input).map_err(FatalError::Terminal)?;

    let mut editor = Editor::new(size, document);

    loop {
        let mut frame = editor.render_frame().map_err(FatalError::Terminal)?;
        frame.flush_stdout().map_err(FatalError::Terminal)?;

        let key = input::read_key(&mut input).map_err(FatalError::Input)?;
        if editor.handle_key(key) == Action::Quit {
            break;
        }
    }

    reset_screen().map_err(FatalError::Terminal)?;
    terminal.leave().map_err(FatalError::Terminal)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(PathBuf::from);

    if let Err(e) = run(path) {
        // Raw mode is already unwound (terminal Drop, or the panic
        // hook); clear the frame remnants so the diagnostic lands on a
        // clean screen.
        let _ = reset_screen();
        eprintln!("tilde: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
