// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and guaranteed restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It enters raw mode via
// termios and guarantees the original attributes come back on every exit
// path: ordinary returns through `leave()`, early returns through `Drop`,
// and panics through a process-wide hook.
//
// The panic hook deserves special mention: it bypasses Rust's stdout lock
// entirely, writing a pre-built restore sequence directly to fd 1. This
// prevents deadlock if the panic happened while holding the stdout lock
// (common during a frame flush). One raw write, termios restored, then
// the original panic handler prints its message to a working terminal.
//
// Window size is discovered once, at startup. Terminals where the ioctl
// is unavailable (or reports zero columns) get the classic fallback:
// push the cursor to the bottom-right corner and ask the terminal where
// it ended up.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// reported size has zero rows or columns (some terminals answer the
/// ioctl with zeros instead of failing).
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Window-Size Fallback ───────────────────────────────────────────────────

/// Upper bound on the cursor-position reply, excluding the terminating `R`.
const CURSOR_REPORT_MAX: usize = 31;

/// Discover the terminal size, preferring the ioctl.
///
/// Falls back to the cursor probe when the ioctl is unavailable or lies:
/// push the cursor to the bottom-right corner, request a cursor-position
/// report, and read the reply through `input`.
///
/// # Errors
///
/// Returns an error when both pathways fail — the ioctl gave nothing and
/// the probe reply was missing or malformed.
pub fn query_size(input: &mut impl ByteSource) -> io::Result<Size> {
    if let Some(size) = get_size() {
        return Ok(size);
    }
    probe_size(input)
}

/// The cursor-probe fallback for [`query_size`].
fn probe_size(input: &mut impl ByteSource) -> io::Result<Size> {
    let mut out = io::stdout().lock();
    ansi::cursor_to_bottom_right(&mut out)?;
    ansi::cursor_position_request(&mut out)?;
    out.flush()?;
    drop(out);

    // Accumulate the reply until the terminating `R`, a read timeout,
    // or the bounded buffer fills.
    let mut reply = [0u8; CURSOR_REPORT_MAX];
    let mut len = 0;
    while len < reply.len() {
        match input.next_byte()? {
            Some(b'R') | None => break,
            Some(byte) => {
                reply[len] = byte;
                len += 1;
            }
        }
    }

    parse_cursor_report(&reply[..len]).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "malformed cursor position report",
        )
    })
}

/// Parse a cursor-position report body: `ESC [ {row} ; {col}`.
///
/// The terminating `R` has already been stripped by the reader. Missing
/// introducer or unparseable integers yield `None`.
fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some(Size {
        rows: rows.parse().ok()?,
        cols: cols.parse().ok()?,
    })
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore raw mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Screen restore sequence for emergency use: clear the screen, home the
/// cursor, show the cursor. Matches what the editor's own quit and fatal
/// paths emit, so a panicked session looks no different from a clean exit.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen restore sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode. The original
/// attributes are restored by [`leave`](Self::leave), by drop, or — if
/// the process panics — by the installed panic hook. Exactly one raw-mode
/// session is active at a time, and every exit path restores exactly once
/// (both `leave` and the hook are idempotent).
///
/// # Example
///
/// ```no_run
/// use tilde_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // ... render frames, handle input ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Whether raw mode is currently active.
    active: bool,
}

impl Terminal {
    /// Create an inactive terminal handle.
    ///
    /// Does **not** enter raw mode — call [`enter`](Self::enter) for that.
    ///
    /// # Errors
    ///
    /// Currently infallible, but returns `Result` for forward compatibility
    /// (e.g., Windows console API initialization).
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            original_termios: None,
            active: false,
        })
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Captures the current attributes, registers them for unconditional
    /// restore (panic hook + global backup), and applies the raw
    /// configuration: no break/CR/parity/strip/flow input processing, no
    /// output post-processing, 8-bit characters, no echo / canonical mode /
    /// extended input / signal generation, and `VMIN = 0` with `VTIME = 1`
    /// so reads time out after ~100 ms instead of blocking forever.
    ///
    /// Idempotent: calling `enter()` while already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or applying terminal attributes fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        // Install the panic hook (once per process).
        install_panic_hook();

        // Enable raw mode (no-op if not a TTY).
        self.enable_raw_mode()?;

        self.active = true;
        Ok(())
    }

    /// Leave raw mode and restore the original attributes.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Save original for restore.
            self.original_termios = Some(termios);

            // Also save to global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100ms, with
            // one byte or none. The input layer turns "none" into its
            // timeout signal for escape-sequence disambiguation.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
