// SPDX-License-Identifier: MIT
//
// tilde-term — Terminal layer for tilde.
//
// Direct terminal control via ANSI escape sequences and raw termios:
// raw-mode entry and guaranteed restore, window-size discovery (with
// the cursor-probe fallback for terminals where the ioctl lies), a
// per-frame byte accumulator so every frame reaches the terminal in a
// single write, and a decoder that turns the raw stdin byte stream
// into logical key events.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of emitting every escape byte itself. The whole
// engine fits in four small modules, and every byte sent to or read
// from the terminal is accounted for.

pub mod ansi;
pub mod frame;
pub mod input;
pub mod terminal;
