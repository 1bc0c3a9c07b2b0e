// SPDX-License-Identifier: MIT
//
// tilde-editor — Editor core for tilde.
//
// The state the terminal layer renders and mutates: the loaded text
// rows, the viewport-bounded cursor, and the frame renderer that turns
// both into one batch of ANSI output per frame.

pub mod cursor;
pub mod document;
pub mod view;
