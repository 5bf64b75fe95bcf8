//! A non-interactive `Screen`/`Keyboard`/`Filesystem` implementation used by
//! tests and by any embedding that wants to drive the engine without a real
//! terminal.

use crate::host::{FileHandle, Filesystem, InputEvent, Keyboard, Screen, TextStyle};
use std::collections::VecDeque;
use std::io::Cursor;

/// Buffers all printed text; never reports any pending input on its own
/// (use [`HeadlessKeyboard::push`] to feed events for a test scenario).
pub struct HeadlessScreen {
    buffer: String,
    columns: u16,
    rows: u16,
}

impl HeadlessScreen {
    pub fn new() -> HeadlessScreen {
        HeadlessScreen {
            buffer: String::new(),
            columns: 80,
            rows: 24,
        }
    }

    pub fn output(&self) -> &str {
        &self.buffer
    }
}

impl Default for HeadlessScreen {
    fn default() -> Self {
        HeadlessScreen::new()
    }
}

impl Screen for HeadlessScreen {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn supports_colour(&self) -> bool {
        false
    }

    fn supports_truecolour(&self) -> bool {
        false
    }

    fn print(&mut self, text: &str, _style: TextStyle) {
        self.buffer.push_str(text);
    }

    fn set_cursor(&mut self, _row: u16, _column: u16) {}

    fn erase_line(&mut self) {}

    fn erase_char(&mut self) {}

    fn erase_screen(&mut self) {
        self.buffer.clear();
    }
}

/// A keyboard whose event queue is populated by the test driving it, not by
/// any real input device.
#[derive(Default)]
pub struct HeadlessKeyboard {
    queue: VecDeque<InputEvent>,
}

impl HeadlessKeyboard {
    pub fn new() -> HeadlessKeyboard {
        HeadlessKeyboard::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }
}

impl Keyboard for HeadlessKeyboard {
    fn get_input(&mut self) -> Vec<InputEvent> {
        self.queue.drain(..).collect()
    }

    fn supports_mouse(&self) -> bool {
        false
    }

    fn supports_menus(&self) -> bool {
        false
    }
}

/// An in-memory filesystem stand-in: files live only in a map, there is no
/// interactive picker.
#[derive(Default)]
pub struct HeadlessFilesystem {
    files: std::collections::HashMap<String, Vec<u8>>,
}

impl HeadlessFilesystem {
    pub fn new() -> HeadlessFilesystem {
        HeadlessFilesystem::default()
    }
}

impl Filesystem for HeadlessFilesystem {
    fn open_read(&mut self, filename: &str) -> Option<Box<dyn FileHandle>> {
        self.files
            .get(filename)
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as Box<dyn FileHandle>)
    }

    fn open_write(&mut self, filename: &str) -> Option<Box<dyn FileHandle>> {
        self.files.entry(filename.to_string()).or_default();
        Some(Box::new(Cursor::new(Vec::new())) as Box<dyn FileHandle>)
    }

    fn pick_filename(&mut self, _for_writing: bool) -> Option<String> {
        None
    }
}
