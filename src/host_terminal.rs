//! A `crossterm`-backed `Screen`/`Keyboard` pair for the reference CLI
//! binary (spec §6a). Grounded on the teacher's crossterm display/input
//! modules, trimmed to the header-only window model this core supports (no
//! split windows, no status line).

use crate::host::{InputEvent, Keyboard, Screen, SpecialKey, TextStyle};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal;
use crossterm::{cursor, execute, queue};
use log::warn;
use std::io::{stdout, Write};
use std::time::Duration;

/// Prints directly to the controlling terminal via `crossterm`.
pub struct TerminalScreen {
    columns: u16,
    rows: u16,
}

impl TerminalScreen {
    pub fn new() -> TerminalScreen {
        let (columns, rows) = terminal::size().unwrap_or((80, 24));
        TerminalScreen { columns, rows }
    }
}

impl Default for TerminalScreen {
    fn default() -> Self {
        TerminalScreen::new()
    }
}

impl Screen for TerminalScreen {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn supports_colour(&self) -> bool {
        true
    }

    fn supports_truecolour(&self) -> bool {
        false
    }

    fn print(&mut self, text: &str, style: TextStyle) {
        let mut out = stdout();
        if style.reverse {
            let _ = queue!(out, SetAttribute(Attribute::Reverse));
        }
        if style.bold {
            let _ = queue!(out, SetAttribute(Attribute::Bold));
        }
        if style.italic {
            let _ = queue!(out, SetAttribute(Attribute::Italic));
        }
        let _ = queue!(out, Print(text));
        if style.reverse || style.bold || style.italic {
            let _ = queue!(out, SetAttribute(Attribute::Reset));
        }
        if let Err(e) = out.flush() {
            warn!("failed to flush terminal output: {e}");
        }
    }

    fn set_cursor(&mut self, row: u16, column: u16) {
        if let Err(e) = execute!(stdout(), cursor::MoveTo(column, row)) {
            warn!("failed to move cursor: {e}");
        }
    }

    fn erase_line(&mut self) {
        if let Err(e) = execute!(stdout(), terminal::Clear(terminal::ClearType::CurrentLine)) {
            warn!("failed to erase line: {e}");
        }
    }

    fn erase_char(&mut self) {
        let _ = execute!(stdout(), cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1));
    }

    fn erase_screen(&mut self) {
        if let Err(e) = execute!(stdout(), terminal::Clear(terminal::ClearType::All)) {
            warn!("failed to erase screen: {e}");
        }
    }
}

/// Polls `crossterm` for key events without blocking, translating them into
/// the core's [`InputEvent`] vocabulary.
#[derive(Default)]
pub struct TerminalKeyboard;

impl TerminalKeyboard {
    pub fn new() -> TerminalKeyboard {
        TerminalKeyboard
    }
}

impl Keyboard for TerminalKeyboard {
    fn get_input(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while event::poll(Duration::from_millis(0)).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(ev) = translate_key(key.code) {
                        events.push(ev);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("failed to read terminal event: {e}");
                    break;
                }
            }
        }
        events
    }

    fn supports_mouse(&self) -> bool {
        false
    }

    fn supports_menus(&self) -> bool {
        false
    }
}

fn translate_key(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Char(c) => Some(InputEvent::Char(c as u16)),
        KeyCode::Enter => Some(InputEvent::Special(SpecialKey::Newline)),
        KeyCode::Backspace => Some(InputEvent::Special(SpecialKey::Delete)),
        KeyCode::Esc => Some(InputEvent::Special(SpecialKey::Escape)),
        KeyCode::Up => Some(InputEvent::Special(SpecialKey::Up)),
        KeyCode::Down => Some(InputEvent::Special(SpecialKey::Down)),
        KeyCode::Left => Some(InputEvent::Special(SpecialKey::Left)),
        KeyCode::Right => Some(InputEvent::Special(SpecialKey::Right)),
        KeyCode::F(1) => Some(InputEvent::Special(SpecialKey::F1)),
        KeyCode::F(2) => Some(InputEvent::Special(SpecialKey::F2)),
        KeyCode::F(3) => Some(InputEvent::Special(SpecialKey::F3)),
        KeyCode::F(4) => Some(InputEvent::Special(SpecialKey::F4)),
        KeyCode::F(5) => Some(InputEvent::Special(SpecialKey::F5)),
        KeyCode::F(6) => Some(InputEvent::Special(SpecialKey::F6)),
        KeyCode::F(7) => Some(InputEvent::Special(SpecialKey::F7)),
        KeyCode::F(8) => Some(InputEvent::Special(SpecialKey::F8)),
        KeyCode::F(9) => Some(InputEvent::Special(SpecialKey::F9)),
        KeyCode::F(10) => Some(InputEvent::Special(SpecialKey::F10)),
        KeyCode::F(11) => Some(InputEvent::Special(SpecialKey::F11)),
        KeyCode::F(12) => Some(InputEvent::Special(SpecialKey::F12)),
        _ => None,
    }
}
