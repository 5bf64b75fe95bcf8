//! Reference CLI shell (spec §6a): wires a terminal `Screen`/`Keyboard` and
//! an in-memory `Filesystem` to the engine and drives it to completion.

use log::error;
use std::env;
use std::fs::File;
use std::process::ExitCode;
use zinc_machine::engine::{Engine, StepResult};
use zinc_machine::error::LoadError;
use zinc_machine::host::{Keyboard, Screen};
use zinc_machine::host_headless::{HeadlessFilesystem, HeadlessKeyboard, HeadlessScreen};
use zinc_machine::host_terminal::{TerminalKeyboard, TerminalScreen};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "zinc-machine".to_string());
    let Some(path) = args.next() else {
        eprintln!("usage: {program} <story-file>");
        return ExitCode::from(1);
    };

    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", LoadError::CantReadStoryFile(e.to_string()));
            return ExitCode::from(1);
        }
    };

    let is_interactive = atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout);
    let screen: Box<dyn Screen> = if is_interactive {
        Box::new(TerminalScreen::new())
    } else {
        Box::new(HeadlessScreen::new())
    };
    let keyboard: Box<dyn Keyboard> = if is_interactive {
        Box::new(TerminalKeyboard::new())
    } else {
        Box::new(HeadlessKeyboard::new())
    };

    let mut engine = match Engine::new(file, screen, keyboard, Box::new(HeadlessFilesystem::new()))
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    loop {
        engine.pump_input();
        match engine.execute_step() {
            StepResult::Ok => continue,
            StepResult::Halted => return ExitCode::from(0),
            StepResult::Fault(kind) => {
                error!("engine faulted: {kind}");
                eprintln!("error: {kind}");
                return ExitCode::from(2);
            }
        }
    }
}
