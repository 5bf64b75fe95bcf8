#![crate_name = "zinc_machine"]

//! A Version 3 Z-machine interpreter core: story file loading, instruction
//! decoding, and a synchronous execution engine driven one step at a time by
//! its embedder.

pub mod engine;
pub mod error;
pub mod header;
pub mod host;
pub mod host_headless;
pub mod host_terminal;
pub mod instruction;
pub mod opcode_tables;
pub mod text;
pub mod vm;
