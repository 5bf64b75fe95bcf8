//! Opcode name lookup and the V3 store/branch/text classification tables
//! that drive how much of an instruction the decoder consumes (spec §4.4).

use crate::instruction::{InstructionForm, OperandCount};

/// Human-readable mnemonic for an opcode, used for logging and disassembly.
/// The table covers the wider Z-machine mnemonic space, not just the subset
/// this core actually dispatches (see `opcode_tables` for the narrower V3
/// store/branch/text sets that gate the decoder itself).
pub fn get_instruction_name(
    opcode: u8,
    form: InstructionForm,
    operand_count: OperandCount,
) -> &'static str {
    match form {
        InstructionForm::Extended => "unknown_ext",
        InstructionForm::Variable => get_variable_opcode_name(opcode, operand_count),
        InstructionForm::Short => match operand_count {
            OperandCount::OP0 => get_0op_opcode_name(opcode),
            OperandCount::OP1 => get_1op_opcode_name(opcode),
            _ => "unknown",
        },
        InstructionForm::Long => get_2op_opcode_name(opcode),
    }
}

fn get_2op_opcode_name(opcode: u8) -> &'static str {
    match opcode {
        0x01 => "je",
        0x02 => "jl",
        0x03 => "jg",
        0x04 => "dec_chk",
        0x05 => "inc_chk",
        0x06 => "jin",
        0x07 => "test",
        0x08 => "or",
        0x09 => "and",
        0x0A => "test_attr",
        0x0B => "set_attr",
        0x0C => "clear_attr",
        0x0D => "store",
        0x0E => "insert_obj",
        0x0F => "loadw",
        0x10 => "loadb",
        0x11 => "get_prop",
        0x12 => "get_prop_addr",
        0x13 => "get_next_prop",
        0x14 => "add",
        0x15 => "sub",
        0x16 => "mul",
        0x17 => "div",
        0x18 => "mod",
        _ => "unknown_2op",
    }
}

fn get_1op_opcode_name(opcode: u8) -> &'static str {
    match opcode {
        0x00 => "jz",
        0x01 => "get_sibling",
        0x02 => "get_child",
        0x03 => "get_parent",
        0x04 => "get_prop_len",
        0x05 => "inc",
        0x06 => "dec",
        0x07 => "print_addr",
        0x08 => "call_1s",
        0x09 => "remove_obj",
        0x0A => "print_obj",
        0x0B => "ret",
        0x0C => "jump",
        0x0D => "print_paddr",
        0x0E => "load",
        0x0F => "not",
        _ => "unknown_1op",
    }
}

fn get_0op_opcode_name(opcode: u8) -> &'static str {
    match opcode {
        0x00 => "rtrue",
        0x01 => "rfalse",
        0x02 => "print",
        0x03 => "print_ret",
        0x04 => "nop",
        0x05 => "save",
        0x06 => "restore",
        0x07 => "restart",
        0x08 => "ret_popped",
        0x09 => "pop",
        0x0A => "quit",
        0x0B => "new_line",
        0x0C => "show_status",
        0x0D => "verify",
        _ => "unknown_0op",
    }
}

fn get_variable_opcode_name(opcode: u8, operand_count: OperandCount) -> &'static str {
    match operand_count {
        OperandCount::VAR => match opcode {
            0x00 => "call",
            0x01 => "storew",
            0x02 => "storeb",
            0x03 => "put_prop",
            0x04 => "sread",
            0x05 => "print_char",
            0x06 => "print_num",
            0x07 => "random",
            0x08 => "push",
            0x09 => "pull",
            0x0A => "split_window",
            0x0B => "set_window",
            0x13 => "output_stream",
            0x14 => "input_stream",
            _ => "unknown_var",
        },
        OperandCount::OP2 => get_2op_opcode_name(opcode),
        _ => "unknown_var",
    }
}

/// V3 store-variable opcode sets (spec §4.4).
pub fn stores_result(operand_count: OperandCount, opcode: u8) -> bool {
    match operand_count {
        OperandCount::OP0 => false,
        OperandCount::OP1 => matches!(opcode, 0x01 | 0x02 | 0x03 | 0x04 | 0x0E | 0x0F),
        OperandCount::OP2 => matches!(
            opcode,
            0x08 | 0x09 | 0x0F | 0x10 | 0x11 | 0x12 | 0x13 | 0x14 | 0x15 | 0x16 | 0x17 | 0x18
        ),
        OperandCount::VAR => matches!(opcode, 0x00 | 0x07),
    }
}

/// V3 branch opcode sets (spec §4.4).
pub fn has_branch(operand_count: OperandCount, opcode: u8) -> bool {
    match operand_count {
        OperandCount::OP0 => matches!(opcode, 0x05 | 0x06 | 0x0D),
        OperandCount::OP1 => matches!(opcode, 0x00 | 0x01 | 0x02),
        OperandCount::OP2 => (0x01..=0x07).contains(&opcode) || opcode == 0x0A,
        OperandCount::VAR => false,
    }
}

/// 0OP opcodes that carry an inline trailing Z-string (spec §4.4).
pub fn has_trailing_string(operand_count: OperandCount, opcode: u8) -> bool {
    matches!(operand_count, OperandCount::OP0) && matches!(opcode, 0x02 | 0x03)
}
