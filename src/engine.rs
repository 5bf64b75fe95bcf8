//! The execution engine (spec §4.5, §6): decodes one instruction per
//! `execute_step`, dispatches by `(category, opcode)`, and owns the PC, call
//! stack, and host interface handles for its lifetime.

use crate::error::{LoadError, ZError};
use crate::host::{Filesystem, Keyboard, Screen, TextStyle};
use crate::instruction::{Instruction, OperandCount, OperandType};
use crate::text;
use crate::vm::{CallFrame, VM};
use log::{debug, error};
use std::io::Read;

/// The outcome of one `execute_step` call.
#[derive(Debug)]
pub enum StepResult {
    Ok,
    Halted,
    Fault(ZError),
}

/// Owns the VM state and the host interface handles the engine talks to
/// for I/O (spec §4.6, §9: "the engine holds opaque handles").
pub struct Engine {
    vm: VM,
    screen: Box<dyn Screen>,
    keyboard: Box<dyn Keyboard>,
    #[allow(dead_code)]
    filesystem: Box<dyn Filesystem>,
}

impl Engine {
    pub fn new<R: Read>(
        stream: R,
        screen: Box<dyn Screen>,
        keyboard: Box<dyn Keyboard>,
        filesystem: Box<dyn Filesystem>,
    ) -> Result<Engine, LoadError> {
        let vm = VM::load(stream)?;
        debug!("engine constructed, pc={:#06x}", vm.pc);
        Ok(Engine {
            vm,
            screen,
            keyboard,
            filesystem,
        })
    }

    pub fn is_running(&self) -> bool {
        self.vm.running
    }

    /// Pump any keyboard events that have accumulated since the last call.
    /// The core does not implement `sread` so this currently only drains
    /// the queue to keep the non-blocking contract honest (spec §5); a
    /// reader may build on this to implement input opcodes later.
    pub fn pump_input(&mut self) -> Vec<crate::host::InputEvent> {
        self.keyboard.get_input()
    }

    /// Decode and dispatch exactly one instruction.
    pub fn execute_step(&mut self) -> StepResult {
        if !self.vm.running {
            return StepResult::Halted;
        }

        let pc = self.vm.pc;
        let inst = match self.decode_at(pc) {
            Ok(inst) => inst,
            Err(e) => return self.fault(e),
        };
        self.vm.pc += inst.size as u32;

        match self.dispatch(&inst) {
            Ok(DispatchOutcome::Continue) => StepResult::Ok,
            Ok(DispatchOutcome::Halt) => {
                self.vm.running = false;
                StepResult::Halted
            }
            Err(e) => self.fault(e),
        }
    }

    fn decode_at(&self, pc: u32) -> Result<Instruction, ZError> {
        // Instruction::decode reads straight from the image; a V3 story's
        // high memory holds executable code so this must read past
        // `readable` if the spec's loadb/loadw view were used instead.
        Instruction::decode(self.vm.memory(), pc)
    }

    fn fault(&mut self, e: ZError) -> StepResult {
        error!("engine faulted: {e}");
        self.vm.running = false;
        StepResult::Fault(e)
    }

    fn resolve_operand(&mut self, op_type: OperandType, value: u16) -> Result<u16, ZError> {
        match op_type {
            OperandType::LargeConstant => Ok(value),
            OperandType::SmallConstant => Ok(value),
            OperandType::Variable => self.vm.read_variable(value as u8),
            OperandType::Omitted => Err(ZError::InternalError(
                "attempted to resolve an omitted operand".to_string(),
            )),
        }
    }

    fn resolve_operands(&mut self, inst: &Instruction) -> Result<Vec<u16>, ZError> {
        inst.operands
            .iter()
            .map(|op| self.resolve_operand(op.op_type, op.value))
            .collect()
    }

    /// Reject an instruction whose operand count doesn't match what the
    /// opcode requires. The decoder does not validate this itself (spec
    /// §4.4), so every handler that indexes a fixed operand position must
    /// check first, mirroring the original's per-opcode guards.
    fn require_operand_count(
        inst: &Instruction,
        mnemonic: &'static str,
        expected: usize,
        expected_str: &'static str,
    ) -> Result<(), ZError> {
        if inst.operands.len() != expected {
            return Err(ZError::WrongNumberOfInstructionOperands {
                mnemonic,
                got: inst.operands.len(),
                expected: expected_str,
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        use OperandCount::*;
        match (inst.operand_count, inst.opcode) {
            (VAR, 0x00) => self.op_call(inst),
            (OP1, 0x0B) => self.op_ret(inst),
            (OP0, 0x00) => self.op_return_value(1),
            (OP0, 0x01) => self.op_return_value(0),
            (OP0, 0x08) => {
                let v = self.vm.pop_local_stack()?;
                self.op_return_value(v)
            }
            (OP0, 0x03) => self.op_print_ret(inst),
            (OP0, 0x09) => {
                self.vm.pop_local_stack()?;
                Ok(DispatchOutcome::Continue)
            }
            (VAR, 0x08) => self.op_push(inst),
            (VAR, 0x09) => self.op_pull(inst),
            (OP2, 0x0D) => self.op_store(inst),
            (OP1, 0x0E) => self.op_load(inst),
            (VAR, 0x02) => self.op_storeb(inst),
            (VAR, 0x01) => self.op_storew(inst),
            (OP2, 0x10) => self.op_loadb(inst),
            (OP2, 0x0F) => self.op_loadw(inst),
            (OP1, 0x0C) => self.op_jump(inst),
            (OP1, 0x00) => self.op_jz(inst),
            (OP2, 0x01) => self.op_je(inst),
            (OP2, 0x02) => self.op_jl(inst),
            (OP2, 0x03) => self.op_jg(inst),
            (OP0, 0x0A) => Ok(DispatchOutcome::Halt),
            _ => Err(ZError::UnimplementedInstruction {
                category: category_name(inst.operand_count),
                opcode: inst.opcode,
            }),
        }
    }

    fn take_branch(&mut self, inst: &Instruction, cond: bool) -> Result<DispatchOutcome, ZError> {
        let Some(branch) = inst.branch else {
            return Ok(DispatchOutcome::Continue);
        };
        if cond != branch.on_true {
            return Ok(DispatchOutcome::Continue);
        }
        match branch.offset {
            0 => self.op_return_value(0),
            1 => self.op_return_value(1),
            offset => {
                self.vm.pc = (self.vm.pc as i64 + offset as i64 - 2) as u32;
                Ok(DispatchOutcome::Continue)
            }
        }
    }

    fn op_call(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        let operands = self.resolve_operands(inst)?;
        if operands.is_empty() {
            return Err(ZError::WrongNumberOfInstructionOperands {
                mnemonic: "call",
                got: 0,
                expected: "1..4",
            });
        }
        let routine = operands[0];
        if routine == 0 {
            if let Some(store) = inst.store_var {
                self.vm.write_variable(store, 0)?;
            }
            return Ok(DispatchOutcome::Continue);
        }

        let expanded = text::unpack_string_address(routine) as u32;
        let locals_count = self.vm.read_byte(expanded) as usize;
        if locals_count > 15 {
            return Err(ZError::InternalError(format!(
                "routine at {expanded:#06x} declares {locals_count} locals (max 15)"
            )));
        }

        let mut locals = Vec::with_capacity(locals_count);
        for i in 0..locals_count {
            locals.push(self.vm.read_word(expanded + 1 + 2 * i as u32));
        }

        let args = &operands[1..];
        for (i, &arg) in args.iter().enumerate().take(locals_count) {
            locals[i] = arg;
        }

        let frame = CallFrame {
            return_pc: self.vm.pc,
            result_variable: inst.store_var,
            argument_count: args.len() as u8,
            local_variables: locals,
            local_stack: Vec::new(),
        };
        self.vm.call_stack.push(frame);
        self.vm.pc = expanded + 1 + 2 * locals_count as u32;
        Ok(DispatchOutcome::Continue)
    }

    fn op_ret(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        let operands = self.resolve_operands(inst)?;
        self.op_return_value(operands[0])
    }

    fn op_return_value(&mut self, value: u16) -> Result<DispatchOutcome, ZError> {
        let frame = self
            .vm
            .call_stack
            .pop()
            .ok_or_else(|| ZError::InternalError("call stack underflow on return".to_string()))?;
        if self.vm.call_stack.is_empty() {
            return Err(ZError::InternalError(
                "returned from the dummy top-level frame".to_string(),
            ));
        }
        self.vm.pc = frame.return_pc;
        if let Some(store) = frame.result_variable {
            self.vm.write_variable(store, value)?;
        }
        Ok(DispatchOutcome::Continue)
    }

    fn op_print_ret(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        if let Some(addr) = inst.trailing_string_addr {
            let (s, _) = text::decode_string(self.vm.memory(), addr as usize, self.abbrev_table_addr())
                .map_err(ZError::InternalError)?;
            self.screen.print(&s, TextStyle::default());
        }
        self.screen.print("\n", TextStyle::default());
        self.op_return_value(1)
    }

    fn abbrev_table_addr(&self) -> usize {
        // The header field for the abbreviations table is not part of this
        // core's §4.1 field set (only version/high_begin/initial_pc/
        // globals_base/static_begin are parsed); 0 disables abbreviation
        // expansion rather than guessing an address.
        0
    }

    fn op_push(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "push", 1, "1")?;
        let operands = self.resolve_operands(inst)?;
        self.vm.push_local_stack(operands[0])?;
        Ok(DispatchOutcome::Continue)
    }

    fn op_pull(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "pull", 1, "1")?;
        let target = self.resolve_operand(inst.operands[0].op_type, inst.operands[0].value)?;
        let value = self.vm.pop_local_stack()?;
        self.vm.write_variable(target as u8, value)?;
        Ok(DispatchOutcome::Continue)
    }

    fn op_store(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "store", 2, "2")?;
        let target = self.resolve_operand(inst.operands[0].op_type, inst.operands[0].value)?;
        let value = self.resolve_operand(inst.operands[1].op_type, inst.operands[1].value)?;
        self.vm.write_variable(target as u8, value)?;
        Ok(DispatchOutcome::Continue)
    }

    fn op_load(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "load", 1, "1")?;
        let target = self.resolve_operand(inst.operands[0].op_type, inst.operands[0].value)?;
        let value = self.vm.read_variable(target as u8)?;
        if let Some(store) = inst.store_var {
            self.vm.write_variable(store, value)?;
        }
        Ok(DispatchOutcome::Continue)
    }

    fn op_storeb(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "storeb", 3, "3")?;
        let operands = self.resolve_operands(inst)?;
        let addr = operands[0] as u32 + operands[1] as u32;
        self.vm.write_byte(addr, operands[2] as u8);
        Ok(DispatchOutcome::Continue)
    }

    fn op_storew(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "storew", 3, "3")?;
        let operands = self.resolve_operands(inst)?;
        let addr = operands[0] as u32 + 2 * operands[1] as u32;
        self.vm.write_word(addr, operands[2]);
        Ok(DispatchOutcome::Continue)
    }

    fn op_loadb(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "loadb", 2, "2")?;
        let operands = self.resolve_operands(inst)?;
        let addr = operands[0] as u32 + operands[1] as u32;
        let value = self.vm.read_byte(addr) as u16;
        if let Some(store) = inst.store_var {
            self.vm.write_variable(store, value)?;
        }
        Ok(DispatchOutcome::Continue)
    }

    fn op_loadw(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "loadw", 2, "2")?;
        let operands = self.resolve_operands(inst)?;
        let addr = operands[0] as u32 + 2 * operands[1] as u32;
        let value = self.vm.read_word(addr);
        if let Some(store) = inst.store_var {
            self.vm.write_variable(store, value)?;
        }
        Ok(DispatchOutcome::Continue)
    }

    fn op_jump(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        let operands = self.resolve_operands(inst)?;
        let offset = operands[0] as i16;
        self.vm.pc = (self.vm.pc as i64 + offset as i64 - 2) as u32;
        Ok(DispatchOutcome::Continue)
    }

    fn op_jz(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        let operands = self.resolve_operands(inst)?;
        let cond = operands[0] == 0;
        self.take_branch(inst, cond)
    }

    fn op_je(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        // Policy (spec §9 open question): evaluate every operand even once
        // equality is decided, so stack-popping operands have deterministic
        // effects regardless of which ones "mattered".
        let operands = self.resolve_operands(inst)?;
        let cond = operands.len() >= 2 && operands[1..].iter().any(|&v| v == operands[0]);
        self.take_branch(inst, cond)
    }

    fn op_jl(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "jl", 2, "2")?;
        let operands = self.resolve_operands(inst)?;
        let cond = (operands[0] as i16) < (operands[1] as i16);
        self.take_branch(inst, cond)
    }

    fn op_jg(&mut self, inst: &Instruction) -> Result<DispatchOutcome, ZError> {
        Self::require_operand_count(inst, "jg", 2, "2")?;
        let operands = self.resolve_operands(inst)?;
        let cond = (operands[0] as i16) > (operands[1] as i16);
        self.take_branch(inst, cond)
    }
}

enum DispatchOutcome {
    Continue,
    Halt,
}

fn category_name(operand_count: OperandCount) -> &'static str {
    match operand_count {
        OperandCount::OP0 => "0OP",
        OperandCount::OP1 => "1OP",
        OperandCount::OP2 => "2OP",
        OperandCount::VAR => "VAR",
    }
}
