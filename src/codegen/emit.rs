use std::collections::BTreeMap;

use hashbrown::HashMap;
use iced_x86::code_asm::*;

use super::builtins::BuiltinFunctions;
use super::error::CodegenError;
use super::frame::FrameLayout;
use crate::ir::{is_literal_operand, Instruction, LabelTable, Opcode, Program};

/// System-V integer argument registers, in order.
const ARG_REGISTERS: [AsmRegister64; 6] = [rdi, rsi, rdx, rcx, r8, r9];
const MAX_REGISTER_ARGS: usize = 6;
const STACK_ARG_SIZE: i32 = 8;

/// Lowers a program to x86-64 through the `iced-x86` code assembler.
///
/// Emission is two-pass: a `jmp main` lands first, then every cached
/// `function` body (each with a synthesized parameter prolog), then the
/// top-level program bound to `main`. Every instruction of a block gets its
/// own assembler label so numeric and symbolic jumps resolve to positions
/// that may not exist yet.
pub struct ProgramEmitter<'a> {
    asm: CodeAssembler,
    table: &'a LabelTable,
    builtins: &'a BuiltinFunctions,
    function_labels: HashMap<String, CodeLabel>,
}

impl<'a> ProgramEmitter<'a> {
    pub fn new(
        table: &'a LabelTable,
        builtins: &'a BuiltinFunctions,
    ) -> Result<Self, CodegenError> {
        Ok(Self {
            asm: CodeAssembler::new(64)?,
            table,
            builtins,
            function_labels: HashMap::new(),
        })
    }

    pub fn emit_program(&mut self, program: &Program) -> Result<(), CodegenError> {
        let mut main_label = self.asm.create_label();
        self.asm.jmp(main_label)?;

        // pass one: cache function definitions and create their labels up
        // front so calls resolve regardless of emission order
        let mut functions: BTreeMap<String, (Vec<String>, Program)> = BTreeMap::new();
        for instr in program {
            if let Instruction::Function { args, body } = instr {
                let name = args[0].clone();
                self.function_labels.insert(name.clone(), self.asm.create_label());
                functions.insert(name, (args.clone(), body.clone()));
            }
        }

        // pass two: function bodies, each in its own frame
        for (name, (args, body)) in &functions {
            let prepared = prepare_function_body(args, body);
            let frame = FrameLayout::build(&prepared);

            let mut label = self.function_labels[name.as_str()];
            self.bind(&mut label)?;
            self.emit_prologue()?;
            let allocated = self.emit_allocation(&frame)?;
            self.emit_block(&prepared, &frame)?;
            self.emit_deallocate_and_return(allocated)?;
        }

        // finally the top level
        self.bind(&mut main_label)?;
        self.emit_prologue()?;
        let frame = FrameLayout::build(program);
        let allocated = self.emit_allocation(&frame)?;
        self.emit_block(program, &frame)?;
        self.emit_deallocate_and_return(allocated)?;

        Ok(())
    }

    pub fn assemble(&mut self, base: u64) -> Result<Vec<u8>, CodegenError> {
        Ok(self.asm.assemble(base)?)
    }

    /// Places a label at the current position. The zero-width filler lets
    /// several labels land on the same address, which happens whenever an
    /// instruction-final label meets the next instruction's entry label.
    fn bind(&mut self, label: &mut CodeLabel) -> Result<(), CodegenError> {
        self.asm.set_label(label)?;
        self.asm.zero_bytes()?;
        Ok(())
    }

    fn emit_prologue(&mut self) -> Result<(), CodegenError> {
        self.asm.push(rbp)?;
        self.asm.mov(rbp, rsp)?;
        Ok(())
    }

    fn emit_allocation(&mut self, frame: &FrameLayout) -> Result<i32, CodegenError> {
        let allocated = frame.allocated_bytes();
        if allocated > 0 {
            self.asm.sub(rsp, allocated)?;
        }
        Ok(allocated)
    }

    fn emit_deallocate_and_return(&mut self, allocated: i32) -> Result<(), CodegenError> {
        if allocated > 0 {
            self.asm.add(rsp, allocated)?;
        }
        self.asm.pop(rbp)?;
        self.asm.ret()?;
        Ok(())
    }

    fn emit_block(&mut self, block: &Program, frame: &FrameLayout) -> Result<(), CodegenError> {
        let labels: Vec<CodeLabel> =
            (0..block.len()).map(|_| self.asm.create_label()).collect();

        for (index, instr) in block.iter().enumerate() {
            let mut label = labels[index];
            self.bind(&mut label)?;
            self.emit_instruction(instr, index, frame, &labels)?;
        }

        Ok(())
    }

    fn emit_instruction(
        &mut self,
        instr: &Instruction,
        index: usize,
        frame: &FrameLayout,
        labels: &[CodeLabel],
    ) -> Result<(), CodegenError> {
        match instr {
            Instruction::Binary(Opcode::Mov, dst, src) => {
                let dst_offset = frame.offset(dst)?;
                if is_literal_operand(src) {
                    let value = parse_immediate(src)?;
                    self.asm.mov(dword_ptr(rbp + dst_offset), value)?;
                } else {
                    let src_offset = frame.offset(src)?;
                    self.asm.mov(rax, qword_ptr(rbp + src_offset))?;
                    self.asm.mov(qword_ptr(rbp + dst_offset), rax)?;
                }
            }
            Instruction::ThreeAddr(op, dst, lhs, rhs) if op.is_comparison() => {
                self.emit_comparison(*op, dst, lhs, rhs, frame)?;
            }
            Instruction::ThreeAddr(op, dst, lhs, rhs) => {
                self.emit_arithmetic(*op, dst, lhs, rhs, frame)?;
            }
            Instruction::Unary(Opcode::Push, arg) => {
                let offset = frame.offset(arg)?;
                self.asm.push(qword_ptr(rbp + offset))?;
            }
            Instruction::Unary(Opcode::Pop, arg) => {
                let offset = frame.offset(arg)?;
                self.asm.pop(qword_ptr(rbp + offset))?;
            }
            Instruction::Unary(Opcode::Jmp, target) => {
                let target_label = self.resolve_block_target(index, target, labels, true)?;
                self.asm.jmp(target_label)?;
            }
            Instruction::Binary(Opcode::If, cond, target) => {
                let cond_offset = frame.offset(cond)?;
                let target_label = self.resolve_block_target(index, target, labels, false)?;
                let mut false_label = self.asm.create_label();

                // taken means cond > 0
                self.asm.mov(ebx, dword_ptr(rbp + cond_offset))?;
                self.asm.cmp(ebx, 0)?;
                self.asm.jle(false_label)?;
                self.asm.jmp(target_label)?;
                self.bind(&mut false_label)?;
            }
            Instruction::Call { args } => {
                self.emit_call(args, frame)?;
            }
            Instruction::PopArgs { params } => {
                for (arg_index, (name, _)) in
                    params.iter().take(MAX_REGISTER_ARGS).enumerate()
                {
                    let offset = frame.offset(name)?;
                    self.asm.mov(qword_ptr(rbp + offset), ARG_REGISTERS[arg_index])?;
                }
            }
            Instruction::NoArg(Opcode::Nop) => {
                self.asm.nop()?;
            }
            // var and label only shape the frame and label maps; ret is
            // subsumed by the block epilogue; new/delete have no lowering;
            // function records were cached in pass one
            _ => {}
        }

        Ok(())
    }

    fn emit_arithmetic(
        &mut self,
        op: Opcode,
        dst: &str,
        lhs: &str,
        rhs: &str,
        frame: &FrameLayout,
    ) -> Result<(), CodegenError> {
        let dst_offset = frame.offset(dst)?;
        let lhs_offset = frame.offset(lhs)?;
        let rhs_offset = frame.offset(rhs)?;

        match op {
            Opcode::Add => {
                self.asm.mov(rax, qword_ptr(rbp + lhs_offset))?;
                self.asm.add(rax, qword_ptr(rbp + rhs_offset))?;
            }
            Opcode::Sub => {
                self.asm.mov(rax, qword_ptr(rbp + lhs_offset))?;
                self.asm.sub(rax, qword_ptr(rbp + rhs_offset))?;
            }
            Opcode::Mul => {
                self.asm.mov(rax, qword_ptr(rbp + lhs_offset))?;
                self.asm.mov(rcx, qword_ptr(rbp + rhs_offset))?;
                self.asm.mul(rcx)?;
            }
            Opcode::Div => {
                self.asm.mov(rax, qword_ptr(rbp + lhs_offset))?;
                self.asm.cdq()?;
                self.asm.idiv(dword_ptr(rbp + rhs_offset))?;
            }
            _ => unreachable!("not an arithmetic opcode: {op}"),
        }

        self.asm.mov(dword_ptr(rbp + dst_offset), eax)?;
        Ok(())
    }

    /// Materializes a comparison result as 0 or 1 in the destination slot.
    /// The branch to `false_label` takes the *inverted* predicate.
    fn emit_comparison(
        &mut self,
        op: Opcode,
        dst: &str,
        lhs: &str,
        rhs: &str,
        frame: &FrameLayout,
    ) -> Result<(), CodegenError> {
        let dst_offset = frame.offset(dst)?;
        let lhs_offset = frame.offset(lhs)?;
        let rhs_offset = frame.offset(rhs)?;

        self.asm.mov(eax, dword_ptr(rbp + lhs_offset))?;
        self.asm.cmp(eax, dword_ptr(rbp + rhs_offset))?;

        let mut false_label = self.asm.create_label();
        let mut end_label = self.asm.create_label();

        match op {
            Opcode::CmpEq => self.asm.jne(false_label)?,
            Opcode::CmpNeq => self.asm.je(false_label)?,
            Opcode::CmpGt => self.asm.jle(false_label)?,
            Opcode::CmpLt => self.asm.jge(false_label)?,
            Opcode::CmpLte => self.asm.jg(false_label)?,
            Opcode::CmpGte => self.asm.jl(false_label)?,
            _ => unreachable!("not a comparison opcode: {op}"),
        }

        self.asm.mov(eax, 1)?;
        self.asm.mov(dword_ptr(rbp + dst_offset), eax)?;
        self.asm.jmp(end_label)?;
        self.bind(&mut false_label)?;
        self.asm.mov(eax, 0)?;
        self.asm.mov(dword_ptr(rbp + dst_offset), eax)?;
        self.bind(&mut end_label)?;

        Ok(())
    }

    /// Marshals arguments into registers (and, past six, onto the stack in
    /// reverse order), then calls either a user function label or a builtin
    /// by pointer immediate, cleaning up stack arguments afterwards.
    fn emit_call(&mut self, args: &[String], frame: &FrameLayout) -> Result<(), CodegenError> {
        let name = &args[0];
        let actual = &args[1..];

        for (arg_index, arg) in actual.iter().take(MAX_REGISTER_ARGS).enumerate() {
            let register = ARG_REGISTERS[arg_index];
            if is_literal_operand(arg) {
                self.asm.mov(register, parse_immediate(arg)? as i64)?;
            } else {
                let offset = frame.offset(arg)?;
                self.asm.mov(register, qword_ptr(rbp + offset))?;
            }
        }

        if actual.len() > MAX_REGISTER_ARGS {
            for arg in actual[MAX_REGISTER_ARGS..].iter().rev() {
                if is_literal_operand(arg) {
                    self.asm.push(parse_immediate(arg)?)?;
                } else {
                    let offset = frame.offset(arg)?;
                    self.asm.push(qword_ptr(rbp + offset))?;
                }
            }
        }

        if let Some(label) = self.function_labels.get(name.as_str()).copied() {
            self.asm.call(label)?;
        } else if let Some(entry) = self.builtins.get(name) {
            self.asm.mov(rax, entry)?;
            self.asm.call(rax)?;
        } else {
            return Err(CodegenError::UnknownFunction { name: name.clone() });
        }

        if actual.len() > MAX_REGISTER_ARGS {
            let stack_bytes = (actual.len() - MAX_REGISTER_ARGS) as i32 * STACK_ARG_SIZE;
            self.asm.add(rsp, stack_bytes)?;
        }

        Ok(())
    }

    /// Resolves a jump target to the pre-allocated label of an instruction
    /// in the current block. Positive numeric offsets carry the historical
    /// `+1` adjustment on `jmp` (`adjust_positive`); `if` targets do not.
    fn resolve_block_target(
        &self,
        index: usize,
        target: &str,
        labels: &[CodeLabel],
        adjust_positive: bool,
    ) -> Result<CodeLabel, CodegenError> {
        let target_index = if is_literal_operand(target) {
            let mut offset = parse_immediate(target)?;
            if adjust_positive && offset > 0 {
                offset += 1;
            }
            index as i32 + offset
        } else {
            match self.table.get(target) {
                Some(resolved) => resolved as i32,
                None => return Err(CodegenError::UnknownLabel { name: target.to_string() }),
            }
        };

        usize::try_from(target_index)
            .ok()
            .and_then(|i| labels.get(i).copied())
            .ok_or(CodegenError::TargetOutOfRange { index: target_index })
    }
}

/// Injects the parameter prolog: one `var` per parameter followed by a
/// single `pop_args` that spills the argument registers into those slots.
fn prepare_function_body(args: &[String], body: &Program) -> Program {
    let params: Vec<(String, String)> = args[1..]
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();

    let mut prepared = Program::new();
    for (name, ty) in &params {
        prepared.push(Instruction::Binary(Opcode::Var, name.clone(), ty.clone()));
    }
    if !params.is_empty() {
        prepared.push(Instruction::PopArgs { params });
    }
    prepared.extend(body.iter().cloned());

    prepared
}

fn parse_immediate(token: &str) -> Result<i32, CodegenError> {
    token
        .parse::<i32>()
        .map_err(|_| CodegenError::BadImmediate { token: token.to_string() })
}
