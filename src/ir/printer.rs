use std::fmt::Write;

use super::instruction::{Instruction, Program};

/// Renders a program back to source, one instruction per line. Function
/// bodies are indented below their signature and keep their terminating
/// `ret`, so the output parses back to an equal program.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();

    for instr in program {
        push_instruction(&mut out, instr, 0);
    }

    out
}

fn push_instruction(out: &mut String, instr: &Instruction, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    let _ = writeln!(out, "{instr}");

    if let Instruction::Function { body, .. } = instr {
        for inner in body {
            push_instruction(out, inner, depth + 1);
        }
    }
}
