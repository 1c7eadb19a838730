mod builtins;
mod emit;
mod error;
mod frame;
mod jit;

pub use builtins::BuiltinFunctions;
pub use emit::ProgramEmitter;
pub use error::CodegenError;
pub use frame::{FrameLayout, VariableSlot, VAR_SLOT_SIZE};

use jit::JitBuffer;

use crate::ir::{LabelTable, Program};

use std::fmt::Write;

/// Base used when the code only needs to be inspected, not run.
const DUMP_BASE_ADDRESS: u64 = 0x1000;

/// Lowers the program and returns the emitter, ready to assemble at any
/// base address.
pub fn gen_x64<'a>(
    program: &Program,
    table: &'a LabelTable,
    builtins: &'a BuiltinFunctions,
) -> Result<ProgramEmitter<'a>, CodegenError> {
    let mut emitter = ProgramEmitter::new(table, builtins)?;
    emitter.emit_program(program)?;
    Ok(emitter)
}

/// Lowers, maps, and runs the program in process. The returned integer is
/// whatever the generated entry point leaves in eax; callers usually
/// discard it.
pub fn exec(
    program: &Program,
    table: &LabelTable,
    builtins: &BuiltinFunctions,
) -> Result<i32, CodegenError> {
    // the first assembly probes the size, the second targets the real base
    let probe = gen_x64(program, table, builtins)?.assemble(DUMP_BASE_ADDRESS)?;

    let mut buffer = JitBuffer::map(probe.len() + 64)?;
    let code = gen_x64(program, table, builtins)?.assemble(buffer.base())?;
    buffer.install(&code)?;

    let entry = unsafe { buffer.entry() };
    Ok(entry())
}

/// Lowers the program and renders the code buffer as upper-case hex.
pub fn dump_x86_64(
    program: &Program,
    table: &LabelTable,
    builtins: &BuiltinFunctions,
) -> Result<String, CodegenError> {
    let code = gen_x64(program, table, builtins)?.assemble(DUMP_BASE_ADDRESS)?;

    let mut out = String::with_capacity(code.len() * 2);
    for byte in code {
        let _ = write!(out, "{byte:02X}");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_program;

    fn pipeline(source: &str) -> (Program, LabelTable, BuiltinFunctions) {
        let (program, table) = parse_program(source).unwrap();
        (program, table, BuiltinFunctions::standard())
    }

    #[test]
    fn hex_dump_is_upper_case_hex() {
        let (program, table, builtins) = pipeline("var a int32\nmov a 42\n");

        let hex = dump_x86_64(&program, &table, &builtins).unwrap();

        assert!(!hex.is_empty());
        assert_eq!(hex.len() % 2, 0);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[cfg(all(unix, target_arch = "x86_64"))]
    #[test]
    fn exec_runs_a_trivial_program() {
        let (program, table, builtins) = pipeline(
            "var a int32\n\
             mov a 42\n\
             function main ( )\n\
             ret\n",
        );

        assert!(exec(&program, &table, &builtins).is_ok());
    }

    // an even variable count keeps rsp 16-aligned at call sites, which the
    // System-V callees on the host side rely on

    #[cfg(all(unix, target_arch = "x86_64"))]
    #[test]
    fn exec_runs_arithmetic_and_builtin_calls() {
        let (program, table, builtins) = pipeline(
            "var a int32\n\
             var b int32\n\
             var c int32\n\
             var pad int32\n\
             mov a 2\n\
             mov b 3\n\
             add c a b\n\
             call writeln c\n",
        );

        assert!(exec(&program, &table, &builtins).is_ok());
    }

    #[cfg(all(unix, target_arch = "x86_64"))]
    #[test]
    fn exec_runs_user_functions_with_arguments() {
        let (program, table, builtins) = pipeline(
            "function show (x int32)\n\
             var pad int32\n\
             call writeln x\n\
             ret\n\
             var a int32\n\
             var pad2 int32\n\
             mov a 9\n\
             call show a\n",
        );

        assert!(exec(&program, &table, &builtins).is_ok());
    }
}
