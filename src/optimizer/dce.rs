use crate::analysis::VariableIntervals;
use crate::ir::{Opcode, Program};

/// Dead-code elimination driven by live ranges. Declarations and control
/// flow anchors always survive; every other instruction survives only while
/// some live interval of a variable it mentions covers its index. Survivors
/// are cloned into a fresh program in their original order.
pub fn remove_dead_code(program: &Program, intervals: &VariableIntervals) -> Program {
    let mut optimized = Program::new();

    for (index, instr) in program.iter().enumerate() {
        let keep = match instr.opcode() {
            Opcode::Var
            | Opcode::Function
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Nop
            | Opcode::Label => true,
            _ => intervals.covers(instr, index),
        };

        if keep {
            optimized.push(instr.clone());
        }
    }

    optimized
}

pub fn optimize(program: &Program, intervals: &VariableIntervals) -> Program {
    remove_dead_code(program, intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{build_cfg, compute_variable_live_ranges, liveness_analysis};
    use crate::ir::{dump_program, parse_program, LabelTable};

    fn run_pipeline(program: &Program, table: &LabelTable) -> Program {
        let cfg = build_cfg(program, table);
        let sets = liveness_analysis(program, &cfg);
        let intervals = compute_variable_live_ranges(&sets);
        optimize(program, &intervals)
    }

    #[test]
    fn dead_store_is_removed_but_its_declaration_stays() {
        let (program, table) = parse_program(
            "var a int32\n\
             mov a 1\n\
             var b int32\n\
             mov b 2\n\
             var c int32\n\
             add c a a\n\
             push c\n",
        )
        .unwrap();

        let optimized = run_pipeline(&program, &table);

        assert_eq!(
            dump_program(&optimized),
            "var a int32\n\
             mov a 1\n\
             var b int32\n\
             var c int32\n\
             add c a a\n\
             push c\n"
        );
    }

    #[test]
    fn control_flow_anchors_always_survive() {
        let (program, table) = parse_program(
            "label top :\n\
             nop\n\
             jmp top\n\
             call writeln 1\n",
        )
        .unwrap();

        let optimized = run_pipeline(&program, &table);

        assert_eq!(optimized, program);
    }

    #[test]
    fn optimization_is_idempotent_after_recomputation() {
        let (program, table) = parse_program(
            "var a int32\n\
             mov a 1\n\
             var b int32\n\
             mov b 2\n\
             var c int32\n\
             add c a a\n\
             push c\n",
        )
        .unwrap();

        let once = run_pipeline(&program, &table);
        // indices shifted, so the analyses rerun from scratch
        let twice = run_pipeline(&once, &table);

        assert_eq!(once, twice);
    }

    #[test]
    fn live_instructions_are_deep_clones() {
        let (program, table) = parse_program("var a int32\nmov a 1\npush a\n").unwrap();

        let optimized = run_pipeline(&program, &table);

        assert_eq!(optimized, program);
    }
}
