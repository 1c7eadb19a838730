use std::collections::BTreeMap;

use crate::ir::{is_literal_operand, Instruction, Opcode, Program};

/// Per-instruction GEN (used) and KILL (defined) variables. Vectors keep
/// duplicates and insertion order because the diagnostic dumps show them
/// verbatim; set semantics only matter once liveness runs.
#[derive(Debug, Default, PartialEq)]
pub struct UseDefSets {
    pub gen: BTreeMap<usize, Vec<String>>,
    pub kill: BTreeMap<usize, Vec<String>>,
}

impl UseDefSets {
    fn gen_push(&mut self, index: usize, var: &str) {
        self.gen.entry(index).or_default().push(var.to_string());
    }

    fn kill_push(&mut self, index: usize, var: &str) {
        self.kill.entry(index).or_default().push(var.to_string());
    }
}

pub fn build_use_def_sets(program: &Program) -> UseDefSets {
    let mut sets = UseDefSets::default();

    for (index, instr) in program.iter().enumerate() {
        match instr {
            Instruction::Binary(Opcode::Mov, dst, src) => {
                sets.kill_push(index, dst);
                if !is_literal_operand(src) {
                    sets.gen_push(index, src);
                }
            }
            // pop counts as a use, matching the original analysis
            Instruction::Unary(Opcode::Push | Opcode::Pop | Opcode::New | Opcode::Delete, arg) => {
                sets.gen_push(index, arg);
            }
            Instruction::Binary(Opcode::If, cond, _) => {
                sets.gen_push(index, cond);
            }
            // arithmetic and comparisons are the only three-address forms
            Instruction::ThreeAddr(_, dst, lhs, rhs) => {
                sets.kill_push(index, dst);
                sets.gen_push(index, lhs);
                sets.gen_push(index, rhs);
            }
            // var, jmp, call, function, ret, label, nop touch no variables
            _ => {}
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_program;

    fn sets_for(source: &str) -> UseDefSets {
        let (program, _) = parse_program(source).unwrap();
        build_use_def_sets(&program)
    }

    #[test]
    fn mov_kills_dst_and_gens_variable_sources_only() {
        let sets = sets_for(
            "var a int32\n\
             mov a 4\n\
             var b int32\n\
             mov b a\n",
        );

        assert_eq!(sets.kill[&1], vec!["a"]);
        assert!(sets.gen.get(&1).is_none());
        assert_eq!(sets.kill[&3], vec!["b"]);
        assert_eq!(sets.gen[&3], vec!["a"]);
    }

    #[test]
    fn arithmetic_gens_both_operands_with_duplicates() {
        let sets = sets_for("add c a a\n");

        assert_eq!(sets.kill[&0], vec!["c"]);
        assert_eq!(sets.gen[&0], vec!["a", "a"]);
    }

    #[test]
    fn comparisons_follow_the_three_address_rule() {
        let sets = sets_for("cmp_lt r x y\n");

        assert_eq!(sets.kill[&0], vec!["r"]);
        assert_eq!(sets.gen[&0], vec!["x", "y"]);
    }

    #[test]
    fn stack_and_heap_ops_are_uses() {
        let sets = sets_for("push a\npop b\nnew c\ndelete c\n");

        assert_eq!(sets.gen[&0], vec!["a"]);
        assert_eq!(sets.gen[&1], vec!["b"]);
        assert_eq!(sets.gen[&2], vec!["c"]);
        assert_eq!(sets.gen[&3], vec!["c"]);
        assert!(sets.kill.is_empty());
    }

    #[test]
    fn control_flow_touches_nothing() {
        let sets = sets_for("label l :\njmp l\ncall f\nret\nnop\n");

        assert!(sets.gen.is_empty());
        assert!(sets.kill.is_empty());
    }

    #[test]
    fn if_gens_its_condition() {
        let sets = sets_for("label l :\nif c l\n");

        assert_eq!(sets.gen[&1], vec!["c"]);
        assert!(sets.kill.is_empty());
    }
}
