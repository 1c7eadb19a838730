use std::collections::BTreeMap;

use crate::ir::{Instruction, LabelTable, Opcode, Program};

/// Virtual exit node marking program termination.
pub const EXIT: i32 = -1;

/// Successor multigraph over instruction indices. Edges keep their
/// insertion order per node, which keeps dumps deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlFlowGraph {
    edges: BTreeMap<i32, Vec<i32>>,
}

impl ControlFlowGraph {
    pub fn insert(&mut self, from: i32, to: i32) {
        self.edges.entry(from).or_default().push(to);
    }

    pub fn successors(&self, node: i32) -> &[i32] {
        self.edges.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges, ordered by source node.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.edges
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }

    /// The edge-reversed multigraph, used to walk predecessors.
    pub fn reversed(&self) -> Self {
        let mut reversed = Self::default();
        for (from, to) in self.iter() {
            reversed.insert(to, from);
        }
        reversed
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl FromIterator<(i32, i32)> for ControlFlowGraph {
    fn from_iter<T: IntoIterator<Item = (i32, i32)>>(iter: T) -> Self {
        let mut cfg = Self::default();
        for (from, to) in iter {
            cfg.insert(from, to);
        }
        cfg
    }
}

/// Builds the successor graph with a linear walk. Calls are biconnected to
/// both their numeric target (when the callee parses as an offset) and the
/// fall-through; a later `ret` pops the recorded call site and returns past
/// it.
pub fn build_cfg(program: &Program, table: &LabelTable) -> ControlFlowGraph {
    let mut cfg = ControlFlowGraph::default();

    if program.is_empty() {
        return cfg;
    }
    if program.len() == 1 {
        cfg.insert(0, EXIT);
        return cfg;
    }

    let mut call_stack: Vec<i32> = Vec::new();
    let last = program.len() - 1;

    for (index, instr) in program.iter().enumerate() {
        let i = index as i32;
        let fall_through = if index == last { EXIT } else { i + 1 };

        match instr {
            Instruction::Unary(Opcode::Jmp, target) => {
                if let Some(to) = resolve_target(i, target, table) {
                    cfg.insert(i, to);
                }
            }
            Instruction::Binary(Opcode::If, _, target) => {
                if let Some(to) = resolve_target(i, target, table) {
                    cfg.insert(i, to);
                }
                cfg.insert(i, fall_through);
            }
            Instruction::Call { args } => {
                if let Ok(offset) = args[0].parse::<i32>() {
                    cfg.insert(i, i + offset);
                }
                cfg.insert(i, fall_through);
                call_stack.push(i);
            }
            Instruction::NoArg(Opcode::Ret) => {
                if let Some(call_site) = call_stack.pop() {
                    cfg.insert(i, call_site + 1);
                }
            }
            _ => cfg.insert(i, fall_through),
        }
    }

    cfg
}

/// Alphabetic targets go through the label table (unknown labels silently
/// contribute no edge here; lowering reports them); anything else is a
/// signed offset relative to the jump.
fn resolve_target(index: i32, target: &str, table: &LabelTable) -> Option<i32> {
    match target.chars().next() {
        Some(c) if c.is_alphabetic() => table.get(target).map(|t| t as i32),
        _ => target.parse::<i32>().ok().map(|offset| index + offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_program;

    fn cfg_for(source: &str) -> ControlFlowGraph {
        let (program, table) = parse_program(source).unwrap();
        build_cfg(&program, &table)
    }

    #[test]
    fn empty_program_has_empty_cfg() {
        assert!(cfg_for("").is_empty());
    }

    #[test]
    fn singleton_program_flows_to_exit() {
        let expected: ControlFlowGraph = [(0, EXIT)].into_iter().collect();
        assert_eq!(cfg_for("nop\n"), expected);
    }

    #[test]
    fn sequential_code() {
        let cfg = cfg_for(
            "var a int32\n\
             mov a 4\n\
             var b int8\n\
             mov b 2\n",
        );

        let expected: ControlFlowGraph =
            [(0, 1), (1, 2), (2, 3), (3, EXIT)].into_iter().collect();
        assert_eq!(cfg, expected);
    }

    #[test]
    fn jmp_code() {
        let cfg = cfg_for(
            "var a int32\n\
             mov a 4\n\
             var b int8\n\
             mov b 2\n\
             jmp -2\n",
        );

        let expected: ControlFlowGraph =
            [(0, 1), (1, 2), (2, 3), (3, 4), (4, 2)].into_iter().collect();
        assert_eq!(cfg, expected);
    }

    #[test]
    fn if_adds_taken_and_fall_through_edges() {
        let cfg = cfg_for(
            "var c int32\n\
             label top :\n\
             nop\n\
             if c top\n\
             nop\n",
        );

        // taken edge first, then the fall-through
        assert_eq!(cfg.successors(3), &[2, 4]);
    }

    #[test]
    fn missing_label_omits_the_edge() {
        let cfg = cfg_for("nop\njmp nowhere\n");

        assert_eq!(cfg.successors(1), &[] as &[i32]);
    }

    #[test]
    fn numeric_call_pairs_with_ret() {
        let cfg = cfg_for(
            "nop\n\
             call 2\n\
             nop\n\
             ret\n\
             nop\n",
        );

        // biconnect at the call site
        assert_eq!(cfg.successors(1), &[3, 2]);
        // ret resumes after the recorded call site
        assert_eq!(cfg.successors(3), &[2]);
    }

    #[test]
    fn symbolic_call_keeps_only_fall_through() {
        let cfg = cfg_for("var a int32\ncall writeln a\nnop\n");

        assert_eq!(cfg.successors(1), &[2]);
    }

    #[test]
    fn reversed_swaps_edges() {
        let cfg: ControlFlowGraph = [(0, 1), (1, 2), (2, EXIT)].into_iter().collect();
        let expected: ControlFlowGraph = [(1, 0), (2, 1), (EXIT, 2)].into_iter().collect();

        assert_eq!(cfg.reversed(), expected);
    }

    #[test]
    fn every_index_is_a_source() {
        let cfg = cfg_for(
            "var a int32\n\
             mov a 1\n\
             label top :\n\
             sub a a 1\n\
             if a top\n\
             push a\n",
        );

        for index in 0..6 {
            assert!(!cfg.successors(index).is_empty(), "index {index} has no edge");
        }
        for (_, to) in cfg.iter() {
            assert!(to == EXIT || (0..6).contains(&to));
        }
    }
}
