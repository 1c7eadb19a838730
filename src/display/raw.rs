use std::collections::BTreeMap;
use std::fmt::Write;

use crate::analysis::{ControlFlowGraph, LivenessSets, UseDefSets, VariableIntervals};
use crate::ir::Program;

/// Instruction listing followed by the edge list, one `from->to` per line.
pub fn cfg_to_string(program: &Program, cfg: &ControlFlowGraph) -> String {
    let mut out = String::new();

    for (index, instr) in program.iter().enumerate() {
        let _ = writeln!(out, "{index} <- {instr}");
    }
    out.push('\n');

    for (from, to) in cfg.iter() {
        let _ = writeln!(out, "\t{from}->{to}");
    }

    out
}

pub fn gen_set_to_string(sets: &UseDefSets) -> String {
    let mut out = String::from("GEN set :\n");
    push_variable_set(&mut out, &sets.gen);
    out
}

pub fn kill_set_to_string(sets: &UseDefSets) -> String {
    let mut out = String::from("KILL set :\n");
    push_variable_set(&mut out, &sets.kill);
    out
}

fn push_variable_set(out: &mut String, set: &BTreeMap<usize, Vec<String>>) {
    for (index, vars) in set {
        let _ = writeln!(out, "\t{index}->{}", vars.join(","));
    }
}

/// `in` and `out` line pairs per instruction.
pub fn liveness_to_string(sets: &LivenessSets) -> String {
    let mut out = String::new();

    for (index, in_out) in sets {
        let in_vars: Vec<&str> = in_out.in_set.iter().map(String::as_str).collect();
        let out_vars: Vec<&str> = in_out.out_set.iter().map(String::as_str).collect();
        let _ = writeln!(out, "in  ({index}) {{{}}}", in_vars.join(","));
        let _ = writeln!(out, "out ({index}) {{{}}}", out_vars.join(","));
    }

    out
}

/// One `name[first,last]` line per live interval.
pub fn intervals_to_string(intervals: &VariableIntervals) -> String {
    let mut out = String::new();

    for (name, (first, last)) in intervals.iter() {
        let _ = writeln!(out, "{name}[{first},{last}]");
    }

    out
}
