use std::collections::BTreeMap;
use std::fmt::Write;

use crate::analysis::{ControlFlowGraph, LivenessSets, UseDefSets, EXIT};
use crate::ir::Program;

/// Graphviz rendering of the CFG: one record node per instruction, HTML
/// table subnodes for the GEN/KILL/LIVE sets, and every edge except those
/// into the exit sentinel.
pub fn cfg_to_dot(
    program: &Program,
    cfg: &ControlFlowGraph,
    use_def: &UseDefSets,
    liveness: &LivenessSets,
) -> String {
    let mut out = String::new();

    out.push_str("digraph {\n");
    out.push_str("\tnode[shape=record,style=filled,fillcolor=gray95]\n");

    for (index, instr) in program.iter().enumerate() {
        let _ = writeln!(out, "\t{index}[label=\"{index} :: {instr}\"]");
    }

    push_set_table(&mut out, "GEN_Set", &use_def.gen);
    push_set_table(&mut out, "KILL_Set", &use_def.kill);
    push_liveness_table(&mut out, "LIVE", liveness);

    for (from, to) in cfg.iter() {
        if to == EXIT {
            continue;
        }
        let _ = writeln!(out, "\t{from}->{to}");
    }

    out.push_str("}\n");
    out
}

fn push_set_table(out: &mut String, label: &str, set: &BTreeMap<usize, Vec<String>>) {
    let _ = writeln!(out, "{label} [label=<");
    out.push_str("<table border=\"0\" cellborder=\"1\" cellspacing=\"0\">\n");
    let _ = writeln!(out, "<tr><td><i>{label}</i></td></tr>");

    for (index, vars) in set {
        let _ = writeln!(
            out,
            "<tr><td port=\"{index}\">{index}:: [{}]</td></tr>",
            vars.join(",")
        );
    }

    out.push_str("</table>>]\n");
}

fn push_liveness_table(out: &mut String, label: &str, sets: &LivenessSets) {
    let _ = writeln!(out, "{label} [label=<");
    out.push_str("<table border=\"0\" cellborder=\"1\" cellspacing=\"0\">\n");
    let _ = writeln!(out, "<tr><td><i>{label}</i></td></tr>");

    for (index, in_out) in sets {
        let in_vars: Vec<&str> = in_out.in_set.iter().map(String::as_str).collect();
        let out_vars: Vec<&str> = in_out.out_set.iter().map(String::as_str).collect();
        let _ = writeln!(
            out,
            "<tr><td port=\"{index}\">{index} inp :: [{}]</td></tr>",
            in_vars.join(",")
        );
        let _ = writeln!(
            out,
            "<tr><td port=\"{index}\">{index} out :: [{}]</td></tr>",
            out_vars.join(",")
        );
    }

    out.push_str("</table>>]\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{build_cfg, build_use_def_sets, liveness_analysis};
    use crate::ir::parse_program;

    #[test]
    fn dot_output_has_nodes_tables_and_edges() {
        let (program, table) = parse_program("var a int32\nmov a 1\npush a\n").unwrap();
        let cfg = build_cfg(&program, &table);
        let use_def = build_use_def_sets(&program);
        let liveness = liveness_analysis(&program, &cfg);

        let dot = cfg_to_dot(&program, &cfg, &use_def, &liveness);

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("\tnode[shape=record,style=filled,fillcolor=gray95]\n"));
        assert!(dot.contains("\t0[label=\"0 :: var a int32\"]"));
        assert!(dot.contains("<tr><td><i>GEN_Set</i></td></tr>"));
        assert!(dot.contains("<tr><td><i>KILL_Set</i></td></tr>"));
        assert!(dot.contains("2 inp :: [a]"));
        assert!(dot.contains("\t0->1\n"));
        // edges into the sentinel are omitted
        assert!(!dot.contains("->-1"));
    }
}
