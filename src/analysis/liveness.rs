use std::collections::{BTreeMap, BTreeSet};

use super::cfg::ControlFlowGraph;
use super::use_def::build_use_def_sets;
use crate::ir::Program;

/// Live variables at instruction entry and exit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InOutSets {
    pub in_set: BTreeSet<String>,
    pub out_set: BTreeSet<String>,
}

pub type LivenessSets = BTreeMap<usize, InOutSets>;

/// Backward liveness dataflow:
///
///   out[n] = U in[s]  for s in succ(n)
///   in[n]  = (out[n] \ kill[n]) U gen[n]
///
/// The worklist seeds every instruction and re-enqueues predecessors
/// whenever an `in` set grows, so the result is a true fixed point even on
/// cyclic graphs.
pub fn liveness_analysis(program: &Program, cfg: &ControlFlowGraph) -> LivenessSets {
    let use_def = build_use_def_sets(program);
    let gen: BTreeMap<usize, BTreeSet<String>> = use_def
        .gen
        .iter()
        .map(|(&index, vars)| (index, vars.iter().cloned().collect()))
        .collect();
    let kill: BTreeMap<usize, BTreeSet<String>> = use_def
        .kill
        .iter()
        .map(|(&index, vars)| (index, vars.iter().cloned().collect()))
        .collect();

    let backward_cfg = cfg.reversed();
    let mut sets: LivenessSets = (0..program.len())
        .map(|index| (index, InOutSets::default()))
        .collect();

    // popping from the back visits the program bottom-up first
    let mut work_list: Vec<i32> = (0..program.len() as i32).collect();

    while let Some(node) = work_list.pop() {
        let index = node as usize;

        let mut out_set = BTreeSet::new();
        for &succ in cfg.successors(node) {
            if succ < 0 {
                continue;
            }
            if let Some(succ_sets) = sets.get(&(succ as usize)) {
                out_set.extend(succ_sets.in_set.iter().cloned());
            }
        }

        let mut in_set: BTreeSet<String> = match kill.get(&index) {
            Some(kill_set) => out_set.difference(kill_set).cloned().collect(),
            None => out_set.clone(),
        };
        if let Some(gen_set) = gen.get(&index) {
            in_set.extend(gen_set.iter().cloned());
        }

        let entry = match sets.get_mut(&index) {
            Some(entry) => entry,
            None => continue,
        };
        let changed = entry.in_set != in_set;
        entry.in_set = in_set;
        entry.out_set = out_set;

        if changed {
            for &pred in backward_cfg.successors(node) {
                if pred >= 0 {
                    work_list.push(pred);
                }
            }
        }
    }

    sets
}
