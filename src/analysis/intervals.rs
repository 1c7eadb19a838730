use std::collections::{BTreeMap, BTreeSet};

use super::liveness::LivenessSets;
use crate::ir::Instruction;

/// Inclusive range of instruction indices over which a variable is live.
pub type LiveRange = (usize, usize);

/// Live ranges per variable. A variable that dies and is later redefined
/// owns several disjoint intervals, so this is a multimap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableIntervals {
    intervals: BTreeMap<String, Vec<LiveRange>>,
}

impl VariableIntervals {
    fn push(&mut self, name: String, range: LiveRange) {
        self.intervals.entry(name).or_default().push(range);
    }

    /// All intervals ordered by variable name, then position.
    pub fn iter(&self) -> impl Iterator<Item = (&str, LiveRange)> + '_ {
        self.intervals
            .iter()
            .flat_map(|(name, ranges)| ranges.iter().map(move |&range| (name.as_str(), range)))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.intervals.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// True when `instr` mentions a variable whose interval covers `index`.
    pub fn covers(&self, instr: &Instruction, index: usize) -> bool {
        self.intervals.iter().any(|(name, ranges)| {
            instr.is_arg_equal(name)
                && ranges.iter().any(|&(first, last)| first <= index && index <= last)
        })
    }
}

/// Collects the indices where each variable is live (in either set), then
/// coalesces runs of consecutive indices into `(first, last)` intervals.
pub fn compute_variable_live_ranges(sets: &LivenessSets) -> VariableIntervals {
    let mut live_points: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

    for (&index, in_out) in sets {
        for var in in_out.in_set.iter().chain(in_out.out_set.iter()) {
            live_points.entry(var.clone()).or_default().insert(index);
        }
    }

    let mut intervals = VariableIntervals::default();
    for (name, indices) in live_points {
        let mut iter = indices.into_iter();
        let first = match iter.next() {
            Some(index) => index,
            None => continue,
        };

        let mut start = first;
        let mut previous = first;
        for index in iter {
            if index - previous > 1 {
                intervals.push(name.clone(), (start, previous));
                start = index;
            }
            previous = index;
        }
        intervals.push(name, (start, previous));
    }

    intervals
}
