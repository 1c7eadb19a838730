mod cfg;
mod intervals;
mod liveness;
mod use_def;

pub use cfg::{build_cfg, ControlFlowGraph, EXIT};
pub use intervals::{compute_variable_live_ranges, LiveRange, VariableIntervals};
pub use liveness::{liveness_analysis, InOutSets, LivenessSets};
pub use use_def::{build_use_def_sets, UseDefSets};
